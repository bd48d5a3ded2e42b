//! HTTP Basic authentication gate
//!
//! With an empty credential table every request passes. Otherwise a request
//! without credentials gets 401 and a challenge; a request with credentials
//! that are malformed, unknown or wrong gets 403.

use std::collections::HashMap;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use hyper::header::{HeaderMap, AUTHORIZATION};

use crate::error::StartupError;
use crate::http::{build_401_response, build_403_response, HttpResponse};
use crate::logger;

/// Realm advertised in `WWW-Authenticate`
pub const REALM: &str = "Access to file GET";

/// Username to password, built once at startup
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CredentialTable {
    entries: HashMap<String, String>,
}

impl CredentialTable {
    /// Build from `user,password` entries; the password may itself contain commas
    pub fn from_entries<I, S>(entries: I) -> Result<Self, StartupError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut table = HashMap::new();
        for entry in entries {
            let entry = entry.as_ref();
            match entry.split_once(',') {
                Some((user, password)) if !user.is_empty() => {
                    table.insert(user.to_string(), password.to_string());
                }
                _ => return Err(StartupError::Credential(entry.to_string())),
            }
        }
        Ok(Self { entries: table })
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check a password; comparison time does not depend on where bytes differ
    pub fn verify(&self, user: &str, password: &str) -> bool {
        self.entries
            .get(user)
            .is_some_and(|expected| constant_time_eq(expected.as_bytes(), password.as_bytes()))
    }
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

/// Outcome of checking a request's `Authorization` header
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthDecision {
    /// No gate configured
    Open,
    /// Valid credentials for this user
    Granted(String),
    /// No `Authorization` header
    Missing,
    /// Credentials supplied but not accepted; carries the user when decodable
    Rejected(Option<String>),
}

/// Decide whether an `Authorization` value satisfies the table
pub fn verify(authorization: Option<&str>, table: &CredentialTable) -> AuthDecision {
    if table.is_empty() {
        return AuthDecision::Open;
    }

    let Some(value) = authorization else {
        return AuthDecision::Missing;
    };

    let Some((user, password)) = decode_basic(value) else {
        return AuthDecision::Rejected(None);
    };

    if table.verify(&user, &password) {
        AuthDecision::Granted(user)
    } else {
        AuthDecision::Rejected(Some(user))
    }
}

/// Decode `Basic <base64(user:password)>`, splitting on the first colon only
fn decode_basic(value: &str) -> Option<(String, String)> {
    let value = value.trim();
    // RFC 7617: the scheme name is case-insensitive
    let payload = value
        .get(..6)
        .filter(|scheme| scheme.eq_ignore_ascii_case("basic "))
        .map(|_| value[6..].trim())?;

    let decoded = STANDARD.decode(payload).ok()?;
    let decoded = String::from_utf8(decoded).ok()?;
    let (user, password) = decoded.split_once(':')?;
    Some((user.to_string(), password.to_string()))
}

/// User name claimed by a Basic `Authorization` header, verified or not
pub fn basic_user(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    decode_basic(value).map(|(user, _)| user)
}

/// Run the gate; `Some(response)` short-circuits the request
pub fn check_auth(headers: &HeaderMap, table: &CredentialTable) -> Option<HttpResponse> {
    // A present but non-ASCII header still counts as supplied credentials
    let authorization = headers
        .get(AUTHORIZATION)
        .map(|v| v.to_str().unwrap_or_default());

    match verify(authorization, table) {
        AuthDecision::Open => None,
        AuthDecision::Granted(user) => {
            tracing::debug!(user = %user, "authorized");
            None
        }
        AuthDecision::Missing => {
            logger::log_warning("No user provided, unauthorized for GET");
            Some(build_401_response(REALM))
        }
        AuthDecision::Rejected(user) => {
            logger::log_auth_rejected(user.as_deref());
            Some(build_403_response(REALM))
        }
    }
}
