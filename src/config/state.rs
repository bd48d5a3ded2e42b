// Application state module
// Validated, immutable configuration shared with every connection

use std::net::SocketAddr;
use std::time::Duration;

use super::types::Config;
use crate::auth::CredentialTable;
use crate::error::StartupError;
use crate::listing::{self, ListingStyle, Locale};
use crate::store::Store;

/// Application state, built once before the accept loop starts
#[derive(Debug)]
pub struct AppState {
    pub config: Config,
    pub addr: SocketAddr,
    pub stores: Vec<Store>,
    pub credentials: CredentialTable,
    /// `None` when directory listings are off
    pub listing: Option<ListingStyle>,
    pub default_locale: Locale,
}

impl AppState {
    /// Validate `config`; any fault here stops the process
    pub fn new(config: Config) -> Result<Self, StartupError> {
        if config.stores.is_empty() {
            return Err(StartupError::NoStores);
        }

        let addr = config.socket_addr()?;
        let stores = config
            .stores
            .iter()
            .map(Store::open)
            .collect::<Result<Vec<_>, _>>()?;
        let credentials = CredentialTable::from_entries(&config.credentials)?;
        let listing = ListingStyle::from_color(&config.listing.color)?;
        let default_locale = config
            .listing
            .default_locale
            .as_deref()
            .and_then(listing::locale::by_tag)
            .unwrap_or_else(listing::locale::process_default);

        Ok(Self {
            config,
            addr,
            stores,
            credentials,
            listing,
            default_locale,
        })
    }

    pub const fn listing_enabled(&self) -> bool {
        self.listing.is_some()
    }

    pub const fn read_timeout(&self) -> Duration {
        Duration::from_secs(self.config.performance.read_timeout)
    }
}
