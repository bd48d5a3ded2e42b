//! HTTP Range negotiation
//!
//! Interprets a `Range` header against a resource length, RFC 9110 §14.
//! Only single `bytes` ranges are served; multipart byte ranges are rejected.

/// Inclusive byte interval of a resource selected for transfer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RangeWindow {
    /// First byte offset
    pub start: u64,
    /// Last byte offset (inclusive)
    pub end: u64,
    /// Total resource length
    pub total: u64,
}

impl RangeWindow {
    /// Window covering the whole resource
    pub const fn full(total: u64) -> Self {
        Self {
            start: 0,
            end: total.saturating_sub(1),
            total,
        }
    }

    /// Number of bytes in the window
    pub const fn len(&self) -> u64 {
        if self.total == 0 {
            0
        } else {
            self.end - self.start + 1
        }
    }

    pub const fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// `Content-Range` value for a 206 response
    pub fn content_range(&self) -> String {
        format!("bytes {}-{}/{}", self.start, self.end, self.total)
    }
}

/// Result of negotiating a `Range` header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeOutcome {
    /// No usable Range header: 200 with the whole resource
    Full(RangeWindow),
    /// Single satisfiable range: 206 with `Content-Range`
    Partial(RangeWindow),
    /// Multiple ranges or start past the end: 416 with `bytes */total`
    Unsatisfiable { total: u64 },
}

impl RangeOutcome {
    /// `Content-Range` value for a 416 response
    pub fn unsatisfied_range(total: u64) -> String {
        format!("bytes */{total}")
    }
}

/// Negotiate the byte window for a resource of `resource_size` bytes
///
/// Supported forms: `bytes=start-end`, `bytes=start-`, `bytes=-suffix`.
/// Headers in another unit or with non-numeric bounds are ignored, as
/// RFC 9110 allows.
///
/// # Examples
/// ```
/// use static_microserver::http::range::{negotiate, RangeOutcome};
///
/// match negotiate(Some("bytes=-10"), 100) {
///     RangeOutcome::Partial(w) => assert_eq!((w.start, w.end), (90, 99)),
///     other => panic!("unexpected {other:?}"),
/// }
/// assert!(matches!(negotiate(None, 100), RangeOutcome::Full(_)));
/// ```
pub fn negotiate(range_header: Option<&str>, resource_size: u64) -> RangeOutcome {
    let full = RangeOutcome::Full(RangeWindow::full(resource_size));

    let Some(header) = range_header.map(str::trim) else {
        return full;
    };

    let Some(spec) = strip_bytes_unit(header) else {
        return full;
    };

    // Multipart byte ranges are not implemented
    if spec.contains(',') {
        return RangeOutcome::Unsatisfiable {
            total: resource_size,
        };
    }

    let Some((start_str, end_str)) = spec.split_once('-') else {
        return full;
    };
    let (start_str, end_str) = (start_str.trim(), end_str.trim());

    let parsed = if start_str.is_empty() {
        parse_suffix_range(end_str, resource_size)
    } else {
        parse_standard_range(start_str, end_str, resource_size)
    };

    match parsed {
        Parsed::Window(window) => RangeOutcome::Partial(window),
        Parsed::Unsatisfiable => RangeOutcome::Unsatisfiable {
            total: resource_size,
        },
        Parsed::Malformed => full,
    }
}

enum Parsed {
    Window(RangeWindow),
    Unsatisfiable,
    Malformed,
}

fn strip_bytes_unit(header: &str) -> Option<&str> {
    let (unit, spec) = header.split_once('=')?;
    unit.trim().eq_ignore_ascii_case("bytes").then_some(spec)
}

/// Suffix range, e.g. "-500" for the last 500 bytes
fn parse_suffix_range(suffix_str: &str, total: u64) -> Parsed {
    let Ok(suffix) = suffix_str.parse::<u64>() else {
        return Parsed::Malformed;
    };

    if suffix == 0 || total == 0 {
        return Parsed::Unsatisfiable;
    }

    // Suffix longer than the resource selects all of it
    Parsed::Window(RangeWindow {
        start: total.saturating_sub(suffix),
        end: total - 1,
        total,
    })
}

/// Standard range, e.g. "0-99" or "100-"
fn parse_standard_range(start_str: &str, end_str: &str, total: u64) -> Parsed {
    let Ok(start) = start_str.parse::<u64>() else {
        return Parsed::Malformed;
    };

    let end = if end_str.is_empty() {
        None
    } else {
        match end_str.parse::<u64>() {
            Ok(e) => Some(e),
            Err(_) => return Parsed::Malformed,
        }
    };

    if let Some(e) = end {
        if start > e {
            return Parsed::Malformed;
        }
    }

    if start >= total {
        return Parsed::Unsatisfiable;
    }

    let last = total - 1;
    Parsed::Window(RangeWindow {
        start,
        end: end.map_or(last, |e| e.min(last)),
        total,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn partial(header: &str, size: u64) -> RangeWindow {
        match negotiate(Some(header), size) {
            RangeOutcome::Partial(w) => w,
            other => panic!("Expected Partial for {header:?}, got {other:?}"),
        }
    }

    #[test]
    fn test_no_range() {
        assert_eq!(
            negotiate(None, 100),
            RangeOutcome::Full(RangeWindow {
                start: 0,
                end: 99,
                total: 100
            })
        );
    }

    #[test]
    fn test_first_byte() {
        let w = partial("bytes=0-0", 100);
        assert_eq!(w.len(), 1);
        assert_eq!(w.content_range(), "bytes 0-0/100");
    }

    #[test]
    fn test_standard_range() {
        let w = partial("bytes=0-9", 100);
        assert_eq!((w.start, w.end), (0, 9));
        assert_eq!(w.len(), 10);
    }

    #[test]
    fn test_open_range() {
        let w = partial("bytes=50-", 100);
        assert_eq!((w.start, w.end), (50, 99));
        assert_eq!(w.len(), 50);
    }

    #[test]
    fn test_end_clamped() {
        let w = partial("bytes=90-5000", 100);
        assert_eq!((w.start, w.end), (90, 99));
    }

    #[test]
    fn test_suffix_range() {
        let w = partial("bytes=-10", 100);
        assert_eq!((w.start, w.end), (90, 99));
        assert_eq!(w.content_range(), "bytes 90-99/100");

        let w = partial("bytes=-500", 100);
        assert_eq!((w.start, w.end), (0, 99));
    }

    #[test]
    fn test_multiple_ranges_rejected() {
        assert_eq!(
            negotiate(Some("bytes=0-9,20-29"), 100),
            RangeOutcome::Unsatisfiable { total: 100 }
        );
        assert_eq!(
            negotiate(Some("bytes=0-0, -1"), 100),
            RangeOutcome::Unsatisfiable { total: 100 }
        );
    }

    #[test]
    fn test_not_satisfiable() {
        assert!(matches!(
            negotiate(Some("bytes=200-"), 100),
            RangeOutcome::Unsatisfiable { total: 100 }
        ));
        assert!(matches!(
            negotiate(Some("bytes=100-100"), 100),
            RangeOutcome::Unsatisfiable { .. }
        ));
        assert!(matches!(
            negotiate(Some("bytes=-0"), 100),
            RangeOutcome::Unsatisfiable { .. }
        ));
        assert!(matches!(
            negotiate(Some("bytes=0-0"), 0),
            RangeOutcome::Unsatisfiable { total: 0 }
        ));
    }

    #[test]
    fn test_malformed_ignored() {
        for header in ["bytes=a-b", "items=0-9", "bytes=9-0", "bytes=5", "garbage"] {
            assert!(
                matches!(negotiate(Some(header), 100), RangeOutcome::Full(_)),
                "{header:?} should be ignored"
            );
        }
    }

    #[test]
    fn test_unit_case_insensitive() {
        let w = partial("Bytes=1-2", 10);
        assert_eq!((w.start, w.end), (1, 2));
    }

    #[test]
    fn test_empty_resource_full_window() {
        let w = RangeWindow::full(0);
        assert!(w.is_empty());
        assert_eq!(RangeOutcome::unsatisfied_range(0), "bytes */0");
    }
}
