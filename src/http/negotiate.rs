//! Proactive content negotiation
//!
//! `Accept` decides whether a resource's type may be sent at all (406
//! otherwise); `Accept-Language` picks the listing locale.

/// One comma-separated element of an `Accept`-style header
struct Weighted<'a> {
    value: &'a str,
    q: f32,
}

fn parse_weighted(header: &str) -> impl Iterator<Item = Weighted<'_>> {
    header.split(',').filter_map(|element| {
        let mut parts = element.split(';');
        let value = parts.next()?.trim();
        if value.is_empty() {
            return None;
        }
        let q = parts
            .filter_map(|p| p.trim().strip_prefix("q="))
            .find_map(|q| q.trim().parse::<f32>().ok())
            .unwrap_or(1.0);
        Some(Weighted { value, q })
    })
}

/// Check whether `content_type` is acceptable under an `Accept` header
///
/// A missing or empty header accepts everything. Otherwise the most specific
/// matching media range decides, and a weight of `q=0` refuses.
///
/// # Examples
/// ```
/// use static_microserver::http::negotiate::accepts;
/// assert!(accepts(None, "image/png"));
/// assert!(accepts(Some("image/*"), "image/png"));
/// assert!(!accepts(Some("text/html"), "image/png"));
/// ```
pub fn accepts(accept: Option<&str>, content_type: &str) -> bool {
    let Some(accept) = accept.map(str::trim).filter(|a| !a.is_empty()) else {
        return true;
    };

    let essence = content_type
        .split(';')
        .next()
        .unwrap_or(content_type)
        .trim()
        .to_ascii_lowercase();
    let (kind, subtype) = essence.split_once('/').unwrap_or((essence.as_str(), ""));

    let mut best: Option<(u8, f32)> = None;
    for range in parse_weighted(accept) {
        let range_value = range.value.to_ascii_lowercase();
        let Some((r_kind, r_sub)) = range_value.split_once('/') else {
            continue;
        };

        let specificity = match (r_kind, r_sub) {
            ("*", "*") => 0,
            (k, "*") if k == kind => 1,
            (k, s) if k == kind && s == subtype => 2,
            _ => continue,
        };

        if best.map_or(true, |(s, _)| specificity > s) {
            best = Some((specificity, range.q));
        }
    }

    best.is_some_and(|(_, q)| q > 0.0)
}

/// Pick the first available locale the client asks for, by descending weight
///
/// Tags match on their primary subtag (`fr-CH` selects `fr`). Returns `None`
/// when nothing matches so the caller can apply its default.
pub fn preferred_language<'a>(accept_language: Option<&str>, available: &[&'a str]) -> Option<&'a str> {
    let header = accept_language?;

    let mut ranges: Vec<Weighted<'_>> = parse_weighted(header).filter(|r| r.q > 0.0).collect();
    // Stable sort keeps header order for equal weights
    ranges.sort_by(|a, b| b.q.total_cmp(&a.q));

    ranges.iter().find_map(|range| {
        let primary = range.value.split('-').next().unwrap_or(range.value);
        available
            .iter()
            .copied()
            .find(|locale| locale.eq_ignore_ascii_case(primary))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_accept_allows_all() {
        assert!(accepts(None, "application/octet-stream"));
        assert!(accepts(Some("  "), "text/plain"));
    }

    #[test]
    fn test_wildcards() {
        assert!(accepts(Some("*/*"), "video/mp4"));
        assert!(accepts(Some("text/*"), "text/html; charset=utf-8"));
        assert!(!accepts(Some("text/*"), "video/mp4"));
    }

    #[test]
    fn test_browser_accept() {
        let accept = "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8";
        assert!(accepts(Some(accept), "image/webp"));
        assert!(accepts(Some(accept), "text/html; charset=utf-8"));
    }

    #[test]
    fn test_zero_weight_refuses() {
        assert!(!accepts(Some("image/png;q=0"), "image/png"));
        assert!(!accepts(Some("*/*, text/*;q=0"), "text/css"));
        assert!(accepts(Some("text/*;q=0, text/css"), "text/css"));
    }

    #[test]
    fn test_preferred_language() {
        let available = ["en", "de", "fr"];
        assert_eq!(
            preferred_language(Some("fr-CH, fr;q=0.9, en;q=0.8"), &available),
            Some("fr")
        );
        assert_eq!(
            preferred_language(Some("ja;q=0.9, de;q=0.5, en;q=0.7"), &available),
            Some("en")
        );
        assert_eq!(preferred_language(Some("ja, *;q=0.1"), &available), None);
        assert_eq!(preferred_language(Some("de;q=0"), &available), None);
        assert_eq!(preferred_language(None, &available), None);
    }
}
