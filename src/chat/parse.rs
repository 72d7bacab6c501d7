//! Free-text extraction of radius, lookback window, and place names

use regex::Regex;
use std::sync::LazyLock;

static RADIUS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)within\s+(\d+\.?\d*)\s*(km|m)").unwrap());

static TIME_RANGE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(past|last)\s+(\d+)\s+(day|days|month|months)").unwrap());

// Lookback phrases are cut out before place extraction so their digits and
// stopwords never end up inside a captured place name.
static TIME_PHRASE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:from\s+)?(?:the\s+)?(?:past|last)\s+\d+\s+(?:day|days|month|months)")
        .unwrap()
});

// Captures the text after an anchor keyword up to an optional suffix
// (marker tag, question mark, day count, radius, coordinate dump) or the
// end of the message.
static PLACE_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)(?:things to do in|things to do near|about|for|to|regarding|in|from)\s+([A-Za-z][A-Za-z0-9\s]*?)\s*(?:\{location=temporary marker\}|\?|for\s+\d+\s+days|within\s+\d+\.?\d*\s*(?:km|m)|at\s+\[.*?\]|$)",
    )
    .unwrap()
});

/// Radius in kilometers from a "within N km|m" phrase, meters normalized.
/// `None` when the message names no radius.
#[must_use]
pub fn parse_radius_km(message: &str) -> Option<f64> {
    RADIUS.captures(message).and_then(|caps| {
        let value: f64 = caps[1].parse().ok()?;
        Some(if caps[2].eq_ignore_ascii_case("km") {
            value
        } else {
            value / 1000.0
        })
    })
}

/// News lookback in days from a "(past|last) N day(s)|month(s)" phrase,
/// months counted as 30 days. `None` when the message names no range.
#[must_use]
pub fn parse_news_days_back(message: &str) -> Option<u32> {
    TIME_RANGE.captures(message).and_then(|caps| {
        let quantity: u32 = caps[2].parse().ok()?;
        Some(if caps[3].to_lowercase().contains("month") {
            quantity * 30
        } else {
            quantity
        })
    })
}

/// Place name following one of the anchor keywords, if any.
#[must_use]
pub fn extract_place_name(message: &str) -> Option<String> {
    let stripped = TIME_PHRASE.replace_all(message, "");
    let captures = PLACE_NAME.captures(&stripped)?;
    let place = captures[1].trim();
    if place.is_empty() {
        None
    } else {
        Some(place.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("things to do within 10 km", Some(10.0))]
    #[case("things to do within 500 m", Some(0.5))]
    #[case("things to do within 2.5 km", Some(2.5))]
    #[case("things to do in Paris", None)]
    fn test_radius_parsing(#[case] message: &str, #[case] expected: Option<f64>) {
        match (parse_radius_km(message), expected) {
            (Some(actual), Some(expected)) => assert!((actual - expected).abs() < 1e-9),
            (actual, expected) => assert_eq!(actual, expected),
        }
    }

    #[rstest]
    #[case("news from the past 2 days", Some(2))]
    #[case("updates from the last 1 day", Some(1))]
    #[case("news from the past 2 months", Some(60))]
    #[case("any recent news from Rome", None)]
    fn test_news_lookback_parsing(#[case] message: &str, #[case] expected: Option<u32>) {
        assert_eq!(parse_news_days_back(message), expected);
    }

    #[rstest]
    #[case("Tell me about London", Some("London"))]
    #[case("Plan a trip to Paris for 7 days", Some("Paris"))]
    #[case("What are the things to do in New York within 10 km", Some("New York"))]
    #[case("What are the updates regarding Berlin?", Some("Berlin"))]
    #[case("Any recent news from San Francisco?", Some("San Francisco"))]
    #[case("Tell me about this location{location=temporary marker}", Some("this location"))]
    #[case("hello there!", None)]
    fn test_place_name_extraction(#[case] message: &str, #[case] expected: Option<&str>) {
        assert_eq!(extract_place_name(message).as_deref(), expected);
    }

    #[test]
    fn test_place_name_stops_before_radius_suffix() {
        let place = extract_place_name("Things to do in Lisbon within 3 km").unwrap();
        assert_eq!(place, "Lisbon");
    }

    #[test]
    fn test_place_name_survives_lookback_phrase() {
        let place = extract_place_name("Any recent news from Berlin from the past 2 days?").unwrap();
        assert_eq!(place, "Berlin");
        assert_eq!(extract_place_name("news from the past 2 days"), None);
    }

    #[test]
    fn test_alphanumeric_place_name_is_captured() {
        let place = extract_place_name("Plan a trip to Qxyzzy123").unwrap();
        assert_eq!(place, "Qxyzzy123");
    }
}
