pub mod event;
pub mod segment;
pub mod submission;
pub mod summary;

pub use event::*;
pub use segment::*;
pub use submission::*;
pub use summary::*;

use serde::de::IgnoredAny;
use serde::{Deserialize, Deserializer};

/// Categorical values that parse leniently from their wire tags.
pub(crate) trait Tag: Sized {
    fn parse_tag(s: &str) -> Option<Self>;
}

/// Deserializes an optional tag, mapping unknown values to `None` instead of failing.
pub(crate) fn lenient_tag<'de, D, T>(deserializer: D) -> std::result::Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Tag,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.as_deref().and_then(T::parse_tag))
}

/// Deserializes a number that may be stored as `null`, reading it as 0.
pub(crate) fn null_as_zero<'de, D>(deserializer: D) -> std::result::Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(0.0))
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawCount {
    Int(i64),
    Float(f64),
    Text(String),
    Other(IgnoredAny),
}

/// Deserializes an optional count. Negative, fractional or unreadable values
/// become `None` so the usual default applies.
pub(crate) fn lenient_count<'de, D>(deserializer: D) -> std::result::Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let count = match Option::<RawCount>::deserialize(deserializer)? {
        Some(RawCount::Int(n)) => u32::try_from(n).ok(),
        Some(RawCount::Float(f)) if f.is_finite() && f >= 0.0 && f.fract() == 0.0 => {
            u32::try_from(f as i64).ok()
        }
        Some(RawCount::Text(s)) => s.trim().parse().ok(),
        _ => None,
    };
    Ok(count)
}

/// Lowercases and strips separators so "Plug-in Hybrid" and "pluginHybrid" compare equal.
pub(crate) fn normalize_tag(s: &str) -> String {
    s.trim().to_lowercase().replace(['-', ' ', '_'], "")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Deserialize)]
    struct Counted {
        #[serde(default, deserialize_with = "lenient_count")]
        count: Option<u32>,
        #[serde(default, deserialize_with = "null_as_zero")]
        amount: f64,
    }

    fn count_of(json: &str) -> Option<u32> {
        serde_json::from_str::<Counted>(json)
            .expect("document parses")
            .count
    }

    #[test]
    fn lenient_count_accepts_whole_numbers() {
        assert_eq!(count_of(r#"{"count": 3}"#), Some(3));
        assert_eq!(count_of(r#"{"count": 4.0}"#), Some(4));
        assert_eq!(count_of(r#"{"count": " 2 "}"#), Some(2));
        assert_eq!(count_of(r#"{}"#), None);
    }

    #[test]
    fn lenient_count_drops_bad_values() {
        assert_eq!(count_of(r#"{"count": -1}"#), None);
        assert_eq!(count_of(r#"{"count": 2.5}"#), None);
        assert_eq!(count_of(r#"{"count": "many"}"#), None);
        assert_eq!(count_of(r#"{"count": true}"#), None);
        assert_eq!(count_of(r#"{"count": null}"#), None);
    }

    #[test]
    fn null_amount_reads_as_zero() {
        let parsed: Counted = serde_json::from_str(r#"{"amount": null}"#).expect("document parses");
        assert_eq!(parsed.amount, 0.0);
        let parsed: Counted = serde_json::from_str(r#"{"amount": 1.5}"#).expect("document parses");
        assert_eq!(parsed.amount, 1.5);
    }
}
