//! Reduction of one hotel's booking-search response into nightly room counts.
//!
//! A response nests nightly observations at two levels: a `date -> count`
//! map on each rate, and `{date, rooms}` lists on each room of a rate. Every
//! observation found anywhere is folded into a single accumulator that keeps
//! the per-date maximum, so overlapping rates never double count a night.

use serde_json::Value;
use std::collections::BTreeMap;

/// `date -> max rooms available` for a single hotel. An absent date means
/// "no data", which is distinct from a stored `0`.
pub type NightlyAvailability = BTreeMap<String, u64>;

/// `hotel_id -> nightly availability` for a whole run.
pub type HotelAvailability = BTreeMap<String, NightlyAvailability>;

/// Running per-date maximum.
#[derive(Debug, Default)]
struct NightlyAccumulator {
    nightly: NightlyAvailability,
}

impl NightlyAccumulator {
    fn merge(&mut self, date: Option<&str>, count: Option<u64>) {
        let (Some(date), Some(count)) = (date, count) else {
            return;
        };
        if date.is_empty() {
            return;
        }
        self.nightly
            .entry(date.to_string())
            .and_modify(|current| *current = (*current).max(count))
            .or_insert(count);
    }

    fn finish(self) -> NightlyAvailability {
        self.nightly
    }
}

/// Normalize a raw search response. Never fails: missing containers,
/// unexpected shapes and uncoercible counts simply contribute nothing.
pub fn normalize(response: &Value) -> NightlyAvailability {
    let mut acc = NightlyAccumulator::default();
    if !is_truthy(response.get("success")) {
        return acc.finish();
    }

    for hotel in array_at(response, "hotels") {
        for rate in array_at(hotel, "rates") {
            if let Some(nightly) = rate.get("nightly").and_then(Value::as_object) {
                for (date, count) in nightly {
                    acc.merge(Some(date), coerce_count(count));
                }
            }

            for room in array_at(rate, "rooms") {
                for night in array_at(room, "nightly") {
                    acc.merge(
                        night.get("date").and_then(Value::as_str),
                        night.get("rooms").and_then(coerce_count),
                    );
                }
            }
        }
    }

    acc.finish()
}

/// Coerce a JSON value into a room count.
///
/// Integers and integral strings are accepted as-is, floats are truncated,
/// booleans map to 0/1. Negative, non-finite and non-numeric values yield
/// `None` so the observation is ignored rather than treated as zero.
pub fn coerce_count(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => {
            if let Some(v) = n.as_u64() {
                Some(v)
            } else if n.is_i64() {
                None
            } else {
                n.as_f64()
                    .filter(|f| f.is_finite() && *f >= 0.0)
                    .map(|f| f.trunc() as u64)
            }
        }
        Value::String(s) => s.trim().parse::<u64>().ok(),
        Value::Bool(b) => Some(u64::from(*b)),
        _ => None,
    }
}

fn array_at<'a>(value: &'a Value, key: &str) -> &'a [Value] {
    value
        .get(key)
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

fn is_truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|f| f != 0.0),
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(a)) => !a.is_empty(),
        Some(Value::Object(o)) => !o.is_empty(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_empty_and_unsuccessful_responses() {
        assert!(normalize(&json!({})).is_empty());
        assert!(normalize(&Value::Null).is_empty());
        assert!(normalize(&json!([1, 2, 3])).is_empty());

        let rates = json!([{ "nightly": { "2026-08-30": 4 } }]);
        assert!(normalize(&json!({ "hotels": [{ "rates": rates }] })).is_empty());
        assert!(normalize(&json!({ "success": false, "hotels": [{ "rates": rates }] })).is_empty());
    }

    #[test]
    fn test_rate_level_nightly_map() {
        let response = json!({
            "success": true,
            "hotels": [{
                "rates": [{ "nightly": { "2026-08-30": 3, "2026-08-31": "5" } }]
            }]
        });

        let nightly = normalize(&response);
        assert_eq!(nightly.get("2026-08-30"), Some(&3));
        assert_eq!(nightly.get("2026-08-31"), Some(&5));
        assert_eq!(nightly.len(), 2);
    }

    #[test]
    fn test_rate_and_room_level_keep_maximum() {
        let response = json!({
            "success": true,
            "hotels": [{
                "rates": [{
                    "nightly": { "2026-08-30": 3 },
                    "rooms": [{ "nightly": [{ "date": "2026-08-30", "rooms": 7 }] }]
                }]
            }]
        });

        assert_eq!(normalize(&response).get("2026-08-30"), Some(&7));
    }

    #[test]
    fn test_maximum_is_order_independent() {
        let response = json!({
            "success": true,
            "hotels": [{
                "rates": [
                    { "rooms": [{ "nightly": [{ "date": "2026-09-01", "rooms": 9 }] }] },
                    { "nightly": { "2026-09-01": 2 } },
                    { "rooms": [
                        { "nightly": [{ "date": "2026-09-01", "rooms": 4 }] },
                        { "nightly": [{ "date": "2026-09-01", "rooms": 0 }] }
                    ] }
                ]
            }]
        });

        assert_eq!(normalize(&response).get("2026-09-01"), Some(&9));
    }

    #[test]
    fn test_multiple_hotels_fold_into_one_map() {
        let response = json!({
            "success": 1,
            "hotels": [
                { "rates": [{ "nightly": { "2026-08-30": 1 } }] },
                { "rates": [{ "nightly": { "2026-08-30": 6, "2026-08-31": 2 } }] }
            ]
        });

        let nightly = normalize(&response);
        assert_eq!(nightly.get("2026-08-30"), Some(&6));
        assert_eq!(nightly.get("2026-08-31"), Some(&2));
    }

    #[test]
    fn test_tolerates_missing_and_null_containers() {
        let response = json!({
            "success": true,
            "hotels": [
                null,
                { "rates": null },
                { "rates": [null, { "nightly": null, "rooms": null }] },
                { "rates": [{ "rooms": [null, { "nightly": null }, { "nightly": [null, 5] }] }] }
            ]
        });

        assert!(normalize(&response).is_empty());
    }

    #[test]
    fn test_skips_uncoercible_pairs() {
        let response = json!({
            "success": true,
            "hotels": [{
                "rates": [{
                    "nightly": { "2026-08-30": "many", "2026-08-31": null, "2026-09-01": -2 },
                    "rooms": [{ "nightly": [
                        { "date": "2026-09-02" },
                        { "rooms": 3 },
                        { "date": "", "rooms": 3 },
                        { "date": "2026-09-03", "rooms": "2.5" },
                        { "date": "2026-09-04", "rooms": 0 }
                    ] }]
                }]
            }]
        });

        let nightly = normalize(&response);
        assert_eq!(nightly.len(), 1);
        assert_eq!(nightly.get("2026-09-04"), Some(&0));
    }

    #[test]
    fn test_coerce_count() {
        assert_eq!(coerce_count(&json!(4)), Some(4));
        assert_eq!(coerce_count(&json!(4.9)), Some(4));
        assert_eq!(coerce_count(&json!(" 12 ")), Some(12));
        assert_eq!(coerce_count(&json!(true)), Some(1));
        assert_eq!(coerce_count(&json!(-1)), None);
        assert_eq!(coerce_count(&json!(-0.5)), None);
        assert_eq!(coerce_count(&json!("1e3")), None);
        assert_eq!(coerce_count(&json!([1])), None);
        assert_eq!(coerce_count(&Value::Null), None);
    }
}
