use crate::error::{FetchError, Result};
use chrono::NaiveDate;
use serde::Serialize;

/// One stay override sent in the request `config` list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StayRequest {
    pub date: String,
    pub rooms: i64,
}

/// Body of one booking-search request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchPayload {
    pub mcode: String,
    pub event_id: String,
    pub hotel_id: String,
    pub best_only: bool,
    pub language: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub config: Vec<StayRequest>,
}

/// Request fields shared by every hotel of a run.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchTemplate {
    pub mcode: String,
    pub event_id: String,
    pub best_only: bool,
    pub language: String,
    pub stays: Vec<StayRequest>,
}

impl SearchTemplate {
    pub fn for_hotel(&self, hotel_id: &str) -> SearchPayload {
        SearchPayload {
            mcode: self.mcode.clone(),
            event_id: self.event_id.clone(),
            hotel_id: hotel_id.to_string(),
            best_only: self.best_only,
            language: self.language.clone(),
            config: self.stays.clone(),
        }
    }
}

/// Parse `DATE:ROOMS` arguments such as `2026-08-30:10`.
pub fn parse_stays<I, S>(stays: I) -> Result<Vec<StayRequest>>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    stays.into_iter().map(|s| parse_stay(s.as_ref())).collect()
}

fn parse_stay(stay: &str) -> Result<StayRequest> {
    let invalid = |reason: &str| FetchError::InvalidStay {
        stay: stay.to_string(),
        reason: reason.to_string(),
    };

    let (date_part, rooms_part) = stay
        .split_once(':')
        .ok_or_else(|| invalid("must use DATE:ROOMS format"))?;

    let date = date_part.trim();
    if date.is_empty() {
        return Err(invalid("date missing"));
    }
    NaiveDate::parse_from_str(date, "%Y-%m-%d").map_err(|_| invalid("date must be YYYY-MM-DD"))?;

    let rooms = rooms_part
        .trim()
        .parse::<i64>()
        .map_err(|_| invalid("rooms must be an integer"))?;

    Ok(StayRequest {
        date: date.to_string(),
        rooms,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn template(stays: Vec<StayRequest>) -> SearchTemplate {
        SearchTemplate {
            mcode: "MXXXX".into(),
            event_id: "20000".into(),
            best_only: true,
            language: "en_GB".into(),
            stays,
        }
    }

    #[test]
    fn test_parse_stays() {
        let stays = parse_stays(["2026-08-30:10", " 2026-08-31 : 9"]).unwrap();
        assert_eq!(
            stays,
            vec![
                StayRequest { date: "2026-08-30".into(), rooms: 10 },
                StayRequest { date: "2026-08-31".into(), rooms: 9 },
            ]
        );
    }

    #[test]
    fn test_parse_stays_rejects_bad_input() {
        for bad in ["2026-08-30", ":10", "2026-08-30:ten", "2026-13-01:1", "tomorrow:1"] {
            let err = parse_stays([bad]).unwrap_err();
            assert!(
                matches!(err, FetchError::InvalidStay { ref stay, .. } if stay == bad),
                "accepted {bad}"
            );
        }
    }

    #[test]
    fn test_payload_without_stays_omits_config() {
        let payload = template(Vec::new()).for_hotel("H1");
        assert_eq!(
            serde_json::to_value(&payload).unwrap(),
            json!({
                "mcode": "MXXXX",
                "event_id": "20000",
                "hotel_id": "H1",
                "best_only": true,
                "language": "en_GB"
            })
        );
    }

    #[test]
    fn test_payload_with_stays() {
        let stays = parse_stays(["2026-08-30:10"]).unwrap();
        let value = serde_json::to_value(template(stays).for_hotel("H2")).unwrap();
        assert_eq!(value["config"], json!([{ "date": "2026-08-30", "rooms": 10 }]));
        assert_eq!(value["hotel_id"], "H2");
    }
}
