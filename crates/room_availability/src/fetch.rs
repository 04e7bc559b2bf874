use crate::{client::BookingSearch, error::FetchError, payload::SearchTemplate};
use availability::{
    AvailabilitySource, HotelAvailability, SnapshotRecord, SnapshotWriter, normalize,
};
use log::{info, warn};
use std::io::Write;

/// Fetches every hotel in order, recording each outcome to the snapshot
/// writer as it goes.
pub struct LiveFetchSource<'a, C, W: Write> {
    client: &'a C,
    template: &'a SearchTemplate,
    hotel_ids: &'a [String],
    writer: Option<SnapshotWriter<W>>,
    failures: usize,
}

impl<'a, C: BookingSearch, W: Write> LiveFetchSource<'a, C, W> {
    pub fn new(
        client: &'a C,
        template: &'a SearchTemplate,
        hotel_ids: &'a [String],
        writer: SnapshotWriter<W>,
    ) -> Self {
        Self {
            client,
            template,
            hotel_ids,
            writer: Some(writer),
            failures: 0,
        }
    }

    /// Hotels whose request failed during the last load.
    pub fn failures(&self) -> usize {
        self.failures
    }
}

impl<C: BookingSearch, W: Write> AvailabilitySource for LiveFetchSource<'_, C, W> {
    type Error = FetchError;

    fn load(&mut self) -> Result<HotelAvailability, FetchError> {
        let mut writer = self.writer.take().ok_or_else(|| {
            FetchError::InvalidConfiguration("live fetch already consumed its snapshot".into())
        })?;

        let total = self.hotel_ids.len();
        let mut hotels = HotelAvailability::new();
        self.failures = 0;

        for (i, hotel_id) in self.hotel_ids.iter().enumerate() {
            info!("[{}/{}] {}", i + 1, total, hotel_id);
            let payload = self.template.for_hotel(hotel_id);

            match self.client.search(&payload) {
                Ok(response) => {
                    hotels.insert(hotel_id.clone(), normalize(&response));
                    writer.write(&SnapshotRecord::response(hotel_id.as_str(), response))?;
                }
                Err(e) => {
                    warn!("Request failed for {hotel_id}: {e}");
                    self.failures += 1;
                    hotels.entry(hotel_id.clone()).or_default();
                    writer.write(&SnapshotRecord::error(hotel_id.as_str(), e.to_string()))?;
                }
            }
        }

        let written = writer.written();
        writer.finish()?;
        info!("Wrote {written} snapshot records ({} failed)", self.failures);
        Ok(hotels)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{error::Result, payload::SearchPayload};
    use availability::{SnapshotSource, build_grid};
    use serde_json::{Value, json};
    use std::cell::RefCell;
    use tempfile::TempDir;

    /// Answers from a fixed table; unknown hotels get a 500.
    struct FakeSearch {
        responses: Vec<(&'static str, Value)>,
        calls: RefCell<Vec<SearchPayload>>,
    }

    impl FakeSearch {
        fn new(responses: Vec<(&'static str, Value)>) -> Self {
            Self {
                responses,
                calls: RefCell::new(Vec::new()),
            }
        }
    }

    impl BookingSearch for FakeSearch {
        fn search(&self, payload: &SearchPayload) -> Result<Value> {
            self.calls.borrow_mut().push(payload.clone());
            self.responses
                .iter()
                .find(|(id, _)| *id == payload.hotel_id)
                .map(|(_, v)| v.clone())
                .ok_or_else(|| FetchError::Status {
                    status: 500,
                    hotel_id: payload.hotel_id.clone(),
                    body: "upstream unavailable".into(),
                })
        }
    }

    fn template() -> SearchTemplate {
        SearchTemplate {
            mcode: "MXXXX".into(),
            event_id: "20000".into(),
            best_only: true,
            language: "en_GB".into(),
            stays: Vec::new(),
        }
    }

    fn nightly(pairs: &[(&str, u64)]) -> Value {
        let nightly: serde_json::Map<String, Value> =
            pairs.iter().map(|(d, n)| (d.to_string(), json!(n))).collect();
        json!({ "success": true, "hotels": [{ "rates": [{ "nightly": nightly }] }] })
    }

    fn ids(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_live_fetch_matches_snapshot_replay() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("out").join("results.jsonl");

        let client = FakeSearch::new(vec![
            ("H1", nightly(&[("2026-08-30", 2), ("2026-08-31", 0)])),
            ("H2", nightly(&[("2026-08-31", 5)])),
            ("H3", json!({ "success": false, "message": "no inventory" })),
        ]);
        let template = template();
        let hotel_ids = ids(&["H2", "H1", "H3"]);
        let writer = SnapshotWriter::create(&path).unwrap();

        let mut source = LiveFetchSource::new(&client, &template, &hotel_ids, writer);
        let live = source.load().unwrap();
        assert_eq!(source.failures(), 0);

        let replayed = SnapshotSource::new(&path).load().unwrap();
        assert_eq!(live, replayed);
        assert_eq!(build_grid(&live), build_grid(&replayed));

        // one request per hotel, in order
        let called: Vec<_> = client
            .calls
            .borrow()
            .iter()
            .map(|p| p.hotel_id.clone())
            .collect();
        assert_eq!(called, hotel_ids);

        let content = std::fs::read_to_string(&path).unwrap();
        let first: Value = serde_json::from_str(content.lines().next().unwrap()).unwrap();
        assert_eq!(first["hotel_id"], "H2");
    }

    #[test]
    fn test_partial_failure_keeps_hotel_row() {
        let client = FakeSearch::new(vec![("H1", nightly(&[("2026-08-30", 3)]))]);
        let template = template();
        let hotel_ids = ids(&["H1", "BROKEN"]);
        let writer = SnapshotWriter::new(Vec::new());

        let mut source = LiveFetchSource::new(&client, &template, &hotel_ids, writer);
        let hotels = source.load().unwrap();

        assert_eq!(source.failures(), 1);
        assert!(hotels["BROKEN"].is_empty());

        let grid = build_grid(&hotels);
        let row = grid.row("BROKEN").unwrap();
        assert_eq!(row.coverage, 0.0);
        assert_eq!(row.cells, vec![None]);
    }

    #[test]
    fn test_failed_duplicate_keeps_earlier_success() {
        struct FlakySearch(RefCell<usize>);

        impl BookingSearch for FlakySearch {
            fn search(&self, payload: &SearchPayload) -> Result<Value> {
                let mut n = self.0.borrow_mut();
                *n += 1;
                if *n == 1 {
                    Ok(nightly(&[("2026-08-30", 1)]))
                } else {
                    Err(FetchError::Status {
                        status: 503,
                        hotel_id: payload.hotel_id.clone(),
                        body: String::new(),
                    })
                }
            }
        }

        let client = FlakySearch(RefCell::new(0));
        let template = template();
        let hotel_ids = ids(&["H1", "H1"]);
        let mut source =
            LiveFetchSource::new(&client, &template, &hotel_ids, SnapshotWriter::new(Vec::new()));

        let hotels = source.load().unwrap();
        assert_eq!(hotels["H1"].get("2026-08-30"), Some(&1));
    }

    #[test]
    fn test_error_record_carries_message() {
        let client = FakeSearch::new(Vec::new());
        let template = template();
        let hotel_ids = ids(&["H9"]);
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("results.jsonl");

        let mut source = LiveFetchSource::new(
            &client,
            &template,
            &hotel_ids,
            SnapshotWriter::create(&path).unwrap(),
        );
        source.load().unwrap();

        let line = std::fs::read_to_string(&path).unwrap();
        let record: Value = serde_json::from_str(line.trim()).unwrap();
        assert_eq!(
            record,
            json!({ "hotel_id": "H9", "error": "500 error for H9: upstream unavailable" })
        );

        // the writer is spent after one load
        assert!(matches!(
            source.load(),
            Err(FetchError::InvalidConfiguration(_))
        ));
    }
}
