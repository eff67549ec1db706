//! Availability checkers for the two monitored field-office regions.
//!
//! Each checker issues one unauthenticated GET against the scheduler endpoint
//! and applies a region-specific policy to the returned office records. Any
//! transport or decode failure is logged and reported as "not available" so
//! the poll loop never dies on a flaky upstream.

use chrono::Duration;
use serde::Deserialize;

/// NV slots are only interesting on these dates (short campaign window;
/// kept as a fixed allow-list on purpose).
const NV_TARGET_DATES: [&str; 2] = ["2022-07-05", "2022-07-06"];

/// One office record as returned by the scheduler API.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OfficeRecord {
    #[serde(default)]
    pub time_slots: Vec<TimeSlot>,
}

/// A single appointment slot; only the date matters to us.
#[derive(Debug, Clone, Deserialize)]
pub struct TimeSlot {
    #[serde(default)]
    pub date: String,
}

/// A monitored field-office region, identified by zip code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Region {
    Wa,
    Nv,
}

impl Region {
    pub fn label(self) -> &'static str {
        match self {
            Self::Wa => "WA",
            Self::Nv => "NV",
        }
    }

    pub fn zip_code(self) -> &'static str {
        match self {
            Self::Wa => "98168",
            Self::Nv => "89118",
        }
    }

    /// Minimum elapsed time between two notifications for this region.
    pub fn cooldown(self) -> Duration {
        match self {
            Self::Wa => Duration::minutes(10),
            Self::Nv => Duration::minutes(30),
        }
    }

    /// Region availability policy over the decoded office records.
    ///
    /// WA: the first office record has at least one slot. NV: any slot in any
    /// record falls on one of the target dates.
    pub fn has_availability(self, records: &[OfficeRecord]) -> bool {
        match self {
            Self::Wa => records
                .first()
                .is_some_and(|office| !office.time_slots.is_empty()),
            Self::Nv => records
                .iter()
                .flat_map(|office| &office.time_slots)
                .any(|slot| NV_TARGET_DATES.contains(&slot.date.as_str())),
        }
    }
}

/// Checks one region's appointment endpoint and yields an availability boolean.
pub struct AvailabilityChecker {
    client: reqwest::Client,
    base_url: String,
    region: Region,
}

impl AvailabilityChecker {
    pub fn new(client: reqwest::Client, base_url: &str, region: Region) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            region,
        }
    }

    pub fn region(&self) -> Region {
        self.region
    }

    /// One availability probe. Never fails: errors are logged and downgraded
    /// to `false`; the enclosing loop provides the retry cadence.
    pub async fn check(&self) -> bool {
        match self.fetch_offices().await {
            Ok(records) => self.region.has_availability(&records),
            Err(e) => {
                tracing::error!(
                    "Availability check for {} failed: {:#}",
                    self.region.label(),
                    e
                );
                false
            }
        }
    }

    async fn fetch_offices(&self) -> anyhow::Result<Vec<OfficeRecord>> {
        let url = format!("{}/{}", self.base_url, self.region.zip_code());
        let records = self
            .client
            .get(&url)
            .send()
            .await?
            .error_for_status()?
            .json::<Vec<OfficeRecord>>()
            .await?;

        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn records(json: &str) -> Vec<OfficeRecord> {
        serde_json::from_str(json).expect("test fixture should parse")
    }

    #[test]
    fn wa_available_when_first_office_has_slots() {
        let offices = records(
            r#"[{"timeSlots": [{"date": "2022-08-01", "time": "09:00"}]},
                {"timeSlots": []}]"#,
        );
        assert!(Region::Wa.has_availability(&offices));
    }

    #[test]
    fn wa_not_available_when_first_office_has_no_slots() {
        let offices = records(r#"[{"timeSlots": []}, {"timeSlots": [{"date": "2022-08-01"}]}]"#);
        assert!(!Region::Wa.has_availability(&offices));
    }

    #[test]
    fn wa_not_available_on_empty_response() {
        assert!(!Region::Wa.has_availability(&[]));
    }

    #[test]
    fn wa_tolerates_missing_time_slots_field() {
        let offices = records(r#"[{"description": "Seattle Field Office"}]"#);
        assert!(!Region::Wa.has_availability(&offices));
    }

    #[test]
    fn nv_available_only_on_target_dates() {
        let on_target = records(r#"[{"timeSlots": [{"date": "2022-07-05"}]}]"#);
        assert!(Region::Nv.has_availability(&on_target));

        let second_target = records(
            r#"[{"timeSlots": [{"date": "2022-07-04"}]},
                {"timeSlots": [{"date": "2022-07-06"}]}]"#,
        );
        assert!(Region::Nv.has_availability(&second_target));

        let off_target = records(r#"[{"timeSlots": [{"date": "2022-07-04"}, {"date": "2022-07-07"}]}]"#);
        assert!(!Region::Nv.has_availability(&off_target));

        assert!(!Region::Nv.has_availability(&[]));
    }

    #[test]
    fn region_constants() {
        assert_eq!(Region::Wa.zip_code(), "98168");
        assert_eq!(Region::Nv.zip_code(), "89118");
        assert_eq!(Region::Wa.cooldown(), Duration::minutes(10));
        assert_eq!(Region::Nv.cooldown(), Duration::minutes(30));
    }

    #[tokio::test]
    async fn check_downgrades_transport_errors_to_not_available() {
        // Nothing listens on port 1; the connection error must stay inside check().
        let checker = AvailabilityChecker::new(
            reqwest::Client::new(),
            "http://127.0.0.1:1/field-offices/zipcode",
            Region::Wa,
        );
        assert!(!checker.check().await);
    }
}
