use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Conventional metric keys. The `metrics` map is an open key set; these are
/// the keys the fixture generator and the aggregator know about.
pub const METRIC_BURN_RATE_MONTHLY: &str = "burn_rate_monthly";
pub const METRIC_RUNWAY_MONTHS: &str = "runway_months";
pub const METRIC_PILOT_CUSTOMERS: &str = "pilot_customers";
pub const METRIC_NPS_SCORE: &str = "nps_score";

/// One tracked startup inside the incubator.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Venture {
    pub id: i64,
    pub name: String,
    pub pod: String,
    pub stage: String,
    pub founder: String,
    pub status: String,
    pub last_update: NaiveDate,
    #[serde(default)]
    pub metrics: BTreeMap<String, f64>,
}

/// Create/update payload: a full venture record minus the assigned id.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VentureDraft {
    pub name: String,
    pub pod: String,
    pub stage: String,
    pub founder: String,
    pub status: String,
    pub last_update: NaiveDate,
    #[serde(default)]
    pub metrics: BTreeMap<String, f64>,
}

#[derive(Debug, Error, PartialEq, Eq)]
/// Enumerates supported `InvalidDraft` values.
pub enum InvalidDraft {
    #[error("venture name must not be empty")]
    EmptyName,
}

impl VentureDraft {
    pub fn validate(&self) -> Result<(), InvalidDraft> {
        if self.name.trim().is_empty() {
            return Err(InvalidDraft::EmptyName);
        }
        Ok(())
    }
}

impl Venture {
    pub fn from_draft(id: i64, draft: VentureDraft) -> Self {
        Self {
            id,
            name: draft.name,
            pod: draft.pod,
            stage: draft.stage,
            founder: draft.founder,
            status: draft.status,
            last_update: draft.last_update,
            metrics: draft.metrics,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(name: &str) -> VentureDraft {
        VentureDraft {
            name: name.to_string(),
            pod: "Infrastructure Intelligence".to_string(),
            stage: "Pilot".to_string(),
            founder: "Dr. Samir Hassan".to_string(),
            status: "on_track".to_string(),
            last_update: NaiveDate::from_ymd_opt(2025, 1, 18).unwrap(),
            metrics: BTreeMap::new(),
        }
    }

    #[test]
    fn rejects_blank_names() {
        assert_eq!(draft("   ").validate(), Err(InvalidDraft::EmptyName));
        assert_eq!(draft("PortFlow").validate(), Ok(()));
    }

    #[test]
    fn missing_metrics_deserialize_to_an_empty_map() {
        let venture: Venture = serde_json::from_str(
            r#"{
                "id": 1,
                "name": "PortFlow",
                "pod": "Infrastructure Intelligence",
                "stage": "Pilot",
                "founder": "Dr. Samir Hassan",
                "status": "on_track",
                "last_update": "2025-01-18"
            }"#,
        )
        .unwrap();
        assert!(venture.metrics.is_empty());
    }
}
