//! Reduction of a venture snapshot into the dashboard summary.

use serde::{Deserialize, Serialize};

use crate::venture::{Venture, METRIC_BURN_RATE_MONTHLY, METRIC_RUNWAY_MONTHS};

/// Status value counted as active. The fixture vocabulary is
/// `on_track/at_risk/off_track`, so this count is commonly zero; the literal
/// comparison is kept pending product clarification.
const ACTIVE_STATUS: &str = "active";

/// Derived aggregate over the current venture set. Recomputed on every
/// request, never persisted.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct MetricsSummary {
    pub total_ventures: u64,
    pub active_ventures: u64,
    pub total_burn_rate: i64,
    pub avg_runway: i64,
}

/// Reduces a snapshot of venture records to the four-field summary.
///
/// Pure and order-independent. Monetary totals accumulate in integer cents
/// so repeated f64 addition cannot drift; the average runway only considers
/// records whose `runway_months` is present and strictly positive.
pub fn summarize(ventures: &[Venture]) -> MetricsSummary {
    let total_ventures = ventures.len() as u64;
    let active_ventures = ventures
        .iter()
        .filter(|venture| venture.status.eq_ignore_ascii_case(ACTIVE_STATUS))
        .count() as u64;

    let mut burn_cents: i64 = 0;
    for venture in ventures {
        if let Some(burn) = venture.metrics.get(METRIC_BURN_RATE_MONTHLY) {
            burn_cents = burn_cents.saturating_add(to_cents(*burn));
        }
    }

    let mut runway_total = 0.0;
    let mut runway_count = 0u64;
    for venture in ventures {
        if let Some(months) = venture.metrics.get(METRIC_RUNWAY_MONTHS) {
            if *months > 0.0 {
                runway_total += *months;
                runway_count += 1;
            }
        }
    }
    let avg_runway = if runway_count == 0 {
        0
    } else {
        (runway_total / runway_count as f64).round() as i64
    };

    MetricsSummary {
        total_ventures,
        active_ventures,
        total_burn_rate: cents_to_whole(burn_cents),
        avg_runway,
    }
}

fn to_cents(value: f64) -> i64 {
    if !value.is_finite() {
        return 0;
    }
    (value * 100.0).round() as i64
}

/// Rounds a cent total back to whole currency units, half away from zero.
fn cents_to_whole(cents: i64) -> i64 {
    if cents >= 0 {
        cents.saturating_add(50) / 100
    } else {
        cents.saturating_sub(50) / 100
    }
}
