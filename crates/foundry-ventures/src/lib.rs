//! Venture domain model and derived portfolio metrics.
mod metrics;
mod venture;

pub use metrics::{summarize, MetricsSummary};
pub use venture::{
    InvalidDraft, Venture, VentureDraft, METRIC_BURN_RATE_MONTHLY, METRIC_NPS_SCORE,
    METRIC_PILOT_CUSTOMERS, METRIC_RUNWAY_MONTHS,
};
