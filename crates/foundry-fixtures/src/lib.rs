//! Synthetic venture batches for demos and tests.

use std::collections::BTreeMap;

use chrono::{Datelike, Duration, Local, NaiveDate};
use foundry_ventures::{
    VentureDraft, METRIC_BURN_RATE_MONTHLY, METRIC_NPS_SCORE, METRIC_PILOT_CUSTOMERS,
    METRIC_RUNWAY_MONTHS,
};
use rand::Rng;

const NAME_ROOTS: &[&str] = &[
    "Port", "Grid", "Flux", "Hearth", "Tide", "Vertex", "Quill", "Lumen", "Forge", "Atlas",
    "Pulse", "Strata", "Harbor", "Cinder", "Vale",
];

const NAME_SUFFIXES: &[&str] = &[
    "Flow", "Sense", "Works", "Labs", "Loop", "Stack", "Metrics", "Path", "Signal", "Base",
];

const PODS: &[&str] = &[
    "Infrastructure Intelligence",
    "Climate Resilience",
    "Health Platforms",
    "Financial Access",
    "Supply Chain Visibility",
    "Developer Tooling",
];

const STAGES: &[&str] = &["Ideation", "Pilot", "Growth", "Scale"];

const STATUSES: &[&str] = &["on_track", "at_risk", "off_track"];

const FOUNDER_FIRST_NAMES: &[&str] = &[
    "Samir", "Amara", "Wei", "Lucia", "Tomas", "Priya", "Noor", "Elias", "Ingrid", "Kofi",
    "Mariana", "Yusuf",
];

const FOUNDER_LAST_NAMES: &[&str] = &[
    "Hassan", "Okafor", "Lindqvist", "Marchetti", "Chen", "Devereux", "Abadi", "Sorensen",
    "Villanueva", "Rahman",
];

/// Generates `count` random venture drafts with the demo vocabulary:
/// stages Ideation/Pilot/Growth/Scale, statuses on_track/at_risk/off_track,
/// and the four conventional metrics.
pub fn generate_ventures(count: usize) -> Vec<VentureDraft> {
    let mut rng = rand::thread_rng();
    let today = Local::now().date_naive();
    (0..count).map(|_| random_venture(&mut rng, today)).collect()
}

fn random_venture<R: Rng>(rng: &mut R, today: NaiveDate) -> VentureDraft {
    let metrics = BTreeMap::from([
        (
            METRIC_BURN_RATE_MONTHLY.to_string(),
            rng.gen_range(10_000..=100_000) as f64,
        ),
        (
            METRIC_RUNWAY_MONTHS.to_string(),
            rng.gen_range(1..=24) as f64,
        ),
        (
            METRIC_PILOT_CUSTOMERS.to_string(),
            rng.gen_range(0..=10) as f64,
        ),
        (METRIC_NPS_SCORE.to_string(), rng.gen_range(0..=100) as f64),
    ]);

    VentureDraft {
        name: format!("{}{}", pick(rng, NAME_ROOTS), pick(rng, NAME_SUFFIXES)),
        pod: pick(rng, PODS).to_string(),
        stage: pick(rng, STAGES).to_string(),
        founder: format!(
            "{} {}",
            pick(rng, FOUNDER_FIRST_NAMES),
            pick(rng, FOUNDER_LAST_NAMES)
        ),
        status: pick(rng, STATUSES).to_string(),
        last_update: date_this_year(rng, today),
        metrics,
    }
}

fn pick<'a, R: Rng>(rng: &mut R, choices: &'a [&'a str]) -> &'a str {
    choices[rng.gen_range(0..choices.len())]
}

/// A random day between January 1st of `today`'s year and `today` itself.
fn date_this_year<R: Rng>(rng: &mut R, today: NaiveDate) -> NaiveDate {
    let year_start = NaiveDate::from_ymd_opt(today.year(), 1, 1).unwrap_or(today);
    let span_days = (today - year_start).num_days().max(0);
    year_start + Duration::days(rng.gen_range(0..=span_days))
}
