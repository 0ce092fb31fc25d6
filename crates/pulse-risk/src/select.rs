//! Candidate-set normalization and route selection.
//!
//! Distance and risk are rescaled to `[0, 1]` against the min and max of the
//! current candidate set. When every candidate has the same value the
//! metric is `0.0` for all of them, never `1.0`.

use pulse_types::{Preference, ScoredRoute};

use crate::error::RiskError;

/// Selection weights for distance (`alpha`) and risk (`beta`), summing to 1.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Weights {
    /// Weight of normalized distance.
    pub alpha: f64,
    /// Weight of normalized risk.
    pub beta: f64,
}

impl Weights {
    /// Rescale raw weights so they sum to 1.
    ///
    /// A non-positive or non-finite sum falls back to an even split.
    pub fn normalized(alpha: f64, beta: f64) -> Self {
        let total = alpha + beta;
        if total.is_finite() && total > 0.0 {
            Self {
                alpha: alpha / total,
                beta: beta / total,
            }
        } else {
            Self {
                alpha: 0.5,
                beta: 0.5,
            }
        }
    }

    /// Blended cost of a normalized route.
    pub fn cost(self, route: &ScoredRoute) -> f64 {
        self.alpha
            .mul_add(route.normalized_distance, self.beta * route.normalized_risk)
    }
}

/// Rescale distance and risk of every route to `[0, 1]` across the set.
pub fn normalize(routes: Vec<ScoredRoute>) -> Vec<ScoredRoute> {
    let Some((dist_min, dist_max)) = min_max(routes.iter().map(ScoredRoute::distance_meters))
    else {
        return routes;
    };
    let (risk_min, risk_max) =
        min_max(routes.iter().map(|r| r.aggregate_risk)).unwrap_or((0.0, 0.0));

    routes
        .into_iter()
        .map(|route| ScoredRoute {
            normalized_distance: rescale(route.distance_meters(), dist_min, dist_max),
            normalized_risk: rescale(route.aggregate_risk, risk_min, risk_max),
            ..route
        })
        .collect()
}

/// Normalize the candidates and pick one according to `preference`.
///
/// `Fastest` takes the minimum duration; `Safest` minimizes
/// `alpha' * normalized_distance + beta' * normalized_risk` with the
/// weights from [`Weights::normalized`]. Ties go to the earliest candidate.
pub fn select_route(
    routes: Vec<ScoredRoute>,
    preference: Preference,
    alpha: f64,
    beta: f64,
) -> Result<ScoredRoute, RiskError> {
    let normalized = normalize(routes);
    let index = select_index(&normalized, preference, alpha, beta)?;
    normalized
        .into_iter()
        .nth(index)
        .ok_or(RiskError::NoCandidates)
}

/// Index of the route [`select_route`] would pick from an already
/// [`normalize`]d set.
pub fn select_index(
    routes: &[ScoredRoute],
    preference: Preference,
    alpha: f64,
    beta: f64,
) -> Result<usize, RiskError> {
    if routes.is_empty() {
        return Err(RiskError::NoCandidates);
    }

    let weights = Weights::normalized(alpha, beta);
    let index = match preference {
        Preference::Fastest => first_min_index(routes.iter().map(ScoredRoute::duration_seconds)),
        Preference::Safest => first_min_index(routes.iter().map(|r| weights.cost(r))),
    };

    tracing::debug!(
        candidates = routes.len(),
        preference = preference.as_str(),
        alpha = weights.alpha,
        beta = weights.beta,
        selected = index,
        "Route selected"
    );
    Ok(index)
}

fn min_max(values: impl Iterator<Item = f64>) -> Option<(f64, f64)> {
    values.fold(None, |acc, v| match acc {
        None => Some((v, v)),
        Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
    })
}

fn rescale(value: f64, min: f64, max: f64) -> f64 {
    let span = max - min;
    if span > 0.0 {
        ((value - min) / span).clamp(0.0, 1.0)
    } else {
        0.0
    }
}

/// Index of the first minimum; later equal values never win. `NaN`s are skipped.
fn first_min_index(values: impl Iterator<Item = f64>) -> usize {
    let mut best_index = 0;
    let mut best = f64::INFINITY;
    for (i, v) in values.enumerate() {
        if v < best {
            best = v;
            best_index = i;
        }
    }
    best_index
}
