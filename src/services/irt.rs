//! Three-parameter logistic item response model.
//!
//! Everything here is a pure function of its inputs. Malformed item
//! parameters are resolved against configured defaults before they reach
//! the math, and an attempt with no responses estimates to θ = 0.

use serde::Serialize;

use crate::core::config::{AbilityEstimator, IrtSettings, ResolvedItem};
use crate::schemas::question::ItemParameters;

const THETA_MIN: f64 = -4.0;
const THETA_MAX: f64 = 4.0;
const EXPONENT_LIMIT: f64 = 40.0;
const PROBABILITY_FLOOR: f64 = 1e-10;
const MLE_MAX_ITERATIONS: usize = 100;
const MLE_TOLERANCE: f64 = 0.001;

/// `c + (1 - c) / (1 + exp(-a(θ - b)))`.
pub fn probability(theta: f64, item: &ResolvedItem) -> f64 {
    let exponent = (-item.discrimination * (theta - item.difficulty))
        .clamp(-EXPONENT_LIMIT, EXPONENT_LIMIT);
    item.guessing + (1.0 - item.guessing) / (1.0 + exponent.exp())
}

/// Fisher information of one item at `theta`; zero where the curve sits on
/// its guessing floor or at certainty.
pub fn item_information(theta: f64, item: &ResolvedItem) -> f64 {
    let p = probability(theta, item);
    let q = 1.0 - p;
    let c = item.guessing;
    if p <= c || q <= 0.0 {
        return 0.0;
    }
    let a = item.discrimination;
    (a * a * (p - c).powi(2) * q) / ((1.0 - c).powi(2) * p)
}

pub fn test_information(theta: f64, items: &[ResolvedItem]) -> f64 {
    items.iter().map(|item| item_information(theta, item)).sum()
}

/// `None` when the items carry no information at `theta`.
pub fn standard_error(theta: f64, items: &[ResolvedItem]) -> Option<f64> {
    let info = test_information(theta, items);
    (info > 0.0).then(|| 1.0 / info.sqrt())
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EapEstimate {
    pub theta: f64,
    pub posterior_sd: f64,
}

/// Posterior mean of θ under a standard normal prior, integrated on an even
/// grid over [-4, 4]. `responses` and `items` are paired by index.
pub fn estimate_ability_eap(
    responses: &[bool],
    items: &[ResolvedItem],
    quadrature_points: usize,
) -> EapEstimate {
    if responses.is_empty() || items.is_empty() || quadrature_points < 2 {
        return EapEstimate { theta: 0.0, posterior_sd: 1.0 };
    }

    let step = (THETA_MAX - THETA_MIN) / (quadrature_points - 1) as f64;

    // Unnormalized log posterior: log-likelihood plus the standard normal log prior.
    let log_posterior: Vec<(f64, f64)> = (0..quadrature_points)
        .map(|i| {
            let theta = THETA_MIN + step * i as f64;
            let log_likelihood: f64 = responses
                .iter()
                .zip(items)
                .map(|(&correct, item)| {
                    let p = probability(theta, item);
                    if correct {
                        p.max(PROBABILITY_FLOOR).ln()
                    } else {
                        (1.0 - p).max(PROBABILITY_FLOOR).ln()
                    }
                })
                .sum();
            (theta, log_likelihood - 0.5 * theta * theta)
        })
        .collect();

    // Shift by the peak so long response vectors do not underflow to zero weight.
    let peak = log_posterior
        .iter()
        .map(|(_, log_weight)| *log_weight)
        .fold(f64::NEG_INFINITY, f64::max);
    let grid: Vec<(f64, f64)> = log_posterior
        .into_iter()
        .map(|(theta, log_weight)| (theta, (log_weight - peak).exp()))
        .collect();

    let total: f64 = grid.iter().map(|(_, weight)| weight).sum();
    if total <= 0.0 || !total.is_finite() {
        return EapEstimate { theta: 0.0, posterior_sd: 1.0 };
    }

    let mean = grid.iter().map(|(theta, weight)| theta * weight).sum::<f64>() / total;
    let variance =
        grid.iter().map(|(theta, weight)| weight * (theta - mean).powi(2)).sum::<f64>() / total;

    EapEstimate { theta: mean, posterior_sd: variance.sqrt() }
}

/// Fisher scoring from θ = 0, clamped to [-4, 4] after each step. All-correct
/// or all-wrong patterns run to the clamp.
pub fn estimate_ability_mle(responses: &[bool], items: &[ResolvedItem]) -> f64 {
    let mut theta = 0.0;
    for _ in 0..MLE_MAX_ITERATIONS {
        let mut numerator = 0.0;
        let mut denominator = 0.0;
        for (&correct, item) in responses.iter().zip(items) {
            let p = probability(theta, item);
            let q = 1.0 - p;
            let c = item.guessing;
            let weight = (item.discrimination * (p - c)) / ((1.0 - c) * p);
            let observed = if correct { 1.0 } else { 0.0 };
            numerator += weight * (observed - p);
            denominator += weight * weight * p * q;
        }

        if denominator.abs() < 1e-10 {
            break;
        }
        let delta = numerator / denominator;
        theta = (theta + delta).clamp(THETA_MIN, THETA_MAX);
        if delta.abs() < MLE_TOLERANCE {
            break;
        }
    }
    theta
}

/// Normal CDF of θ as a whole percentile, using the Zelen-Severo rational
/// approximation.
pub fn ability_percentile(theta: f64) -> u8 {
    if !theta.is_finite() {
        return if theta > 0.0 { 100 } else { 0 };
    }
    let t = 1.0 / (1.0 + 0.231_641_9 * theta.abs());
    let density = 0.398_942_280_401_432_7 * (-theta * theta / 2.0).exp();
    let poly = t
        * (0.319_381_5
            + t * (-0.356_563_8 + t * (1.781_478 + t * (-1.821_256 + t * 1.330_274_4))));
    let tail = density * poly;
    let cdf = if theta > 0.0 { 1.0 - tail } else { tail };
    (cdf * 100.0).round().clamp(0.0, 100.0) as u8
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AbilityEstimate {
    pub theta: f64,
    pub percentile: u8,
    pub standard_error: f64,
    pub estimator: &'static str,
}

/// Ability for one attempt. Item parameters are resolved against the
/// configured defaults; extra responses or items beyond the shorter of the
/// two lists are ignored.
pub fn estimate_ability(
    responses: &[bool],
    items: &[ItemParameters],
    settings: &IrtSettings,
) -> AbilityEstimate {
    if responses.len() != items.len() {
        tracing::warn!(
            responses = responses.len(),
            items = items.len(),
            "Response and item counts differ; extra entries ignored"
        );
    }
    let paired = responses.len().min(items.len());
    let responses = &responses[..paired];
    let resolved: Vec<ResolvedItem> =
        items[..paired].iter().map(|params| settings.default_item.resolve(params)).collect();

    let (theta, standard_error) = match settings.estimator {
        AbilityEstimator::Eap => {
            let estimate =
                estimate_ability_eap(responses, &resolved, settings.quadrature_points);
            (estimate.theta, estimate.posterior_sd)
        }
        AbilityEstimator::Mle if responses.is_empty() => (0.0, 1.0),
        AbilityEstimator::Mle => {
            let theta = estimate_ability_mle(responses, &resolved);
            (theta, standard_error(theta, &resolved).unwrap_or(1.0))
        }
    };

    metrics::histogram!("ability_theta").record(theta);

    AbilityEstimate {
        theta,
        percentile: ability_percentile(theta),
        standard_error,
        estimator: settings.estimator.as_str(),
    }
}
