use serde::{Deserialize, Serialize};
use tracing::debug;

use super::series_ops::project_value;
use crate::models::{Convergence, Milestone, ProjectionPoint};

/// Default gap-closing thresholds reported as milestones.
pub const DEFAULT_MILESTONES: [f64; 3] = [0.25, 0.5, 0.75];

fn valid_level(value: f64) -> bool {
    value.is_finite() && value > 0.0
}

fn valid_rate(rate: f64) -> bool {
    rate.is_finite() && rate > -1.0
}

/// Years until `chaser_value` growing at `chaser_growth_rate` reaches
/// `target_value` growing at `target_growth_rate`.
///
/// `ln(target/chaser) / ln((1 + g_chaser) / (1 + g_target))`
pub fn years_to_convergence(
    chaser_value: f64,
    target_value: f64,
    chaser_growth_rate: f64,
    target_growth_rate: f64,
) -> Convergence {
    if !valid_level(chaser_value) || !valid_level(target_value) {
        return Convergence::Unknown;
    }
    if !valid_rate(chaser_growth_rate) || !valid_rate(target_growth_rate) {
        return Convergence::Unknown;
    }
    if chaser_value >= target_value {
        return Convergence::Converges(0.0);
    }
    if chaser_growth_rate <= target_growth_rate {
        debug!(
            chaser_growth_rate,
            target_growth_rate, "chaser does not outgrow target; no convergence"
        );
        return Convergence::Never;
    }

    let growth_ratio = (1.0 + chaser_growth_rate) / (1.0 + target_growth_rate);
    let years = (target_value / chaser_value).ln() / growth_ratio.ln();
    if years.is_finite() {
        Convergence::Converges(years)
    } else {
        Convergence::Unknown
    }
}

/// Annual growth the chaser needs to catch the target within `years`.
///
/// `(target/chaser)^(1/years) * (1 + g_target) - 1`
pub fn required_growth_rate(
    chaser_value: f64,
    target_value: f64,
    target_growth_rate: f64,
    years: f64,
) -> Option<f64> {
    if !(years > 0.0) || !valid_level(chaser_value) || !valid_level(target_value) {
        return None;
    }
    let rate = (target_value / chaser_value).powf(1.0 / years) * (1.0 + target_growth_rate) - 1.0;
    rate.is_finite().then_some(rate)
}

/// Year-by-year compounding of a chaser/target pair.
///
/// The plan is a plain value; every call to [`Projection::iter`] starts a
/// fresh pass over the same points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Projection {
    pub chaser_value: f64,
    pub target_value: f64,
    pub chaser_growth_rate: f64,
    pub target_growth_rate: f64,
    pub start_year: i32,
    pub horizon_cap_years: u32,
}

impl Projection {
    pub fn iter(&self) -> ProjectionIter {
        ProjectionIter {
            plan: *self,
            step: 0,
            finished: false,
        }
    }

    pub fn to_vec(&self) -> Vec<ProjectionPoint> {
        self.iter().collect()
    }
}

impl IntoIterator for &Projection {
    type Item = ProjectionPoint;
    type IntoIter = ProjectionIter;

    fn into_iter(self) -> ProjectionIter {
        self.iter()
    }
}

/// Iterator over a [`Projection`]. Yields at most `horizon_cap_years` points
/// and stops after the first point where the chaser has caught up.
#[derive(Debug, Clone)]
pub struct ProjectionIter {
    plan: Projection,
    step: u32,
    finished: bool,
}

impl Iterator for ProjectionIter {
    type Item = ProjectionPoint;

    fn next(&mut self) -> Option<ProjectionPoint> {
        if self.finished || self.step >= self.plan.horizon_cap_years {
            return None;
        }
        // years past i32::MAX end the projection
        let Some(year) = i32::try_from(self.step)
            .ok()
            .and_then(|step| self.plan.start_year.checked_add(step))
        else {
            self.finished = true;
            return None;
        };

        let t = self.step as f64;
        let point = ProjectionPoint {
            year,
            chaser_value: project_value(self.plan.chaser_value, self.plan.chaser_growth_rate, t),
            target_value: project_value(self.plan.target_value, self.plan.target_growth_rate, t),
        };

        self.step += 1;
        if point.chaser_value >= point.target_value {
            self.finished = true;
        }
        Some(point)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.finished {
            return (0, Some(0));
        }
        let remaining = self.plan.horizon_cap_years.saturating_sub(self.step) as usize;
        // the start year is always representable; later years may not be
        let lower = if self.step == 0 { remaining.min(1) } else { 0 };
        (lower, Some(remaining))
    }
}

/// Projection of both values from `start_year`, bounded by `horizon_cap_years` points.
pub fn generate_projection(
    chaser_value: f64,
    target_value: f64,
    chaser_growth_rate: f64,
    target_growth_rate: f64,
    start_year: i32,
    horizon_cap_years: u32,
) -> Projection {
    Projection {
        chaser_value,
        target_value,
        chaser_growth_rate,
        target_growth_rate,
        start_year,
        horizon_cap_years,
    }
}

/// First crossing of each requested chaser/target ratio, ascending by percentage.
///
/// Percentages outside `(0, 1]` are ignored. Points with a non-positive or
/// non-finite value on either side are skipped.
pub fn calculate_milestones(projection: &[ProjectionPoint], percentages: &[f64]) -> Vec<Milestone> {
    let mut remaining: Vec<f64> = percentages
        .iter()
        .copied()
        .filter(|p| p.is_finite() && *p > 0.0 && *p <= 1.0)
        .collect();
    remaining.sort_by(|a, b| a.total_cmp(b));
    remaining.dedup();

    let mut points = projection.to_vec();
    points.sort_by_key(|p| p.year);

    let mut milestones = Vec::with_capacity(remaining.len());
    for point in &points {
        if remaining.is_empty() {
            break;
        }
        let Some(ratio) = point.ratio() else {
            continue;
        };
        remaining.retain(|&percentage| {
            if ratio >= percentage {
                milestones.push(Milestone {
                    percentage,
                    year: point.year,
                    chaser_value: point.chaser_value,
                    target_value: point.target_value,
                });
                false
            } else {
                true
            }
        });
    }

    milestones.sort_by(|a, b| a.percentage.total_cmp(&b.percentage));
    milestones
}
