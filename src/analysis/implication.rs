use serde::{Deserialize, Serialize};

use super::template::Interpolant;
use crate::models::{Composition, MetricDefinition, Transform};

/// An entity's own current metric value, or `None` when it cannot anchor an
/// estimate (non-finite, or non-positive for a log-log metric).
pub fn sanitize_anchor(value: Option<f64>, transform: Transform) -> Option<f64> {
    value.filter(|v| transform.accepts(*v))
}

fn clamp_into(value: f64, range: Option<[f64; 2]>) -> f64 {
    match range {
        Some([min, max]) => value.max(min).min(max),
        None => value,
    }
}

/// Future metric level implied by moving along the template path.
///
/// With both the template level at current income and the entity's own
/// value known, the template's ratio (`Multiply`) or difference (`Add`) is
/// applied to the entity's value. Otherwise the raw template level at the
/// future income is returned. The result is clamped into `clamp_range`.
pub fn estimate(
    template_at_current_income: Option<f64>,
    template_at_future_income: Option<f64>,
    entity_current_metric: Option<f64>,
    composition: Composition,
    clamp_range: Option<[f64; 2]>,
) -> Option<f64> {
    let future = template_at_future_income.filter(|v| v.is_finite())?;
    let current = template_at_current_income.filter(|v| v.is_finite());
    let own = entity_current_metric.filter(|v| v.is_finite());

    let raw = match (current, own) {
        (Some(current), Some(own)) => match composition {
            Composition::Multiply => {
                if current == 0.0 {
                    return None;
                }
                own * (future / current)
            }
            Composition::Add => own + (future - current),
        },
        _ => future,
    };

    raw.is_finite().then(|| clamp_into(raw, clamp_range))
}

/// Estimate for one metric together with the template levels it was built from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Implication {
    pub template_current: Option<f64>,
    pub template_future: Option<f64>,
    pub entity_current: Option<f64>,
    pub implied: Option<f64>,
    /// True when the estimate is a delta on the entity's own value rather
    /// than the raw template level.
    pub anchored: bool,
}

/// Combines a metric's template path with an entity's own baseline.
pub struct ImplicationEstimator<'a> {
    interpolant: &'a Interpolant,
    definition: &'a MetricDefinition,
}

impl<'a> ImplicationEstimator<'a> {
    pub fn new(interpolant: &'a Interpolant, definition: &'a MetricDefinition) -> Self {
        Self {
            interpolant,
            definition,
        }
    }

    /// Implied metric level once income moves from `current_income` to `future_income`.
    pub fn estimate(
        &self,
        current_income: f64,
        future_income: f64,
        entity_current_metric: Option<f64>,
    ) -> Implication {
        let template_current = self.interpolant.predict(current_income);
        let template_future = self.interpolant.predict(future_income);
        let entity_current = sanitize_anchor(entity_current_metric, self.definition.transform);

        let implied = estimate(
            template_current,
            template_future,
            entity_current,
            self.definition.composition,
            self.definition.clamp_range,
        );

        Implication {
            template_current,
            template_future,
            entity_current,
            implied,
            anchored: implied.is_some()
                && template_future.is_some()
                && template_current.is_some()
                && entity_current.is_some(),
        }
    }
}
