use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::models::{MetricDefinition, SeriesPoint, Transform};

/// One pooled `(income, metric)` observation of a template path.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TemplatePoint {
    pub income: f64,
    pub value: f64,
}

/// Piecewise log-space mapping from income level to metric level, learned
/// from pooled donor histories.
///
/// Points are sorted by strictly increasing income. Queries outside the
/// observed income range are clamped to the boundary values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Interpolant {
    pub metric_code: String,
    pub transform: Transform,
    pub points: Vec<TemplatePoint>,
    pub min_income: Option<f64>,
    pub max_income: Option<f64>,
}

impl Interpolant {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Metric level at `income`. See [`predict`].
    pub fn predict(&self, income: f64) -> Option<f64> {
        predict(self, income)
    }
}

/// Pool every donor's `(income, metric)` pairs into one interpolant.
///
/// Pairs are matched by year within a donor. Pairs with non-positive or
/// non-finite income are dropped, as are metric values the definition's
/// transform cannot take. Equal incomes collapse to the mean metric value.
pub fn build_mapping<S: AsRef<[SeriesPoint]>>(
    income_by_country: &BTreeMap<String, S>,
    metric_by_country: &BTreeMap<String, S>,
    definition: &MetricDefinition,
) -> Interpolant {
    let mut pairs: Vec<TemplatePoint> = Vec::new();
    let mut discarded = 0usize;

    for (country, metric_series) in metric_by_country {
        let Some(income_series) = income_by_country.get(country) else {
            continue;
        };
        let income_by_year: HashMap<i32, f64> = income_series
            .as_ref()
            .iter()
            .filter(|p| p.value.is_finite())
            .map(|p| (p.year, p.value))
            .collect();

        for point in metric_series.as_ref() {
            let Some(&income) = income_by_year.get(&point.year) else {
                continue;
            };
            if income > 0.0 && income.is_finite() && definition.transform.accepts(point.value) {
                pairs.push(TemplatePoint {
                    income,
                    value: point.value,
                });
            } else {
                discarded += 1;
            }
        }
    }

    pairs.sort_by(|a, b| a.income.total_cmp(&b.income));
    let points = collapse_duplicate_incomes(&pairs);

    debug!(
        metric = %definition.code,
        donors = metric_by_country.len(),
        pairs = pairs.len(),
        discarded,
        points = points.len(),
        "built template interpolant"
    );

    Interpolant {
        metric_code: definition.code.clone(),
        transform: definition.transform,
        min_income: points.first().map(|p| p.income),
        max_income: points.last().map(|p| p.income),
        points,
    }
}

/// Average the metric values of runs of equal income in an income-sorted slice.
fn collapse_duplicate_incomes(sorted: &[TemplatePoint]) -> Vec<TemplatePoint> {
    let mut out: Vec<TemplatePoint> = Vec::with_capacity(sorted.len());
    let mut i = 0;
    while i < sorted.len() {
        let income = sorted[i].income;
        let run = sorted[i..]
            .iter()
            .take_while(|p| p.income == income)
            .count();
        let mean = sorted[i..i + run].iter().map(|p| p.value).sum::<f64>() / run as f64;
        out.push(TemplatePoint {
            income,
            value: mean,
        });
        i += run;
    }
    out
}

/// Metric level the template path associates with `income`.
///
/// `None` with fewer than two points or a non-positive/non-finite income.
/// Incomes at or beyond the observed range return the boundary value.
pub fn predict(interpolant: &Interpolant, income: f64) -> Option<f64> {
    let points = &interpolant.points;
    if points.len() < 2 || !income.is_finite() || income <= 0.0 {
        return None;
    }

    let first = points[0];
    let last = points[points.len() - 1];
    if income <= first.income {
        return Some(first.value);
    }
    if income >= last.income {
        return Some(last.value);
    }

    // first index with income >= query; 1..len-1 given the checks above
    let hi = points.partition_point(|p| p.income < income);
    let (a, b) = (points[hi - 1], points[hi]);
    if b.income == income {
        return Some(b.value);
    }

    let t = (income.ln() - a.income.ln()) / (b.income.ln() - a.income.ln());
    let value = match interpolant.transform {
        Transform::LogLog => (a.value.ln() + t * (b.value.ln() - a.value.ln())).exp(),
        Transform::LogX => a.value + t * (b.value - a.value),
    };
    value.is_finite().then_some(value)
}
