use serde::Serialize;
use tracing::{debug, info};

use crate::analysis::{
    analyze, build_mapping, calculate_milestones, compute_totals_with, generate_projection,
    project_value, required_growth_rate, sanitize_anchor, series_ops, years_to_convergence,
    Implication, ImplicationEstimator, Projection, ScenarioEngine, SensitivityReport, Totals,
    TotalsInput,
};
use crate::config::EngineConfig;
use crate::error::ConvergenceError;
use crate::models::{Convergence, Dataset, Entity, Milestone, ScenarioPresets, SeriesPoint};

/// Growth rates used for a comparison, and whether each was estimated from history.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GrowthAssumptions {
    pub chaser_growth_rate: f64,
    pub target_growth_rate: f64,
    pub chaser_estimated: bool,
    pub target_estimated: bool,
}

/// Headline convergence figures for a chaser/target pair.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConvergenceSummary {
    pub chaser: String,
    pub target: String,
    pub base_year: i32,
    pub chaser_income: f64,
    pub target_income: f64,
    pub chaser_growth_rate: f64,
    pub target_growth_rate: f64,
    pub convergence: Convergence,
    pub convergence_year: Option<i32>,
    /// Chaser growth needed to converge within the projection horizon
    pub required_growth_rate: Option<f64>,
}

/// One metric's implied future level and totals.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImplicationRow {
    pub code: String,
    pub label: String,
    #[serde(flatten)]
    pub implication: Implication,
    /// Estimate after scenario adjustment
    pub adjusted: Option<f64>,
    #[serde(flatten)]
    pub totals: Totals,
    pub total_unit: Option<&'static str>,
    pub donor_points: usize,
}

/// Implications of the chaser reaching a future income level.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImplicationReport {
    pub scenario: String,
    pub presets: ScenarioPresets,
    pub donor_pool: String,
    pub base_year: i32,
    pub target_year: i32,
    pub income_current: f64,
    pub income_future: f64,
    pub population_current: Option<f64>,
    pub population_future: Option<f64>,
    pub rows: Vec<ImplicationRow>,
}

/// Unified API over one chaser/target pair drawn from a dataset.
pub struct Comparison<'a> {
    dataset: &'a Dataset,
    config: &'a EngineConfig,
    chaser: &'a Entity,
    target: &'a Entity,
    scenarios: ScenarioEngine,
}

impl<'a> Comparison<'a> {
    /// Create a comparison; both entities must exist in the dataset.
    pub fn new(
        dataset: &'a Dataset,
        config: &'a EngineConfig,
        chaser_id: &str,
        target_id: &str,
    ) -> Result<Self, ConvergenceError> {
        let lookup = move |id: &str| {
            dataset.entity(id).ok_or_else(|| {
                ConvergenceError::ValidationError(format!("unknown entity '{id}'"))
            })
        };
        Ok(Self {
            dataset,
            config,
            chaser: lookup(chaser_id)?,
            target: lookup(target_id)?,
            scenarios: ScenarioEngine::new(config.scenarios.clone()),
        })
    }

    pub fn scenarios(&self) -> &ScenarioEngine {
        &self.scenarios
    }

    fn latest_income(&self, entity: &Entity) -> Result<SeriesPoint, ConvergenceError> {
        entity
            .series(&self.config.income_indicator)
            .and_then(|s| series_ops::latest(s))
            .filter(|p| p.value > 0.0)
            .ok_or_else(|| {
                ConvergenceError::InsufficientData(format!(
                    "no positive {} observation for '{}'",
                    self.config.income_indicator, entity.id
                ))
            })
    }

    /// Latest income observations of chaser and target.
    pub fn current_incomes(&self) -> Result<(SeriesPoint, SeriesPoint), ConvergenceError> {
        Ok((self.latest_income(self.chaser)?, self.latest_income(self.target)?))
    }

    /// Explicit rates win; otherwise each side's income CAGR over the
    /// configured lookback. A target without history is assumed static.
    pub fn growth_assumptions(
        &self,
        chaser_growth_rate: Option<f64>,
        target_growth_rate: Option<f64>,
    ) -> Result<GrowthAssumptions, ConvergenceError> {
        let estimate = |entity: &Entity| {
            entity
                .series(&self.config.income_indicator)
                .and_then(|s| series_ops::cagr(s, self.config.cagr_lookback_years))
        };

        let (chaser_rate, chaser_estimated) = match chaser_growth_rate {
            Some(rate) => (rate, false),
            None => {
                let rate = estimate(self.chaser).ok_or_else(|| {
                    ConvergenceError::InsufficientData(format!(
                        "cannot estimate income growth for '{}'",
                        self.chaser.id
                    ))
                })?;
                (rate, true)
            }
        };
        let (target_rate, target_estimated) = match target_growth_rate {
            Some(rate) => (rate, false),
            None => match estimate(self.target) {
                Some(rate) => (rate, true),
                None => (0.0, false),
            },
        };

        debug!(chaser_rate, target_rate, "growth assumptions");
        Ok(GrowthAssumptions {
            chaser_growth_rate: chaser_rate,
            target_growth_rate: target_rate,
            chaser_estimated,
            target_estimated,
        })
    }

    pub fn convergence(
        &self,
        growth: &GrowthAssumptions,
    ) -> Result<ConvergenceSummary, ConvergenceError> {
        let (chaser, target) = self.current_incomes()?;
        let convergence = years_to_convergence(
            chaser.value,
            target.value,
            growth.chaser_growth_rate,
            growth.target_growth_rate,
        );
        info!(
            chaser = %self.chaser.id,
            target = %self.target.id,
            %convergence,
            "convergence computed"
        );
        Ok(ConvergenceSummary {
            chaser: self.chaser.id.clone(),
            target: self.target.id.clone(),
            base_year: chaser.year,
            chaser_income: chaser.value,
            target_income: target.value,
            chaser_growth_rate: growth.chaser_growth_rate,
            target_growth_rate: growth.target_growth_rate,
            convergence,
            convergence_year: convergence.convergence_year(chaser.year),
            required_growth_rate: required_growth_rate(
                chaser.value,
                target.value,
                growth.target_growth_rate,
                self.config.horizon_cap_years as f64,
            ),
        })
    }

    /// Year-by-year income path from the chaser's latest observation year.
    pub fn projection(
        &self,
        growth: &GrowthAssumptions,
        horizon_cap_years: Option<u32>,
    ) -> Result<Projection, ConvergenceError> {
        let (chaser, target) = self.current_incomes()?;
        Ok(generate_projection(
            chaser.value,
            target.value,
            growth.chaser_growth_rate,
            growth.target_growth_rate,
            chaser.year,
            horizon_cap_years.unwrap_or(self.config.horizon_cap_years),
        ))
    }

    pub fn milestones(&self, growth: &GrowthAssumptions) -> Result<Vec<Milestone>, ConvergenceError> {
        let points = self.projection(growth, None)?.to_vec();
        Ok(calculate_milestones(&points, &self.config.milestone_percentages))
    }

    pub fn sensitivity(
        &self,
        growth: &GrowthAssumptions,
    ) -> Result<SensitivityReport, ConvergenceError> {
        let (chaser, target) = self.current_incomes()?;
        Ok(analyze(
            chaser.value,
            target.value,
            growth.chaser_growth_rate,
            growth.target_growth_rate,
            chaser.year,
            self.config.sensitivity_delta,
        ))
    }

    /// Implied metric levels and totals for the chaser in `target_year`.
    ///
    /// Without a target year, the convergence year is used, capped at the
    /// projection horizon.
    pub fn implications(
        &self,
        growth: &GrowthAssumptions,
        scenario_id: &str,
        pool_id: &str,
        target_year: Option<i32>,
    ) -> Result<ImplicationReport, ConvergenceError> {
        let pool = self.config.donor_pool(pool_id).ok_or_else(|| {
            ConvergenceError::ValidationError(format!("unknown donor pool '{pool_id}'"))
        })?;
        let summary = self.convergence(growth)?;
        let base_year = summary.base_year;
        let horizon_year = i32::try_from(self.config.horizon_cap_years)
            .ok()
            .and_then(|horizon| base_year.checked_add(horizon))
            .ok_or_else(|| {
                ConvergenceError::ValidationError(format!(
                    "horizon of {} years from {base_year} is out of range",
                    self.config.horizon_cap_years
                ))
            })?;
        let target_year = target_year
            .unwrap_or_else(|| summary.convergence_year.unwrap_or(horizon_year).min(horizon_year));
        let years = (i64::from(target_year) - i64::from(base_year)).max(0) as f64;

        let income_current = summary.chaser_income;
        let income_future = project_value(income_current, growth.chaser_growth_rate, years);

        let population = self.chaser.series(&self.config.population_indicator);
        let population_current = population
            .and_then(|s| series_ops::latest(s))
            .map(|p| p.value)
            .filter(|v| *v > 0.0);
        let population_growth =
            population.and_then(|s| series_ops::cagr(s, self.config.cagr_lookback_years));
        let population_future = population_current
            .zip(population_growth)
            .map(|(pop, rate)| project_value(pop, rate, years));

        let donor_income = self
            .dataset
            .series_for(&pool.members, &self.config.income_indicator);
        let scenario = self.scenarios.resolve(scenario_id);

        let rows = self
            .config
            .metrics
            .iter()
            .map(|definition| {
                let donor_metric = self.dataset.series_for(&pool.members, &definition.code);
                let interpolant = build_mapping(&donor_income, &donor_metric, definition);
                let own = self
                    .chaser
                    .series(&definition.code)
                    .and_then(|s| series_ops::latest(s))
                    .map(|p| p.value);

                let implication = ImplicationEstimator::new(&interpolant, definition).estimate(
                    income_current,
                    income_future,
                    own,
                );
                let adjusted =
                    self.scenarios
                        .apply(&scenario.id, &definition.code, implication.implied);
                let rule = definition.totals_rule();
                let totals = compute_totals_with(
                    rule,
                    &TotalsInput {
                        current_metric: sanitize_anchor(own, definition.transform),
                        implied_metric: adjusted,
                        population_current,
                        population_future,
                        income_per_capita_current: Some(income_current),
                        income_per_capita_future: Some(income_future),
                    },
                );

                ImplicationRow {
                    code: definition.code.clone(),
                    label: definition.label().to_string(),
                    implication,
                    adjusted,
                    totals,
                    total_unit: rule.map(|r| r.unit()),
                    donor_points: interpolant.len(),
                }
            })
            .collect();

        Ok(ImplicationReport {
            scenario: scenario.id.clone(),
            presets: scenario.presets,
            donor_pool: pool.id.clone(),
            base_year,
            target_year,
            income_current,
            income_future,
            population_current,
            population_future,
            rows,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{INCOME_INDICATOR, POPULATION_INDICATOR};
    use crate::models::{
        series_from_pairs, DonorPool, TimeSeries, CO2_EMISSIONS_PC, URBAN_POPULATION_PCT,
    };
    use assert_approx_eq::assert_approx_eq;

    fn growth_series(start_year: i32, years: i32, start: f64, rate: f64) -> TimeSeries {
        (0..=years)
            .map(|t| SeriesPoint::new(start_year + t, start * (1.0 + rate).powi(t)))
            .collect()
    }

    fn sample_dataset() -> Dataset {
        let mut ds = Dataset::new("Comparison Test");
        ds.insert(
            Entity::new("CHS")
                .with_series(INCOME_INDICATOR, growth_series(2010, 10, 5_000.0, 0.05))
                .with_series(POPULATION_INDICATOR, growth_series(2010, 10, 1.0e7, 0.01))
                .with_series(CO2_EMISSIONS_PC, series_from_pairs(&[(2020, 2.0)]))
                .with_series(URBAN_POPULATION_PCT, series_from_pairs(&[(2020, 40.0)])),
        );
        ds.insert(
            Entity::new("TGT")
                .with_series(INCOME_INDICATOR, growth_series(2010, 10, 20_000.0, 0.01)),
        );
        // donor: income 2_000 -> 64_000, emissions proportional to income / 1000
        let donor_income = growth_series(1960, 60, 2_000.0, 0.06);
        let donor_co2: TimeSeries = donor_income
            .iter()
            .map(|p| SeriesPoint::new(p.year, p.value / 1_000.0))
            .collect();
        let donor_urban: TimeSeries = donor_income
            .iter()
            .enumerate()
            .map(|(i, p)| SeriesPoint::new(p.year, 20.0 + i as f64))
            .collect();
        ds.insert(
            Entity::new("DNR")
                .with_series(INCOME_INDICATOR, donor_income)
                .with_series(CO2_EMISSIONS_PC, donor_co2)
                .with_series(URBAN_POPULATION_PCT, donor_urban),
        );
        ds
    }

    fn config() -> EngineConfig {
        EngineConfig {
            donor_pools: vec![DonorPool::new("test_pool", "Test", &["DNR", "MISSING"])],
            ..EngineConfig::default()
        }
    }

    #[test]
    fn test_unknown_entity_rejected() {
        let ds = sample_dataset();
        let cfg = config();
        assert!(matches!(
            Comparison::new(&ds, &cfg, "CHS", "NOPE"),
            Err(ConvergenceError::ValidationError(_))
        ));
    }

    #[test]
    fn test_growth_estimated_from_history() {
        let ds = sample_dataset();
        let cfg = config();
        let cmp = Comparison::new(&ds, &cfg, "CHS", "TGT").unwrap();
        let growth = cmp.growth_assumptions(None, None).unwrap();
        assert_approx_eq!(growth.chaser_growth_rate, 0.05, 1e-9);
        assert_approx_eq!(growth.target_growth_rate, 0.01, 1e-9);
        assert!(growth.chaser_estimated && growth.target_estimated);

        let explicit = cmp.growth_assumptions(Some(0.07), Some(0.0)).unwrap();
        assert_eq!(explicit.chaser_growth_rate, 0.07);
        assert!(!explicit.chaser_estimated);
    }

    #[test]
    fn test_target_without_history_is_static() {
        let mut ds = sample_dataset();
        ds.insert(
            Entity::new("FLAT").with_series(INCOME_INDICATOR, series_from_pairs(&[(2020, 9e4)])),
        );
        let cfg = config();
        let cmp = Comparison::new(&ds, &cfg, "CHS", "FLAT").unwrap();
        let growth = cmp.growth_assumptions(None, None).unwrap();
        assert_eq!(growth.target_growth_rate, 0.0);
        assert!(!growth.target_estimated);

        let stuck = Comparison::new(&ds, &cfg, "FLAT", "CHS").unwrap();
        assert!(matches!(
            stuck.growth_assumptions(None, None),
            Err(ConvergenceError::InsufficientData(_))
        ));
    }

    #[test]
    fn test_convergence_summary() {
        let ds = sample_dataset();
        let cfg = config();
        let cmp = Comparison::new(&ds, &cfg, "CHS", "TGT").unwrap();
        let growth = cmp.growth_assumptions(Some(0.05), Some(0.01)).unwrap();
        let summary = cmp.convergence(&growth).unwrap();
        assert_eq!(summary.base_year, 2020);
        let chaser = 5_000.0 * 1.05f64.powi(10);
        let target = 20_000.0 * 1.01f64.powi(10);
        let expected = (target / chaser).ln() / (1.05f64 / 1.01).ln();
        assert_approx_eq!(summary.convergence.years().unwrap(), expected, 1e-9);
        assert_eq!(summary.convergence_year, Some((2020.0 + expected).round() as i32));
        assert!(summary.required_growth_rate.unwrap() > 0.01);
    }

    #[test]
    fn test_projection_and_milestones() {
        let ds = sample_dataset();
        let cfg = config();
        let cmp = Comparison::new(&ds, &cfg, "CHS", "TGT").unwrap();
        let growth = cmp.growth_assumptions(Some(0.05), Some(0.01)).unwrap();
        let points = cmp.projection(&growth, None).unwrap().to_vec();
        let last = points.last().unwrap();
        assert!(last.chaser_value >= last.target_value);
        let milestones = cmp.milestones(&growth).unwrap();
        assert_eq!(milestones.len(), 3);
        assert!(milestones.windows(2).all(|w| w[0].percentage < w[1].percentage));
    }

    #[test]
    fn test_sensitivity_uses_configured_delta() {
        let ds = sample_dataset();
        let cfg = EngineConfig {
            sensitivity_delta: 0.02,
            ..config()
        };
        let cmp = Comparison::new(&ds, &cfg, "CHS", "TGT").unwrap();
        let growth = cmp.growth_assumptions(Some(0.05), Some(0.01)).unwrap();
        let report = cmp.sensitivity(&growth).unwrap();
        assert_approx_eq!(report.optimistic.chaser_growth_rate, 0.07, 1e-12);
        assert_approx_eq!(report.pessimistic.chaser_growth_rate, 0.03, 1e-12);
    }

    #[test]
    fn test_implications_anchor_and_scale() {
        let ds = sample_dataset();
        let cfg = config();
        let cmp = Comparison::new(&ds, &cfg, "CHS", "TGT").unwrap();
        let growth = cmp.growth_assumptions(Some(0.05), Some(0.01)).unwrap();
        let report = cmp
            .implications(&growth, "baseline", "test_pool", Some(2030))
            .unwrap();
        assert_eq!(report.target_year, 2030);
        assert_approx_eq!(report.income_future, report.income_current * 1.05f64.powi(10), 1e-6);

        let co2 = report.rows.iter().find(|r| r.code == CO2_EMISSIONS_PC).unwrap();
        // template is linear in income, so the anchored estimate scales with income
        assert!(co2.implication.anchored);
        assert_approx_eq!(co2.adjusted.unwrap(), 2.0 * 1.05f64.powi(10), 1e-6);
        assert_eq!(co2.total_unit, Some("Mt CO2"));
        assert_approx_eq!(
            co2.totals.current_total.unwrap(),
            2.0 * report.population_current.unwrap() / 1e6,
            1e-9
        );
        assert!(co2.totals.implied_total.unwrap() > co2.totals.current_total.unwrap());

        let urban = report.rows.iter().find(|r| r.code == URBAN_POPULATION_PCT).unwrap();
        let adjusted = urban.adjusted.unwrap();
        assert!(adjusted > 40.0 && adjusted <= 100.0);

        // metrics without donor data stay empty rather than failing
        let energy = report.rows.iter().find(|r| r.code == "EG.USE.PCAP.KG.OE").unwrap();
        assert_eq!(energy.donor_points, 0);
        assert_eq!(energy.adjusted, None);
        assert_eq!(energy.totals, Totals::default());
    }

    #[test]
    fn test_implications_apply_scenario() {
        let ds = sample_dataset();
        let cfg = config();
        let cmp = Comparison::new(&ds, &cfg, "CHS", "TGT").unwrap();
        let growth = cmp.growth_assumptions(Some(0.05), Some(0.01)).unwrap();
        let base = cmp.implications(&growth, "baseline", "test_pool", Some(2030)).unwrap();
        let green = cmp.implications(&growth, "green_growth", "test_pool", Some(2030)).unwrap();
        let pick = |r: &ImplicationReport| {
            r.rows.iter().find(|row| row.code == CO2_EMISSIONS_PC).unwrap().adjusted.unwrap()
        };
        assert_approx_eq!(pick(&green), pick(&base) * 0.6, 1e-9);
        assert_eq!(green.presets.horizon_years, Some(50));

        let unknown = cmp.implications(&growth, "made_up", "test_pool", Some(2030)).unwrap();
        assert_eq!(unknown.scenario, "baseline");
    }

    #[test]
    fn test_implications_default_year_is_convergence_year() {
        let ds = sample_dataset();
        let cfg = config();
        let cmp = Comparison::new(&ds, &cfg, "CHS", "TGT").unwrap();
        let growth = cmp.growth_assumptions(Some(0.05), Some(0.01)).unwrap();
        let summary = cmp.convergence(&growth).unwrap();
        let report = cmp.implications(&growth, "baseline", "test_pool", None).unwrap();
        assert_eq!(Some(report.target_year), summary.convergence_year);

        let stalled = cmp.growth_assumptions(Some(0.0), Some(0.01)).unwrap();
        let capped = cmp.implications(&stalled, "baseline", "test_pool", None).unwrap();
        assert_eq!(capped.target_year, 2020 + cfg.horizon_cap_years as i32);
    }

    #[test]
    fn test_oversized_horizon_is_an_error() {
        let ds = sample_dataset();
        let cfg = EngineConfig {
            horizon_cap_years: i32::MAX as u32,
            ..config()
        };
        let cmp = Comparison::new(&ds, &cfg, "CHS", "TGT").unwrap();
        let growth = cmp.growth_assumptions(Some(0.05), Some(0.01)).unwrap();
        assert!(matches!(
            cmp.implications(&growth, "baseline", "test_pool", Some(2030)),
            Err(ConvergenceError::ValidationError(_))
        ));

        let cfg = EngineConfig {
            horizon_cap_years: u32::MAX,
            ..config()
        };
        let cmp = Comparison::new(&ds, &cfg, "CHS", "TGT").unwrap();
        assert!(cmp.implications(&growth, "baseline", "test_pool", None).is_err());
    }

    #[test]
    fn test_explicit_year_far_in_the_past_projects_zero_years() {
        let ds = sample_dataset();
        let cfg = config();
        let cmp = Comparison::new(&ds, &cfg, "CHS", "TGT").unwrap();
        let growth = cmp.growth_assumptions(Some(0.05), Some(0.01)).unwrap();
        let report = cmp
            .implications(&growth, "baseline", "test_pool", Some(i32::MIN))
            .unwrap();
        assert_eq!(report.income_future, report.income_current);
    }

    #[test]
    fn test_unknown_pool_rejected() {
        let ds = sample_dataset();
        let cfg = config();
        let cmp = Comparison::new(&ds, &cfg, "CHS", "TGT").unwrap();
        let growth = cmp.growth_assumptions(Some(0.05), Some(0.01)).unwrap();
        assert!(cmp.implications(&growth, "baseline", "nowhere", None).is_err());
    }
}
