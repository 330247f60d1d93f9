use serde::{Deserialize, Serialize};

use crate::models::TotalsRule;

/// Absolute totals for the current and implied values of one metric.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Totals {
    pub current_total: Option<f64>,
    pub implied_total: Option<f64>,
}

/// Inputs for a totals conversion. Any missing piece yields a missing total.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TotalsInput {
    pub current_metric: Option<f64>,
    pub implied_metric: Option<f64>,
    pub population_current: Option<f64>,
    pub population_future: Option<f64>,
    pub income_per_capita_current: Option<f64>,
    pub income_per_capita_future: Option<f64>,
}

/// Convert one per-capita or percentage value into an absolute total.
pub fn convert(
    rule: TotalsRule,
    value: Option<f64>,
    population: Option<f64>,
    income_per_capita: Option<f64>,
) -> Option<f64> {
    let value = value.filter(|v| v.is_finite())?;
    let population = population.filter(|p| p.is_finite() && *p > 0.0)?;

    let total = match rule {
        TotalsRule::EnergyToe => value * population / 1_000.0,
        TotalsRule::ElectricityTwh => value * population / 1e9,
        TotalsRule::EmissionsMt => value * population / 1e6,
        TotalsRule::PercentOfPopulation => value / 100.0 * population,
        TotalsRule::PercentOfGdp => {
            let income = income_per_capita.filter(|i| i.is_finite() && *i > 0.0)?;
            value / 100.0 * (income * population)
        }
    };
    total.is_finite().then_some(total)
}

/// Totals under an explicit conversion rule; `None` yields missing totals.
pub fn compute_totals_with(rule: Option<TotalsRule>, input: &TotalsInput) -> Totals {
    let Some(rule) = rule else {
        return Totals::default();
    };
    Totals {
        current_total: convert(
            rule,
            input.current_metric,
            input.population_current,
            input.income_per_capita_current,
        ),
        implied_total: convert(
            rule,
            input.implied_metric,
            input.population_future,
            input.income_per_capita_future,
        ),
    }
}

/// Totals for a built-in indicator code. Unrecognised codes yield missing totals.
pub fn compute_totals(metric_code: &str, input: &TotalsInput) -> Totals {
    compute_totals_with(TotalsRule::for_code(metric_code), input)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        CO2_EMISSIONS_PC, ELECTRICITY_USE_PC, ENERGY_USE_PC, MANUFACTURING_PCT_GDP,
        URBAN_POPULATION_PCT,
    };
    use assert_approx_eq::assert_approx_eq;

    fn full_input(current: f64, implied: f64) -> TotalsInput {
        TotalsInput {
            current_metric: Some(current),
            implied_metric: Some(implied),
            population_current: Some(50_000_000.0),
            population_future: Some(60_000_000.0),
            income_per_capita_current: Some(10_000.0),
            income_per_capita_future: Some(20_000.0),
        }
    }

    #[test]
    fn test_energy_to_tonnes_oil_equivalent() {
        let t = compute_totals(ENERGY_USE_PC, &full_input(1_000.0, 2_000.0));
        assert_approx_eq!(t.current_total.unwrap(), 5.0e7, 1e-3);
        assert_approx_eq!(t.implied_total.unwrap(), 1.2e8, 1e-3);
    }

    #[test]
    fn test_electricity_to_twh() {
        let t = compute_totals(ELECTRICITY_USE_PC, &full_input(2_000.0, 5_000.0));
        assert_approx_eq!(t.current_total.unwrap(), 100.0, 1e-9);
        assert_approx_eq!(t.implied_total.unwrap(), 300.0, 1e-9);
    }

    #[test]
    fn test_emissions_to_megatonnes() {
        let t = compute_totals(CO2_EMISSIONS_PC, &full_input(4.0, 6.0));
        assert_approx_eq!(t.current_total.unwrap(), 200.0, 1e-9);
        assert_approx_eq!(t.implied_total.unwrap(), 360.0, 1e-9);
    }

    #[test]
    fn test_percent_of_population_to_persons() {
        let t = compute_totals(URBAN_POPULATION_PCT, &full_input(40.0, 60.0));
        assert_approx_eq!(t.current_total.unwrap(), 20_000_000.0, 1e-3);
        assert_approx_eq!(t.implied_total.unwrap(), 36_000_000.0, 1e-3);
    }

    #[test]
    fn test_percent_of_gdp_to_currency() {
        let t = compute_totals(MANUFACTURING_PCT_GDP, &full_input(20.0, 25.0));
        // 20% of 10_000 * 50M
        assert_approx_eq!(t.current_total.unwrap(), 1.0e11, 1.0);
        // 25% of 20_000 * 60M
        assert_approx_eq!(t.implied_total.unwrap(), 3.0e11, 1.0);
    }

    #[test]
    fn test_unknown_code_yields_no_totals() {
        let t = compute_totals("SOME.OTHER.CODE", &full_input(1.0, 2.0));
        assert_eq!(t, Totals::default());
        assert_eq!(t.current_total, None);
        assert_eq!(t.implied_total, None);
    }

    #[test]
    fn test_missing_inputs_yield_missing_side() {
        let mut input = full_input(40.0, 60.0);
        input.population_future = None;
        let t = compute_totals(URBAN_POPULATION_PCT, &input);
        assert!(t.current_total.is_some());
        assert_eq!(t.implied_total, None);

        let mut gdp = full_input(20.0, 25.0);
        gdp.income_per_capita_current = None;
        let t = compute_totals(MANUFACTURING_PCT_GDP, &gdp);
        assert_eq!(t.current_total, None);
        assert!(t.implied_total.is_some());
    }

    #[test]
    fn test_explicit_rule_overrides_code() {
        let t = compute_totals_with(Some(TotalsRule::EmissionsMt), &full_input(1.0, 1.0));
        assert_approx_eq!(t.current_total.unwrap(), 50.0, 1e-9);
        assert_eq!(compute_totals_with(None, &full_input(1.0, 1.0)), Totals::default());
    }
}
