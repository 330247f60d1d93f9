use serde::{Deserialize, Serialize};

use super::convergence::years_to_convergence;
use crate::models::Convergence;

/// Default growth-rate perturbation for sensitivity bands.
pub const DEFAULT_DELTA: f64 = 0.01;

/// Convergence under one chaser growth assumption.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SensitivityCase {
    pub chaser_growth_rate: f64,
    pub convergence: Convergence,
    pub convergence_year: Option<i32>,
}

/// Baseline and perturbed convergence outcomes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SensitivityReport {
    pub baseline: SensitivityCase,
    pub optimistic: SensitivityCase,
    pub pessimistic: SensitivityCase,
}

fn run_case(
    chaser_value: f64,
    target_value: f64,
    chaser_growth_rate: f64,
    target_growth_rate: f64,
    base_year: i32,
) -> SensitivityCase {
    let convergence =
        years_to_convergence(chaser_value, target_value, chaser_growth_rate, target_growth_rate);
    SensitivityCase {
        chaser_growth_rate,
        convergence,
        convergence_year: convergence.convergence_year(base_year),
    }
}

/// Re-run the convergence calculation with the chaser's growth rate moved
/// up and down by `delta`. The pessimistic rate never goes below zero.
pub fn analyze(
    chaser_value: f64,
    target_value: f64,
    chaser_growth_rate: f64,
    target_growth_rate: f64,
    base_year: i32,
    delta: f64,
) -> SensitivityReport {
    let case = |rate| run_case(chaser_value, target_value, rate, target_growth_rate, base_year);
    SensitivityReport {
        baseline: case(chaser_growth_rate),
        optimistic: case(chaser_growth_rate + delta),
        pessimistic: case((chaser_growth_rate - delta).max(0.0)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn test_bands_bracket_baseline() {
        let r = analyze(10_000.0, 20_000.0, 0.05, 0.0, 2024, DEFAULT_DELTA);
        let base = r.baseline.convergence.years().unwrap();
        let opt = r.optimistic.convergence.years().unwrap();
        let pess = r.pessimistic.convergence.years().unwrap();
        assert!(opt < base && base < pess);
        assert_approx_eq!(base, 14.2067, 1e-4);
        assert_eq!(r.baseline.convergence_year, Some(2038));
        assert_approx_eq!(r.optimistic.chaser_growth_rate, 0.06, 1e-12);
        assert_approx_eq!(r.pessimistic.chaser_growth_rate, 0.04, 1e-12);
    }

    #[test]
    fn test_pessimistic_floored_at_zero() {
        let r = analyze(1.0, 2.0, 0.005, 0.0, 2024, 0.01);
        assert_eq!(r.pessimistic.chaser_growth_rate, 0.0);
        assert_eq!(r.pessimistic.convergence, Convergence::Never);
        assert_eq!(r.pessimistic.convergence_year, None);
        assert!(r.baseline.convergence.converges());
    }

    #[test]
    fn test_already_ahead_all_zero() {
        let r = analyze(3.0, 2.0, 0.02, 0.05, 2020, 0.01);
        for case in [r.baseline, r.optimistic, r.pessimistic] {
            assert_eq!(case.convergence, Convergence::Converges(0.0));
            assert_eq!(case.convergence_year, Some(2020));
        }
    }
}
