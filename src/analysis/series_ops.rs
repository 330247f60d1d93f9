//! Shared helpers over year/value series.

use crate::models::{SeriesPoint, TimeSeries};

/// Copy of `series` sorted ascending by year.
pub fn sorted(series: &[SeriesPoint]) -> TimeSeries {
    let mut out = series.to_vec();
    out.sort_by_key(|p| p.year);
    out
}

/// Sorted copy of `series` without non-finite values.
pub fn clean(series: &[SeriesPoint]) -> TimeSeries {
    let mut out: TimeSeries = series.iter().copied().filter(|p| p.value.is_finite()).collect();
    out.sort_by_key(|p| p.year);
    out
}

/// Most recent finite observation.
pub fn latest(series: &[SeriesPoint]) -> Option<SeriesPoint> {
    series
        .iter()
        .filter(|p| p.value.is_finite())
        .max_by_key(|p| p.year)
        .copied()
}

/// Finite value observed in exactly `year`.
pub fn value_at(series: &[SeriesPoint], year: i32) -> Option<f64> {
    series
        .iter()
        .find(|p| p.year == year && p.value.is_finite())
        .map(|p| p.value)
}

/// Compound `value` at `growth_rate` for `years` years.
pub fn project_value(value: f64, growth_rate: f64, years: f64) -> f64 {
    value * (1.0 + growth_rate).powf(years)
}

/// Compound annual growth rate between the latest point and the point
/// `lookback_years` before it.
///
/// Falls back to the earliest observation when the series is shorter than
/// the lookback window.
pub fn cagr(series: &[SeriesPoint], lookback_years: u32) -> Option<f64> {
    let points = clean(series);
    let latest = *points.last()?;
    if latest.value <= 0.0 {
        return None;
    }

    // a window reaching before i32::MIN covers the whole series
    let cutoff = i32::try_from(lookback_years)
        .ok()
        .and_then(|lookback| latest.year.checked_sub(lookback));
    let earlier = cutoff
        .and_then(|cutoff| points.iter().rev().find(|p| p.year <= cutoff))
        .or_else(|| points.first())?;

    let years = latest.year.checked_sub(earlier.year)?;
    if earlier.value <= 0.0 || years <= 0 {
        return None;
    }

    let rate = (latest.value / earlier.value).powf(1.0 / years as f64) - 1.0;
    rate.is_finite().then_some(rate)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::series_from_pairs;
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn test_sorted_does_not_touch_input() {
        let input = series_from_pairs(&[(2003, 3.0), (2001, 1.0), (2002, 2.0)]);
        let out = sorted(&input);
        assert_eq!(out.iter().map(|p| p.year).collect::<Vec<_>>(), vec![2001, 2002, 2003]);
        assert_eq!(input[0].year, 2003);
    }

    #[test]
    fn test_clean_drops_non_finite() {
        let input = series_from_pairs(&[(2001, f64::NAN), (2000, 1.0), (2002, f64::INFINITY)]);
        let out = clean(&input);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].year, 2000);
    }

    #[test]
    fn test_latest_and_value_at() {
        let input = series_from_pairs(&[(2001, 1.0), (2005, f64::NAN), (2003, 3.0)]);
        assert_eq!(latest(&input), Some(SeriesPoint::new(2003, 3.0)));
        assert_eq!(value_at(&input, 2001), Some(1.0));
        assert_eq!(value_at(&input, 2005), None);
        assert_eq!(latest(&[]), None);
    }

    #[test]
    fn test_project_value() {
        assert_approx_eq!(project_value(100.0, 0.1, 2.0), 121.0, 1e-9);
        assert_approx_eq!(project_value(100.0, -0.5, 1.0), 50.0, 1e-9);
        assert_approx_eq!(project_value(100.0, 0.05, 0.0), 100.0, 1e-12);
    }

    #[test]
    fn test_cagr_uses_lookback_window() {
        // 2010 -> 2020 doubling
        let s = series_from_pairs(&[(2000, 50.0), (2010, 100.0), (2015, 150.0), (2020, 200.0)]);
        let rate = cagr(&s, 10).unwrap();
        assert_approx_eq!(rate, 2f64.powf(0.1) - 1.0, 1e-12);
    }

    #[test]
    fn test_cagr_picks_latest_point_before_cutoff() {
        // cutoff 2012: 2010 qualifies, 2015 does not
        let s = series_from_pairs(&[(2015, 150.0), (2020, 200.0), (2010, 100.0), (2000, 1.0)]);
        let rate = cagr(&s, 8).unwrap();
        assert_approx_eq!(rate, 2f64.powf(0.1) - 1.0, 1e-12);
    }

    #[test]
    fn test_cagr_falls_back_to_earliest() {
        let s = series_from_pairs(&[(2016, 100.0), (2020, 121.0 * 121.0 / 100.0)]);
        // only 4 years available for a 10-year lookback
        let rate = cagr(&s, 10).unwrap();
        assert_approx_eq!(rate, 1.21f64.powf(0.5) - 1.0, 1e-12);
    }

    #[test]
    fn test_cagr_with_huge_lookback_uses_earliest() {
        let s = series_from_pairs(&[(2010, 100.0), (2020, 200.0)]);
        let expected = 2f64.powf(0.1) - 1.0;
        assert_approx_eq!(cagr(&s, 2_147_483_648).unwrap(), expected, 1e-12);
        assert_approx_eq!(cagr(&s, u32::MAX).unwrap(), expected, 1e-12);
    }

    #[test]
    fn test_cagr_extreme_years_do_not_overflow() {
        let s = series_from_pairs(&[(i32::MIN, 1.0), (i32::MAX, 2.0)]);
        assert_eq!(cagr(&s, 10), None);
    }

    #[test]
    fn test_cagr_none_cases() {
        assert_eq!(cagr(&[], 10), None);
        assert_eq!(cagr(&series_from_pairs(&[(2020, 5.0)]), 10), None);
        assert_eq!(cagr(&series_from_pairs(&[(2010, 0.0), (2020, 5.0)]), 10), None);
        assert_eq!(cagr(&series_from_pairs(&[(2010, 5.0), (2020, -1.0)]), 10), None);
    }
}
