//! Return summaries over a value series.

/// Chained day-over-day return of a value series, in percent.
///
/// Steps from a non-positive value are skipped.
pub fn time_weighted_return(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }

    let growth = values
        .windows(2)
        .filter(|w| w[0] > 0.0)
        .fold(1.0, |acc, w| acc * w[1] / w[0]);

    (growth - 1.0) * 100.0
}

/// Return from `initial_value` to `final_value`, in percent.
pub fn holding_period_return(initial_value: f64, final_value: f64) -> f64 {
    if initial_value <= 0.0 {
        return 0.0;
    }
    ((final_value - initial_value) / initial_value) * 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_time_weighted_return() {
        let values = vec![10000.0, 10500.0, 10200.0, 11000.0];

        // (10500/10000) * (10200/10500) * (11000/10200) - 1 = 10%
        assert_relative_eq!(time_weighted_return(&values), 10.0, max_relative = 1e-9);
    }

    #[test]
    fn test_time_weighted_return_short_series() {
        assert_eq!(time_weighted_return(&[]), 0.0);
        assert_eq!(time_weighted_return(&[100.0]), 0.0);
    }

    #[test]
    fn test_holding_period_return() {
        assert_relative_eq!(holding_period_return(10000.0, 11500.0), 15.0, max_relative = 1e-9);
        assert_eq!(holding_period_return(0.0, 100.0), 0.0);
    }
}
