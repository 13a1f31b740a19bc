//! Risk metrics over daily return and value series.
//!
//! None of these annualize: returns are per trading day and the risk-free
//! rate is subtracted from the per-day mean as given.

use crate::{Error, Result};

/// Arithmetic mean of a series.
pub fn mean(values: &[f64]) -> Result<f64> {
    if values.is_empty() {
        return Err(Error::InsufficientData(
            "Cannot average an empty series".to_string(),
        ));
    }

    Ok(values.iter().sum::<f64>() / values.len() as f64)
}

/// Population standard deviation of returns.
///
/// Equal to `sqrt(mean(r^2) - mean(r)^2)`, computed in two passes so a
/// constant series gives 0 rather than the square root of a tiny negative.
/// A single return yields 0.
pub fn volatility(returns: &[f64]) -> Result<f64> {
    let mean_return = mean(returns).map_err(|_| {
        Error::InsufficientData("Volatility needs at least one return".to_string())
    })?;

    let n = returns.len() as f64;
    let variance = returns
        .iter()
        .map(|r| (r - mean_return).powi(2))
        .sum::<f64>()
        / n;

    Ok(variance.sqrt())
}

/// Largest peak-to-trough decline of a value series, as a fraction of the
/// running peak.
///
/// Returns 0 for a non-decreasing series. Values are expected positive;
/// a zero peak yields NaN drawdowns, which never raise the maximum.
pub fn max_drawdown(values: &[f64]) -> Result<f64> {
    let Some(&first) = values.first() else {
        return Err(Error::InsufficientData(
            "Max drawdown needs at least one value".to_string(),
        ));
    };

    let mut peak = first;
    let mut max_drawdown = 0.0;

    for &value in values {
        if value > peak {
            peak = value;
        }
        let drawdown = (peak - value) / peak;
        if drawdown > max_drawdown {
            max_drawdown = drawdown;
        }
    }

    Ok(max_drawdown)
}

/// Per-period Sharpe ratio: `(mean(returns) - risk_free_rate) / volatility`.
///
/// Zero volatility is not guarded; the result is then ±infinity, or NaN
/// when the mean equals the risk-free rate.
pub fn sharpe_ratio(returns: &[f64], risk_free_rate: f64) -> Result<f64> {
    let mean_return = mean(returns).map_err(|_| {
        Error::InsufficientData("Sharpe ratio needs at least one return".to_string())
    })?;

    Ok((mean_return - risk_free_rate) / volatility(returns)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::{assert_abs_diff_eq, assert_relative_eq};

    #[test]
    fn test_volatility() {
        let returns = vec![0.01, -0.01, 0.02, -0.02];

        // mean 0, mean of squares 0.00025
        assert_relative_eq!(
            volatility(&returns).unwrap(),
            0.00025_f64.sqrt(),
            max_relative = 1e-12
        );
    }

    #[test]
    fn test_volatility_matches_moment_formula() {
        let returns = vec![0.0, 0.1, -0.0909, 0.032, 0.015];
        let n = returns.len() as f64;
        let m = returns.iter().sum::<f64>() / n;
        let sq = returns.iter().map(|r| r * r).sum::<f64>() / n;

        assert_relative_eq!(
            volatility(&returns).unwrap(),
            (sq - m * m).sqrt(),
            max_relative = 1e-9
        );
    }

    #[test]
    fn test_volatility_constant_series() {
        let returns = vec![0.001; 250];
        assert_abs_diff_eq!(volatility(&returns).unwrap(), 0.0, epsilon = 1e-15);
    }

    #[test]
    fn test_volatility_single_return() {
        assert_eq!(volatility(&[0.05]).unwrap(), 0.0);
    }

    #[test]
    fn test_volatility_empty() {
        assert!(matches!(volatility(&[]), Err(Error::InsufficientData(_))));
    }

    #[test]
    fn test_max_drawdown() {
        let values = vec![100.0, 120.0, 90.0, 110.0, 80.0, 130.0];

        // Peak 120, trough 80
        assert_relative_eq!(max_drawdown(&values).unwrap(), 40.0 / 120.0);
    }

    #[test]
    fn test_max_drawdown_no_loss() {
        let values = vec![100.0, 100.0, 101.0, 105.0, 110.0];
        assert_eq!(max_drawdown(&values).unwrap(), 0.0);
    }

    #[test]
    fn test_max_drawdown_single_value() {
        assert_eq!(max_drawdown(&[1_000_000.0]).unwrap(), 0.0);
    }

    #[test]
    fn test_max_drawdown_total_loss() {
        let values = vec![100.0, 50.0, 0.0];
        assert_eq!(max_drawdown(&values).unwrap(), 1.0);
    }

    #[test]
    fn test_max_drawdown_empty() {
        assert!(matches!(max_drawdown(&[]), Err(Error::InsufficientData(_))));
    }

    #[test]
    fn test_sharpe_ratio() {
        let returns = vec![0.02, 0.0, 0.01, -0.01];
        let expected = (0.005 - 0.001) / volatility(&returns).unwrap();
        assert_relative_eq!(
            sharpe_ratio(&returns, 0.001).unwrap(),
            expected,
            max_relative = 1e-9
        );

        let losing = vec![-0.02, 0.0, -0.01, 0.01];
        assert!(sharpe_ratio(&losing, 0.001).unwrap() < 0.0);
    }

    #[test]
    fn test_sharpe_ratio_zero_volatility() {
        let flat = vec![0.0, 0.0, 0.0];
        let sharpe = sharpe_ratio(&flat, 0.01).unwrap();
        assert!(sharpe.is_infinite() && sharpe.is_sign_negative());

        assert!(sharpe_ratio(&flat, 0.0).unwrap().is_nan());
    }

    #[test]
    fn test_sharpe_ratio_empty() {
        assert!(matches!(
            sharpe_ratio(&[], 0.01),
            Err(Error::InsufficientData(_))
        ));
    }
}
