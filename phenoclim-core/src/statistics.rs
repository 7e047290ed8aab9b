//! Descriptive statistics, the Shapiro-Wilk normality check and the paired t-test.

use crate::error::PhenoclimError;
use phenoclim_schemas::statistics::{NormalityCheck, PairedComparison, SummaryStats};
use statrs::distribution::{ContinuousCDF, Normal, StudentsT};

/// Quantile by linear interpolation between order statistics at position `(n - 1) p`.
/// `sorted` must be non-empty and ascending.
fn quantile(sorted: &[f64], p: f64) -> f64 {
    let h = (sorted.len() - 1) as f64 * p;
    let lo = h.floor() as usize;
    let hi = h.ceil() as usize;
    sorted[lo] + (h - lo as f64) * (sorted[hi] - sorted[lo])
}

fn checked_sorted(sample: &[f64], needed: usize) -> Result<Vec<f64>, PhenoclimError> {
    if sample.len() < needed {
        return Err(PhenoclimError::InsufficientSample {
            needed,
            got: sample.len(),
        });
    }
    if sample.iter().any(|v| !v.is_finite()) {
        return Err(PhenoclimError::NonFiniteSample);
    }
    let mut sorted = sample.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    Ok(sorted)
}

fn mean_and_sd(sample: &[f64]) -> (f64, f64) {
    let n = sample.len() as f64;
    let mean = sample.iter().sum::<f64>() / n;
    let variance = sample.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0);
    (mean, variance.sqrt())
}

/// Summary statistics of a sample of at least two finite values.
pub fn summarize(sample: &[f64]) -> Result<SummaryStats, PhenoclimError> {
    let sorted = checked_sorted(sample, 2)?;
    let n = sorted.len();
    let (mean, std_dev) = mean_and_sd(&sorted);
    let q1 = quantile(&sorted, 0.25);
    let q3 = quantile(&sorted, 0.75);
    let iqr = q3 - q1;
    Ok(SummaryStats {
        n,
        min: sorted[0],
        q1,
        median: quantile(&sorted, 0.5),
        mean,
        q3,
        max: sorted[n - 1],
        iqr,
        upper_fence: q3 + 1.5 * iqr,
        lower_fence: q1 - 1.5 * iqr,
        std_dev,
        std_error: std_dev / (n as f64).sqrt(),
    })
}

fn standard_normal() -> Result<Normal, PhenoclimError> {
    Normal::new(0.0, 1.0).map_err(|e| PhenoclimError::Distribution(e.to_string()))
}

fn poly(coefficients: &[f64], x: f64) -> f64 {
    coefficients.iter().rev().fold(0.0, |acc, c| acc * x + c)
}

/// Shapiro-Wilk W and its p-value (Royston 1995 approximation), for 3 to 5000 values.
pub fn shapiro_wilk(sample: &[f64]) -> Result<NormalityCheck, PhenoclimError> {
    const C1: [f64; 6] = [0.0, 0.221157, -0.147981, -2.071190, 4.434685, -2.706056];
    const C2: [f64; 6] = [0.0, 0.042981, -0.293762, -1.752461, 5.682633, -3.582633];
    const C3: [f64; 4] = [0.5440, -0.39978, 0.025054, -6.714e-4];
    const C4: [f64; 4] = [1.3822, -0.77857, 0.062767, -0.0020322];
    const C5: [f64; 4] = [-1.5861, -0.31082, -0.083751, 0.0038915];
    const C6: [f64; 3] = [-0.4803, -0.082676, 0.0030302];
    const G: [f64; 2] = [-2.273, 0.459];

    let x = checked_sorted(sample, 3)?;
    let n = x.len();
    if n > 5000 {
        return Err(PhenoclimError::Distribution(format!(
            "Shapiro-Wilk supports at most 5000 values, got {n}"
        )));
    }
    if x[n - 1] - x[0] < f64::EPSILON * x[0].abs().max(1.0) {
        return Err(PhenoclimError::ZeroVariance("Shapiro-Wilk sample".to_string()));
    }

    let normal = standard_normal()?;
    let an = n as f64;
    let half = n / 2;

    // Coefficients for the upper half of the order statistics; the lower half is
    // antisymmetric.
    let mut a = vec![0.0; half];
    if n == 3 {
        a[0] = 0.5f64.sqrt();
    } else {
        let m: Vec<f64> = (1..=half)
            .map(|i| normal.inverse_cdf((i as f64 - 0.375) / (an + 0.25)))
            .collect();
        let summ2 = 2.0 * m.iter().map(|v| v * v).sum::<f64>();
        let ssumm2 = summ2.sqrt();
        let rsn = 1.0 / an.sqrt();
        let a1 = poly(&C1, rsn) - m[0] / ssumm2;

        let (first_free, fac) = if n > 5 {
            let a2 = -m[1] / ssumm2 + poly(&C2, rsn);
            a[1] = a2;
            let fac = ((summ2 - 2.0 * m[0].powi(2) - 2.0 * m[1].powi(2))
                / (1.0 - 2.0 * a1.powi(2) - 2.0 * a2.powi(2)))
            .sqrt();
            (2, fac)
        } else {
            let fac = ((summ2 - 2.0 * m[0].powi(2)) / (1.0 - 2.0 * a1.powi(2))).sqrt();
            (1, fac)
        };
        a[0] = a1;
        for i in first_free..half {
            a[i] = -m[i] / fac;
        }
    }

    let mean = x.iter().sum::<f64>() / an;
    let ssq: f64 = x.iter().map(|v| (v - mean).powi(2)).sum();
    let numerator: f64 = a
        .iter()
        .enumerate()
        .map(|(i, ai)| ai * (x[n - 1 - i] - x[i]))
        .sum();
    let w = (numerator * numerator / ssq).min(1.0);

    let p_value = if n == 3 {
        let pi6 = 6.0 / std::f64::consts::PI;
        let stqr = (0.75f64).sqrt().asin();
        (pi6 * (w.sqrt().asin() - stqr)).max(0.0)
    } else {
        let w1 = (1.0 - w).ln();
        let (y, mu, sigma) = if n <= 11 {
            let gamma = poly(&G, an);
            if w1 >= gamma {
                return Ok(NormalityCheck { w, p_value: 1e-99 });
            }
            (-(gamma - w1).ln(), poly(&C3, an), poly(&C4, an).exp())
        } else {
            let ln_n = an.ln();
            (w1, poly(&C5, ln_n), poly(&C6, ln_n).exp())
        };
        normal.sf((y - mu) / sigma)
    };

    Ok(NormalityCheck { w, p_value })
}

/// Differences `first[i] - second[i]`.
pub fn paired_differences(first: &[f64], second: &[f64]) -> Result<Vec<f64>, PhenoclimError> {
    if first.len() != second.len() {
        return Err(PhenoclimError::LengthMismatch(first.len(), second.len()));
    }
    Ok(first.iter().zip(second).map(|(a, b)| a - b).collect())
}

/// Two-sided paired t-test of `first - second`, with a normality check of the
/// differences attached for reporting.
pub fn paired_t_test(
    variable: &str,
    first: &[f64],
    second: &[f64],
) -> Result<PairedComparison, PhenoclimError> {
    let differences = paired_differences(first, second)?;
    let checked = checked_sorted(&differences, 2)?;
    let (mean_difference, sd_difference) = mean_and_sd(&checked);
    if sd_difference == 0.0 {
        return Err(PhenoclimError::ZeroVariance(variable.to_string()));
    }

    let n = differences.len();
    let df = (n - 1) as f64;
    let t = mean_difference / (sd_difference / (n as f64).sqrt());
    let students_t =
        StudentsT::new(0.0, 1.0, df).map_err(|e| PhenoclimError::Distribution(e.to_string()))?;
    let p_value = (2.0 * students_t.sf(t.abs())).min(1.0);

    let normality = if n >= 3 {
        shapiro_wilk(&differences)?
    } else {
        NormalityCheck {
            w: f64::NAN,
            p_value: f64::NAN,
        }
    };

    Ok(PairedComparison {
        variable: variable.to_string(),
        n,
        mean_difference,
        sd_difference,
        t,
        df,
        p_value,
        normality,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64, tol: f64) -> bool {
        (a - b).abs() < tol
    }

    #[test]
    fn quartiles_interpolate_between_order_statistics() {
        let stats = summarize(&[4.0, 1.0, 3.0, 2.0]).unwrap();
        assert_eq!(stats.n, 4);
        assert!(close(stats.q1, 1.75, 1e-12));
        assert!(close(stats.median, 2.5, 1e-12));
        assert!(close(stats.q3, 3.25, 1e-12));
        assert!(close(stats.iqr, 1.5, 1e-12));
        assert!(close(stats.upper_fence, 5.5, 1e-12));
        assert!(close(stats.lower_fence, -0.5, 1e-12));
        assert!(close(stats.std_dev, 1.2909944487358056, 1e-12));
        assert!(close(stats.std_error, 0.6454972243679028, 1e-12));
    }

    #[test]
    fn fences_flag_outliers() {
        let stats = summarize(&[10.0, 11.0, 12.0, 13.0, 40.0]).unwrap();
        assert!(stats.is_outlier(40.0));
        assert!(!stats.is_outlier(13.0));
    }

    #[test]
    fn single_value_is_rejected() {
        let err = summarize(&[1.0]).unwrap_err();
        assert!(matches!(
            err,
            PhenoclimError::InsufficientSample { needed: 2, got: 1 }
        ));
    }

    #[test]
    fn non_finite_values_are_rejected() {
        assert!(matches!(
            summarize(&[1.0, f64::NAN]).unwrap_err(),
            PhenoclimError::NonFiniteSample
        ));
    }

    #[test]
    fn shapiro_wilk_accepts_near_normal_sample() {
        // Normal quantiles are as normal as a sample gets.
        let normal = standard_normal().unwrap();
        let sample: Vec<f64> = (1..=15)
            .map(|i| normal.inverse_cdf((i as f64 - 0.5) / 15.0))
            .collect();
        let check = shapiro_wilk(&sample).unwrap();
        assert!(check.w > 0.97, "W = {}", check.w);
        assert!(check.p_value > 0.5, "p = {}", check.p_value);
    }

    #[test]
    fn shapiro_wilk_rejects_skewed_sample() {
        let sample: Vec<f64> = (0..15).map(|i| (i as f64).exp()).collect();
        let check = shapiro_wilk(&sample).unwrap();
        assert!(check.w < 0.7, "W = {}", check.w);
        assert!(check.p_value < 0.001, "p = {}", check.p_value);
    }

    #[test]
    fn shapiro_wilk_of_three_equidistant_values_is_one() {
        let check = shapiro_wilk(&[1.0, 2.0, 3.0]).unwrap();
        assert!(close(check.w, 1.0, 1e-9));
        assert!(close(check.p_value, 1.0, 1e-6));
    }

    #[test]
    fn paired_t_test_matches_hand_computation() {
        // Differences 1, 2, 3, 4, 5: mean 3, sd sqrt(2.5), t = 3 / (sqrt(2.5) / sqrt(5)).
        let first = [11.0, 12.0, 13.0, 14.0, 15.0];
        let second = [10.0, 10.0, 10.0, 10.0, 10.0];
        let result = paired_t_test("flowers", &first, &second).unwrap();

        assert_eq!(result.n, 5);
        assert_eq!(result.df, 4.0);
        assert!(close(result.mean_difference, 3.0, 1e-12));
        assert!(close(result.t, 4.242640687119285, 1e-9));
        // Two-sided p for t = 4.2426 with 4 degrees of freedom.
        assert!(close(result.p_value, 0.01324, 1e-4), "p = {}", result.p_value);
    }

    #[test]
    fn identical_differences_have_zero_variance() {
        let err = paired_t_test("flowers", &[2.0, 3.0, 4.0], &[1.0, 2.0, 3.0]).unwrap_err();
        assert!(matches!(err, PhenoclimError::ZeroVariance(_)));
    }

    #[test]
    fn unequal_lengths_are_rejected() {
        assert!(matches!(
            paired_differences(&[1.0], &[1.0, 2.0]).unwrap_err(),
            PhenoclimError::LengthMismatch(1, 2)
        ));
    }
}
