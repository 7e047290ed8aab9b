use serde::{Deserialize, Serialize};

/// Descriptive statistics of a one-dimensional sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SummaryStats {
    pub n: usize,
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub mean: f64,
    pub q3: f64,
    pub max: f64,
    pub iqr: f64,
    /// Q3 + 1.5 IQR
    pub upper_fence: f64,
    /// Q1 - 1.5 IQR
    pub lower_fence: f64,
    /// Sample standard deviation (n - 1).
    pub std_dev: f64,
    pub std_error: f64,
}

impl SummaryStats {
    /// True when `value` lies strictly outside the IQR fences.
    pub fn is_outlier(&self, value: f64) -> bool {
        value > self.upper_fence || value < self.lower_fence
    }
}

/// Shapiro-Wilk normality check of a sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NormalityCheck {
    pub w: f64,
    pub p_value: f64,
}

/// Two-sided paired t-test of first-year minus second-year values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PairedComparison {
    pub variable: String,
    pub n: usize,
    pub mean_difference: f64,
    pub sd_difference: f64,
    pub t: f64,
    pub df: f64,
    pub p_value: f64,
    pub normality: NormalityCheck,
}
