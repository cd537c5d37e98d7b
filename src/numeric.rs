//! Numeric primitives for trial aggregation
//!
//! Every function in this module accepts sequences whose elements are either
//! plain `f64` or `Option<f64>` ("number or missing"). Missing and non-finite
//! entries are skipped before any arithmetic. Too little data never raises:
//! results degrade to `None` or to the documented degenerate default.
//!
//! # Dispersion
//!
//! [`sample_std_dev`] uses the **population** formula (divide by `n`) around
//! the mean of the finite values. This is the convention the whole pipeline
//! was calibrated against; it reads lower than the Bessel-corrected (`n − 1`)
//! estimator for small samples (`[1, 2, 3, 4]` → 1.118 rather than 1.291).
//! [`cohens_d`] is the one exception: its pooled deviation weights each
//! group's unbiased variance by `n − 1`, the textbook definition of the
//! effect size.

use serde::{Deserialize, Serialize};

/// Normal-approximation multiplier for a two-sided 95% interval.
pub const Z_95: f64 = 1.96;

/// Parse free-text numeric input.
///
/// The first comma is read as a decimal point (`"1,35"` == `"1.35"`) and
/// leading whitespace is ignored. The longest leading decimal number is
/// taken and anything after it is dropped, so `"1.2 m"` reads as 1.2.
/// Input without a leading number, or whose number is not finite, yields
/// `None`.
///
/// # Example
/// ```
/// use cartlab::numeric::parse_numeric;
///
/// assert_eq!(parse_numeric("1,35"), Some(1.35));
/// assert_eq!(parse_numeric(" 250 "), Some(250.0));
/// assert_eq!(parse_numeric("1.2 m"), Some(1.2));
/// assert_eq!(parse_numeric("inf"), None);
/// assert_eq!(parse_numeric(""), None);
/// ```
pub fn parse_numeric(raw: &str) -> Option<f64> {
    let normalized = raw.replacen(',', ".", 1);
    let prefix = decimal_prefix(normalized.trim_start());
    if prefix.is_empty() {
        return None;
    }
    prefix.parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Longest prefix of the form `[+-]digits[.digits][(e|E)[+-]digits]`
///
/// At least one mantissa digit is required; an exponent marker without
/// digits is not part of the number.
fn decimal_prefix(s: &str) -> &str {
    let bytes = s.as_bytes();
    let digits_from = |start: usize| {
        bytes[start..]
            .iter()
            .take_while(|b| b.is_ascii_digit())
            .count()
    };

    let mut end = 0;
    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end += 1;
    }
    let int_digits = digits_from(end);
    end += int_digits;

    let mut frac_digits = 0;
    if bytes.get(end) == Some(&b'.') {
        frac_digits = digits_from(end + 1);
        if frac_digits > 0 {
            end += 1 + frac_digits;
        }
    }
    if int_digits + frac_digits == 0 {
        return "";
    }

    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exp = end + 1;
        if matches!(bytes.get(exp), Some(b'+' | b'-')) {
            exp += 1;
        }
        let exp_digits = digits_from(exp);
        if exp_digits > 0 {
            end = exp + exp_digits;
        }
    }

    &s[..end]
}

/// Collect the finite values of a number-or-missing sequence, in order
fn finite_values<T>(xs: &[T]) -> Vec<f64>
where
    T: Copy + Into<Option<f64>>,
{
    xs.iter()
        .filter_map(|&x| x.into())
        .filter(|x: &f64| x.is_finite())
        .collect()
}

fn mean_of(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Arithmetic mean of the finite values, `None` if there are none.
pub fn mean<T>(xs: &[T]) -> Option<f64>
where
    T: Copy + Into<Option<f64>>,
{
    mean_of(&finite_values(xs))
}

/// Standard deviation of the finite values (population formula).
///
/// Returns `None` for fewer than two finite values: dispersion of a single
/// observation is undefined, not zero.
pub fn sample_std_dev<T>(xs: &[T]) -> Option<f64>
where
    T: Copy + Into<Option<f64>>,
{
    population_std_dev(&finite_values(xs))
}

fn population_std_dev(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let m = mean_of(values)?;
    let variance = values.iter().map(|x| (x - m).powi(2)).sum::<f64>() / values.len() as f64;
    Some(variance.sqrt())
}

/// Standard error of the mean: `sd / sqrt(n)` over the finite values.
pub fn standard_error<T>(xs: &[T]) -> Option<f64>
where
    T: Copy + Into<Option<f64>>,
{
    let values = finite_values(xs);
    let sd = population_std_dev(&values)?;
    Some(sd / (values.len() as f64).sqrt())
}

/// Closed interval around a sample mean
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceInterval {
    pub low: f64,
    pub high: f64,
}

impl ConfidenceInterval {
    /// Half-width of the interval
    pub fn margin(&self) -> f64 {
        (self.high - self.low) / 2.0
    }

    /// True when both bounds coincide (no standard error was available)
    pub fn is_degenerate(&self) -> bool {
        self.low == self.high
    }
}

/// 95% confidence interval for the mean, `mean ± 1.96 · SE`.
///
/// This is a large-sample normal approximation; no Student-t correction is
/// applied for small `n`. With a single finite value the interval collapses
/// onto the mean. With no finite values there is no mean and the result is
/// `None`.
pub fn confidence_interval_95<T>(xs: &[T]) -> Option<ConfidenceInterval>
where
    T: Copy + Into<Option<f64>>,
{
    confidence_interval(xs, Z_95)
}

/// Confidence interval for the mean with an explicit normal multiplier
pub fn confidence_interval<T>(xs: &[T], z: f64) -> Option<ConfidenceInterval>
where
    T: Copy + Into<Option<f64>>,
{
    let values = finite_values(xs);
    let m = mean_of(&values)?;
    let Some(sd) = population_std_dev(&values) else {
        return Some(ConfidenceInterval { low: m, high: m });
    };
    let margin = z * sd / (values.len() as f64).sqrt();
    Some(ConfidenceInterval {
        low: m - margin,
        high: m + margin,
    })
}

/// A single `(x, y)` observation for regression
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

/// Ordinary least squares fit `y = slope · x + intercept`
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct LinearFit {
    pub slope: f64,
    pub intercept: f64,
    pub r2: f64,
}

/// Simple linear regression over `points`.
///
/// Fewer than two usable points, or points that all share one `x`, produce
/// the degenerate default `slope = 0, intercept = 0, r2 = 0`. When every `y`
/// is equal the fit is exact but explains no variance, so `r2` is 0.
///
/// # Example
/// ```
/// use cartlab::numeric::{linear_regression, Point};
///
/// let fit = linear_regression(&[Point { x: 0.0, y: 0.0 }, Point { x: 1.0, y: 1.0 }]);
/// assert_eq!(fit.slope, 1.0);
/// assert_eq!(fit.intercept, 0.0);
/// assert_eq!(fit.r2, 1.0);
/// ```
pub fn linear_regression(points: &[Point]) -> LinearFit {
    let usable: Vec<Point> = points
        .iter()
        .copied()
        .filter(|p| p.x.is_finite() && p.y.is_finite())
        .collect();
    if usable.len() < 2 {
        return LinearFit::default();
    }

    let n = usable.len() as f64;
    let mean_x = usable.iter().map(|p| p.x).sum::<f64>() / n;
    let mean_y = usable.iter().map(|p| p.y).sum::<f64>() / n;

    let (mut sxx, mut sxy, mut ss_tot) = (0.0, 0.0, 0.0);
    for p in &usable {
        let dx = p.x - mean_x;
        let dy = p.y - mean_y;
        sxx += dx * dx;
        sxy += dx * dy;
        ss_tot += dy * dy;
    }
    if sxx == 0.0 {
        return LinearFit::default();
    }

    let slope = sxy / sxx;
    let intercept = mean_y - slope * mean_x;
    let r2 = if ss_tot == 0.0 {
        0.0
    } else {
        let ss_res: f64 = usable
            .iter()
            .map(|p| (p.y - (intercept + slope * p.x)).powi(2))
            .sum();
        1.0 - ss_res / ss_tot
    };

    LinearFit {
        slope,
        intercept,
        r2,
    }
}

/// Cohen's d of `group_b` relative to `group_a`: `(mean_b − mean_a) / pooled_sd`.
///
/// Returns `None` when either group has fewer than two finite values or when
/// the pooled deviation is zero or non-finite.
pub fn cohens_d<T>(group_a: &[T], group_b: &[T]) -> Option<f64>
where
    T: Copy + Into<Option<f64>>,
{
    let a = finite_values(group_a);
    let b = finite_values(group_b);
    if a.len() < 2 || b.len() < 2 {
        return None;
    }

    let (mean_a, mean_b) = (mean_of(&a)?, mean_of(&b)?);
    let ss_a: f64 = a.iter().map(|x| (x - mean_a).powi(2)).sum();
    let ss_b: f64 = b.iter().map(|x| (x - mean_b).powi(2)).sum();
    let pooled = ((ss_a + ss_b) / (a.len() + b.len() - 2) as f64).sqrt();
    if !pooled.is_finite() || pooled == 0.0 {
        return None;
    }

    let d = (mean_b - mean_a) / pooled;
    d.is_finite().then_some(d)
}
