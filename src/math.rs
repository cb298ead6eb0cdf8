//! Math utilities.

use crate::constants::SQRT_2;
use special::Error;

/// Floating-point precision to use for integration.
#[allow(non_camel_case_types)]
pub type fin = f64;

/// Romberg integrator refining midpoint or trapezoid sums and
/// extrapolating the step length to zero.
#[derive(Clone, Debug)]
pub struct Integrator {
    order: usize,
    max_stages: usize,
    precision: fin,
}

impl Integrator {
    /// Number of refinement stages entering each extrapolation.
    pub const DEFAULT_ORDER: usize = 5;
    /// Maximum number of refinement stages before giving up.
    pub const DEFAULT_MAX_STAGES: usize = 14;
    /// Relative precision at which refinement stops.
    pub const DEFAULT_PRECISION: fin = 1e-6;

    pub fn new(order: usize, max_stages: usize, precision: fin) -> Self {
        assert!(
            order >= 2,
            "Extrapolation order {} must be at least two",
            order
        );
        assert!(
            max_stages >= order,
            "Stage budget {} is smaller than the extrapolation order {}",
            max_stages,
            order
        );
        assert!(precision > 0.0, "Precision {:?} must be positive", precision);
        Self {
            order,
            max_stages,
            precision,
        }
    }

    /// Estimates the integral of the given function over the closed
    /// interval `[start, end]` by refining trapezoid sums, evaluating
    /// the integrand at both endpoints.
    pub fn integrate_closed<E>(&self, evaluate_integrand: E, start: fin, end: fin) -> fin
    where
        E: Fn(fin) -> fin,
    {
        assert!(
            end >= start,
            "Interval end {:?} is smaller than interval start {:?}",
            end,
            start
        );
        if start == end {
            return 0.0;
        }
        let mut steps = Vec::with_capacity(self.max_stages);
        let mut estimates = Vec::with_capacity(self.max_stages);
        let mut step = 1.0;
        let mut stage_sum = 0.0;
        let mut added_points: usize = 1;
        for stage in 0..self.max_stages {
            if stage == 0 {
                stage_sum =
                    0.5 * (end - start) * (evaluate_integrand(start) + evaluate_integrand(end));
            } else {
                let spacing = (end - start) / (added_points as fin);
                let mut x = start + 0.5 * spacing;
                let mut sum = 0.0;
                for _ in 0..added_points {
                    sum += evaluate_integrand(x);
                    x += spacing;
                }
                stage_sum = 0.5 * (stage_sum + (end - start) * sum / (added_points as fin));
                added_points *= 2;
            }
            steps.push(step);
            estimates.push(stage_sum);
            if let Some(result) = self.try_extrapolate(&steps, &estimates) {
                return result;
            }
            // Halving the spacing divides the truncation error by four.
            step /= 4.0;
        }
        self.best_estimate(&steps, &estimates)
    }

    /// Estimates the integral of the given function over the open
    /// interval `(start, end)` by refining midpoint sums, never
    /// evaluating the integrand at the endpoints.
    pub fn integrate_opened<E>(&self, evaluate_integrand: E, start: fin, end: fin) -> fin
    where
        E: Fn(fin) -> fin,
    {
        assert!(
            end >= start,
            "Interval end {:?} is smaller than interval start {:?}",
            end,
            start
        );
        if start == end {
            return 0.0;
        }
        let mut steps = Vec::with_capacity(self.max_stages);
        let mut estimates = Vec::with_capacity(self.max_stages);
        let mut step = 1.0;
        let mut stage_sum = 0.0;
        let mut added_pairs: usize = 1;
        for stage in 0..self.max_stages {
            if stage == 0 {
                stage_sum = (end - start) * evaluate_integrand(0.5 * (start + end));
            } else {
                let spacing = (end - start) / (3.0 * added_pairs as fin);
                let mut x = start + 0.5 * spacing;
                let mut sum = 0.0;
                for _ in 0..added_pairs {
                    sum += evaluate_integrand(x);
                    x += 2.0 * spacing;
                    sum += evaluate_integrand(x);
                    x += spacing;
                }
                stage_sum = (stage_sum + (end - start) * sum / (added_pairs as fin)) / 3.0;
                added_pairs *= 3;
            }
            steps.push(step);
            estimates.push(stage_sum);
            if let Some(result) = self.try_extrapolate(&steps, &estimates) {
                return result;
            }
            // Tripling the point count divides the truncation error by nine.
            step /= 9.0;
        }
        self.best_estimate(&steps, &estimates)
    }

    /// Estimates the integral of the given function over `[start, end]`
    /// with both bounds positive, using the substitution `x = exp(u)`
    /// to resolve integrands varying over many orders of magnitude.
    pub fn integrate_with_log<E>(&self, evaluate_integrand: E, start: fin, end: fin) -> fin
    where
        E: Fn(fin) -> fin,
    {
        assert!(
            start > 0.0 && end > 0.0,
            "Logarithmic substitution requires positive bounds, got [{:?}, {:?}]",
            start,
            end
        );
        self.integrate_opened(
            |u: fin| {
                let x = fin::exp(u);
                x * evaluate_integrand(x)
            },
            fin::ln(start),
            fin::ln(end),
        )
    }

    /// Estimates the integral of the given function from positive
    /// `start` to infinity, using the substitution `t = 1/x`.
    pub fn integrate_to_infinity<E>(&self, evaluate_integrand: E, start: fin) -> fin
    where
        E: Fn(fin) -> fin,
    {
        assert!(
            start > 0.0,
            "Integration to infinity requires a positive lower bound, got {:?}",
            start
        );
        self.integrate_opened(
            |t: fin| evaluate_integrand(1.0 / t) / (t * t),
            0.0,
            1.0 / start,
        )
    }

    fn try_extrapolate(&self, steps: &[fin], estimates: &[fin]) -> Option<fin> {
        if estimates.len() < self.order {
            return None;
        }
        let window = estimates.len() - self.order;
        let (result, correction) = extrapolate_to_zero(&steps[window..], &estimates[window..]);
        if correction.abs() <= self.precision * result.abs() {
            Some(result)
        } else {
            None
        }
    }

    fn best_estimate(&self, steps: &[fin], estimates: &[fin]) -> fin {
        let window = estimates.len() - self.order;
        extrapolate_to_zero(&steps[window..], &estimates[window..]).0
    }
}

impl Default for Integrator {
    fn default() -> Self {
        Self::new(
            Self::DEFAULT_ORDER,
            Self::DEFAULT_MAX_STAGES,
            Self::DEFAULT_PRECISION,
        )
    }
}

/// Evaluates the polynomial through `(steps[i], estimates[i])` at step
/// zero with Neville's algorithm, returning the extrapolated value and
/// the final correction term.
///
/// The step lengths must be distinct and in decreasing order.
fn extrapolate_to_zero(steps: &[fin], estimates: &[fin]) -> (fin, fin) {
    let n = estimates.len();
    let mut vals_c = estimates.to_vec();
    let mut vals_d = estimates.to_vec();
    let mut result = vals_d[n - 1];
    let mut correction = 0.0;
    for column in 1..n {
        for i in 0..(n - column) {
            let weight = (vals_c[i + 1] - vals_d[i]) / (steps[i] - steps[i + column]);
            vals_c[i] = steps[i] * weight;
            vals_d[i] = steps[i + column] * weight;
        }
        correction = vals_d[n - 1 - column];
        result += correction;
    }
    (result, correction)
}

/// Finds the argument in `[start, end]` where the given monotone
/// function crosses `target`, by bisection to the given absolute
/// tolerance.
pub fn invert_monotone<E>(function: E, start: fin, end: fin, target: fin, tolerance: fin) -> fin
where
    E: Fn(fin) -> fin,
{
    assert!(
        end >= start,
        "Interval end {:?} is smaller than interval start {:?}",
        end,
        start
    );
    assert!(tolerance > 0.0, "Tolerance {:?} must be positive", tolerance);
    let increasing = function(start) <= function(end);
    let mut lower = start;
    let mut upper = end;
    while upper - lower > tolerance {
        let midpoint = 0.5 * (lower + upper);
        let above = if increasing {
            function(midpoint) >= target
        } else {
            function(midpoint) <= target
        };
        if above {
            upper = midpoint;
        } else {
            lower = midpoint;
        }
    }
    0.5 * (lower + upper)
}

/// Evaluates the cumulative distribution function of the standard
/// normal distribution.
pub fn normal_cdf(x: fin) -> fin {
    0.5 * (1.0 + fin::error(x / SQRT_2))
}

/// Evaluates the quantile function of the standard normal distribution
/// for probabilities in `(0, 1)`.
pub fn normal_quantile(probability: fin) -> fin {
    SQRT_2 * fin::inv_error(2.0 * probability - 1.0)
}
