//! Construction and evaluation of interpolation tables.

pub mod cache;
pub mod poly_fit;

use ndarray::prelude::*;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use self::cache::hash_combine;
use self::poly_fit::{interp_polynomial, interp_rational, window_start, MAX_POINTS};

/// Floating-point precision to use for interpolation tables.
#[allow(non_camel_case_types)]
pub type fit = f64;

/// Values at or below this floor are clipped before taking the
/// logarithm of stored table values.
const LOG_VALUE_FLOOR: fit = 1e-300;

/// Fraction of the (transformed) axis span used as the bisection
/// tolerance when inverting a table.
const INVERSION_TOLERANCE: fit = 1e-12;

/// Placement of table nodes along one table dimension.
///
/// Nodes are spaced uniformly either in the coordinate itself or in
/// its natural logarithm.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Axis {
    min: fit,
    max: fit,
    num_nodes: usize,
    order: usize,
    log_scale: bool,
    rational_fit: bool,
}

impl Axis {
    /// Order of interpolation between table nodes.
    pub const DEFAULT_ORDER: usize = 5;

    /// Creates an axis with nodes spaced uniformly in the coordinate.
    pub fn linear(min: fit, max: fit, num_nodes: usize) -> Self {
        Self {
            min,
            max,
            num_nodes,
            order: Self::DEFAULT_ORDER,
            log_scale: false,
            rational_fit: false,
        }
    }

    /// Creates an axis with nodes spaced uniformly in the natural
    /// logarithm of the coordinate.
    pub fn log(min: fit, max: fit, num_nodes: usize) -> Self {
        Self {
            log_scale: true,
            ..Self::linear(min, max, num_nodes)
        }
    }

    /// Changes the interpolation order between table nodes.
    pub fn with_order(mut self, order: usize) -> Self {
        self.order = order;
        self
    }

    /// Switches window evaluation to a diagonal rational function fit.
    pub fn with_rational_fit(mut self) -> Self {
        self.rational_fit = true;
        self
    }

    /// Panics if any axis parameter is invalid.
    pub fn validate(&self) {
        assert!(
            self.min < self.max,
            "Axis lower bound {:?} is not smaller than upper bound {:?}",
            self.min,
            self.max
        );
        if self.log_scale {
            assert!(
                self.min > 0.0,
                "Logarithmic axis requires a positive lower bound, got {:?}",
                self.min
            );
        }
        assert!(self.order >= 1, "Interpolation order must be at least one");
        assert!(
            self.points() <= MAX_POINTS,
            "Interpolation order {} exceeds the largest supported window",
            self.order
        );
        assert!(
            self.num_nodes >= self.points(),
            "Axis has {} nodes but the interpolation window needs {}",
            self.num_nodes,
            self.points()
        );
    }

    pub fn min(&self) -> fit {
        self.min
    }

    pub fn max(&self) -> fit {
        self.max
    }

    pub fn num_nodes(&self) -> usize {
        self.num_nodes
    }

    /// Number of nodes in the interpolation window.
    pub fn points(&self) -> usize {
        self.order + 1
    }

    /// Maps a coordinate to the transformed space the nodes are
    /// uniform in.
    pub fn transform(&self, coord: fit) -> fit {
        if self.log_scale {
            fit::ln(coord)
        } else {
            coord
        }
    }

    /// Maps a transformed coordinate back to the original space.
    pub fn untransform(&self, transformed: fit) -> fit {
        if self.log_scale {
            fit::exp(transformed)
        } else {
            transformed
        }
    }

    /// Returns the coordinate of the node with the given index.
    pub fn node(&self, idx: usize) -> fit {
        self.untransform(self.transformed_node(idx))
    }

    fn transformed_node(&self, idx: usize) -> fit {
        self.transform(self.min) + (idx as fit) * self.step()
    }

    fn step(&self) -> fit {
        (self.transform(self.max) - self.transform(self.min)) / ((self.num_nodes - 1) as fit)
    }

    /// Returns the index of the node interval containing the given
    /// transformed coordinate, clamped to the interior of the axis.
    fn cell(&self, transformed: fit) -> usize {
        let raw = fit::floor((transformed - self.transform(self.min)) / self.step()) as isize;
        raw.clamp(0, (self.num_nodes - 2) as isize) as usize
    }

    /// Folds every parameter determining node placement into the given
    /// hash state.
    pub fn hash_into(&self, state: &mut u64) {
        hash_combine(state, self.min.to_bits());
        hash_combine(state, self.max.to_bits());
        hash_combine(state, self.num_nodes as u64);
        hash_combine(state, self.order as u64);
        hash_combine(state, self.log_scale as u64);
        hash_combine(state, self.rational_fit as u64);
    }
}

/// One-dimensional interpolation table.
///
/// The table stores the logarithm of the tabulated function when
/// `log_values` is set, which keeps the local fit accurate for
/// functions spanning many orders of magnitude.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Interpolant1 {
    axis: Axis,
    values: Array1<fit>,
    log_values: bool,
}

impl Interpolant1 {
    /// Builds the table by evaluating the given function at every
    /// axis node, in parallel.
    pub fn build<E>(axis: Axis, log_values: bool, evaluate_value: E) -> Self
    where
        E: Fn(fit) -> fit + Sync + Send,
    {
        axis.validate();
        let values: Vec<fit> = (0..axis.num_nodes())
            .into_par_iter()
            .map(|idx| {
                let value = evaluate_value(axis.node(idx));
                if log_values {
                    fit::ln(fit::max(value, LOG_VALUE_FLOOR))
                } else {
                    value
                }
            })
            .collect();
        Self {
            axis,
            values: Array1::from_vec(values),
            log_values,
        }
    }

    pub fn axis(&self) -> &Axis {
        &self.axis
    }

    /// Computes the interpolated value of the tabulated function at
    /// the given coordinate.
    ///
    /// Coordinates outside the axis are extrapolated with the nearest
    /// boundary window.
    pub fn evaluate(&self, coord: fit) -> fit {
        let raw = self.evaluate_transformed(self.axis.transform(coord));
        if self.log_values {
            fit::exp(raw)
        } else {
            raw
        }
    }

    /// Computes the interpolated raw table value (the logarithm of the
    /// function when `log_values` is set) at a transformed coordinate.
    fn evaluate_transformed(&self, transformed: fit) -> fit {
        let points = self.axis.points();
        let start = window_start(self.axis.cell(transformed), points, self.axis.num_nodes());
        let mut coords = [0.0; MAX_POINTS];
        let mut values = [0.0; MAX_POINTS];
        for offset in 0..points {
            coords[offset] = self.axis.transformed_node(start + offset);
            values[offset] = self.values[start + offset];
        }
        if self.axis.rational_fit {
            interp_rational(&coords[..points], &values[..points], transformed)
        } else {
            interp_polynomial(&coords[..points], &values[..points], transformed)
        }
    }

    /// Finds the coordinate where the tabulated function crosses the
    /// given target, assuming the table is monotone along its axis.
    ///
    /// Returns `None` if the target lies outside the tabulated range.
    pub fn invert(&self, target: fit) -> Option<fit> {
        let raw_target = if self.log_values {
            if target <= 0.0 {
                return None;
            }
            fit::ln(target)
        } else {
            target
        };
        let lower = self.axis.transform(self.axis.min());
        let upper = self.axis.transform(self.axis.max());
        let at_lower = self.evaluate_transformed(lower);
        let at_upper = self.evaluate_transformed(upper);
        if raw_target < fit::min(at_lower, at_upper) || raw_target > fit::max(at_lower, at_upper) {
            return None;
        }
        let tolerance = (upper - lower) * INVERSION_TOLERANCE;
        let transformed = crate::math::invert_monotone(
            |t| self.evaluate_transformed(t),
            lower,
            upper,
            raw_target,
            tolerance,
        );
        Some(self.axis.untransform(transformed))
    }
}

/// Two-dimensional interpolation table, stored as a family of
/// one-dimensional tables over the second axis.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Interpolant2 {
    axis: Axis,
    rows: Vec<Interpolant1>,
    log_values: bool,
}

impl Interpolant2 {
    /// Builds the table by evaluating the given function on the node
    /// grid spanned by the two axes, parallelizing over the first
    /// axis.
    pub fn build<E>(axis_x: Axis, axis_y: Axis, log_values: bool, evaluate_value: E) -> Self
    where
        E: Fn(fit, fit) -> fit + Sync + Send,
    {
        axis_x.validate();
        axis_y.validate();
        let rows: Vec<Interpolant1> = (0..axis_x.num_nodes())
            .into_par_iter()
            .map(|idx| {
                let x = axis_x.node(idx);
                Interpolant1::build(axis_y.clone(), log_values, |y| evaluate_value(x, y))
            })
            .collect();
        Self {
            axis: axis_x,
            rows,
            log_values,
        }
    }

    pub fn axis_x(&self) -> &Axis {
        &self.axis
    }

    pub fn axis_y(&self) -> &Axis {
        self.rows[0].axis()
    }

    /// Computes the interpolated value of the tabulated function at
    /// the given coordinate pair.
    pub fn evaluate(&self, x: fit, y: fit) -> fit {
        let transformed_x = self.axis.transform(x);
        let transformed_y = self.axis_y().transform(y);
        let points = self.axis.points();
        let start = window_start(self.axis.cell(transformed_x), points, self.axis.num_nodes());
        let mut coords = [0.0; MAX_POINTS];
        let mut values = [0.0; MAX_POINTS];
        for offset in 0..points {
            coords[offset] = self.axis.transformed_node(start + offset);
            values[offset] = self.rows[start + offset].evaluate_transformed(transformed_y);
        }
        let raw = if self.axis.rational_fit {
            interp_rational(&coords[..points], &values[..points], transformed_x)
        } else {
            interp_polynomial(&coords[..points], &values[..points], transformed_x)
        };
        if self.log_values {
            fit::exp(raw)
        } else {
            raw
        }
    }
}
