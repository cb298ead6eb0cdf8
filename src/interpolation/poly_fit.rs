//! Interpolation by polynomial and rational fitting.

use super::fit;

/// Largest supported number of interpolation points in a window.
pub const MAX_POINTS: usize = 8;

/// Determines the start index of an interpolation window of `points`
/// nodes around the node interval with the given index, shifting the
/// window where necessary so that it lies fully inside the axis.
pub fn window_start(cell: usize, points: usize, num_nodes: usize) -> usize {
    debug_assert!(points <= num_nodes);
    let start = (cell as isize) + 1 - ((points + 1) as isize) / 2;
    start.clamp(0, (num_nodes - points) as isize) as usize
}

/// Evaluates the polynomial through the given window nodes at `x`
/// using Neville's algorithm.
pub fn interp_polynomial(coords: &[fit], values: &[fit], x: fit) -> fit {
    let points = coords.len();
    debug_assert!(points == values.len() && points <= MAX_POINTS);

    let mut vals_c = [0.0; MAX_POINTS];
    let mut vals_d = [0.0; MAX_POINTS];
    vals_c[..points].copy_from_slice(values);
    vals_d[..points].copy_from_slice(values);

    let mut accum = vals_c[0];

    for n in 1..points {
        for i in 0..(points - n) {
            let correction = (vals_c[i + 1] - vals_d[i]) / (coords[i + n] - coords[i]);
            vals_c[i] = (x - coords[i]) * correction;
            vals_d[i] = (x - coords[i + n]) * correction;
        }
        accum += vals_c[0];
    }

    accum
}

/// Evaluates the diagonal rational function through the given window
/// nodes at `x`.
///
/// Falls back to polynomial interpolation if the rational function has
/// a pole at `x`.
pub fn interp_rational(coords: &[fit], values: &[fit], x: fit) -> fit {
    const TINY: fit = 1e-25;

    let points = coords.len();
    debug_assert!(points == values.len() && points <= MAX_POINTS);

    let mut vals_c = [0.0; MAX_POINTS];
    let mut vals_d = [0.0; MAX_POINTS];
    let mut nearest = 0;
    let mut nearest_distance = fit::abs(x - coords[0]);

    for i in 0..points {
        let distance = fit::abs(x - coords[i]);
        if distance == 0.0 {
            return values[i];
        }
        if distance < nearest_distance {
            nearest = i;
            nearest_distance = distance;
        }
        vals_c[i] = values[i];
        // The offset protects against a zero-over-zero condition.
        vals_d[i] = values[i] + TINY;
    }

    let mut accum = values[nearest];
    let mut position = (nearest as isize) - 1;

    for n in 1..points {
        for i in 0..(points - n) {
            let weight = vals_c[i + 1] - vals_d[i];
            let offset = (coords[i] - x) * vals_d[i] / (coords[i + n] - x);
            let denominator = offset - vals_c[i + 1];
            if denominator == 0.0 {
                return interp_polynomial(coords, values, x);
            }
            let scaled = weight / denominator;
            vals_d[i] = vals_c[i + 1] * scaled;
            vals_c[i] = offset * scaled;
        }
        let correction = if 2 * (position + 1) < (points - n) as isize {
            vals_c[(position + 1) as usize]
        } else {
            let value = vals_d[position as usize];
            position -= 1;
            value
        };
        accum += correction;
    }

    accum
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn window_stays_inside_the_axis() {
        assert_eq!(window_start(0, 4, 10), 0);
        assert_eq!(window_start(1, 4, 10), 0);
        assert_eq!(window_start(4, 4, 10), 3);
        assert_eq!(window_start(8, 4, 10), 6);
        assert_eq!(window_start(9, 4, 10), 6);
    }

    #[test]
    fn polynomial_fit_is_exact_for_matching_degree() {
        let coords = [0.0, 1.0, 2.0, 3.0];
        let values = coords.map(|x| 2.0 * x * x * x - x + 4.0);
        for &x in &[0.5, 1.3, 2.9] {
            assert_relative_eq!(
                interp_polynomial(&coords, &values, x),
                2.0 * x * x * x - x + 4.0,
                max_relative = 1e-12
            );
        }
    }

    #[test]
    fn polynomial_fit_passes_through_the_nodes() {
        let coords = [1.0, 2.0, 4.0, 8.0, 16.0];
        let values = [3.0, -1.0, 0.5, 2.5, -4.0];
        for i in 0..coords.len() {
            assert_relative_eq!(
                interp_polynomial(&coords, &values, coords[i]),
                values[i],
                max_relative = 1e-12
            );
        }
    }

    #[test]
    fn rational_fit_is_exact_for_simple_rational_function() {
        let evaluate = |x: fit| (x + 2.0) / (x * x + 1.0);
        let coords = [0.0, 0.5, 1.0, 1.5, 2.0];
        let values = coords.map(evaluate);
        for &x in &[0.25, 0.8, 1.9] {
            assert_relative_eq!(
                interp_rational(&coords, &values, x),
                evaluate(x),
                max_relative = 1e-10
            );
        }
    }

    #[test]
    fn rational_fit_returns_node_value_at_a_node() {
        let coords = [0.0, 1.0, 2.0, 3.0];
        let values = [1.0, 0.5, 0.2, 0.1];
        assert_eq!(interp_rational(&coords, &values, 2.0), 0.2);
    }
}
