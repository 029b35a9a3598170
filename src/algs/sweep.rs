//! Checkerboard-colored relaxation passes.
//!
//! Each pass updates one color of the red-black checkerboard: cell
//! `(i, j, k)` belongs to the pass iff `k ≡ (i + j + color) mod 2`,
//! with `i` the *global* row index so the coloring stays consistent
//! across slab boundaries. Within a pass no two updated cells are
//! face-adjacent, so the in-place update never reads a value this pass
//! already rewrote (true Gauss-Seidel ordering for the chosen color).

use crate::data::slab_field::SlabField;

/// The two checkerboard colors, named by the parity of `i + j + k`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Color {
    Even,
    Odd,
}

impl Color {
    /// Both colors, in sweep order.
    pub const BOTH: [Color; 2] = [Color::Even, Color::Odd];

    /// Phase offset added to `i + j` when picking the starting `k`.
    #[inline]
    pub fn offset(self) -> usize {
        match self {
            Color::Even => 0,
            Color::Odd => 1,
        }
    }
}

/// Apply one color's damped Gauss-Seidel update to every owned interior
/// cell; returns the largest absolute correction of the pass.
///
/// The six-neighbor mean pulls the adjacent rows through
/// [`SlabField::stencil_get`], which resolves to the ghost planes at the
/// slab edges; the ghost planes must have been refreshed since the
/// neighbors' rows last changed.
pub fn sweep_color(field: &mut SlabField<f64>, color: Color, relaxation: f64) -> f64 {
    let n = field.extent();
    let mut local_max = 0.0f64;
    for i in field.rows() {
        for j in 1..=n - 2 {
            let k0 = 1 + (i + j + color.offset()) % 2;
            for k in (k0..=n - 2).step_by(2) {
                let mean = (field.stencil_get(i - 1, j, k)
                    + field.stencil_get(i + 1, j, k)
                    + field.get(i, j - 1, k)
                    + field.get(i, j + 1, k)
                    + field.get(i, j, k - 1)
                    + field.get(i, j, k + 1))
                    / 6.0;
                let correction = relaxation * (mean - field.get(i, j, k));
                local_max = local_max.max(correction.abs());
                field.set(i, j, k, field.get(i, j, k) + correction);
            }
        }
    }
    local_max
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::problem::init_field;
    use crate::topology::slab::SlabPartition;
    use itertools::iproduct;

    fn initialized_field(extent: usize) -> SlabField<f64> {
        let p = SlabPartition::new(extent, 1, 0).unwrap();
        let mut f = SlabField::zeroed(&p);
        init_field(&mut f);
        f
    }

    /// The coloring predicate, spelled out cell-wise for cross-checking
    /// the strided loop.
    fn in_color(i: usize, j: usize, k: usize, color: Color) -> bool {
        k % 2 == (i + j + color.offset() + 1) % 2
    }

    #[test]
    fn colored_cells_are_never_face_adjacent() {
        let n = 8;
        let offsets: [(isize, isize, isize); 6] = [
            (-1, 0, 0),
            (1, 0, 0),
            (0, -1, 0),
            (0, 1, 0),
            (0, 0, -1),
            (0, 0, 1),
        ];
        for color in Color::BOTH {
            for (i, j, k) in iproduct!(1..n - 1, 1..n - 1, 1..n - 1) {
                if !in_color(i, j, k, color) {
                    continue;
                }
                for (di, dj, dk) in offsets {
                    let (ni, nj, nk) = (
                        (i as isize + di) as usize,
                        (j as isize + dj) as usize,
                        (k as isize + dk) as usize,
                    );
                    assert!(
                        !in_color(ni, nj, nk, color),
                        "face neighbors ({i},{j},{k}) and ({ni},{nj},{nk}) share color {color:?}"
                    );
                }
            }
        }
    }

    #[test]
    fn strided_loop_visits_exactly_the_colored_cells() {
        // Mark every visited cell and compare with the predicate.
        let n = 7;
        for color in Color::BOTH {
            let mut visited = vec![false; n * n * n];
            for i in 1..=n - 2 {
                for j in 1..=n - 2 {
                    let k0 = 1 + (i + j + color.offset()) % 2;
                    for k in (k0..=n - 2).step_by(2) {
                        visited[(i * n + j) * n + k] = true;
                    }
                }
            }
            for (i, j, k) in iproduct!(1..n - 1, 1..n - 1, 1..n - 1) {
                assert_eq!(
                    visited[(i * n + j) * n + k],
                    in_color(i, j, k, color),
                    "cell ({i},{j},{k}) color {color:?}"
                );
            }
        }
    }

    #[test]
    fn boundary_cells_stay_zero_after_sweeps() {
        let n = 10;
        let mut field = initialized_field(n);
        for _ in 0..3 {
            for color in Color::BOTH {
                sweep_color(&mut field, color, 0.5);
            }
        }
        for (i, j, k) in iproduct!(field.rows(), 0..n, 0..n) {
            if j == 0 || j == n - 1 || k == 0 || k == n - 1 {
                assert_eq!(field.get(i, j, k), 0.0, "face cell ({i},{j},{k}) moved");
            }
        }
    }

    #[test]
    fn single_cell_update_matches_the_formula() {
        // 3x3x3 grid: one interior cell, updated by the odd pass
        // (i = j = k = 1 has i + j + k odd... the even pass starts at
        // k0 = 1 + (1+1)%2 = 1, so Color::Even covers it).
        let p = SlabPartition::new(3, 1, 0).unwrap();
        let mut f = SlabField::zeroed(&p);
        f.set(1, 1, 1, 12.0);
        let eps = sweep_color(&mut f, Color::Even, 0.5);
        // All six neighbors are zero: correction = 0.5 * (0 - 12).
        assert_eq!(f.get(1, 1, 1), 6.0);
        assert_eq!(eps, 6.0);
        // The odd pass touches nothing on this grid.
        let eps = sweep_color(&mut f, Color::Odd, 0.5);
        assert_eq!(eps, 0.0);
        assert_eq!(f.get(1, 1, 1), 6.0);
    }
}
