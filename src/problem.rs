//! Grid initialization and the verification checksum.
//!
//! Both are simple deterministic loops with no coordination logic: the
//! initializer covers exactly the owned slab, and the checksum runs
//! once on the coordinating rank over the gathered grid.

use itertools::iproduct;

use crate::data::slab_field::SlabField;
use crate::error::RelaxError;

/// Fill the owned slab: zero on the `j`/`k` faces, `4 + i + j + k`
/// everywhere else. The primary-axis face rows 0 and `extent - 1` are
/// never owned, so they stay at their zeroed Dirichlet state.
pub fn init_field(field: &mut SlabField<f64>) {
    let n = field.extent();
    for (i, j, k) in iproduct!(field.rows(), 0..n, 0..n) {
        let value = if j == 0 || j == n - 1 || k == 0 || k == n - 1 {
            0.0
        } else {
            (4 + i + j + k) as f64
        };
        field.set(i, j, k, value);
    }
}

/// Weighted checksum over the fully assembled grid:
/// `Σ value(i,j,k) · (i+1)(j+1)(k+1) / extent³`.
///
/// # Errors
/// [`RelaxError::GatherMismatch`] if `cells` is not a full
/// `extent³` grid.
pub fn weighted_checksum(cells: &[f64], extent: usize) -> Result<f64, RelaxError> {
    let expected = extent * extent * extent;
    if cells.len() != expected {
        return Err(RelaxError::GatherMismatch {
            expected,
            got: cells.len(),
        });
    }
    let scale = expected as f64;
    let mut sum = 0.0;
    for (i, j, k) in iproduct!(0..extent, 0..extent, 0..extent) {
        let weight = ((i + 1) * (j + 1) * (k + 1)) as f64;
        sum += cells[(i * extent + j) * extent + k] * weight / scale;
    }
    Ok(sum)
}
