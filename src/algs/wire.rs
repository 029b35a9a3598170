//! Fixed little-endian wire records for collective traffic.
//!
//! Plane payloads travel as raw `f64` slices cast with bytemuck (the
//! process group is homogeneous); the small scalar records exchanged by
//! the collectives are pinned to little-endian explicitly.

use bytemuck::{Pod, Zeroable};
use static_assertions::const_assert_eq;

pub fn cast_slice<T: Pod>(v: &[T]) -> &[u8] {
    bytemuck::cast_slice(v)
}

pub fn cast_slice_mut<T: Pod>(v: &mut [T]) -> &mut [u8] {
    bytemuck::cast_slice_mut(v)
}

/// One `f64` on the wire, bit pattern stored little-endian.
#[repr(transparent)]
#[derive(Copy, Clone, Pod, Zeroable)]
pub struct WireScalar {
    bits_le: u64,
}

impl WireScalar {
    pub fn of(value: f64) -> Self {
        Self {
            bits_le: value.to_bits().to_le(),
        }
    }
    pub fn get(&self) -> f64 {
        f64::from_bits(u64::from_le(self.bits_le))
    }
}

const_assert_eq!(std::mem::size_of::<WireScalar>(), 8);
const_assert_eq!(std::mem::align_of::<WireScalar>(), 8);
