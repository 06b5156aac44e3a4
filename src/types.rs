pub type Intensity = f64;
pub type Weight    = f64;

/// Logical voxel index, in `[x, y, z]` order. Logical indices may be negative:
/// volumes are usually addressed relative to their centre.
pub type Index3 = [i32; 3];

/// Tolerance used by every comparison in the ray tracer. It also stands in
/// for direction components which are exactly zero, so that rays parallel to
/// an axis can be traced with the same arithmetic as any other ray.
pub const EPS: f64 = 1e-6;

/// Logical index of the first element along an axis of `size` elements, when
/// the logical origin sits at the centre of that axis.
#[inline]
pub fn first_centred_index(size: usize) -> i32 { -((size / 2) as i32) }
