//! Find the voxels traversed by a ray, and the length of the ray inside each
//! of them.
//!
//! The algorithm is centred around two key simplifications:
//!
//! 1. Work in voxel units with voxel centres on integer coordinates. The
//!    boundary between two voxels along any axis is then half a voxel away
//!    from the current index, on the side towards which the ray is moving,
//!    and the parameter at which the ray reaches it is a single division.
//!
//! 2. Never let a direction component be exactly zero: it is replaced by
//!    `EPS`. Rays parallel to an axis then cross the boundaries of that axis
//!    absurdly far away, and are traced by the same arithmetic as every other
//!    ray.
//!
//! Points on the ray are `p1 + alpha * d`. All comparisons between parameters
//! are made with the tolerance `EPS`: when the ray reaches the boundaries of
//! several axes at once (edges and corners), the index moves along all of
//! them in the same step.

use geometry::Vector3;

use crate::types::{EPS, Index3, Weight};
use crate::volume::VoxelVolume;

/// Inclusive range of logical voxel indices. The geometric box extends half
/// a voxel beyond the centres of the outermost voxels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VoxelBox {
    pub lowest : Index3,
    pub highest: Index3,
}

impl VoxelBox {

    pub fn new(lowest: Index3, highest: Index3) -> Self { Self { lowest, highest } }

    #[inline]
    pub fn contains(&self, i: Index3) -> bool {
        (0..3).all(|d| self.lowest[d] <= i[d] && i[d] <= self.highest[d])
    }

    /// Force index `i` into the box, axis by axis
    #[inline]
    pub fn clip(&self, i: Index3) -> Index3 {
        let mut out = i;
        for d in 0..3 { out[d] = i[d].clamp(self.lowest[d], self.highest[d]) }
        out
    }
}

/// A ray in voxel coordinates. Construction replaces zero direction
/// components by `EPS`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Ray {
    pub origin   : Vector3,
    pub direction: Vector3,
}

impl Ray {
    pub fn new(origin: Vector3, direction: Vector3) -> Self {
        Self { origin, direction: direction.map(|c| if c == 0.0 { EPS } else { c }) }
    }

    #[inline]
    pub fn at(&self, alpha: f64) -> Vector3 { self.origin + self.direction * alpha }

    /// +1 or -1 per axis: the direction in which indices move along the ray
    #[inline]
    fn signs(&self) -> [i32; 3] {
        let s = |c: f64| if c > 0.0 { 1 } else { -1 };
        [s(self.direction.x), s(self.direction.y), s(self.direction.z)]
    }
}

/// The parameter interval `[alpha_min, alpha_max]` over which `ray` lies
/// inside `vbox`, found by intersecting the three slabs of the box.
///
/// `None` if the ray misses the box, or only grazes it (the interval is
/// shorter than `EPS`).
pub fn intersect(ray: &Ray, vbox: &VoxelBox) -> Option<(f64, f64)> {
    let mut alpha_min = f64::NEG_INFINITY;
    let mut alpha_max = f64::INFINITY;
    for d in 0..3 {
        let near = (vbox.lowest [d] as f64 - 0.5 - ray.origin[d]) / ray.direction[d];
        let far  = (vbox.highest[d] as f64 + 0.5 - ray.origin[d]) / ray.direction[d];
        alpha_min = alpha_min.max(near.min(far));
        alpha_max = alpha_max.min(near.max(far));
    }
    if alpha_max - alpha_min < EPS { None }
    else                           { Some((alpha_min, alpha_max)) }
}

/// An iterator which yields the logical indices of the voxels traversed by a
/// ray, along with the length of the ray inside each of them.
///
/// The lengths yielded along one ray add up to the length of the ray inside
/// the box.
#[derive(Clone, Debug)]
pub enum WalkAlongRay {

    // Not inside the box: either the ray missed it, or we have come out of
    // the other side. Nothing more to yield.
    Outside,

    Inside {
        ray: Ray,
        vbox: VoxelBox,

        // Voxel we are about to cross
        index: Index3,

        // Direction in which the index moves along each axis
        sign: [i32; 3],

        // How far along the ray we are, and where it leaves the box
        alpha: f64,
        alpha_max: f64,
    },
}

impl WalkAlongRay {
    pub fn new(ray: &Ray, vbox: VoxelBox) -> Self {
        let Some((alpha_min, alpha_max)) = intersect(ray, &vbox) else { return Self::Outside };

        // First voxel: the one nearest to the entry point. Floating-point
        // error can put the entry point a hair outside, so clip.
        let entry = ray.at(alpha_min);
        let index = vbox.clip([entry.x.round() as i32, entry.y.round() as i32, entry.z.round() as i32]);

        Self::Inside { ray: *ray, vbox, index, sign: ray.signs(), alpha: alpha_min, alpha_max }
    }
}

impl Iterator for WalkAlongRay {

    type Item = (Index3, Weight);

    fn next(&mut self) -> Option<Self::Item> {
        match self {
            Self::Outside => None,

            Self::Inside { ray, vbox, index, sign, alpha, alpha_max } => {
                let crossed = *index;

                // Parameter at which the ray crosses into the next voxel,
                // along each axis, and how far away that is
                let mut boundary = [0.0; 3];
                let mut distance = [0.0; 3];
                for d in 0..3 {
                    boundary[d] = (index[d] as f64 + 0.5 * sign[d] as f64 - ray.origin[d]) / ray.direction[d];
                    distance[d] = (*alpha - boundary[d]).abs();
                }

                // The nearest boundary limits the length inside this voxel
                let step = distance[0].min(distance[1]).min(distance[2]);

                // Cross every boundary which is reached in this step
                let mut left_box = false;
                for d in 0..3 {
                    if (step - distance[d]).abs() <= EPS {
                        *alpha = boundary[d];
                        index[d] += sign[d];
                        left_box |= !(vbox.lowest[d]..=vbox.highest[d]).contains(&index[d]);
                    }
                }

                if left_box || *alpha_max - *alpha <= EPS {
                    *self = Self::Outside;
                }

                Some((crossed, step))
            }
        }
    }
}

/// Sum of the volume's values along `ray`, each weighted by the length of
/// the ray inside its voxel.
#[inline]
pub fn line_integral(volume: &VoxelVolume, ray: &Ray) -> f64 {
    WalkAlongRay::new(ray, volume.bounding_box())
        .map(|(index, length)| length * volume[index])
        .sum()
}
