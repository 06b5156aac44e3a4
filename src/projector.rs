//! Forward projection of voxel volumes, and its simplest adjoint.
//!
//! Every projection pixel `(i, j)` sits at the in-plane point `(x=j, y=i)` of
//! a plane through the universal origin. Rays leave the plane along the
//! projection direction; their line integrals through the volume are
//! computed by the walker in `siddon`.

use geometry::{EulerAngles, Vector2, plane_to_universe};
use ndarray::Zip;

use crate::projection::Projection;
use crate::siddon::{Ray, WalkAlongRay, line_integral};
use crate::volume::VoxelVolume;

/// Offset, in pixels, of the four supersampling rays from the pixel centre
pub const SUBPIXEL_STEP: f64 = 1.0 / 3.0;

/// In-plane `(x, y)` offsets of the rays averaged into each pixel
const SUBRAYS: [(f64, f64); 4] = [
    (-SUBPIXEL_STEP, -SUBPIXEL_STEP),
    (-SUBPIXEL_STEP,  SUBPIXEL_STEP),
    ( SUBPIXEL_STEP, -SUBPIXEL_STEP),
    ( SUBPIXEL_STEP,  SUBPIXEL_STEP),
];

/// Project `volume` onto a fresh `ydim × xdim` projection seen from `angles`.
///
/// Each pixel is the mean of the line integrals of four rays, offset by a
/// third of a pixel from its centre along both in-plane axes. Pixels are
/// independent of each other and are computed in parallel; the result does
/// not depend on how the work is scheduled.
pub fn project_volume(volume: &VoxelVolume, ydim: usize, xdim: usize, angles: EulerAngles) -> Projection {
    let mut projection = Projection::new(ydim, xdim, angles);
    let eulert    = projection.eulert();
    let direction = projection.direction();
    let (y0, x0) = (projection.image().starting_y(), projection.image().starting_x());

    log::debug!("projecting {:?} volume onto {ydim}x{xdim} pixels at {angles}", volume.dims());

    Zip::indexed(projection.image_mut().data_mut())
        .par_for_each(|(pi, pj), pixel| {
            let (i, j) = ((pi as i32 + y0) as f64, (pj as i32 + x0) as f64);
            let ray_sum: f64 = SUBRAYS.iter()
                .map(|&(dx, dy)| {
                    let p1 = plane_to_universe(&eulert, Vector2::new(j + dx, i + dy));
                    line_integral(volume, &Ray::new(p1, direction))
                })
                .sum();
            *pixel = ray_sum * 0.25;
        });

    projection
}

/// Smear every pixel of `projection` back into `volume`, along the single ray
/// through the pixel centre. Each traversed voxel receives the pixel value
/// weighted by the length of the ray inside it.
///
/// Unfiltered: weighted back-projection reconstructions filter the
/// projections before calling this.
pub fn single_wbp(volume: &mut VoxelVolume, projection: &Projection) {
    let eulert    = projection.eulert();
    let direction = projection.direction();
    let vbox      = volume.bounding_box();

    log::debug!("back-projecting {}x{} pixels from {} into {:?} volume",
                projection.ydim(), projection.xdim(), projection.angles(), volume.dims());

    for ((i, j), &value) in projection.image().indexed_iter() {
        // Contributes nothing
        if value == 0.0 { continue }
        let p1 = plane_to_universe(&eulert, Vector2::new(j as f64, i as f64));
        for (index, length) in WalkAlongRay::new(&Ray::new(p1, direction), vbox) {
            volume[index] += length * value;
        }
    }
}
