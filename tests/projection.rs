use float_eq::assert_float_eq;
use rstest::rstest;

use cryoproj::{EulerAngles, VoxelVolume, project_volume, single_wbp};
use cryoproj::config::project::TiltSeries;
use cryoproj::phantom::{Phantom, Sphere};

fn ball(radius: f64) -> VoxelVolume {
    let sphere = Sphere { centre: [0.0; 3], radius, density: 1.0 };
    Phantom { sphere: vec![sphere], ..Phantom::default() }.rasterise([9, 9, 9])
}

// Orientations which map the voxel grid onto itself see exactly the same
// projection of a centred ball.
#[rstest(/**/ rot , tilt , psi ,
         case(90.0,   0.0,  0.0),
         case( 0.0,  90.0,  0.0),
         case(90.0,  90.0,  0.0),
         case( 0.0, 180.0,  0.0),
         case( 0.0,   0.0, 90.0),
         case(90.0,  90.0, 90.0),
         case(180.0, 90.0, -90.0),
)]
fn ball_looks_the_same_from_equivalent_directions(rot: f64, tilt: f64, psi: f64) {
    let volume = ball(3.5);
    let reference = project_volume(&volume, 9, 9, EulerAngles::zero());
    let rotated   = project_volume(&volume, 9, 9, EulerAngles::from_degrees(rot, tilt, psi));
    for ((yx, &expected), (_, &got)) in reference.image().indexed_iter().zip(rotated.image().indexed_iter()) {
        assert_float_eq!(got, expected, abs <= 1e-6, "pixel {yx:?}");
    }
}

// From arbitrary directions the voxelised ball is no longer exactly
// symmetric, but the total projected mass is preserved.
#[rstest(/**/ rot , tilt, psi ,
         case( 30.0, 40.0,  10.0),
         case(-75.0, 45.0, 130.0),
         case( 10.0, 70.0, 200.0),
         case( 45.0, 54.7356, 0.0),
)]
fn ball_mass_is_independent_of_direction(rot: f64, tilt: f64, psi: f64) {
    let volume = ball(3.5);
    assert_eq!(volume.sum(), 179.0);
    let p = project_volume(&volume, 9, 9, EulerAngles::from_degrees(rot, tilt, psi));
    assert_float_eq!(p.image().sum(), volume.sum(), rmax <= 0.02);
}

// Back-projecting the projections of a single voxel, taken over a tilt
// series about y, concentrates the density back onto that voxel.
#[test]
fn tilt_series_backprojection_peaks_at_impulse() {
    let impulse = [1, -1, 0];
    let mut volume = VoxelVolume::zeros([9, 9, 9]);
    volume[impulse] = 1.0;

    let series = TiltSeries { rot: 0.0, psi: 0.0, tilt_min: -60.0, tilt_max: 60.0, tilt_step: 15.0 };
    let mut reconstruction = VoxelVolume::zeros([9, 9, 9]);
    for angles in series.orientations() {
        let projection = project_volume(&volume, 9, 9, angles);
        assert!(projection.image().sum() > 0.9);
        single_wbp(&mut reconstruction, &projection);
    }

    let brightest = reconstruction.indices()
        .max_by(|&a, &b| reconstruction[a].total_cmp(&reconstruction[b]))
        .unwrap();
    assert_eq!(brightest, impulse);
    // Rays stay in the plane of the tilt axis
    for i in reconstruction.indices() {
        if reconstruction[i] > 1e-9 { assert_eq!(i[1], impulse[1]) }
    }
}
