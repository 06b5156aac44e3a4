use crate::{Matrix3, Vector2, Vector3};

/// Universal coordinates of the in-plane point `r` of a projection whose
/// transposed Euler matrix is `eulert`.
///
/// The projection plane passes through the universal origin, so the
/// in-plane point has zero component along the projection direction.
#[inline]
pub fn plane_to_universe(eulert: &Matrix3, r: Vector2) -> Vector3 {
    eulert * Vector3::new(r.x, r.y, 0.0)
}

/// Express the universal point (or direction) `p` in the coordinate system
/// attached to a projection with Euler matrix `euler`. The first two
/// components are the position in the projection plane, the third is the
/// depth along the projection direction.
#[inline]
pub fn universe_to_plane(euler: &Matrix3, p: Vector3) -> Vector3 {
    euler * p
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::EulerAngles;
    use float_eq::assert_float_eq;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn plane_point_survives_trip_through_universe(
            rot  in -180.0..(180.0 as f64),
            tilt in    0.0..(180.0 as f64),
            psi  in -180.0..(180.0 as f64),
            x    in  -50.0..( 50.0 as f64),
            y    in  -50.0..( 50.0 as f64),
        ) {
            let euler = EulerAngles::from_degrees(rot, tilt, psi).matrix();
            let p = plane_to_universe(&euler.transpose(), Vector2::new(x, y));
            let back = universe_to_plane(&euler, p);
            assert_float_eq!([back.x, back.y, back.z], [x, y, 0.0], abs_all <= 1e-10);
        }

        #[test]
        fn direction_projects_onto_plane_normal(
            rot  in -180.0..(180.0 as f64),
            tilt in    0.0..(180.0 as f64),
            psi  in -180.0..(180.0 as f64),
        ) {
            let angles = EulerAngles::from_degrees(rot, tilt, psi);
            let d = universe_to_plane(&angles.matrix(), angles.direction());
            assert_float_eq!([d.x, d.y, d.z], [0.0, 0.0, 1.0], abs_all <= 1e-12);
        }
    }
}
