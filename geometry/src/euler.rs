//! Orientation of a projection with respect to the volume.
//!
//! Three angles in the ZYZ convention: `rot` about Z, then `tilt` about the new
//! Y, then `psi` about the new Z. The resulting matrix `E` takes universal
//! (volume) coordinates into the coordinate system attached to the projection:
//! its first two rows span the projection plane and its third row is the
//! direction along which the rays travel.

use units::{Angle, deg, deg_, sin_cos};
use crate::{Matrix3, Vector3};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EulerAngles {
    pub rot : Angle,
    pub tilt: Angle,
    pub psi : Angle,
}

impl EulerAngles {

    pub fn new(rot: Angle, tilt: Angle, psi: Angle) -> Self { Self { rot, tilt, psi } }

    /// Angles given as plain numbers, interpreted as degrees
    pub fn from_degrees(rot: f64, tilt: f64, psi: f64) -> Self {
        Self::new(deg(rot), deg(tilt), deg(psi))
    }

    pub fn zero() -> Self { Self::from_degrees(0.0, 0.0, 0.0) }

    /// The Euler matrix `E`: universal coordinates -> projection coordinates.
    pub fn matrix(&self) -> Matrix3 {
        let (sa, ca) = sin_cos(self.rot);
        let (sb, cb) = sin_cos(self.tilt);
        let (sg, cg) = sin_cos(self.psi);
        let cc = cb * ca;
        let cs = cb * sa;
        let sc = sb * ca;
        let ss = sb * sa;
        Matrix3::new(
             cg * cc - sg * sa,   cg * cs + sg * ca,  -cg * sb,
            -sg * cc - cg * sa,  -sg * cs + cg * ca,   sg * sb,
                            sc,                  ss,        cb,
        )
    }

    /// Unit vector, in universal coordinates, along which projection rays travel.
    /// Identical to the third row of `matrix()`, but cheaper to compute.
    pub fn direction(&self) -> Vector3 {
        let (sa, ca) = sin_cos(self.rot);
        let (sb, cb) = sin_cos(self.tilt);
        Vector3::new(sb * ca, sb * sa, cb)
    }
}

impl Default for EulerAngles {
    fn default() -> Self { Self::zero() }
}

impl std::fmt::Display for EulerAngles {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "(rot {:7.2}° tilt {:7.2}° psi {:7.2}°)",
               deg_(self.rot), deg_(self.tilt), deg_(self.psi))
    }
}
