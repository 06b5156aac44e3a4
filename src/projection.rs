use geometry::{EulerAngles, Matrix3, Vector3};

use crate::image::CentredImage;
use crate::types::Intensity;

/// A 2D projection image together with the orientation it was taken from.
///
/// Pixels use the centred logical convention of `CentredImage`. The Euler
/// matrix, its transpose and the projection direction are derived from the
/// angles whenever they are set, so they can never disagree.
#[derive(Clone, Debug, PartialEq)]
pub struct Projection {
    image: CentredImage<Intensity>,
    angles: EulerAngles,
    euler: Matrix3,
    eulert: Matrix3,
    direction: Vector3,
}

impl Projection {

    /// Zeroed `ydim × xdim` projection seen from `angles`
    pub fn new(ydim: usize, xdim: usize, angles: EulerAngles) -> Self {
        Self::from_image(CentredImage::zeros(ydim, xdim), angles)
    }

    pub fn from_image(image: CentredImage<Intensity>, angles: EulerAngles) -> Self {
        let euler = angles.matrix();
        Self { image, angles, euler, eulert: euler.transpose(), direction: angles.direction() }
    }

    /// Discard the pixel data, replacing it with a zeroed `ydim × xdim` image
    pub fn reset(&mut self, ydim: usize, xdim: usize) {
        self.image = CentredImage::zeros(ydim, xdim);
    }

    pub fn set_angles(&mut self, angles: EulerAngles) {
        *self = Self::from_image(std::mem::replace(&mut self.image, CentredImage::zeros(0, 0)), angles);
    }

    pub fn angles   (&self) -> EulerAngles { self.angles }
    pub fn euler    (&self) -> Matrix3     { self.euler }
    pub fn eulert   (&self) -> Matrix3     { self.eulert }
    pub fn direction(&self) -> Vector3     { self.direction }

    pub fn image    (&    self) -> &    CentredImage<Intensity> { &    self.image }
    pub fn image_mut(&mut self) -> &mut CentredImage<Intensity> { &mut self.image }
    pub fn into_image(self) -> CentredImage<Intensity> { self.image }

    pub fn ydim(&self) -> usize { self.image.ydim() }
    pub fn xdim(&self) -> usize { self.image.xdim() }
}

impl core::ops::Index<(i32, i32)> for Projection {
    type Output = Intensity;
    #[inline]
    fn index(&self, yx: (i32, i32)) -> &Self::Output { &self.image[yx] }
}

impl core::ops::IndexMut<(i32, i32)> for Projection {
    #[inline]
    fn index_mut(&mut self, yx: (i32, i32)) -> &mut Self::Output { &mut self.image[yx] }
}

/// Companion of a `Projection`, with the same pixel grid.
///
/// Forward crystal projection accumulates the squared footprint weight which
/// reached every pixel; backward crystal projection reads the per-pixel
/// corrections from it.
#[derive(Clone, Debug, PartialEq)]
pub struct NormalizationProjection(pub CentredImage<Intensity>);

impl NormalizationProjection {
    /// Zeroed, with the shape and origin of `projection`
    pub fn like(projection: &Projection) -> Self {
        Self(CentredImage::zeros_like(projection.image()))
    }

    pub fn image    (&    self) -> &    CentredImage<Intensity> { &    self.0 }
    pub fn image_mut(&mut self) -> &mut CentredImage<Intensity> { &mut self.0 }
}
