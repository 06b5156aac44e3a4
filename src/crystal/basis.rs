//! Basis functions placed on grid points, and their projection footprints.

use ndarray::Array2;

use crate::blob::BlobParams;
use crate::error::Result;

/// Default number of footprint samples per pixel, along each axis
pub const DEFAULT_OVERSAMPLING: usize = 10;

/// Kind of function centred on every grid point
#[derive(Clone, Debug, PartialEq)]
pub enum Basis {
    Blobs(BlobBasis),
    Voxels,
}

impl Basis {
    /// Blob basis with the default footprint oversampling
    pub fn blobs(blob: BlobParams) -> Result<Self> {
        Ok(Self::Blobs(BlobBasis::new(blob, DEFAULT_OVERSAMPLING, false)?))
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Blobs(_) => "blobs",
            Self::Voxels   => "voxels",
        }
    }
}

/// A blob together with its tabulated projection and squared projection
#[derive(Clone, Debug, PartialEq)]
pub struct BlobBasis {
    pub blob: BlobParams,
    pub blobprint: Footprint,
    pub blobprint2: Footprint,
}

impl BlobBasis {
    pub fn new(blob: BlobParams, oversampling: usize, normalise: bool) -> Result<Self> {
        let blob = blob.validated()?;
        let blobprint = Footprint::of_blob(&blob, oversampling, normalise);
        let blobprint2 = blobprint.squared();
        Ok(Self { blob, blobprint, blobprint2 })
    }
}

/// Oversampled table of a basis function's projection.
///
/// Covers in-plane offsets `[-umax, umax]` along x and `[-vmax, vmax]` along
/// y, with `oversampling` samples per pixel. Offsets falling outside the
/// table are outside the footprint's support.
#[derive(Clone, Debug, PartialEq)]
pub struct Footprint {
    data: Array2<f64>,
    umax: i32,
    vmax: i32,
    oversampling: usize,
}

impl Footprint {

    /// Tabulate the projection of `blob`. With `normalise` the table is
    /// scaled so that the footprint integrates to one.
    pub fn of_blob(blob: &BlobParams, oversampling: usize, normalise: bool) -> Self {
        let oversampling = oversampling.max(1);
        let half = blob.radius.ceil() as i32;
        let n = 2 * half as usize * oversampling + 1;
        let step = 1.0 / oversampling as f64;
        let mut data = Array2::from_shape_fn((n, n), |(iv, iu)| {
            let v = iv as f64 * step - half as f64;
            let u = iu as f64 * step - half as f64;
            blob.projection(u.hypot(v))
        });
        if normalise {
            let integral = data.sum() * step * step;
            if integral > 0.0 { data /= integral }
        }
        Self { data, umax: half, vmax: half, oversampling }
    }

    pub fn umax(&self) -> i32 { self.umax }
    pub fn vmax(&self) -> i32 { self.vmax }
    pub fn oversampling(&self) -> usize { self.oversampling }
    pub fn data(&self) -> &Array2<f64> { &self.data }

    /// Number of pixels a single basis function can contribute to
    pub fn equations(&self) -> usize {
        ((2 * self.umax + 1) * (2 * self.vmax + 1)) as usize
    }

    /// Table position `[v, u]` of the sample nearest to offset `(v, u)`, if
    /// the offset lies within the table
    #[inline]
    pub fn sample_index(&self, v: f64, u: f64) -> Option<[usize; 2]> {
        let os = self.oversampling as f64;
        let iv = ((v + self.vmax as f64) * os).round();
        let iu = ((u + self.umax as f64) * os).round();
        let (nv, nu) = self.data.dim();
        if iv < 0.0 || iu < 0.0 || iv >= nv as f64 || iu >= nu as f64 { return None }
        Some([iv as usize, iu as usize])
    }

    /// Footprint value at offset `(v, u)`; zero outside the support
    pub fn at(&self, v: f64, u: f64) -> f64 {
        self.sample_index(v, u).map_or(0.0, |i| self.data[i])
    }

    pub fn squared(&self) -> Self {
        Self { data: self.data.mapv(|x| x * x), ..self.clone() }
    }
}

impl core::ops::Index<[usize; 2]> for Footprint {
    type Output = f64;
    #[inline]
    fn index(&self, i: [usize; 2]) -> &f64 { &self.data[i] }
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_eq::assert_float_eq;
    use rstest::rstest;

    #[test]
    fn footprint_geometry() {
        let fp = Footprint::of_blob(&BlobParams::default(), 10, false);
        assert_eq!((fp.umax(), fp.vmax()), (2, 2));
        assert_eq!(fp.data().dim(), (41, 41));
        assert_eq!(fp.equations(), 25);
        assert_eq!(fp.sample_index(0.0, 0.0), Some([20, 20]));
        assert_eq!(fp.sample_index(-2.0, 2.0), Some([0, 40]));
        assert_eq!(fp.sample_index(0.0, 2.1), None);
        assert_eq!(fp.sample_index(-2.1, 0.0), None);
        // Nearest sample
        assert_eq!(fp.sample_index(0.04, -0.06), Some([20, 19]));
    }

    #[rstest(/**/ v  ,  u  ,
             case(0.0,  0.0),
             case(0.5, -1.2),
             case(1.0,  1.0),
    )]
    fn footprint_samples_blob_projection(v: f64, u: f64) {
        let blob = BlobParams::default();
        let fp = Footprint::of_blob(&blob, 10, false);
        assert_float_eq!(fp.at(v, u), blob.projection(u.hypot(v)), r2nd <= 1e-10);
        let fp2 = fp.squared();
        assert_float_eq!(fp2.at(v, u), fp.at(v, u).powi(2), r2nd <= 1e-12);
    }

    #[test]
    fn normalised_footprint_integrates_to_one() {
        let fp = Footprint::of_blob(&BlobParams::default(), 8, true);
        let step = 1.0 / 8.0;
        assert_float_eq!(fp.data().sum() * step * step, 1.0, abs <= 1e-12);
    }

    #[test]
    fn invalid_blob_is_rejected() {
        let blob = BlobParams { radius: -1.0, ..BlobParams::default() };
        assert!(BlobBasis::new(blob, 10, false).is_err());
        assert!(Basis::blobs(BlobParams::default()).is_ok());
    }
}
