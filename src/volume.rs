//! Dense voxel volumes addressed by logical indices.

use ndarray::Array3;
use itertools::iproduct;

use crate::error::{Error, Result};
use crate::siddon::VoxelBox;
use crate::types::{Index3, Intensity, first_centred_index};

/// A dense scalar field over `[x0,xF] × [y0,yF] × [z0,zF]`.
///
/// Samples are stored with axis order `[z, y, x]`; client code addresses them
/// with logical `[x, y, z]` indices, which are offset from the physical ones
/// by the volume's starting indices.
#[derive(Clone, Debug, PartialEq)]
pub struct VoxelVolume {
    data: Array3<Intensity>,
    starting: Index3,
}

impl VoxelVolume {

    /// Zero-filled volume of `[nx, ny, nz]` voxels, centred on the logical origin
    pub fn zeros(n: [usize; 3]) -> Self {
        Self::filled(n, 0.0)
    }

    pub fn filled([nx, ny, nz]: [usize; 3], value: Intensity) -> Self {
        Self::from_array(Array3::from_elem((nz, ny, nx), value))
    }

    /// Zero-filled volume whose first voxel has logical index `starting`
    pub fn with_starting([nx, ny, nz]: [usize; 3], starting: Index3) -> Self {
        Self { data: Array3::zeros((nz, ny, nx)), starting }
    }

    /// Wrap `data` (axis order `[z, y, x]`), centring the logical origin
    pub fn from_array(data: Array3<Intensity>) -> Self {
        let (nz, ny, nx) = data.dim();
        let starting = [first_centred_index(nx), first_centred_index(ny), first_centred_index(nz)];
        Self { data, starting }
    }

    /// Build from samples in `[z][y][x]` order (`x` varies fastest)
    pub fn from_vec([nx, ny, nz]: [usize; 3], starting: Index3, samples: Vec<Intensity>) -> Result<Self> {
        let len = samples.len();
        let data = Array3::from_shape_vec((nz, ny, nx), samples)
            .map_err(|_| Error::ShapeMismatch { shape: vec![nx, ny, nz], len })?;
        Ok(Self { data, starting })
    }

    /// Number of voxels along `[x, y, z]`
    pub fn dims(&self) -> [usize; 3] {
        let (nz, ny, nx) = self.data.dim();
        [nx, ny, nz]
    }

    pub fn starting(&self) -> Index3 { self.starting }

    pub fn finishing(&self) -> Index3 {
        let [nx, ny, nz] = self.dims();
        let [x0, y0, z0] = self.starting;
        [x0 + nx as i32 - 1, y0 + ny as i32 - 1, z0 + nz as i32 - 1]
    }

    /// Inclusive range of logical indices covered by this volume
    pub fn bounding_box(&self) -> VoxelBox {
        VoxelBox::new(self.starting(), self.finishing())
    }

    pub fn contains(&self, i: Index3) -> bool { self.bounding_box().contains(i) }

    pub fn get(&self, i: Index3) -> Option<Intensity> {
        if self.contains(i) { Some(self[i]) } else { None }
    }

    /// All logical indices, `x` varying fastest
    pub fn indices(&self) -> impl Iterator<Item = Index3> {
        let ([x0, y0, z0], [xf, yf, zf]) = (self.starting(), self.finishing());
        iproduct!(z0..=zf, y0..=yf, x0..=xf).map(|(z, y, x)| [x, y, z])
    }

    pub fn sum(&self) -> Intensity { self.data.sum() }

    pub fn data    (&    self) -> &    Array3<Intensity> { &    self.data }
    pub fn data_mut(&mut self) -> &mut Array3<Intensity> { &mut self.data }

    #[inline]
    fn physical(&self, [x, y, z]: Index3) -> [usize; 3] {
        let [x0, y0, z0] = self.starting;
        [(z - z0) as usize, (y - y0) as usize, (x - x0) as usize]
    }
}

impl core::ops::Index<Index3> for VoxelVolume {
    type Output = Intensity;
    #[inline]
    fn index(&self, i: Index3) -> &Self::Output { &self.data[self.physical(i)] }
}

impl core::ops::IndexMut<Index3> for VoxelVolume {
    #[inline]
    fn index_mut(&mut self, i: Index3) -> &mut Self::Output {
        let p = self.physical(i);
        &mut self.data[p]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    #[allow(unused)] use pretty_assertions::{assert_eq, assert_ne};
    use rstest::rstest;

    #[rstest(/**/    dims   ,    starting   ,    finishing ,
             case([5, 5, 5], [-2, -2, -2], [2, 2, 2]),
             case([4, 6, 1], [-2, -3,  0], [1, 2, 0]),
             case([2, 3, 8], [-1, -1, -4], [0, 1, 3]),
    )]
    fn centred_bounds(dims: [usize; 3], starting: Index3, finishing: Index3) {
        let v = VoxelVolume::zeros(dims);
        assert_eq!(v.dims(), dims);
        assert_eq!(v.starting(), starting);
        assert_eq!(v.finishing(), finishing);
    }

    #[test]
    fn logical_index_maps_onto_zyx_storage() {
        let mut v = VoxelVolume::with_starting([3, 4, 5], [10, 20, 30]);
        v[[10, 20, 30]] = 1.0;
        v[[12, 21, 34]] = 2.0;
        assert_eq!(v.data()[[0, 0, 0]], 1.0);
        assert_eq!(v.data()[[4, 1, 2]], 2.0);
        assert_eq!(v.get([13, 20, 30]), None);
        assert_eq!(v.sum(), 3.0);
    }

    #[test]
    fn indices_visit_every_voxel_once() {
        let v = VoxelVolume::zeros([2, 3, 4]);
        let all: Vec<Index3> = v.indices().collect();
        assert_eq!(all.len(), 24);
        assert_eq!(all[0], v.starting());
        assert_eq!(all[1], [0, -1, -2]);
        assert_eq!(*all.last().unwrap(), v.finishing());
        assert!(all.iter().all(|&i| v.contains(i)));
    }

    #[test]
    fn samples_must_fill_volume() {
        assert!(VoxelVolume::from_vec([2, 2, 2], [0, 0, 0], vec![0.0; 8]).is_ok());
        assert!(matches!(
            VoxelVolume::from_vec([2, 2, 2], [0, 0, 0], vec![0.0; 7]),
            Err(Error::ShapeMismatch { len: 7, .. })
        ));
    }
}
