//! Lattices of basis-function centres.

use geometry::{Matrix3, Vector3};

use crate::error::{Error, Result};
use crate::types::Index3;
use crate::volume::VoxelVolume;

/// A regular lattice of points, addressed by integer grid indices.
///
/// Grid point `g` sits at `basis · g · relative_size + origin` in universal
/// coordinates. Only indices in `lowest..=highest` (per axis) belong to the
/// grid, and if a radius of interest has been set, only those points lying
/// strictly inside the sphere of that radius are considered interesting.
#[derive(Clone, Debug, PartialEq)]
pub struct SimpleGrid {
    /// Columns are the grid vectors in universal coordinates
    pub basis: Matrix3,
    pub relative_size: f64,
    pub origin: Vector3,
    pub lowest: Index3,
    pub highest: Index3,
    r2: Option<f64>,
}

impl SimpleGrid {

    pub fn new(basis: Matrix3, relative_size: f64, origin: Vector3, lowest: Index3, highest: Index3) -> Self {
        Self { basis, relative_size, origin, lowest, highest, r2: None }
    }

    /// Orthonormal grid with unit spacing, its origin at the universal origin
    pub fn cubic(lowest: Index3, highest: Index3) -> Self {
        Self::new(Matrix3::identity(), 1.0, Vector3::zeros(), lowest, highest)
    }

    /// Restrict interesting points to those closer than `radius` to the
    /// universal origin
    pub fn with_interest_radius(mut self, radius: f64) -> Self {
        self.r2 = Some(radius * radius);
        self
    }

    pub fn interest_radius_squared(&self) -> Option<f64> { self.r2 }

    /// Number of grid indices along `[x, y, z]`
    pub fn dims(&self) -> [usize; 3] {
        let extent = |d: usize| (self.highest[d] - self.lowest[d] + 1).max(0) as usize;
        [extent(0), extent(1), extent(2)]
    }

    /// Universal position of a (possibly fractional) grid coordinate
    pub fn grid_to_universe(&self, g: Vector3) -> Vector3 {
        self.direction_to_universe(g) + self.origin
    }

    /// Universal vector corresponding to a displacement `g` in grid coordinates
    pub fn direction_to_universe(&self, g: Vector3) -> Vector3 {
        self.basis * g * self.relative_size
    }

    pub fn is_interesting(&self, [x, y, z]: Index3) -> bool {
        match self.r2 {
            None     => true,
            Some(r2) => {
                let p = self.grid_to_universe(Vector3::new(x as f64, y as f64, z as f64));
                p.norm_squared() < r2
            }
        }
    }
}

/// One sublattice of a `GridVolume`, with the coefficients of the basis
/// functions centred on its points
#[derive(Clone, Debug, PartialEq)]
pub struct GridComponent {
    pub grid: SimpleGrid,
    pub volume: VoxelVolume,
}

/// Several sublattices which together describe one density.
///
/// The logical bounds of each component's volume coincide with the index
/// bounds of its grid, so `volume[g]` is the coefficient of grid point `g`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GridVolume {
    components: Vec<GridComponent>,
}

impl GridVolume {

    pub fn new() -> Self { Self::default() }

    /// Add a sublattice with all coefficients set to zero
    pub fn push(&mut self, grid: SimpleGrid) {
        let volume = VoxelVolume::with_starting(grid.dims(), grid.lowest);
        self.components.push(GridComponent { grid, volume });
    }

    /// Add a sublattice with the given coefficients, which must cover exactly
    /// the grid's index bounds
    pub fn push_with_volume(&mut self, grid: SimpleGrid, volume: VoxelVolume) -> Result<()> {
        if volume.dims() != grid.dims() || volume.starting() != grid.lowest {
            let [nx, ny, nz] = grid.dims();
            return Err(Error::ShapeMismatch { shape: vec![nx, ny, nz], len: volume.data().len() })
        }
        self.components.push(GridComponent { grid, volume });
        Ok(())
    }

    /// Simple cubic lattice with spacing `relative_size`, covering the
    /// sphere of `radius` around the origin
    pub fn simple_cubic(relative_size: f64, radius: f64) -> Self {
        Self::from_offsets(relative_size, radius, &[[0.0, 0.0, 0.0]])
    }

    /// Body-centred cubic lattice: two interleaved simple cubic sublattices
    pub fn body_centred_cubic(relative_size: f64, radius: f64) -> Self {
        Self::from_offsets(relative_size, radius, &[[0.0, 0.0, 0.0], [0.5, 0.5, 0.5]])
    }

    /// Face-centred cubic lattice: four interleaved simple cubic sublattices
    pub fn face_centred_cubic(relative_size: f64, radius: f64) -> Self {
        Self::from_offsets(relative_size, radius, &[
            [0.0, 0.0, 0.0],
            [0.5, 0.5, 0.0],
            [0.5, 0.0, 0.5],
            [0.0, 0.5, 0.5],
        ])
    }

    fn from_offsets(relative_size: f64, radius: f64, offsets: &[[f64; 3]]) -> Self {
        let n = (radius / relative_size).ceil() as i32;
        let mut volume = Self::new();
        for &[x, y, z] in offsets {
            let origin = Vector3::new(x, y, z) * relative_size;
            let grid = SimpleGrid::new(Matrix3::identity(), relative_size, origin, [-n; 3], [n; 3])
                .with_interest_radius(radius);
            volume.push(grid);
        }
        volume
    }

    pub fn len(&self) -> usize { self.components.len() }
    pub fn is_empty(&self) -> bool { self.components.is_empty() }

    pub fn iter    (&    self) -> impl Iterator<Item = &    GridComponent> { self.components.iter    () }
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut GridComponent> { self.components.iter_mut() }

    /// Number of interesting grid points, over all sublattices
    pub fn interesting_points(&self) -> usize {
        self.iter()
            .map(|GridComponent { grid, volume }| volume.indices().filter(|&g| grid.is_interesting(g)).count())
            .sum()
    }
}

impl core::ops::Index<usize> for GridVolume {
    type Output = GridComponent;
    fn index(&self, n: usize) -> &Self::Output { &self.components[n] }
}

impl core::ops::IndexMut<usize> for GridVolume {
    fn index_mut(&mut self, n: usize) -> &mut Self::Output { &mut self.components[n] }
}
