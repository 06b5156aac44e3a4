//! Analytic densities for generating test volumes.
//!
//! A phantom is a collection of spheres and axis-aligned cuboids, each with
//! its own density. Where shapes overlap, their densities add up.

use geometry::Vector3;
use ndarray::Zip;
use serde::Deserialize;

use crate::types::Intensity;
use crate::volume::VoxelVolume;

#[derive(Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Sphere {
    #[serde(default)]
    pub centre: [f64; 3],
    pub radius: f64,
    #[serde(default = "unit_density")]
    pub density: Intensity,
}

#[derive(Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Cuboid {
    #[serde(default)]
    pub centre: [f64; 3],
    /// Half of the full width along each axis
    pub half_width: [f64; 3],
    #[serde(default = "unit_density")]
    pub density: Intensity,
}

fn unit_density() -> Intensity { 1.0 }

#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Phantom {
    #[serde(default)]
    pub sphere: Vec<Sphere>,
    #[serde(default)]
    pub cuboid: Vec<Cuboid>,
}

impl Sphere {
    pub fn contains(&self, p: Vector3) -> bool {
        (p - Vector3::from(self.centre)).norm_squared() <= self.radius * self.radius
    }
}

impl Cuboid {
    pub fn contains(&self, p: Vector3) -> bool {
        let d = p - Vector3::from(self.centre);
        (0..3).all(|n| d[n].abs() <= self.half_width[n])
    }
}

impl Phantom {

    pub fn is_empty(&self) -> bool { self.sphere.is_empty() && self.cuboid.is_empty() }

    /// Total density at the point `p`
    pub fn density_at(&self, p: Vector3) -> Intensity {
        let spheres: Intensity = self.sphere.iter().filter(|s| s.contains(p)).map(|s| s.density).sum();
        let cuboids: Intensity = self.cuboid.iter().filter(|c| c.contains(p)).map(|c| c.density).sum();
        spheres + cuboids
    }

    /// Sample the phantom at the centre of every voxel of a fresh, centred
    /// volume of `[nx, ny, nz]` voxels
    pub fn rasterise(&self, dims: [usize; 3]) -> VoxelVolume {
        let mut volume = VoxelVolume::zeros(dims);
        self.rasterise_into(&mut volume);
        volume
    }

    /// Add the phantom's density at each voxel centre to `volume`
    pub fn rasterise_into(&self, volume: &mut VoxelVolume) {
        let [x0, y0, z0] = volume.starting();
        Zip::indexed(volume.data_mut())
            .par_for_each(|(k, i, j), voxel| {
                let p = Vector3::new((j as i32 + x0) as f64,
                                     (i as i32 + y0) as f64,
                                     (k as i32 + z0) as f64);
                *voxel += self.density_at(p);
            });
    }
}
