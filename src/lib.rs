//! Projection and back-projection of voxel volumes and of crystal lattices of
//! blobs, the forward model underneath iterative 3D reconstruction.

pub mod error;
pub mod types;
pub mod image;
pub mod volume;
pub mod projection;
pub mod siddon;
pub mod projector;
pub mod blob;
pub mod crystal;
pub mod phantom;
pub mod io;
pub mod config;
pub mod utils;

pub use error::{Error, Result};
pub use types::{Index3, EPS};
pub use image::CentredImage;
pub use volume::VoxelVolume;
pub use projection::{Projection, NormalizationProjection};
pub use projector::{project_volume, single_wbp};
pub use crystal::{Basis, CrystalLattice, CrystalProjector, EquationMode, GridVolume, SimpleGrid};
pub use geometry::EulerAngles;
