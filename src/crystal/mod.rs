//! Crystals: periodic lattices of blobs, and their projections.
//!
//! A `GridVolume` describes the density of one unit cell as coefficients of
//! blobs centred on the points of one or more `SimpleGrid`s. The
//! `CrystalProjector` turns it into projections of the corresponding
//! infinite, possibly deformed, 2D crystal, and back.

pub mod basis;
pub mod grid;
pub mod projector;

pub use basis::{Basis, BlobBasis, Footprint, DEFAULT_OVERSAMPLING};
pub use grid::{GridComponent, GridVolume, SimpleGrid};
pub use projector::{CrystalLattice, CrystalProjector, Deformation, EquationMode};
