//! Projection of blob lattices describing a crystal unit cell.
//!
//! The projection image stands for one unit cell of an infinite 2D crystal:
//! the projected lattice repeat vectors are mapped onto the image's edges and
//! every footprint sample which falls outside the image is wrapped
//! periodically back into it.

use geometry::{EulerAngles, Matrix2, Matrix3, Vector2, Vector3, universe_to_plane};
use itertools::iproduct;

use crate::error::{Error, Result};
use crate::image::{CentredImage, wrap_index};
use crate::projection::{NormalizationProjection, Projection};
use crate::types::{EPS, Index3};

use super::basis::{Basis, BlobBasis, Footprint};
use super::grid::{GridComponent, GridVolume, SimpleGrid};

/// Largest extent, in unit cells, of a footprint mapped into the unit cell.
/// Nearly parallel projected lattice vectors stretch footprints far beyond it.
const MAX_FOOTPRINT_CELLS: f64 = 4.0;

/// How footprint weights enter the normalisation image (forward) and how
/// per-blob corrections are applied to the coefficients (backward), for the
/// different iterative reconstruction schemes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EquationMode {
    /// Block ART: full correction
    Artk,
    /// Component-averaged block ART: correction divided by the number of
    /// equations each blob takes part in
    CavArtk,
    Cavk,
    Cav,
}

impl EquationMode {

    /// Does forward projection accumulate squared footprints into the
    /// normalisation image?
    pub fn accumulates_norm(self) -> bool {
        matches!(self, Self::Artk | Self::CavArtk)
    }

    /// Amount to add to a coefficient, given its accumulated correction
    fn update(self, correction: f64, equations: usize) -> Option<f64> {
        match self {
            Self::Artk    => Some(correction),
            Self::CavArtk => Some(correction / equations as f64),
            Self::Cavk | Self::Cav => None,
        }
    }
}

/// Linear distortion of the crystal lattice
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Deformation {
    d: Matrix3,
    dinv: Matrix3,
}

impl Deformation {

    pub fn new(d: Matrix3) -> Result<Self> {
        let dinv = d.try_inverse().ok_or(Error::SingularDeformation)?;
        Ok(Self { d, dinv })
    }

    pub fn identity() -> Self { Self { d: Matrix3::identity(), dinv: Matrix3::identity() } }

    pub fn matrix (&self) -> Matrix3 { self.d }
    pub fn inverse(&self) -> Matrix3 { self.dinv }

    pub fn deform  (&self, p: Vector3) -> Vector3 { self.d    * p }
    pub fn undeform(&self, p: Vector3) -> Vector3 { self.dinv * p }
}

impl Default for Deformation {
    fn default() -> Self { Self::identity() }
}

/// Everything about the crystal which is fixed for a whole reconstruction
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CrystalLattice {
    /// In-plane lattice repeat vectors, in voxels
    pub aint: Vector2,
    pub bint: Vector2,
    /// Offset of the projected grid origin, in units of the lattice vectors
    pub shift: Vector2,
    pub deformation: Deformation,
}

impl CrystalLattice {

    pub fn new(aint: Vector2, bint: Vector2) -> Self {
        Self { aint, bint, shift: Vector2::zeros(), deformation: Deformation::identity() }
    }

    pub fn with_shift(self, shift: Vector2) -> Self { Self { shift, ..self } }

    pub fn with_deformation(self, deformation: Deformation) -> Self { Self { deformation, ..self } }
}

/// Projects and back-projects `GridVolume`s whose basis functions are blobs
#[derive(Clone, Copy, Debug)]
pub struct CrystalProjector<'b> {
    basis: &'b BlobBasis,
}

impl<'b> CrystalProjector<'b> {

    /// Fails unless `basis` consists of blobs
    pub fn new(basis: &'b Basis) -> Result<Self> {
        match basis {
            Basis::Blobs(basis) => Ok(Self { basis }),
            other => Err(Error::UnsupportedBasis(other.name())),
        }
    }

    pub fn footprint(&self) -> &Footprint { &self.basis.blobprint }

    /// Project every sublattice of `volume` onto a fresh `ydim × xdim` unit
    /// cell seen from `angles`.
    ///
    /// The returned normalisation image holds, per pixel, the sum of squared
    /// footprint weights that reached it (only in modes which accumulate it;
    /// otherwise it stays zero).
    #[allow(clippy::too_many_arguments)]
    pub fn project(
        &self,
        volume: &GridVolume,
        ydim: usize,
        xdim: usize,
        angles: EulerAngles,
        lattice: &CrystalLattice,
        mask: &CentredImage<bool>,
        mode: EquationMode,
    ) -> (Projection, NormalizationProjection) {
        let mut projection = Projection::new(ydim, xdim, angles);
        let mut norm = NormalizationProjection::like(&projection);
        self.project_into(volume, &mut projection, &mut norm, lattice, mask, mode);
        (projection, norm)
    }

    /// Like `project`, but adds onto existing images
    pub fn project_into(
        &self,
        volume: &GridVolume,
        projection: &mut Projection,
        norm: &mut NormalizationProjection,
        lattice: &CrystalLattice,
        mask: &CentredImage<bool>,
        mode: EquationMode,
    ) {
        let blobprint  = &self.basis.blobprint;
        let blobprint2 = &self.basis.blobprint2;
        let mut hits = vec![];
        for GridComponent { grid, volume } in volume.iter() {
            let Some(frame) = self.frame(grid, projection, lattice) else { continue };
            log::debug!("projecting {:?} grid points onto crystal unit cell {}", grid.dims(), projection.angles());
            for point in grid_points(grid, mask) {
                let coefficient = volume[point];
                frame.footprint_hits(point, blobprint, &mut hits);
                for &Hit { pixel, sample } in &hits {
                    projection[pixel] += coefficient * blobprint[sample];
                    if mode.accumulates_norm() {
                        norm.image_mut()[pixel] += blobprint2[sample];
                    }
                }
            }
        }
    }

    /// Distribute the per-pixel `corrections` back onto the coefficients of
    /// every sublattice of `volume`, through the footprints of the blobs
    /// which reach each pixel from the orientation of `projection`.
    pub fn back_project(
        &self,
        volume: &mut GridVolume,
        projection: &Projection,
        corrections: &NormalizationProjection,
        lattice: &CrystalLattice,
        mask: &CentredImage<bool>,
        mode: EquationMode,
    ) {
        let blobprint = &self.basis.blobprint;
        let equations = blobprint.equations();
        let mut hits = vec![];
        for GridComponent { grid, volume } in volume.iter_mut() {
            let Some(frame) = self.frame(grid, projection, lattice) else { continue };
            log::debug!("back-projecting crystal unit cell {} onto {:?} grid points", projection.angles(), grid.dims());
            for point in grid_points(grid, mask) {
                frame.footprint_hits(point, blobprint, &mut hits);
                let correction: f64 = hits.iter()
                    .map(|&Hit { pixel, sample }| corrections.image()[pixel] * blobprint[sample])
                    .sum();
                if let Some(delta) = mode.update(correction, equations) {
                    volume[point] += delta;
                }
            }
        }
    }

    fn frame(&self, grid: &SimpleGrid, projection: &Projection, lattice: &CrystalLattice) -> Option<GridFrame> {
        let frame = GridFrame::new(grid, &projection.euler(), lattice, projection.image(), &self.basis.blobprint);
        if frame.is_none() {
            log::warn!("crystal lattice degenerate when seen from {}: skipping grid", projection.angles());
        }
        frame
    }
}

/// Grid points within the grid's bounds and the mask's range, which are
/// selected by the mask and interesting to the grid
fn grid_points<'a>(grid: &'a SimpleGrid, mask: &'a CentredImage<bool>) -> impl Iterator<Item = Index3> + 'a {
    let [xl, yl, zl] = grid.lowest;
    let [xh, yh, zh] = grid.highest;
    let zs = zl..=zh;
    let ys = yl.max(mask.starting_y())..=yh.min(mask.finishing_y());
    let xs = xl.max(mask.starting_x())..=xh.min(mask.finishing_x());
    iproduct!(zs, ys, xs)
        .filter(move |&(_, i, j)| mask[(i, j)])
        .map(|(k, i, j)| [j, i, k])
        .filter(move |&g| grid.is_interesting(g))
}

/// A pixel touched by a footprint, and the footprint sample which touches it
#[derive(Clone, Copy, Debug, PartialEq)]
struct Hit {
    pixel: (i32, i32),
    sample: [usize; 2],
}

/// Geometry of one sublattice as seen in one projection.
///
/// `a` maps in-plane positions into the deformed projection space, where the
/// projected lattice vectors become `(xdim, 0)` and `(0, ydim)`; `ainv` maps
/// back.
#[derive(Clone, Debug)]
struct GridFrame {
    prj_x: Vector2,
    prj_y: Vector2,
    prj_z: Vector2,
    prj_origin: Vector2,
    a: Matrix2,
    ainv: Matrix2,
    deffootprint: Vector2,
    y0: i32,
    x0: i32,
    ydim: usize,
    xdim: usize,
}

impl GridFrame {

    fn new(
        grid: &SimpleGrid,
        euler: &Matrix3,
        lattice: &CrystalLattice,
        image: &CentredImage<f64>,
        footprint: &Footprint,
    ) -> Option<Self> {
        let eg = euler * lattice.deformation.matrix();
        let to_plane = |p: Vector3| universe_to_plane(&eg, p).xy();
        let project_direction = |g: Vector3| to_plane(grid.direction_to_universe(g));

        let CrystalLattice { aint, bint, shift, .. } = *lattice;
        let prjaint = project_direction(Vector3::new(aint.x, aint.y, 0.0));
        let prjbint = project_direction(Vector3::new(bint.x, bint.y, 0.0));

        let prj_x = project_direction(Vector3::x());
        let prj_y = project_direction(Vector3::y());
        let prj_z = project_direction(Vector3::z());
        let prj_origin = to_plane(grid.origin) + prjaint * shift.x + prjbint * shift.y;

        // Sine of the angle between the projected lattice vectors, times their lengths
        let det = prjaint.x * prjbint.y - prjbint.x * prjaint.y;
        if det.abs() <= EPS * prjaint.norm() * prjbint.norm() { return None }
        let (ydim, xdim) = (image.ydim(), image.xdim());
        let (yd, xd) = (ydim as f64, xdim as f64);
        let a = Matrix2::new(
             prjbint.y * xd, -prjbint.x * xd,
            -prjaint.y * yd,  prjaint.x * yd,
        ) / det;
        let ainv = a.try_inverse()?;

        let (umax, vmax) = (footprint.umax() as f64, footprint.vmax() as f64);
        let c1 = a * Vector2::new( umax, vmax);
        let c2 = a * Vector2::new(-umax, vmax);
        let deffootprint = Vector2::new(c1.x.abs().max(c2.x.abs()),
                                        c1.y.abs().max(c2.y.abs()));
        if deffootprint.x > MAX_FOOTPRINT_CELLS * xd || deffootprint.y > MAX_FOOTPRINT_CELLS * yd {
            return None
        }

        Some(Self {
            prj_x, prj_y, prj_z, prj_origin, a, ainv, deffootprint,
            y0: image.starting_y(), x0: image.starting_x(), ydim, xdim,
        })
    }

    /// In-plane position of grid point `[j, i, k]`
    fn position(&self, [j, i, k]: Index3) -> Vector2 {
        self.prj_origin + self.prj_x * j as f64 + self.prj_y * i as f64 + self.prj_z * k as f64
    }

    /// Replace the contents of `hits` with the wrapped pixels reached by the
    /// footprint of the blob at `point`
    fn footprint_hits(&self, point: Index3, footprint: &Footprint, hits: &mut Vec<Hit>) {
        hits.clear();
        let actprj = self.position(point);
        let def = self.a * actprj;
        let x1 = (def.x - self.deffootprint.x).ceil () as i32;
        let y1 = (def.y - self.deffootprint.y).ceil () as i32;
        let x2 = (def.x + self.deffootprint.x).floor() as i32;
        let y2 = (def.y + self.deffootprint.y).floor() as i32;
        for y in y1..=y2 {
            for x in x1..=x2 {
                let rc = self.ainv * Vector2::new(x as f64, y as f64);
                let Some(sample) = footprint.sample_index(rc.y - actprj.y, rc.x - actprj.x) else { continue };
                let pixel = (wrap_index(y, self.y0, self.ydim), wrap_index(x, self.x0, self.xdim));
                hits.push(Hit { pixel, sample });
            }
        }
    }
}
