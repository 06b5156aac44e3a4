//! Two-dimensional arrays addressed by logical, centred indices.
//!
//! Projections, normalisation images and reconstruction masks all share the
//! same convention: element `(y, x)` lives at physical position
//! `(y - y0, x - x0)`, where `(y0, x0)` are the logical indices of the first
//! element. By default the logical origin sits at the centre of the image.

use ndarray::Array2;
use num_traits::Zero;

use crate::error::{Error, Result};
use crate::types::first_centred_index;

#[derive(Clone, Debug, PartialEq)]
pub struct CentredImage<T> {
    data: Array2<T>,
    y0: i32,
    x0: i32,
}

impl<T: Clone + Zero> CentredImage<T> {
    pub fn zeros(ydim: usize, xdim: usize) -> Self {
        Self::from_array(Array2::zeros((ydim, xdim)))
    }

    /// A zeroed image with the same shape and logical origin as `other`
    pub fn zeros_like<U>(other: &CentredImage<U>) -> Self {
        let data = Array2::zeros(other.data.dim());
        Self { data, y0: other.y0, x0: other.x0 }
    }
}

impl<T: Clone> CentredImage<T> {
    pub fn filled(ydim: usize, xdim: usize, value: T) -> Self {
        Self::from_array(Array2::from_elem((ydim, xdim), value))
    }

    /// Build from row-major samples (`x` varies fastest).
    pub fn from_vec(ydim: usize, xdim: usize, samples: Vec<T>) -> Result<Self> {
        let len = samples.len();
        let data = Array2::from_shape_vec((ydim, xdim), samples)
            .map_err(|_| Error::ShapeMismatch { shape: vec![ydim, xdim], len })?;
        Ok(Self::from_array(data))
    }
}

impl<T> CentredImage<T> {

    /// Wrap `data` (indexed `[y, x]`) with the logical origin at its centre
    pub fn from_array(data: Array2<T>) -> Self {
        let (ydim, xdim) = data.dim();
        Self { data, y0: first_centred_index(ydim), x0: first_centred_index(xdim) }
    }

    /// Wrap `data`, placing its first element at logical `(y0, x0)`
    pub fn with_origin(data: Array2<T>, y0: i32, x0: i32) -> Self { Self { data, y0, x0 } }

    #[inline] pub fn ydim(&self) -> usize { self.data.nrows() }
    #[inline] pub fn xdim(&self) -> usize { self.data.ncols() }

    #[inline] pub fn starting_y (&self) -> i32 { self.y0 }
    #[inline] pub fn starting_x (&self) -> i32 { self.x0 }
    #[inline] pub fn finishing_y(&self) -> i32 { self.y0 + self.ydim() as i32 - 1 }
    #[inline] pub fn finishing_x(&self) -> i32 { self.x0 + self.xdim() as i32 - 1 }

    #[inline]
    pub fn contains(&self, y: i32, x: i32) -> bool {
        (self.starting_y()..=self.finishing_y()).contains(&y) &&
        (self.starting_x()..=self.finishing_x()).contains(&x)
    }

    pub fn get(&self, y: i32, x: i32) -> Option<&T> {
        if self.contains(y, x) { Some(&self[(y, x)]) } else { None }
    }

    /// Periodic wrap of the logical position `(y, x)` into this image
    #[inline]
    pub fn wrap(&self, y: i32, x: i32) -> (i32, i32) {
        (wrap_index(y, self.y0, self.ydim()), wrap_index(x, self.x0, self.xdim()))
    }

    pub fn data    (&    self) -> &    Array2<T> { &    self.data }
    pub fn data_mut(&mut self) -> &mut Array2<T> { &mut self.data }
    pub fn into_data(self) -> Array2<T> { self.data }

    /// Elements with their logical `(y, x)` indices, row by row
    pub fn indexed_iter(&self) -> impl Iterator<Item = ((i32, i32), &T)> + '_ {
        let (y0, x0) = (self.y0, self.x0);
        self.data.indexed_iter()
            .map(move |((i, j), v)| ((i as i32 + y0, j as i32 + x0), v))
    }

    pub fn map<U>(&self, f: impl FnMut(&T) -> U) -> CentredImage<U> {
        CentredImage { data: self.data.map(f), y0: self.y0, x0: self.x0 }
    }

    /// Same shape and logical placement
    pub fn same_shape<U>(&self, other: &CentredImage<U>) -> bool {
        self.data.dim() == other.data.dim() && self.y0 == other.y0 && self.x0 == other.x0
    }

    #[inline]
    fn physical(&self, (y, x): (i32, i32)) -> [usize; 2] {
        [(y - self.y0) as usize, (x - self.x0) as usize]
    }
}

impl CentredImage<f64> {
    pub fn sum(&self) -> f64 { self.data.sum() }
}

/// Fold logical index `i` into the `len` indices starting at `first`.
///
/// This is a true periodic wrap rather than a clamp: `first + len` lands on
/// `first`, `first - 1` on `first + len - 1`.
#[inline]
pub fn wrap_index(i: i32, first: i32, len: usize) -> i32 {
    first + (i - first).rem_euclid(len as i32)
}

impl<T> core::ops::Index<(i32, i32)> for CentredImage<T> {
    type Output = T;
    #[inline]
    fn index(&self, yx: (i32, i32)) -> &Self::Output { &self.data[self.physical(yx)] }
}

impl<T> core::ops::IndexMut<(i32, i32)> for CentredImage<T> {
    #[inline]
    fn index_mut(&mut self, yx: (i32, i32)) -> &mut Self::Output {
        let p = self.physical(yx);
        &mut self.data[p]
    }
}
