/// Everything that can go wrong in this crate.
///
/// Numerical degeneracies (rays grazing or missing the volume, directions
/// parallel to an axis) are *not* errors: they are absorbed by the projectors.
/// What remains are configuration mistakes, which are reported before any
/// data is modified, and the usual input/output failures.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// Crystal projection is only implemented for blob bases.
    #[error("crystal projection needs a blob basis, not {0}")]
    UnsupportedBasis(&'static str),

    #[error("invalid blob parameters: {0}")]
    InvalidBlob(String),

    #[error("the lattice deformation matrix is singular")]
    SingularDeformation,

    /// The number of samples does not match the requested array shape.
    #[error("{len} samples cannot fill an array of shape {shape:?}")]
    ShapeMismatch { shape: Vec<usize>, len: usize },

    #[error("malformed raw file: {0}")]
    RawFormat(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Config(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
