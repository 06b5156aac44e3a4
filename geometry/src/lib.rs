mod euler;
mod plane;

pub use euler::EulerAngles;
pub use plane::{plane_to_universe, universe_to_plane};

pub type Vector2 = nalgebra::Vector2<f64>;
pub type Vector3 = nalgebra::Vector3<f64>;
pub type Matrix2 = nalgebra::Matrix2<f64>;
pub type Matrix3 = nalgebra::Matrix3<f64>;
