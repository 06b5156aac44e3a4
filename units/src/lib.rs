//! Angle quantities used to orient projections.
//!
//! Euler angles arrive from metadata files and the command line as plain
//! numbers in degrees, while the trigonometry wants radians. Keeping them as
//! `uom` quantities makes the unit explicit at every point of use.

pub use uom;
pub use uom::si::Quantity;

pub use uom::si::f64::Angle;

mod units {
  pub use uom::si::angle::{degree, radian};
}

// Making values from float literals seems to be very long-winded, so provide
// some pithily-named convenience constructors.

/// Generate a function called NAME which returns QUANTITY by interpreting its
/// argument as UNIT
///
/// wrap!(NAME QUANTITY UNIT);
macro_rules! wrap {
  ($name:ident $quantity:ident $unit:ident ) => {
    pub fn $name(x: f64) -> $quantity { $quantity::new::<units::$unit>(x) }
  };
}

wrap!(deg    Angle degree);
wrap!(radian Angle radian);

// Reverse direction of the above
pub fn deg_   (x: Angle) -> f64 { x.get::<units::degree>() }
pub fn radian_(x: Angle) -> f64 { x.get::<units::radian>() }

/// Sine and cosine of an angle, in that order
pub fn sin_cos(x: Angle) -> (f64, f64) { radian_(x).sin_cos() }

#[macro_export]
macro_rules! assert_uom_eq {
  ($unit:ident, $lhs:expr, $rhs:expr, $algo:ident <= $tol:expr) => {
    float_eq::assert_float_eq!($lhs.get::<$unit>(), $rhs.get::<$unit>(), $algo <= $tol)
  };
}
