pub mod error;
pub mod geometry;
pub mod math;
pub mod operations;
pub mod road;
pub mod skeleton;
pub mod topology;

#[cfg(test)]
pub(crate) mod test_fixtures;

pub use error::{ParcelError, Result};
