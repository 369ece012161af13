//! Loading CIPIC HRTF datasets, and converting between the coordinate conventions HRTF rigs use.
//!
//! The entry points are [CipicHrtf::open] (or [DatasetLocator] to find subjects by index), which produce an
//! [HrtfDataset] with positions in vertical-polar coordinates, and the functions in [coordinates].
pub mod config;
pub mod coordinates;
pub mod ear_image;
mod error;
mod hrtf;
mod locator;
pub mod mat;
pub mod sofa;
mod source;

pub use coordinates::{
    interaural_polar_to_vertical_polar, interaural_polar_to_vertical_polar_many,
    vertical_polar_to_cipic_polar, vertical_polar_to_cipic_polar_many,
    vertical_polar_to_interaural_polar, vertical_polar_to_interaural_polar_many, Convention,
    CoordinateError, UnitVector,
};
pub use error::{Error, Result};
pub use hrtf::*;
pub use locator::*;
pub use source::*;
