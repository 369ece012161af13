//! Loader for the CIPIC `.mat` distribution.
//!
//! Each subject's file holds two grids, `hrir_l` and `hrir_r`, indexed by azimuth, elevation and time.  The file carries
//! no position metadata: the azimuths and elevations are a fixed grid which every subject shares, and which we
//! regenerate here.  The grid values are the rig's own angles and are used as-is.
use std::io::BufReader;
use std::path::Path;

use itertools::iproduct;
use ndarray::{s, Array3, ShapeBuilder};

use crate::config::*;
use crate::error::{open_file, Result};
use crate::hrtf::{Channel, Measurements, SpatialPosition};

pub const CIPIC_AZIMUTH_COUNT: usize = 25;
pub const CIPIC_ELEVATION_COUNT: usize = 50;

const ELEVATION_START: f64 = -45.0;
const ELEVATION_STEP: f64 = 5.625;

#[derive(Debug, thiserror::Error)]
pub enum MatError {
    #[error("Unable to parse MAT file: {0}")]
    Parse(String),

    #[error("Variable {0} is missing")]
    MissingVariable(String),

    #[error("Variable {0} does not hold floating point data")]
    NotFloat(String),

    #[error("Variable {name} has dimensions {dims:?}, which is not a 25x50 grid over time")]
    UnexpectedGrid { name: String, dims: Vec<usize> },

    #[error("Left grid has dimensions {left:?} but right grid has {right:?}")]
    ChannelMismatch { left: Vec<usize>, right: Vec<usize> },
}

/// The 25 azimuths of the CIPIC grid: sparse at the sides, every 5 degrees in front.
pub fn canonical_azimuths() -> Vec<f64> {
    let mut out = vec![-80.0, -65.0, -55.0];
    out.extend((0..19).map(|i| -45.0 + 5.0 * i as f64));
    out.extend([55.0, 65.0, 80.0]);
    out
}

/// The 50 elevations of the CIPIC grid, -45 to 230.625 in steps of 5.625.
pub fn canonical_elevations() -> Vec<f64> {
    (0..CIPIC_ELEVATION_COUNT)
        .map(|i| ELEVATION_START + ELEVATION_STEP * i as f64)
        .collect()
}

/// Positions of every grid point in measurement order: azimuth outer, elevation inner.
pub fn canonical_positions() -> Vec<SpatialPosition> {
    iproduct!(canonical_azimuths(), canonical_elevations())
        .map(|(az, el)| SpatialPosition::new(el, az))
        .collect()
}

/// Read one grid and return it as `[azimuth, elevation, time]`.
///
/// CIPIC files store `[azimuth, elevation, time]`; `[time, azimuth, elevation]` is accepted as well.  MATLAB drops
/// trailing singleton dimensions, so a 2-d grid is a single sample long.
fn read_grid(mat: &matfile::MatFile, name: &str) -> Result<Array3<f64>> {
    let array = mat
        .find_by_name(name)
        .ok_or_else(|| MatError::MissingVariable(name.to_string()))?;

    let mut dims = array.size().to_vec();
    if dims.len() == 2 {
        dims.push(1);
    }
    if dims.len() != 3 {
        return Err(MatError::UnexpectedGrid {
            name: name.to_string(),
            dims,
        }
        .into());
    }

    let data: Vec<f64> = match array.data() {
        matfile::NumericData::Double { real, .. } => real.clone(),
        matfile::NumericData::Single { real, .. } => real.iter().map(|&x| x as f64).collect(),
        _ => return Err(MatError::NotFloat(name.to_string()).into()),
    };

    // MATLAB arrays are column-major.
    let grid = Array3::from_shape_vec((dims[0], dims[1], dims[2]).f(), data)?;

    match (dims[0], dims[1], dims[2]) {
        (CIPIC_AZIMUTH_COUNT, CIPIC_ELEVATION_COUNT, _) => Ok(grid),
        (_, CIPIC_AZIMUTH_COUNT, CIPIC_ELEVATION_COUNT) => Ok(grid.permuted_axes([1, 2, 0])),
        _ => Err(MatError::UnexpectedGrid {
            name: name.to_string(),
            dims,
        }
        .into()),
    }
}

pub(crate) fn load(path: &Path) -> Result<Measurements> {
    let file = open_file(path)?;
    let mat = matfile::MatFile::parse(BufReader::new(file))
        .map_err(|e| MatError::Parse(format!("{:?}", e)))?;

    let left = read_grid(&mat, MAT_LEFT_FIELD)?;
    let right = read_grid(&mat, MAT_RIGHT_FIELD)?;
    if left.dim() != right.dim() {
        return Err(MatError::ChannelMismatch {
            left: left.shape().to_vec(),
            right: right.shape().to_vec(),
        }
        .into());
    }

    let samples = left.dim().2;
    let mut impulses = Array3::zeros((
        CIPIC_AZIMUTH_COUNT * CIPIC_ELEVATION_COUNT,
        CHANNEL_COUNT,
        samples,
    ));
    for (m, (a, e)) in iproduct!(0..CIPIC_AZIMUTH_COUNT, 0..CIPIC_ELEVATION_COUNT).enumerate() {
        impulses
            .slice_mut(s![m, Channel::Left.index(), ..])
            .assign(&left.slice(s![a, e, ..]));
        impulses
            .slice_mut(s![m, Channel::Right.index(), ..])
            .assign(&right.slice(s![a, e, ..]));
    }

    log::debug!(
        "Loaded {} measurements of {} samples from {}",
        impulses.dim().0,
        samples,
        path.display()
    );
    Measurements::new(canonical_positions(), impulses)
}
