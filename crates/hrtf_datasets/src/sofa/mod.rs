//! SOFA (AES69) files: impulse responses and source positions stored as named variables.
//!
//! We read and write the netCDF classic encoding of SOFA.  The variables and dimensions are the ones from the
//! `SimpleFreeFieldHRIR` convention: `Data.IR` is `[M, R, N]` (measurements, receivers, samples) and `SourcePosition`
//! is `[M, C]` with columns azimuth, elevation, distance.  Every other variable and attribute is carried through a
//! rewrite untouched.
//!
//! Positions on disk are interaural-polar.  [load] converts them to vertical-polar and rounds them to
//! [POSITION_DECIMALS] places, which removes the noise the trip through the unit sphere adds.
mod container;

pub(crate) use container::SofaContainer;

use std::path::{Path, PathBuf};

use ndarray::{Array2, Array3, ArrayView1};

use crate::config::*;
use crate::coordinates::interaural_polar_to_vertical_polar_many;
use crate::error::{Error, Result};
use crate::hrtf::{Measurements, SpatialPosition};

#[derive(Debug, thiserror::Error)]
pub enum SofaError {
    #[error("Unable to read {}: {message}", .path.display())]
    Read { path: PathBuf, message: String },

    #[error("Unable to write {}: {message}", .path.display())]
    Write { path: PathBuf, message: String },

    #[error("Variable {0} is missing")]
    MissingField(String),

    #[error("Variable {field} is stored as {storage}, which cannot hold {value}")]
    Unrepresentable {
        field: String,
        value: f64,
        storage: &'static str,
    },
}

/// Round to [POSITION_DECIMALS] places, ties to even.
fn round_position(x: f64) -> f64 {
    let scale = 10f64.powi(POSITION_DECIMALS);
    (x * scale).round_ties_even() / scale
}

/// Number of measurements, taken from `Data.IR`.
fn measurement_count(container: &SofaContainer) -> Result<usize> {
    let shape = container.shape(SOFA_IMPULSES_FIELD)?;
    match shape.as_slice() {
        &[m, _, _] => Ok(m),
        _ => Err(Error::shape_mismatch(
            SOFA_IMPULSES_FIELD,
            vec![0, CHANNEL_COUNT, 0],
            shape,
        )),
    }
}

/// `SourcePosition` as an `[M, 3]` array.
fn read_positions(container: &SofaContainer, count: usize) -> Result<Array2<f64>> {
    let shape = container.shape(SOFA_POSITIONS_FIELD)?;
    if shape != [count, 3] {
        return Err(Error::shape_mismatch(
            SOFA_POSITIONS_FIELD,
            vec![count, 3],
            shape,
        ));
    }
    Ok(Array2::from_shape_vec(
        (count, 3),
        container.field_f64(SOFA_POSITIONS_FIELD)?,
    )?)
}

fn check_sampling_rate(container: &SofaContainer, path: &Path) -> Result<()> {
    if !container.has_field(SOFA_SAMPLING_RATE_FIELD) {
        return Ok(());
    }

    let rates = container.field_f64(SOFA_SAMPLING_RATE_FIELD)?;
    if rates.iter().any(|&r| r != SR) {
        log::warn!(
            "{} declares sampling rate {:?}; treating it as {}",
            path.display(),
            rates,
            SR
        );
    }
    Ok(())
}

pub(crate) fn measurements_from(container: &SofaContainer, path: &Path) -> Result<Measurements> {
    let count = measurement_count(container)?;
    let shape = container.shape(SOFA_IMPULSES_FIELD)?;
    let impulses = Array3::from_shape_vec(
        (shape[0], shape[1], shape[2]),
        container.field_f64(SOFA_IMPULSES_FIELD)?,
    )?;

    let raw = read_positions(container, count)?;
    let azimuths = raw.column(0).to_vec();
    let elevations = raw.column(1).to_vec();
    let (elevations, azimuths) = interaural_polar_to_vertical_polar_many(&elevations, &azimuths)?;

    let positions = elevations
        .into_iter()
        .zip(azimuths)
        .zip(raw.column(2).iter())
        .map(|((el, az), &dist)| {
            SpatialPosition::new(round_position(el), round_position(az)).with_distance(dist)
        })
        .collect();

    check_sampling_rate(container, path)?;
    Measurements::new(positions, impulses)
}

/// Load the measurements of a SOFA file.
pub(crate) fn load(path: &Path) -> Result<Measurements> {
    let container = SofaContainer::read(path)?;
    let measurements = measurements_from(&container, path)?;
    log::debug!(
        "Loaded {} measurements of {} samples from {}",
        measurements.len(),
        measurements.impulse_length(),
        path.display()
    );
    Ok(measurements)
}

/// Overwrite `Data.IR`.  The shape must match exactly.
pub(crate) fn replace_impulses(container: &mut SofaContainer, impulses: &Array3<f64>) -> Result<()> {
    let shape = container.shape(SOFA_IMPULSES_FIELD)?;
    if impulses.shape() != shape.as_slice() {
        return Err(Error::shape_mismatch(
            SOFA_IMPULSES_FIELD,
            shape,
            impulses.shape().to_vec(),
        ));
    }
    container.replace_f64(SOFA_IMPULSES_FIELD, impulses.iter().copied().collect())
}

/// Overwrite the azimuth and elevation columns of `SourcePosition`, leaving distances alone.
///
/// There must be exactly one elevation and one azimuth per measurement.
pub(crate) fn replace_positions(
    container: &mut SofaContainer,
    elevations: &[f64],
    azimuths: &[f64],
) -> Result<()> {
    let count = container.shape(SOFA_POSITIONS_FIELD)?.first().copied().unwrap_or(0);
    for got in [elevations.len(), azimuths.len()] {
        if got != count {
            return Err(Error::shape_mismatch(
                SOFA_POSITIONS_FIELD,
                vec![count],
                vec![got],
            ));
        }
    }

    let mut positions = read_positions(container, count)?;
    positions.column_mut(0).assign(&ArrayView1::from(azimuths));
    positions.column_mut(1).assign(&ArrayView1::from(elevations));
    container.replace_f64(SOFA_POSITIONS_FIELD, positions.iter().copied().collect())
}

pub(crate) fn write_impulses(path: &Path, impulses: &Array3<f64>) -> Result<()> {
    let mut container = SofaContainer::read(path)?;
    replace_impulses(&mut container, impulses)?;
    container.write(path)?;
    log::debug!("Rewrote {} in {}", SOFA_IMPULSES_FIELD, path.display());
    Ok(())
}

pub(crate) fn write_positions(path: &Path, elevations: &[f64], azimuths: &[f64]) -> Result<()> {
    let mut container = SofaContainer::read(path)?;
    // Anything which won't load back must never reach the file.
    interaural_polar_to_vertical_polar_many(elevations, azimuths)?;
    replace_positions(&mut container, elevations, azimuths)?;
    container.write(path)?;
    log::debug!("Rewrote {} in {}", SOFA_POSITIONS_FIELD, path.display());
    Ok(())
}
