//! Conversions between the angular conventions used by HRTF measurement rigs.
//!
//! There are three conventions, all of which are `(elevation, azimuth)` pairs in degrees describing a direction on the
//! unit sphere around the listener:
//!
//! - Vertical-polar: azimuth is measured in the horizontal plane, and elevation tilts a vertical plane up or down.  This
//!   is what most of the literature (and [crate::HrtfDataset]) uses.
//! - Interaural-polar: azimuth is measured around the interaural (left-right) axis, and elevation is measured in the
//!   median planes.
//! - CIPIC-polar: interaural-polar, but with the elevation folded into `[-90, 270)` to match the physical sweep of the
//!   CIPIC rig.
//!
//! Rather than having a formula per pair of conventions, every conversion goes through [UnitVector], a cartesian point
//! on the unit sphere.  The point is conserved across a conversion, so round trips reproduce the input up to the choice
//! of branch.
//!
//! Each direction applies a wraparound fixup after recovering angles from the cartesian form.  The `-46` and `-90`
//! thresholds come from the angular layout of the CIPIC rig and are not general constants; don't try to derive them.
//!
//! Any finite pair of angles lands on the sphere.  The sphere check therefore only trips for NaN or infinite inputs, which
//! always indicate a bug in the caller.  It fails with [CoordinateError::OffSphere] rather than normalizing.

/// Angles below this threshold are moved up by a full turn after converting between vertical-polar and
/// interaural-polar.  Applies to the azimuth going to vertical-polar and the elevation going to interaural-polar.
pub const INTERAURAL_WRAP_DEG: f64 = -46.0;

/// CIPIC-polar elevations below this threshold are moved up by a full turn, giving the range `[-90, 270)`.
pub const CIPIC_WRAP_DEG: f64 = -90.0;

/// Maximum allowed distance of `x^2 + y^2 + z^2` from 1.
pub const UNIT_SPHERE_TOLERANCE: f64 = 1e-9;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CoordinateError {
    #[error("Angles (elevation {elevation}, azimuth {azimuth}) map to a point with squared norm {norm_squared}, which is not on the unit sphere")]
    OffSphere {
        elevation: f64,
        azimuth: f64,
        norm_squared: f64,
    },

    #[error("Got {elevations} elevations but {azimuths} azimuths")]
    LengthMismatch { elevations: usize, azimuths: usize },
}

/// One of the supported angular conventions.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Convention {
    VerticalPolar,
    InterauralPolar,
    CipicPolar,
}

/// A point on the unit sphere.
///
/// `x` points forward out of the nose, `y` out of the left ear, and `z` up.  Positive azimuths are to the right in
/// both conventions, which is why `y` picks up a minus sign.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct UnitVector {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

/// Move `angle` up by a full turn if it is strictly below `threshold`.
pub fn wrap_below(angle: f64, threshold: f64) -> f64 {
    if angle < threshold {
        angle + 360.0
    } else {
        angle
    }
}

/// Fold an interaural-polar elevation onto the CIPIC rig's `[-90, 270)` sweep.
fn fold_into_cipic(elevation: f64) -> f64 {
    let rad = elevation.to_radians();
    wrap_below(rad.sin().atan2(rad.cos()).to_degrees(), CIPIC_WRAP_DEG)
}

impl UnitVector {
    pub fn from_interaural_polar(elevation: f64, azimuth: f64) -> Self {
        let (el, az) = (elevation.to_radians(), azimuth.to_radians());
        Self {
            x: az.cos() * el.cos(),
            y: -az.sin(),
            z: az.cos() * el.sin(),
        }
    }

    pub fn from_vertical_polar(elevation: f64, azimuth: f64) -> Self {
        let (el, az) = (elevation.to_radians(), azimuth.to_radians());
        Self {
            x: el.cos() * az.cos(),
            y: -(el.cos() * az.sin()),
            z: el.sin(),
        }
    }

    pub fn norm_squared(&self) -> f64 {
        self.x * self.x + self.y * self.y + self.z * self.z
    }

    /// Is this point within [UNIT_SPHERE_TOLERANCE] of the unit sphere?
    ///
    /// False for any NaN component.
    pub fn is_on_sphere(&self) -> bool {
        (self.norm_squared() - 1.0).abs() <= UNIT_SPHERE_TOLERANCE
    }

    /// Fail if this point is not on the unit sphere.  The angles are only used for the error.
    pub fn ensure_on_sphere(self, elevation: f64, azimuth: f64) -> Result<Self, CoordinateError> {
        if self.is_on_sphere() {
            Ok(self)
        } else {
            Err(CoordinateError::OffSphere {
                elevation,
                azimuth,
                norm_squared: self.norm_squared(),
            })
        }
    }

    /// Vertical-polar `(elevation, azimuth)` of this point with no wraparound applied.
    ///
    /// Azimuth is in `(-180, 180]`, elevation in `[-90, 90]`.
    pub fn to_vertical_polar(&self) -> (f64, f64) {
        (
            self.z.asin().to_degrees(),
            (-self.y).atan2(self.x).to_degrees(),
        )
    }

    /// Interaural-polar `(elevation, azimuth)` of this point with no wraparound applied.
    ///
    /// Elevation is in `(-180, 180]`, azimuth in `[-90, 90]`.
    pub fn to_interaural_polar(&self) -> (f64, f64) {
        (
            self.z.atan2(self.x).to_degrees(),
            (-self.y).asin().to_degrees(),
        )
    }
}

/// Convert an interaural-polar `(elevation, azimuth)` to vertical-polar.
///
/// The resulting azimuth is in `[-46, 314)`.
pub fn interaural_polar_to_vertical_polar(
    elevation: f64,
    azimuth: f64,
) -> Result<(f64, f64), CoordinateError> {
    let point =
        UnitVector::from_interaural_polar(elevation, azimuth).ensure_on_sphere(elevation, azimuth)?;
    let (el, az) = point.to_vertical_polar();
    Ok((el, wrap_below(az, INTERAURAL_WRAP_DEG)))
}

/// Convert a vertical-polar `(elevation, azimuth)` to interaural-polar.
///
/// The resulting elevation is in `[-46, 314)`.
pub fn vertical_polar_to_interaural_polar(
    elevation: f64,
    azimuth: f64,
) -> Result<(f64, f64), CoordinateError> {
    let point =
        UnitVector::from_vertical_polar(elevation, azimuth).ensure_on_sphere(elevation, azimuth)?;
    let (el, az) = point.to_interaural_polar();
    Ok((wrap_below(el, INTERAURAL_WRAP_DEG), az))
}

/// Convert a vertical-polar `(elevation, azimuth)` to CIPIC-polar.
///
/// This is [vertical_polar_to_interaural_polar] followed by folding the elevation into `[-90, 270)`.
pub fn vertical_polar_to_cipic_polar(
    elevation: f64,
    azimuth: f64,
) -> Result<(f64, f64), CoordinateError> {
    let (el, az) = vertical_polar_to_interaural_polar(elevation, azimuth)?;
    Ok((fold_into_cipic(el), az))
}

fn convert_many(
    elevations: &[f64],
    azimuths: &[f64],
    convert: impl Fn(f64, f64) -> Result<(f64, f64), CoordinateError>,
) -> Result<(Vec<f64>, Vec<f64>), CoordinateError> {
    if elevations.len() != azimuths.len() {
        return Err(CoordinateError::LengthMismatch {
            elevations: elevations.len(),
            azimuths: azimuths.len(),
        });
    }

    let pairs = elevations
        .iter()
        .zip(azimuths.iter())
        .map(|(&el, &az)| convert(el, az))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(pairs.into_iter().unzip())
}

/// [interaural_polar_to_vertical_polar] over parallel slices.  Fails as a whole if any entry fails.
pub fn interaural_polar_to_vertical_polar_many(
    elevations: &[f64],
    azimuths: &[f64],
) -> Result<(Vec<f64>, Vec<f64>), CoordinateError> {
    convert_many(elevations, azimuths, interaural_polar_to_vertical_polar)
}

/// [vertical_polar_to_interaural_polar] over parallel slices.
pub fn vertical_polar_to_interaural_polar_many(
    elevations: &[f64],
    azimuths: &[f64],
) -> Result<(Vec<f64>, Vec<f64>), CoordinateError> {
    convert_many(elevations, azimuths, vertical_polar_to_interaural_polar)
}

/// [vertical_polar_to_cipic_polar] over parallel slices.
pub fn vertical_polar_to_cipic_polar_many(
    elevations: &[f64],
    azimuths: &[f64],
) -> Result<(Vec<f64>, Vec<f64>), CoordinateError> {
    convert_many(elevations, azimuths, vertical_polar_to_cipic_polar)
}

impl Convention {
    /// Convert `(elevation, azimuth)` from this convention to `target`.
    ///
    /// Conversions touching vertical-polar go through [UnitVector].  CIPIC-polar and interaural-polar only differ in
    /// the branch of the elevation, so converting between those two is a refold with no trigonometry on the way back
    /// to interaural-polar.
    pub fn convert_to(
        self,
        target: Convention,
        elevation: f64,
        azimuth: f64,
    ) -> Result<(f64, f64), CoordinateError> {
        use Convention::*;

        match (self, target) {
            (VerticalPolar, VerticalPolar)
            | (InterauralPolar, InterauralPolar)
            | (CipicPolar, CipicPolar) => Ok((elevation, azimuth)),
            (VerticalPolar, InterauralPolar) => vertical_polar_to_interaural_polar(elevation, azimuth),
            (VerticalPolar, CipicPolar) => vertical_polar_to_cipic_polar(elevation, azimuth),
            (InterauralPolar, VerticalPolar) => interaural_polar_to_vertical_polar(elevation, azimuth),
            (InterauralPolar, CipicPolar) => {
                UnitVector::from_interaural_polar(elevation, azimuth)
                    .ensure_on_sphere(elevation, azimuth)?;
                Ok((fold_into_cipic(elevation), azimuth))
            }
            (CipicPolar, InterauralPolar) => {
                UnitVector::from_interaural_polar(elevation, azimuth)
                    .ensure_on_sphere(elevation, azimuth)?;
                Ok((wrap_below(elevation, INTERAURAL_WRAP_DEG), azimuth))
            }
            (CipicPolar, VerticalPolar) => interaural_polar_to_vertical_polar(elevation, azimuth),
        }
    }

    /// [Convention::convert_to] over parallel slices.
    pub fn convert_many_to(
        self,
        target: Convention,
        elevations: &[f64],
        azimuths: &[f64],
    ) -> Result<(Vec<f64>, Vec<f64>), CoordinateError> {
        convert_many(elevations, azimuths, |el, az| self.convert_to(target, el, az))
    }
}
