use ndarray::{s, Array3, ArrayView1};

use crate::config::*;
use crate::error::{Error, Result};

/// A direction (and possibly a distance) at which one impulse response was measured.
///
/// Angles are in degrees.  Which convention they are in depends on where the position came from; positions held by
/// [HrtfDataset] are always vertical-polar.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SpatialPosition {
    pub elevation: f64,
    pub azimuth: f64,

    /// Distance from the listener in meters.  Only SOFA files carry this.
    pub distance: Option<f64>,
}

impl SpatialPosition {
    pub fn new(elevation: f64, azimuth: f64) -> Self {
        Self {
            elevation,
            azimuth,
            distance: None,
        }
    }

    #[must_use]
    pub fn with_distance(mut self, distance: f64) -> Self {
        self.distance = Some(distance);
        self
    }
}

/// A channel of an HRTF.  The discriminant is the index along the channel axis of the impulses.
#[derive(Copy, Clone, Debug, Eq, Ord, PartialEq, PartialOrd, Hash)]
pub enum Channel {
    Left = 0,
    Right = 1,
}

impl Channel {
    pub const ALL: [Channel; CHANNEL_COUNT] = [Channel::Left, Channel::Right];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn label(self) -> &'static str {
        CHANNEL_LABELS[self.index()]
    }
}

/// The measured part of a dataset: positions and the impulse responses taken at them.
///
/// `impulses` is indexed `[measurement, channel, sample]` and its first axis lines up with `positions`.  This is checked
/// at construction and can't be broken afterward.
#[derive(Clone, Debug, PartialEq)]
pub struct Measurements {
    positions: Vec<SpatialPosition>,
    impulses: Array3<f64>,
}

impl Measurements {
    pub fn new(positions: Vec<SpatialPosition>, impulses: Array3<f64>) -> Result<Self> {
        let (count, channels, samples) = impulses.dim();
        if count != positions.len() || channels != CHANNEL_COUNT {
            return Err(Error::shape_mismatch(
                "impulses",
                vec![positions.len(), CHANNEL_COUNT, samples],
                impulses.shape().to_vec(),
            ));
        }

        Ok(Self {
            positions,
            impulses,
        })
    }

    pub fn positions(&self) -> &[SpatialPosition] {
        &self.positions[..]
    }

    pub fn impulses(&self) -> &Array3<f64> {
        &self.impulses
    }

    /// Length of each impulse response in samples.
    pub fn impulse_length(&self) -> usize {
        self.impulses.dim().2
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

/// An HRTF: a set of stereo impulse responses measured at known positions.
///
/// This is a plain record.  Loading is done by [crate::CipicHrtf], which fills it in from a file.  Until that happens,
/// or if loading gave up on a missing file or unsupported format, the measurements are unset and the accessors return
/// `None`.
#[derive(Clone, Debug, PartialEq)]
pub struct HrtfDataset {
    sampling_rate: f64,
    measurements: Option<Measurements>,
}

impl HrtfDataset {
    /// An empty dataset at the given sampling rate.
    pub fn empty(sampling_rate: f64) -> Self {
        Self {
            sampling_rate,
            measurements: None,
        }
    }

    pub fn with_measurements(sampling_rate: f64, measurements: Measurements) -> Self {
        Self {
            sampling_rate,
            measurements: Some(measurements),
        }
    }

    pub fn channel_count(&self) -> usize {
        CHANNEL_COUNT
    }

    pub fn sampling_rate(&self) -> f64 {
        self.sampling_rate
    }

    pub fn is_loaded(&self) -> bool {
        self.measurements.is_some()
    }

    pub fn measurements(&self) -> Option<&Measurements> {
        self.measurements.as_ref()
    }

    pub(crate) fn set_measurements(&mut self, measurements: Option<Measurements>) {
        self.measurements = measurements;
    }

    /// `["left", "right"]`, or `None` if nothing is loaded.
    pub fn channel_labels(&self) -> Option<&'static [&'static str]> {
        self.measurements.as_ref().map(|_| &CHANNEL_LABELS[..])
    }

    pub fn positions(&self) -> Option<&[SpatialPosition]> {
        self.measurements.as_ref().map(Measurements::positions)
    }

    pub fn impulses(&self) -> Option<&Array3<f64>> {
        self.measurements.as_ref().map(Measurements::impulses)
    }

    pub fn elevations(&self) -> Option<Vec<f64>> {
        self.positions()
            .map(|p| p.iter().map(|x| x.elevation).collect())
    }

    pub fn azimuths(&self) -> Option<Vec<f64>> {
        self.positions().map(|p| p.iter().map(|x| x.azimuth).collect())
    }

    /// Distances, if loaded and if the source carried them.
    pub fn distances(&self) -> Option<Vec<f64>> {
        self.positions()?.iter().map(|x| x.distance).collect()
    }

    /// Number of measurements, 0 if unset.
    pub fn len(&self) -> usize {
        self.measurements.as_ref().map_or(0, Measurements::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The impulse response for one channel of one measurement.
    pub fn impulse(&self, measurement: usize, channel: Channel) -> Option<ArrayView1<'_, f64>> {
        let impulses = self.impulses()?;
        if measurement >= impulses.dim().0 {
            return None;
        }
        Some(impulses.slice(s![measurement, channel.index(), ..]))
    }
}
