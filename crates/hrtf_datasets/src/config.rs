/// The fixed sample rate of every supported dataset.
///
/// CIPIC measurements were all taken at 44.1 KHZ and nothing here resamples.
pub const SR: f64 = 44100.0;

/// Number of channels in every supported dataset.  Always left then right.
pub const CHANNEL_COUNT: usize = 2;

/// Labels for the channel axis of [crate::HrtfDataset::impulses], in index order.
pub const CHANNEL_LABELS: [&str; CHANNEL_COUNT] = ["left", "right"];

/// Name of the impulse response variable in SOFA files, shaped `[measurements, receivers, samples]`.
pub const SOFA_IMPULSES_FIELD: &str = "Data.IR";

/// Name of the source position variable in SOFA files, shaped `[measurements, 3]`.
///
/// Columns are azimuth, elevation, distance.
pub const SOFA_POSITIONS_FIELD: &str = "SourcePosition";

/// Optional per-file sampling rate in SOFA files.
pub const SOFA_SAMPLING_RATE_FIELD: &str = "Data.SamplingRate";

/// Variable names for the left and right grids in CIPIC `.mat` files.
pub const MAT_LEFT_FIELD: &str = "hrir_l";
pub const MAT_RIGHT_FIELD: &str = "hrir_r";

/// SOFA positions are rounded to this many decimal places after conversion.
pub const POSITION_DECIMALS: i32 = 3;

/// Subject indices are zero-padded to this many digits when building paths.
pub const SUBJECT_INDEX_WIDTH: usize = 3;
