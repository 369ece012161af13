use std::path::PathBuf;

use crate::coordinates::CoordinateError;
use crate::ear_image::EarImageError;
use crate::mat::MatError;
use crate::sofa::SofaError;

#[derive(Debug, derive_more::Display, derive_more::IsVariant)]
enum ErrorPayload {
    #[display(fmt = "File {} not found", "_0.display()")]
    FileNotFound(PathBuf),

    #[display(
        fmt = "File format {:?} not supported here. Supported: {}",
        extension,
        supported
    )]
    UnsupportedFormat {
        extension: String,
        supported: &'static str,
    },

    #[display(fmt = "Sampling rate {} is not supported; only {} is", _0, crate::config::SR)]
    UnsupportedSamplingRate(f64),

    #[display(fmt = "{} has shape {:?}, expected {:?}", field, found, expected)]
    ShapeMismatch {
        field: String,
        expected: Vec<usize>,
        found: Vec<usize>,
    },

    #[display(fmt = "Coordinate error: {}", _0)]
    Coordinate(CoordinateError),

    #[display(fmt = "MAT file error: {}", _0)]
    Mat(MatError),

    #[display(fmt = "SOFA file error: {}", _0)]
    Sofa(SofaError),

    #[display(fmt = "Ear image error: {}", _0)]
    EarImage(EarImageError),

    #[display(fmt = "Array error: {}", _0)]
    Array(ndarray::ShapeError),

    #[display(fmt = "I/O error: {}", _0)]
    Io(std::io::Error),
}

#[derive(Debug, thiserror::Error)]
#[error("{payload}")]
pub struct Error {
    payload: ErrorPayload,
}

macro_rules! conv {
    ($variant: ident, $from_err: path) => {
        impl From<$from_err> for Error {
            fn from(value: $from_err) -> Error {
                Error {
                    payload: ErrorPayload::$variant(value),
                }
            }
        }
    };
}

conv!(Coordinate, CoordinateError);
conv!(Mat, MatError);
conv!(Sofa, SofaError);
conv!(EarImage, EarImageError);
conv!(Array, ndarray::ShapeError);
conv!(Io, std::io::Error);

impl Error {
    pub(crate) fn file_not_found(path: impl Into<PathBuf>) -> Self {
        Error {
            payload: ErrorPayload::FileNotFound(path.into()),
        }
    }

    pub(crate) fn unsupported_format(extension: impl Into<String>, supported: &'static str) -> Self {
        Error {
            payload: ErrorPayload::UnsupportedFormat {
                extension: extension.into(),
                supported,
            },
        }
    }

    pub(crate) fn unsupported_sampling_rate(rate: f64) -> Self {
        Error {
            payload: ErrorPayload::UnsupportedSamplingRate(rate),
        }
    }

    pub(crate) fn shape_mismatch(
        field: impl Into<String>,
        expected: Vec<usize>,
        found: Vec<usize>,
    ) -> Self {
        Error {
            payload: ErrorPayload::ShapeMismatch {
                field: field.into(),
                expected,
                found,
            },
        }
    }

    /// Did this error happen because a file (dataset or template) does not exist?
    pub fn is_file_not_found(&self) -> bool {
        self.payload.is_file_not_found()
    }

    /// Did this error happen because the file extension is not one we know how to read?
    pub fn is_unsupported_format(&self) -> bool {
        self.payload.is_unsupported_format()
    }

    pub fn is_unsupported_sampling_rate(&self) -> bool {
        self.payload.is_unsupported_sampling_rate()
    }

    /// Was an array the wrong shape for where it was going?
    pub fn is_shape_mismatch(&self) -> bool {
        self.payload.is_shape_mismatch()
    }

    /// Did a coordinate conversion fail?  This happens for angles which don't land on the unit sphere.
    pub fn is_coordinate(&self) -> bool {
        self.payload.is_coordinate()
    }

    /// Is this one of the failures which loaders and writers report and then carry on from?
    ///
    /// Those are missing files and unsupported formats.  Everything else means the data or the caller is broken.
    pub fn is_recoverable(&self) -> bool {
        self.is_file_not_found() || self.is_unsupported_format()
    }
}

/// Log recoverable failures and turn them into `None`, passing everything else through.
pub(crate) fn report_recoverable<T>(result: Result<T>) -> Result<Option<T>> {
    match result {
        Ok(x) => Ok(Some(x)),
        Err(e) if e.is_recoverable() => {
            log::error!("{}", e);
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

/// Open a file, mapping a missing file to [Error::is_file_not_found].
pub(crate) fn open_file(path: &std::path::Path) -> Result<std::fs::File> {
    std::fs::File::open(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => Error::file_not_found(path),
        _ => e.into(),
    })
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
