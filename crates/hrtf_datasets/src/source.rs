use std::path::{Path, PathBuf};

use ndarray::Array3;

use crate::config::SR;
use crate::coordinates::interaural_polar_to_vertical_polar_many;
use crate::error::{report_recoverable, Error, Result};
use crate::hrtf::{HrtfDataset, Measurements};
use crate::sofa::{self, SofaContainer};
use crate::mat;

/// The file formats datasets can be loaded from.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum SourceFormat {
    /// The CIPIC MATLAB distribution: fixed 25x50 grids, no position metadata.
    Mat,

    /// SOFA, with positions stored in interaural-polar coordinates.
    Sofa,
}

fn extension_of(path: &Path) -> &str {
    path.extension().and_then(|e| e.to_str()).unwrap_or("")
}

impl SourceFormat {
    /// Pick the format from the extension of `path`, ignoring case.
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = extension_of(path);
        if ext.eq_ignore_ascii_case("mat") {
            Ok(SourceFormat::Mat)
        } else if ext.eq_ignore_ascii_case("sofa") {
            Ok(SourceFormat::Sofa)
        } else {
            Err(Error::unsupported_format(ext, "mat, sofa"))
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            SourceFormat::Mat => "mat",
            SourceFormat::Sofa => "sofa",
        }
    }

    fn load(self, path: &Path) -> Result<Measurements> {
        match self {
            SourceFormat::Mat => mat::load(path),
            SourceFormat::Sofa => sofa::load(path),
        }
    }
}

/// An HRTF dataset backed by a file on disk.
///
/// Opening never fails for a missing file or an unsupported extension.  Those are logged and leave the dataset
/// unset, which can be checked with [HrtfDataset::is_loaded].  Anything else (a corrupt file, arrays of the wrong shape,
/// positions that don't land on the unit sphere) is an error.
///
/// The writers rewrite the backing file and then reload from it, so the in-memory dataset always reflects the file.
/// Only SOFA files can be written.
#[derive(Clone, Debug)]
pub struct CipicHrtf {
    path: PathBuf,
    format: Option<SourceFormat>,
    dataset: HrtfDataset,
}

impl CipicHrtf {
    /// Open and fully load `path`.
    ///
    /// `sampling_rate` must be [SR]; nothing is resampled.
    pub fn open(path: impl Into<PathBuf>, sampling_rate: f64) -> Result<Self> {
        if sampling_rate != SR {
            return Err(Error::unsupported_sampling_rate(sampling_rate));
        }

        let path = path.into();
        let format = report_recoverable(SourceFormat::from_path(&path))?;
        let mut dataset = HrtfDataset::empty(sampling_rate);
        if let Some(format) = format {
            dataset.set_measurements(report_recoverable(format.load(&path))?);
        }

        Ok(Self {
            path,
            format,
            dataset,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The format, or `None` if the extension wasn't recognized.
    pub fn format(&self) -> Option<SourceFormat> {
        self.format
    }

    pub fn dataset(&self) -> &HrtfDataset {
        &self.dataset
    }

    pub fn into_dataset(self) -> HrtfDataset {
        self.dataset
    }

    /// Replace every impulse response in the backing file.
    ///
    /// `impulses` must have exactly the shape already in the file.  Returns `Ok(false)` if the file was missing or is
    /// not a SOFA file; this is logged.
    pub fn set_file_impulses(&mut self, impulses: &Array3<f64>) -> Result<bool> {
        self.persist(|path| sofa::write_impulses(path, impulses))
    }

    /// Replace the azimuth and elevation of every position in the backing file.
    ///
    /// The angles are written as given, in the file's own interaural-polar convention.  Distances are kept.  There must
    /// be one elevation and one azimuth per measurement already in the file.
    pub fn set_file_positions(&mut self, elevations: &[f64], azimuths: &[f64]) -> Result<bool> {
        self.persist(|path| sofa::write_positions(path, elevations, azimuths))
    }

    fn writable_path(&self) -> Result<&Path> {
        match self.format {
            Some(SourceFormat::Sofa) => Ok(&self.path),
            _ => Err(Error::unsupported_format(extension_of(&self.path), "sofa")),
        }
    }

    fn persist(&mut self, write: impl FnOnce(&Path) -> Result<()>) -> Result<bool> {
        let attempt = self.writable_path().and_then(write);
        if report_recoverable(attempt)?.is_none() {
            return Ok(false);
        }

        self.dataset.set_measurements(Some(sofa::load(&self.path)?));
        Ok(true)
    }
}

/// Create a new SOFA file at `output` from a template.
///
/// Every variable and attribute of `template` is copied verbatim, then the impulses and positions are replaced.
/// `elevations` and `azimuths` are interaural-polar and are converted to vertical-polar before they are written.  The
/// shapes must match the template's.
///
/// A missing template is logged and gives `Ok(false)`.
pub fn create_derived_dataset(
    template: &Path,
    output: &Path,
    impulses: &Array3<f64>,
    elevations: &[f64],
    azimuths: &[f64],
) -> Result<bool> {
    let derive = || -> Result<()> {
        let mut container = SofaContainer::read(template)?;
        let (elevations, azimuths) = interaural_polar_to_vertical_polar_many(elevations, azimuths)?;
        sofa::replace_impulses(&mut container, impulses)?;
        sofa::replace_positions(&mut container, &elevations, &azimuths)?;
        container.write(output)?;
        log::debug!(
            "Derived {} from template {}",
            output.display(),
            template.display()
        );
        Ok(())
    };

    Ok(report_recoverable(derive())?.is_some())
}
