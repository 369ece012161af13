use std::path::{Path, PathBuf};

use crate::config::{SR, SUBJECT_INDEX_WIDTH};
use crate::error::Result;
use crate::source::{CipicHrtf, SourceFormat};

/// Builds paths to subjects in a directory laid out like the CIPIC distribution:
///
/// - `root/subject_007/hrir_final.mat`
/// - `root/subject_007.sofa`
///
/// This does no I/O until one of the `open` methods is called.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DatasetLocator {
    root: PathBuf,
}

impl DatasetLocator {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The zero-padded subject id, e.g. `7` to `"007"`.  Indices with more digits than the padding are left alone.
    pub fn subject_id(subject: u32) -> String {
        format!("{:0width$}", subject, width = SUBJECT_INDEX_WIDTH)
    }

    pub fn mat_path(&self, subject: u32) -> PathBuf {
        self.root
            .join(format!("subject_{}", Self::subject_id(subject)))
            .join("hrir_final.mat")
    }

    pub fn sofa_path(&self, subject: u32) -> PathBuf {
        self.root
            .join(format!("subject_{}.sofa", Self::subject_id(subject)))
    }

    pub fn path(&self, subject: u32, format: SourceFormat) -> PathBuf {
        match format {
            SourceFormat::Mat => self.mat_path(subject),
            SourceFormat::Sofa => self.sofa_path(subject),
        }
    }

    /// Open a subject at the fixed sampling rate.  See [CipicHrtf::open] for how failures are handled.
    pub fn open(&self, subject: u32, format: SourceFormat) -> Result<CipicHrtf> {
        CipicHrtf::open(self.path(subject, format), SR)
    }

    pub fn open_mat(&self, subject: u32) -> Result<CipicHrtf> {
        self.open(subject, SourceFormat::Mat)
    }

    pub fn open_sofa(&self, subject: u32) -> Result<CipicHrtf> {
        self.open(subject, SourceFormat::Sofa)
    }
}
