use std::collections::HashMap;
use std::path::{Path, PathBuf};

use netcdf3::{DataSet, DataVector, FileReader, FileWriter, Version};

use crate::error::{Error, Result};
use crate::sofa::SofaError;

/// A whole SOFA file held in memory: the definition (dimensions, variables, attributes) plus the data of every
/// variable.
///
/// Files are small enough that reading everything is simpler than tracking which variables a caller will touch, and it
/// is what lets us rewrite a file with only some variables changed.
pub(crate) struct SofaContainer {
    definition: DataSet,
    fields: HashMap<String, DataVector>,
}

fn read_error(path: &Path, e: impl std::fmt::Debug) -> SofaError {
    SofaError::Read {
        path: path.to_path_buf(),
        message: format!("{:?}", e),
    }
}

fn write_error(path: &Path, e: impl std::fmt::Debug) -> SofaError {
    SofaError::Write {
        path: path.to_path_buf(),
        message: format!("{:?}", e),
    }
}

fn to_f64(data: &DataVector) -> Vec<f64> {
    match data {
        DataVector::I8(v) => v.iter().map(|&x| x as f64).collect(),
        DataVector::U8(v) => v.iter().map(|&x| x as f64).collect(),
        DataVector::I16(v) => v.iter().map(|&x| x as f64).collect(),
        DataVector::I32(v) => v.iter().map(|&x| x as f64).collect(),
        DataVector::F32(v) => v.iter().map(|&x| x as f64).collect(),
        DataVector::F64(v) => v.clone(),
    }
}

fn storage_name(data: &DataVector) -> &'static str {
    match data {
        DataVector::I8(_) => "i8",
        DataVector::U8(_) => "u8",
        DataVector::I16(_) => "i16",
        DataVector::I32(_) => "i32",
        DataVector::F32(_) => "f32",
        DataVector::F64(_) => "f64",
    }
}

/// Narrow every value to an integer type, failing on the first one which would be truncated or clamped.
fn narrow<T: TryFrom<i64>>(
    field: &str,
    storage: &'static str,
    data: Vec<f64>,
) -> Result<Vec<T>, SofaError> {
    data.into_iter()
        .map(|x| {
            let unrepresentable = || SofaError::Unrepresentable {
                field: field.to_string(),
                value: x,
                storage,
            };
            // The range check keeps the cast below exact; i64 holds every integer type netCDF-3 has.
            if x.fract() != 0.0 || !(i64::MIN as f64..=i64::MAX as f64).contains(&x) {
                return Err(unrepresentable());
            }
            T::try_from(x as i64).map_err(|_| unrepresentable())
        })
        .collect()
}

/// Convert to the storage type of `like`, so that rewriting a variable never changes its type on disk.
///
/// Integer storage only accepts integral values in range.  Floats narrowed to f32 lose precision but never fail.
fn from_f64_like(field: &str, like: &DataVector, data: Vec<f64>) -> Result<DataVector, SofaError> {
    let storage = storage_name(like);
    Ok(match like {
        DataVector::I8(_) => DataVector::I8(narrow(field, storage, data)?),
        DataVector::U8(_) => DataVector::U8(narrow(field, storage, data)?),
        DataVector::I16(_) => DataVector::I16(narrow(field, storage, data)?),
        DataVector::I32(_) => DataVector::I32(narrow(field, storage, data)?),
        DataVector::F32(_) => DataVector::F32(data.into_iter().map(|x| x as f32).collect()),
        DataVector::F64(_) => DataVector::F64(data),
    })
}

impl SofaContainer {
    pub(crate) fn read(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(Error::file_not_found(path));
        }

        let mut reader = FileReader::open(path).map_err(|e| read_error(path, e))?;
        let fields = reader.read_all_vars().map_err(|e| read_error(path, e))?;
        let (definition, _) = reader.close();

        Ok(Self { definition, fields })
    }

    pub(crate) fn has_field(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    /// Dimension sizes of a variable, outermost first.
    pub(crate) fn shape(&self, name: &str) -> Result<Vec<usize>> {
        let var = self
            .definition
            .get_var(name)
            .ok_or_else(|| SofaError::MissingField(name.to_string()))?;
        Ok(var.get_dims().iter().map(|d| d.size()).collect())
    }

    /// The data of a variable in row-major order, converted to f64.
    pub(crate) fn field_f64(&self, name: &str) -> Result<Vec<f64>> {
        let data = self
            .fields
            .get(name)
            .ok_or_else(|| SofaError::MissingField(name.to_string()))?;
        Ok(to_f64(data))
    }

    /// Replace the data of a variable.  The element count must stay the same.
    pub(crate) fn replace_f64(&mut self, name: &str, data: Vec<f64>) -> Result<()> {
        let shape = self.shape(name)?;
        let existing = self
            .fields
            .get_mut(name)
            .ok_or_else(|| SofaError::MissingField(name.to_string()))?;

        let expected: usize = shape.iter().product();
        if data.len() != expected {
            return Err(Error::shape_mismatch(name, shape, vec![data.len()]));
        }

        *existing = from_f64_like(name, existing, data)?;
        Ok(())
    }

    /// Write everything out to `path`.
    ///
    /// The data goes to a sibling file first, which is then renamed over `path`, so a failed write leaves any existing
    /// file alone.
    pub(crate) fn write(&self, path: &Path) -> Result<()> {
        let mut partial = path.as_os_str().to_owned();
        partial.push(".partial");
        let partial = PathBuf::from(partial);

        if let Err(e) = self.write_to(&partial) {
            let _ = std::fs::remove_file(&partial);
            return Err(e);
        }
        if let Err(e) = std::fs::rename(&partial, path) {
            let _ = std::fs::remove_file(&partial);
            return Err(e.into());
        }
        Ok(())
    }

    fn write_to(&self, path: &Path) -> Result<()> {
        let mut writer = FileWriter::open(path).map_err(|e| write_error(path, e))?;
        writer
            .set_def(&self.definition, Version::Classic, 0)
            .map_err(|e| write_error(path, e))?;

        for (name, data) in self.fields.iter() {
            let res = match data {
                DataVector::I8(v) => writer.write_var_i8(name, v),
                DataVector::U8(v) => writer.write_var_u8(name, v),
                DataVector::I16(v) => writer.write_var_i16(name, v),
                DataVector::I32(v) => writer.write_var_i32(name, v),
                DataVector::F32(v) => writer.write_var_f32(name, v),
                DataVector::F64(v) => writer.write_var_f64(name, v),
            };
            res.map_err(|e| write_error(path, e))?;
        }

        writer.close().map_err(|e| write_error(path, e))?;
        Ok(())
    }
}
