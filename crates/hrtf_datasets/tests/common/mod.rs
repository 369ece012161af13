//! Fixture writers shared by the integration tests.
#![allow(dead_code)]
use std::path::Path;

use ndarray::{Array2, Array3};
use netcdf3::{DataSet, FileWriter, Version};

const MI_INT8: u32 = 1;
const MI_INT32: u32 = 5;
const MI_UINT32: u32 = 6;
const MI_DOUBLE: u32 = 9;
const MI_MATRIX: u32 = 14;
const MX_DOUBLE_CLASS: u32 = 6;

pub const AZIMUTHS: usize = 25;
pub const ELEVATIONS: usize = 50;

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// A level 5 data element, padded to 8 bytes.
fn element(data_type: u32, payload: &[u8]) -> Vec<u8> {
    let mut out = vec![];
    out.extend(data_type.to_le_bytes());
    out.extend((payload.len() as u32).to_le_bytes());
    out.extend(payload);
    while out.len() % 8 != 0 {
        out.push(0);
    }
    out
}

fn double_matrix(name: &str, dims: &[usize], column_major: &[f64]) -> Vec<u8> {
    assert_eq!(dims.iter().product::<usize>(), column_major.len());

    let flags = [MX_DOUBLE_CLASS, 0]
        .iter()
        .flat_map(|x| x.to_le_bytes())
        .collect::<Vec<u8>>();
    let dims = dims
        .iter()
        .flat_map(|&d| (d as i32).to_le_bytes())
        .collect::<Vec<u8>>();
    let data = column_major
        .iter()
        .flat_map(|x| x.to_le_bytes())
        .collect::<Vec<u8>>();

    let mut body = vec![];
    body.extend(element(MI_UINT32, &flags));
    body.extend(element(MI_INT32, &dims));
    body.extend(element(MI_INT8, name.as_bytes()));
    body.extend(element(MI_DOUBLE, &data));
    element(MI_MATRIX, &body)
}

/// Write an uncompressed little-endian level 5 MAT file holding double arrays.
pub fn write_mat(path: &Path, vars: &[(&str, Vec<usize>, Vec<f64>)]) {
    let mut out = b"MATLAB 5.0 MAT-file, Platform: test, Created by: hrtf_datasets".to_vec();
    out.resize(116, b' ');
    out.extend([0u8; 8]);
    out.extend(0x0100u16.to_le_bytes());
    out.extend(b"IM");
    for (name, dims, data) in vars {
        out.extend(double_matrix(name, dims, data));
    }
    std::fs::write(path, out).unwrap();
}

/// The sample stored at one grid point.  Right is the negation of left.
pub fn grid_value(azimuth: usize, elevation: usize, sample: usize) -> f64 {
    1000.0 * azimuth as f64 + elevation as f64 + 0.001 * sample as f64
}

/// A CIPIC grid in the on-disk `[azimuth, elevation, time]` layout, column-major.
pub fn cipic_grid(samples: usize, sign: f64) -> Vec<f64> {
    let mut out = vec![];
    for t in 0..samples {
        for e in 0..ELEVATIONS {
            for a in 0..AZIMUTHS {
                out.push(sign * grid_value(a, e, t));
            }
        }
    }
    out
}

/// The same grid in `[time, azimuth, elevation]` layout, column-major.
pub fn cipic_grid_time_first(samples: usize, sign: f64) -> Vec<f64> {
    let mut out = vec![];
    for e in 0..ELEVATIONS {
        for a in 0..AZIMUTHS {
            for t in 0..samples {
                out.push(sign * grid_value(a, e, t));
            }
        }
    }
    out
}

pub fn write_cipic_mat(path: &Path, samples: usize) {
    let dims = vec![AZIMUTHS, ELEVATIONS, samples];
    write_mat(
        path,
        &[
            ("hrir_l", dims.clone(), cipic_grid(samples, 1.0)),
            ("hrir_r", dims, cipic_grid(samples, -1.0)),
        ],
    );
}

/// Listener position stored in every fixture, to check that untouched variables survive rewrites.
pub const LISTENER_POSITION: [f32; 3] = [0.0, 0.0, 1.25];

/// Write a minimal SimpleFreeFieldHRIR file.
///
/// `positions` is `[M, 3]` with columns azimuth, elevation, distance.
pub fn write_sofa(path: &Path, impulses: &Array3<f64>, positions: &Array2<f64>, sampling_rate: f64) {
    let (m, r, n) = impulses.dim();
    assert_eq!(positions.dim(), (m, 3));

    let mut data_set = DataSet::new();
    data_set.add_fixed_dim("M", m).unwrap();
    data_set.add_fixed_dim("R", r).unwrap();
    data_set.add_fixed_dim("N", n).unwrap();
    data_set.add_fixed_dim("C", 3).unwrap();
    data_set.add_fixed_dim("I", 1).unwrap();
    data_set.add_var_f64("Data.IR", &["M", "R", "N"]).unwrap();
    data_set.add_var_f64("SourcePosition", &["M", "C"]).unwrap();
    data_set.add_var_f64("Data.SamplingRate", &["I"]).unwrap();
    data_set.add_var_f32("ListenerPosition", &["I", "C"]).unwrap();

    let mut writer = FileWriter::open(path).unwrap();
    writer.set_def(&data_set, Version::Classic, 0).unwrap();
    writer
        .write_var_f64("Data.IR", &impulses.iter().copied().collect::<Vec<_>>())
        .unwrap();
    writer
        .write_var_f64("SourcePosition", &positions.iter().copied().collect::<Vec<_>>())
        .unwrap();
    writer
        .write_var_f64("Data.SamplingRate", &[sampling_rate])
        .unwrap();
    writer
        .write_var_f32("ListenerPosition", &LISTENER_POSITION)
        .unwrap();
    writer.close().unwrap();
}

/// Impulses where every sample encodes its own index.
pub fn indexed_impulses(measurements: usize, samples: usize) -> Array3<f64> {
    Array3::from_shape_fn((measurements, 2, samples), |(m, c, s)| {
        (m * 100 + c * 10 + s) as f64
    })
}

/// Read back one variable of a SOFA file as f64.
pub fn read_sofa_f64(path: &Path, name: &str) -> Vec<f64> {
    let mut reader = netcdf3::FileReader::open(path).unwrap();
    reader.read_var_f64(name).unwrap()
}

pub fn read_sofa_f32(path: &Path, name: &str) -> Vec<f32> {
    let mut reader = netcdf3::FileReader::open(path).unwrap();
    reader.read_var_f32(name).unwrap()
}

pub fn assert_close(got: f64, expected: f64) {
    assert!(
        (got - expected).abs() < 1e-9,
        "got {got}, expected {expected}"
    );
}
