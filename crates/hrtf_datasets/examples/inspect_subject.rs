//! Print a summary of one CIPIC subject, and optionally the edge map of their ear photo.
//!
//! Usage: cargo run --example inspect_subject <dataset_root> <subject> [mat|sofa] [photo_root]
use anyhow::{anyhow, Context, Result};

use hrtf_datasets::coordinates::vertical_polar_to_cipic_polar;
use hrtf_datasets::ear_image::{edge_features, EarPhotoLocator};
use hrtf_datasets::{Channel, DatasetLocator, SourceFormat};

fn main() -> Result<()> {
    env_logger::init();

    let args = std::env::args().collect::<Vec<_>>();
    let root = args
        .get(1)
        .ok_or_else(|| anyhow!("Specify the dataset root as the first argument"))?;
    let subject: u32 = args
        .get(2)
        .ok_or_else(|| anyhow!("Specify a subject index as the second argument"))?
        .parse()
        .context("Subject index must be a number")?;
    let format = match args.get(3).map(|s| s.as_str()) {
        None | Some("sofa") => SourceFormat::Sofa,
        Some("mat") => SourceFormat::Mat,
        Some(other) => return Err(anyhow!("Unknown format {}", other)),
    };

    let hrtf = DatasetLocator::new(root).open(subject, format)?;
    let dataset = hrtf.dataset();
    if !dataset.is_loaded() {
        println!("Nothing loaded from {}", hrtf.path().display());
        return Ok(());
    }

    let positions = dataset.positions().unwrap_or_default();
    println!(
        "{}: {} measurements of {} samples at {} Hz",
        hrtf.path().display(),
        positions.len(),
        dataset.measurements().map(|m| m.impulse_length()).unwrap_or(0),
        dataset.sampling_rate()
    );

    for (i, p) in positions.iter().enumerate().step_by(positions.len().div_ceil(10).max(1)) {
        let (cipic_el, cipic_az) = vertical_polar_to_cipic_polar(p.elevation, p.azimuth)?;
        let peak = |ch| {
            dataset
                .impulse(i, ch)
                .map(|ir| ir.iter().fold(0.0f64, |acc, &x| acc.max(x.abs())))
                .unwrap_or(0.0)
        };
        println!(
            "  #{:<5} el {:>8.3} az {:>8.3} (cipic el {:>8.3} az {:>8.3}) peak L {:.4} R {:.4}",
            i,
            p.elevation,
            p.azimuth,
            cipic_el,
            cipic_az,
            peak(Channel::Left),
            peak(Channel::Right)
        );
    }

    if let Some(photo_root) = args.get(4) {
        let (photo, side) = EarPhotoLocator::new(photo_root).load(subject)?;
        let edges = edge_features(&photo)?;
        let count = edges.pixels().filter(|p| p.0[0] > 0).count();
        println!(
            "Ear photo ({:?}): {} of {} pixels are edges",
            side,
            count,
            edges.width() * edges.height()
        );
    }

    Ok(())
}
