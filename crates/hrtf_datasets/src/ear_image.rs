//! Ear photographs for CIPIC subjects, and the edge features computed from them.
//!
//! The photos were collected by hand and their names are not consistent, so finding one means trying a fixed list of
//! naming conventions in order.  The first file which can be read wins.
use std::path::{Path, PathBuf};

use image::{imageops, imageops::FilterType, DynamicImage, GrayImage};

const CROP_X: u32 = 50;
const CROP_Y: u32 = 50;
const CROP_SIZE: u32 = 450;
const FEATURE_SIZE: u32 = 64;

/// Sigma equivalent to a 5x5 Gaussian kernel with the sigma derived from the kernel size.
const BLUR_SIGMA: f32 = 1.1;

const CANNY_LOW: f32 = 50.0;
const CANNY_HIGH: f32 = 100.0;

/// Which ear a photo shows.  The discriminant is the side indicator used alongside the image.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum EarSide {
    Left = 0,
    Right = 1,
}

impl EarSide {
    pub fn index(self) -> usize {
        self as usize
    }
}

#[derive(Debug, thiserror::Error)]
pub enum EarImageError {
    #[error("No ear photo found for subject {subject}; tried {} paths", .tried.len())]
    NoPatternMatched { subject: u32, tried: Vec<PathBuf> },

    #[error("Image is {width}x{height}, which leaves nothing after cropping")]
    TooSmall { width: u32, height: u32 },
}

struct Candidate {
    /// File name under the subject's directory; `{n}` is replaced with the unpadded subject index.
    template: &'static str,
    side: EarSide,
}

const CANDIDATES: [Candidate; 8] = [
    Candidate {
        template: "{n}_left_side.jpg",
        side: EarSide::Left,
    },
    Candidate {
        template: "{n}_right_side.jpg",
        side: EarSide::Right,
    },
    Candidate {
        template: "0{n}_left.jpg",
        side: EarSide::Left,
    },
    Candidate {
        template: "0{n}_right.jpg",
        side: EarSide::Right,
    },
    Candidate {
        template: "0{n}_left.JPG",
        side: EarSide::Left,
    },
    Candidate {
        template: "0{n}_right.JPG",
        side: EarSide::Right,
    },
    Candidate {
        template: "Subject_{n}_left_side.jpg",
        side: EarSide::Left,
    },
    Candidate {
        template: "0{n}_left_2.jpg",
        side: EarSide::Left,
    },
];

/// Finds ear photos laid out as `root/Subject_{n}/<one of several names>`.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct EarPhotoLocator {
    root: PathBuf,
}

impl EarPhotoLocator {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn subject_dir(&self, subject: u32) -> PathBuf {
        self.root.join(format!("Subject_{}", subject))
    }

    /// Every path tried for `subject`, in the order they are tried.
    pub fn candidates(&self, subject: u32) -> Vec<(PathBuf, EarSide)> {
        let dir = self.subject_dir(subject);
        let n = subject.to_string();
        CANDIDATES
            .iter()
            .map(|c| (dir.join(c.template.replace("{n}", &n)), c.side))
            .collect()
    }

    /// Load the first readable photo for `subject`, along with which ear it shows.
    pub fn load(&self, subject: u32) -> Result<(DynamicImage, EarSide), EarImageError> {
        let mut tried = vec![];
        for (path, side) in self.candidates(subject) {
            match image::open(&path) {
                Ok(img) => {
                    log::debug!("Using ear photo {}", path.display());
                    return Ok((img, side));
                }
                Err(e) => {
                    log::trace!("Skipping {}: {}", path.display(), e);
                    tried.push(path);
                }
            }
        }

        Err(EarImageError::NoPatternMatched { subject, tried })
    }
}

/// Edge map of an ear photo: crop to the ear, shrink to 64x64, blur, then Canny.
pub fn edge_features(photo: &DynamicImage) -> Result<GrayImage, EarImageError> {
    let cropped = photo.crop_imm(CROP_X, CROP_Y, CROP_SIZE, CROP_SIZE);
    if cropped.width() == 0 || cropped.height() == 0 {
        return Err(EarImageError::TooSmall {
            width: photo.width(),
            height: photo.height(),
        });
    }

    let small = cropped
        .resize_exact(FEATURE_SIZE, FEATURE_SIZE, FilterType::Triangle)
        .to_luma8();
    let blurred = imageops::blur(&small, BLUR_SIGMA);
    Ok(imageproc::edges::canny(&blurred, CANNY_LOW, CANNY_HIGH))
}

#[cfg(test)]
mod tests {
    use super::*;

    use image::{Rgb, RgbImage};
    use pretty_assertions::assert_eq;

    fn write_photo(path: &Path) {
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        RgbImage::from_pixel(8, 8, Rgb([200, 100, 50]))
            .save(path)
            .unwrap();
    }

    #[test]
    fn test_candidate_order() {
        let loc = EarPhotoLocator::new("/photos");
        let names = loc
            .candidates(7)
            .into_iter()
            .map(|(p, side)| (p.file_name().unwrap().to_str().unwrap().to_string(), side))
            .collect::<Vec<_>>();
        assert_eq!(
            names,
            vec![
                ("7_left_side.jpg".to_string(), EarSide::Left),
                ("7_right_side.jpg".to_string(), EarSide::Right),
                ("07_left.jpg".to_string(), EarSide::Left),
                ("07_right.jpg".to_string(), EarSide::Right),
                ("07_left.JPG".to_string(), EarSide::Left),
                ("07_right.JPG".to_string(), EarSide::Right),
                ("Subject_7_left_side.jpg".to_string(), EarSide::Left),
                ("07_left_2.jpg".to_string(), EarSide::Left),
            ]
        );
        assert!(loc
            .candidates(7)
            .iter()
            .all(|(p, _)| p.starts_with("/photos/Subject_7")));
    }

    #[test]
    fn test_first_readable_candidate_wins() {
        let dir = tempfile::tempdir().unwrap();
        let loc = EarPhotoLocator::new(dir.path());
        write_photo(&loc.subject_dir(12).join("012_right.jpg"));
        write_photo(&loc.subject_dir(12).join("012_left_2.jpg"));

        let (img, side) = loc.load(12).unwrap();
        assert_eq!(side, EarSide::Right);
        assert_eq!(side.index(), 1);
        assert_eq!((img.width(), img.height()), (8, 8));
    }

    #[test]
    fn test_unreadable_files_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let loc = EarPhotoLocator::new(dir.path());
        let bogus = loc.subject_dir(3).join("3_left_side.jpg");
        std::fs::create_dir_all(bogus.parent().unwrap()).unwrap();
        std::fs::write(&bogus, b"not a jpeg").unwrap();
        write_photo(&loc.subject_dir(3).join("Subject_3_left_side.jpg"));

        let (_, side) = loc.load(3).unwrap();
        assert_eq!(side, EarSide::Left);
    }

    #[test]
    fn test_no_pattern_matched() {
        let dir = tempfile::tempdir().unwrap();
        let loc = EarPhotoLocator::new(dir.path());
        match loc.load(99) {
            Err(EarImageError::NoPatternMatched { subject, tried }) => {
                assert_eq!(subject, 99);
                assert_eq!(tried.len(), 8);
            }
            other => panic!("Expected NoPatternMatched, got {:?}", other.map(|(_, s)| s)),
        }
    }

    #[test]
    fn test_edge_features_of_a_square() {
        let mut img = RgbImage::from_pixel(600, 600, Rgb([0, 0, 0]));
        for y in 150..400 {
            for x in 150..400 {
                img.put_pixel(x, y, Rgb([255, 255, 255]));
            }
        }

        let edges = edge_features(&DynamicImage::ImageRgb8(img)).unwrap();
        assert_eq!(edges.dimensions(), (64, 64));
        assert!(edges.pixels().any(|p| p.0[0] == 255));
        // The middle of the square is flat.
        assert_eq!(edges.get_pixel(32, 32).0[0], 0);
    }

    #[test]
    fn test_edge_features_of_a_flat_image() {
        let img = RgbImage::from_pixel(600, 600, Rgb([90, 90, 90]));
        let edges = edge_features(&DynamicImage::ImageRgb8(img)).unwrap();
        assert!(edges.pixels().all(|p| p.0[0] == 0));
    }

    #[test]
    fn test_tiny_image_is_rejected() {
        let img = RgbImage::from_pixel(40, 40, Rgb([1, 2, 3]));
        assert!(matches!(
            edge_features(&DynamicImage::ImageRgb8(img)),
            Err(EarImageError::TooSmall {
                width: 40,
                height: 40
            })
        ));
    }
}
