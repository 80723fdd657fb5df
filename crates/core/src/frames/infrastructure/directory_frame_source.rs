use std::fs;
use std::path::{Path, PathBuf};

use crate::frames::domain::frame_source::{FrameSource, FrameSourceError};
use crate::shared::constants::IMAGE_EXTENSIONS;
use crate::shared::frame::Frame;

/// Reads frames from `<root>/<webcam id>/<frame files>` using the `image` crate.
///
/// Every immediate sub-directory of the root is one webcam; plain files in the
/// root are ignored.
pub struct DirectoryFrameSource {
    root: PathBuf,
}

impl DirectoryFrameSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Image files of one webcam, sorted by file name.
    fn frame_paths(&self, id: &str) -> Result<Vec<PathBuf>, FrameSourceError> {
        let dir = self.root.join(id);
        if !dir.is_dir() {
            return Err(FrameSourceError::UnknownIdentifier(id.to_string()));
        }
        let entries = fs::read_dir(&dir).map_err(|e| FrameSourceError::List {
            path: dir.clone(),
            source: e,
        })?;

        let mut paths: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| path.is_file() && is_image(path))
            .collect();
        paths.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
        Ok(paths)
    }
}

impl FrameSource for DirectoryFrameSource {
    fn list_identifiers(&self) -> Result<Vec<String>, FrameSourceError> {
        let entries = fs::read_dir(&self.root).map_err(|e| FrameSourceError::List {
            path: self.root.clone(),
            source: e,
        })?;

        let mut ids: Vec<String> = entries
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.path().is_dir())
            .filter_map(|entry| entry.file_name().into_string().ok())
            .collect();
        ids.sort();
        Ok(ids)
    }

    fn frames(&self, id: &str) -> Result<Vec<Frame>, FrameSourceError> {
        let mut frames = Vec::new();
        for path in self.frame_paths(id)? {
            match image::open(&path) {
                Ok(img) => {
                    let gray = img.to_luma8();
                    let (width, height) = gray.dimensions();
                    frames.push(Frame::new(gray.into_raw(), width, height, 1, frames.len()));
                }
                Err(e) => log::debug!("Skipping undecodable frame {}: {e}", path.display()),
            }
        }
        Ok(frames)
    }

    fn representative_frame(&self, id: &str) -> Result<Option<Frame>, FrameSourceError> {
        for path in self.frame_paths(id)? {
            if let Ok(img) = image::open(&path) {
                let rgb = img.to_rgb8();
                let (width, height) = rgb.dimensions();
                return Ok(Some(Frame::new(rgb.into_raw(), width, height, 3, 0)));
            }
        }
        Ok(None)
    }
}

fn is_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| IMAGE_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_gray_image(path: &Path, value: u8) {
        let img = image::GrayImage::from_pixel(8, 6, image::Luma([value]));
        img.save(path).unwrap();
    }

    fn webcam_dir(root: &Path, id: &str) -> PathBuf {
        let dir = root.join(id);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_list_identifiers_returns_subdirectories_only() {
        let tmp = TempDir::new().unwrap();
        webcam_dir(tmp.path(), "cam_b");
        webcam_dir(tmp.path(), "cam_a");
        fs::write(tmp.path().join("notes.txt"), b"not a webcam").unwrap();

        let source = DirectoryFrameSource::new(tmp.path());
        assert_eq!(source.list_identifiers().unwrap(), vec!["cam_a", "cam_b"]);
    }

    #[test]
    fn test_list_identifiers_missing_root_is_error() {
        let source = DirectoryFrameSource::new("/nonexistent/frames");
        assert!(matches!(
            source.list_identifiers(),
            Err(FrameSourceError::List { .. })
        ));
    }

    #[test]
    fn test_frames_are_lexicographic_and_grayscale() {
        let tmp = TempDir::new().unwrap();
        let dir = webcam_dir(tmp.path(), "cam");
        write_gray_image(&dir.join("0002.png"), 20);
        write_gray_image(&dir.join("0001.png"), 10);
        write_gray_image(&dir.join("0003.png"), 30);

        let frames = DirectoryFrameSource::new(tmp.path()).frames("cam").unwrap();

        assert_eq!(frames.len(), 3);
        let firsts: Vec<u8> = frames.iter().map(|f| f.data()[0]).collect();
        assert_eq!(firsts, vec![10, 20, 30]);
        assert!(frames.iter().all(|f| f.channels() == 1));
        assert_eq!(frames[2].index(), 2);
        assert_eq!((frames[0].width(), frames[0].height()), (8, 6));
    }

    #[test]
    fn test_frames_skip_non_images_and_corrupt_files() {
        let tmp = TempDir::new().unwrap();
        let dir = webcam_dir(tmp.path(), "cam");
        write_gray_image(&dir.join("0001.png"), 10);
        fs::write(dir.join("0002.png"), b"definitely not a png").unwrap();
        fs::write(dir.join("meta.json"), b"{}").unwrap();

        let frames = DirectoryFrameSource::new(tmp.path()).frames("cam").unwrap();
        assert_eq!(frames.len(), 1);
    }

    #[test]
    fn test_frames_unknown_identifier_is_error() {
        let tmp = TempDir::new().unwrap();
        let source = DirectoryFrameSource::new(tmp.path());
        assert!(matches!(
            source.frames("missing"),
            Err(FrameSourceError::UnknownIdentifier(_))
        ));
    }

    #[test]
    fn test_representative_frame_is_first_in_colour() {
        let tmp = TempDir::new().unwrap();
        let dir = webcam_dir(tmp.path(), "cam");
        write_gray_image(&dir.join("b.png"), 200);
        write_gray_image(&dir.join("a.png"), 100);

        let frame = DirectoryFrameSource::new(tmp.path())
            .representative_frame("cam")
            .unwrap()
            .unwrap();
        assert_eq!(frame.channels(), 3);
        assert_eq!(&frame.data()[..3], &[100, 100, 100]);
    }

    #[test]
    fn test_representative_frame_empty_webcam() {
        let tmp = TempDir::new().unwrap();
        webcam_dir(tmp.path(), "cam");
        let source = DirectoryFrameSource::new(tmp.path());
        assert!(source.representative_frame("cam").unwrap().is_none());
    }
}
