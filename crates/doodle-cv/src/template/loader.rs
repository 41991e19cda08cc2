//! Spring template lookup on disk

use super::Template;
use crate::error::VisionError;
use crate::utils::{is_image_file, ImageUtils};
use crate::Result;
use anyhow::Context;
use opencv::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Finds template images by name in an ordered list of directories.
///
/// A template named `Spring` matches `Spring.png`, `spring.JPG` or `_spring.bmp`: names are
/// compared without case, a leading underscore is ignored, and any image extension is accepted.
/// Earlier directories win; inside a directory a file without underscore wins.
#[derive(Debug, Clone, Default)]
pub struct TemplateLoader {
    template_dirs: Vec<PathBuf>,
}

impl TemplateLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add template directory
    pub fn add_template_dir<P: AsRef<Path>>(mut self, dir: P) -> Self {
        self.template_dirs.push(dir.as_ref().to_path_buf());
        self
    }

    /// Load template by name, `None` if no directory holds it
    pub fn load_template(&self, name: &str) -> Result<Option<Template>> {
        let Some(path) = self.locate(name) else {
            return Ok(None);
        };

        let image = ImageUtils::load_grayscale(&path)
            .with_context(|| format!("Failed to load template: {:?}", path))?;
        if image.empty() {
            return Err(VisionError::EmptyImage(path).into());
        }

        debug!(template = name, path = %path.display(), "template loaded");
        Template::new(name, image).map(Some)
    }

    /// Load a template that must exist
    pub fn require(&self, name: &str) -> Result<Template> {
        self.load_template(name)?
            .ok_or_else(|| VisionError::TemplateNotFound(name.to_string()).into())
    }

    fn locate(&self, name: &str) -> Option<PathBuf> {
        self.template_dirs
            .iter()
            .find_map(|dir| Self::locate_in(dir, name))
    }

    fn locate_in(dir: &Path, name: &str) -> Option<PathBuf> {
        let mut matches: Vec<(bool, PathBuf)> = fs::read_dir(dir)
            .ok()?
            .flatten()
            .map(|entry| entry.path())
            .filter(|path| is_image_file(path))
            .filter_map(|path| {
                let stem = path.file_stem()?.to_string_lossy().into_owned();
                let prefixed = stem.starts_with('_');
                stem.trim_start_matches('_')
                    .eq_ignore_ascii_case(name)
                    .then_some((prefixed, path))
            })
            .collect();

        matches.sort();
        matches.into_iter().next().map(|(_, path)| path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use opencv::core::{Mat, Scalar, CV_8UC1};

    fn scratch_dir(tag: &str) -> Result<PathBuf> {
        let dir = std::env::temp_dir().join(format!("doodle-templates-{}-{}", tag, std::process::id()));
        fs::create_dir_all(&dir)?;
        Ok(dir)
    }

    #[test]
    fn test_case_insensitive_lookup() -> Result<()> {
        let dir = scratch_dir("case")?;
        let image = Mat::new_rows_cols_with_default(20, 17, CV_8UC1, Scalar::all(128.0))?;
        ImageUtils::save_image(&image, dir.join("spring.png"))?;

        let loader = TemplateLoader::new().add_template_dir(&dir);
        let template = loader.require("Spring")?;
        fs::remove_dir_all(&dir)?;

        assert_eq!((template.width(), template.height()), (17, 20));
        Ok(())
    }

    #[test]
    fn test_plain_name_preferred_over_underscore() -> Result<()> {
        let dir = scratch_dir("prefix")?;
        let small = Mat::new_rows_cols_with_default(8, 8, CV_8UC1, Scalar::all(128.0))?;
        let large = Mat::new_rows_cols_with_default(20, 17, CV_8UC1, Scalar::all(128.0))?;
        ImageUtils::save_image(&small, dir.join("_Spring.png"))?;
        ImageUtils::save_image(&large, dir.join("SPRING.bmp"))?;
        std::fs::write(dir.join("spring.txt"), b"not an image")?;

        let template = TemplateLoader::new().add_template_dir(&dir).require("spring")?;
        fs::remove_dir_all(&dir)?;

        assert_eq!(template.width(), 17);
        Ok(())
    }

    #[test]
    fn test_missing_template() -> Result<()> {
        let dir = scratch_dir("missing")?;
        let loader = TemplateLoader::new().add_template_dir(&dir);

        assert!(loader.load_template("Spring")?.is_none());
        let err = loader.require("Spring").unwrap_err();
        fs::remove_dir_all(&dir)?;

        assert!(matches!(
            err.downcast_ref::<VisionError>(),
            Some(VisionError::TemplateNotFound(_))
        ));
        Ok(())
    }
}
