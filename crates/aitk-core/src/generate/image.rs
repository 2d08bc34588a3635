//! Saving generated images.
//!
//! The generation loop owns the image type. Anything that can write itself to
//! a path can be handed to [`GenerateImageConfig::save_image`].
//!
//! [`GenerateImageConfig::save_image`]: super::GenerateImageConfig::save_image

use image::{DynamicImage, RgbImage, RgbaImage};
use std::path::Path;

use crate::error::Result;

/// An image that can be written to disk. The format follows the path's
/// extension.
pub trait SaveImage {
    fn save_to(&self, path: &Path) -> Result<()>;
}

impl SaveImage for DynamicImage {
    fn save_to(&self, path: &Path) -> Result<()> {
        self.save(path)?;
        Ok(())
    }
}

impl SaveImage for RgbImage {
    fn save_to(&self, path: &Path) -> Result<()> {
        self.save(path)?;
        Ok(())
    }
}

impl SaveImage for RgbaImage {
    fn save_to(&self, path: &Path) -> Result<()> {
        self.save(path)?;
        Ok(())
    }
}
