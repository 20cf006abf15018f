//! Validity masks as grayscale images.
//!
//! Mask bytes already use the 0 / 128 / 255 encoding, so the conversion is
//! a copy; the helpers exist to keep `image` out of the core crates.

use std::path::Path;

use image::GrayImage;

use crate::plane::ValidPixelMask;

#[derive(thiserror::Error, Debug)]
pub enum MaskImageError {
    #[error("mask of {width}x{height} does not fit an image")]
    Dimensions { width: usize, height: usize },
    #[error(transparent)]
    Image(#[from] image::ImageError),
}

/// Copy `mask` into an 8-bit grayscale image of the same size.
pub fn mask_to_gray_image(mask: &ValidPixelMask) -> Result<GrayImage, MaskImageError> {
    let dims_err = || MaskImageError::Dimensions {
        width: mask.width,
        height: mask.height,
    };
    let width = u32::try_from(mask.width).map_err(|_| dims_err())?;
    let height = u32::try_from(mask.height).map_err(|_| dims_err())?;
    GrayImage::from_raw(width, height, mask.as_bytes().to_vec()).ok_or_else(dims_err)
}

/// Write `mask` to `path`; the format follows the file extension.
pub fn write_mask_image(
    mask: &ValidPixelMask,
    path: impl AsRef<Path>,
) -> Result<(), MaskImageError> {
    mask_to_gray_image(mask)?.save(path)?;
    Ok(())
}
