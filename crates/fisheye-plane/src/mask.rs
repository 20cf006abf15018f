use serde::{Deserialize, Serialize};

use fisheye_core::RasterSize;

/// Classification of one output texel.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaskTexel {
    /// Does not survive the project/unproject round trip.
    Invalid,
    /// Geometrically valid but outside the calibrated-plane bounds.
    DeadZone,
    /// Valid and inside the bounds.
    Valid,
}

impl MaskTexel {
    pub const INVALID: u8 = 0;
    pub const DEAD_ZONE: u8 = 128;
    pub const VALID: u8 = 255;

    #[inline]
    pub fn to_u8(self) -> u8 {
        match self {
            MaskTexel::Invalid => Self::INVALID,
            MaskTexel::DeadZone => Self::DEAD_ZONE,
            MaskTexel::Valid => Self::VALID,
        }
    }

    /// Decode a mask byte. Unknown values read as invalid.
    #[inline]
    pub fn from_u8(value: u8) -> Self {
        match value {
            Self::VALID => MaskTexel::Valid,
            Self::DEAD_ZONE => MaskTexel::DeadZone,
            _ => MaskTexel::Invalid,
        }
    }
}

/// Single-channel `width x height` validity bitmap, row-major.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidPixelMask {
    pub width: usize,
    pub height: usize,
    pub data: Vec<u8>, // len = w*h
}

impl ValidPixelMask {
    pub(crate) fn from_raw(size: RasterSize, data: Vec<u8>) -> Self {
        debug_assert_eq!(data.len(), size.area());
        Self {
            width: size.width as usize,
            height: size.height as usize,
            data,
        }
    }

    #[inline]
    pub fn size(&self) -> RasterSize {
        RasterSize::new(self.width as u32, self.height as u32)
    }

    /// Texel at integer raster coordinates, `None` outside the raster.
    #[inline]
    pub fn get(&self, x: usize, y: usize) -> Option<MaskTexel> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(MaskTexel::from_u8(self.data[y * self.width + x]))
    }

    /// Texel containing the continuous raster point `(x, y)`.
    pub fn at_point(&self, x: f64, y: f64) -> Option<MaskTexel> {
        if !(x.is_finite() && y.is_finite()) || x < 0.0 || y < 0.0 {
            return None;
        }
        self.get(x.floor() as usize, y.floor() as usize)
    }

    /// Number of texels with the given classification.
    pub fn count(&self, texel: MaskTexel) -> usize {
        let value = texel.to_u8();
        self.data.iter().filter(|&&t| t == value).count()
    }

    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }
}
