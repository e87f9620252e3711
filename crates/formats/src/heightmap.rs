use std::fmt;
use std::path::{Path, PathBuf};

use foundation::math::{
    MOON_LOLA_MAX_OFFSET_M, MOON_LOLA_MIN_OFFSET_M, MOON_RADIUS_M, Vec3, normalized_lat_lon,
    wrap_index,
};
use image::RgbImage;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// The source topography images stack three single-channel copies of the map
/// vertically, so only the top `rows / STACKED_COPIES` rows are one map.
pub const STACKED_COPIES: u32 = 3;

/// Value returned for a lookup that falls outside the pixel grid.
pub const OUT_OF_GRID_SAMPLE: f64 = 0.5;

/// Physical radii that the darkest and brightest pixel values map to.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeightRange {
    pub min_m: f64,
    pub max_m: f64,
}

impl HeightRange {
    /// Dynamic range documented for the LOLA global lunar topography.
    pub const MOON_LOLA: HeightRange = HeightRange {
        min_m: MOON_RADIUS_M - MOON_LOLA_MIN_OFFSET_M,
        max_m: MOON_RADIUS_M + MOON_LOLA_MAX_OFFSET_M,
    };

    pub fn new(min_m: f64, max_m: f64) -> Self {
        Self { min_m, max_m }
    }

    /// Radius multiplier for a raw 8-bit sample: the pixel's physical radius
    /// divided by `min_m`.
    pub fn scale(&self, raw: u8) -> f64 {
        let t = f64::from(raw) / 255.0;
        (self.min_m + t * (self.max_m - self.min_m)) / self.min_m
    }
}

impl Default for HeightRange {
    fn default() -> Self {
        Self::MOON_LOLA
    }
}

#[derive(Debug)]
pub enum TextureError {
    Decode {
        path: PathBuf,
        source: image::ImageError,
    },
    StackedRows {
        rows: u32,
    },
    TooSmall {
        width: u32,
        height: u32,
    },
    InvalidRange(HeightRange),
    /// The file decoded but its grid is unusable.
    Invalid {
        path: PathBuf,
        source: Box<TextureError>,
    },
}

impl fmt::Display for TextureError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TextureError::Decode { path, source } => {
                write!(f, "failed to decode heightmap {}: {source}", path.display())
            }
            TextureError::StackedRows { rows } => write!(
                f,
                "heightmap has {rows} rows, expected a multiple of {STACKED_COPIES}"
            ),
            TextureError::TooSmall { width, height } => write!(
                f,
                "heightmap grid {width}x{height} is too small, need at least 2x2"
            ),
            TextureError::InvalidRange(r) => write!(
                f,
                "invalid height range: min {} m, max {} m",
                r.min_m, r.max_m
            ),
            TextureError::Invalid { path, source } => {
                write!(f, "invalid heightmap {}: {source}", path.display())
            }
        }
    }
}

impl std::error::Error for TextureError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TextureError::Decode { source, .. } => Some(source),
            TextureError::Invalid { source, .. } => Some(source.as_ref()),
            _ => None,
        }
    }
}

/// Equirectangular elevation texture sampled by sphere direction.
///
/// Latitude indexes the width axis and longitude the (logical) height axis.
#[derive(Debug, Clone)]
pub struct HeightmapTexture {
    /// Channel 0 of the full decoded image, row-major, `width * raw_height`.
    data: Vec<u8>,
    width: u32,
    raw_height: u32,
    height: u32,
    range: HeightRange,
}

impl HeightmapTexture {
    pub fn load(path: impl AsRef<Path>, range: HeightRange) -> Result<Self, TextureError> {
        let path = path.as_ref();
        let image = image::open(path)
            .map_err(|source| TextureError::Decode {
                path: path.to_path_buf(),
                source,
            })?
            .to_rgb8();
        debug!(
            "decoded {} ({}x{})",
            path.display(),
            image.width(),
            image.height()
        );
        Self::from_rgb(&image, range).map_err(|source| TextureError::Invalid {
            path: path.to_path_buf(),
            source: Box::new(source),
        })
    }

    pub fn from_rgb(image: &RgbImage, range: HeightRange) -> Result<Self, TextureError> {
        if !(range.min_m > 0.0 && range.max_m.is_finite() && range.min_m.is_finite()) {
            return Err(TextureError::InvalidRange(range));
        }

        let (width, raw_height) = image.dimensions();
        if raw_height % STACKED_COPIES != 0 {
            return Err(TextureError::StackedRows { rows: raw_height });
        }
        let height = raw_height / STACKED_COPIES;
        // Indices wrap modulo `dim - 1`, which must be non-zero.
        if width < 2 || height < 2 {
            return Err(TextureError::TooSmall { width, height });
        }

        let data = image.pixels().map(|p| p.0[0]).collect();
        Ok(Self {
            data,
            width,
            raw_height,
            height,
            range,
        })
    }

    /// Logical grid size `(width, height)`.
    pub fn dims(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// The validated range pixel values are mapped through.
    pub fn range(&self) -> HeightRange {
        self.range
    }

    /// Radius multiplier at the texel nearest `dir`.
    pub fn sample(&self, dir: Vec3) -> f64 {
        let c = normalized_lat_lon(dir);
        let ix = (c.lat * f64::from(self.width) + 0.5).floor() as i64;
        let iy = (c.lon * f64::from(self.height) + 0.5).floor() as i64;
        let ix = wrap_index(ix, 0, i64::from(self.width) - 1);
        let iy = wrap_index(iy, 0, i64::from(self.height) - 1);
        self.value_at(ix, iy)
    }

    fn value_at(&self, x: i64, y: i64) -> f64 {
        match self.pixel(x, y) {
            Some(raw) => self.range.scale(raw),
            None => OUT_OF_GRID_SAMPLE,
        }
    }

    fn pixel(&self, x: i64, y: i64) -> Option<u8> {
        if x < 0 || y < 0 || x >= i64::from(self.width) || y >= i64::from(self.raw_height) {
            return None;
        }
        self.data
            .get(y as usize * self.width as usize + x as usize)
            .copied()
    }
}
