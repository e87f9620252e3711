use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

/// Row-major grid of elevation values decoded from a raw float file.
#[derive(Debug, Clone, PartialEq)]
pub struct RawHeightmap {
    width: usize,
    height: usize,
    values: Vec<f32>,
}

#[derive(Debug)]
pub enum RawHeightmapError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Misaligned {
        len: usize,
    },
    CountMismatch {
        values: usize,
        width: usize,
        height: usize,
    },
}

impl fmt::Display for RawHeightmapError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawHeightmapError::Io { path, source } => {
                write!(f, "failed to read {}: {source}", path.display())
            }
            RawHeightmapError::Misaligned { len } => {
                write!(f, "raw heightmap is {len} bytes, not a multiple of 4")
            }
            RawHeightmapError::CountMismatch {
                values,
                width,
                height,
            } => write!(
                f,
                "raw heightmap holds {values} values, expected {width}x{height} = {}",
                width.saturating_mul(*height)
            ),
        }
    }
}

impl std::error::Error for RawHeightmapError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RawHeightmapError::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl RawHeightmap {
    /// Decode big-endian IEEE-754 `f32` values into a `height x width` grid.
    pub fn from_be_bytes(
        bytes: &[u8],
        width: usize,
        height: usize,
    ) -> Result<Self, RawHeightmapError> {
        if bytes.len() % 4 != 0 {
            return Err(RawHeightmapError::Misaligned { len: bytes.len() });
        }
        let count = bytes.len() / 4;
        if width.checked_mul(height) != Some(count) {
            return Err(RawHeightmapError::CountMismatch {
                values: count,
                width,
                height,
            });
        }

        let values = bytes
            .chunks_exact(4)
            .map(|c| f32::from_be_bytes([c[0], c[1], c[2], c[3]]))
            .collect();
        Ok(Self {
            width,
            height,
            values,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn values(&self) -> &[f32] {
        &self.values
    }

    pub fn get(&self, row: usize, col: usize) -> Option<f32> {
        if row >= self.height || col >= self.width {
            return None;
        }
        self.values.get(row * self.width + col).copied()
    }

    /// Min, max and mean of the finite values, if any.
    pub fn stats(&self) -> Option<(f32, f32, f64)> {
        let mut finite = self.values.iter().copied().filter(|v| v.is_finite());
        let first = finite.next()?;
        let (mut min, mut max, mut sum, mut n) = (first, first, f64::from(first), 1usize);
        for v in finite {
            min = min.min(v);
            max = max.max(v);
            sum += f64::from(v);
            n += 1;
        }
        Some((min, max, sum / n as f64))
    }
}

/// Load a raw big-endian float heightmap of known dimensions.
pub fn load_raw(
    path: impl AsRef<Path>,
    width: usize,
    height: usize,
) -> Result<RawHeightmap, RawHeightmapError> {
    let path = path.as_ref();
    let bytes = fs::read(path).map_err(|source| RawHeightmapError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    RawHeightmap::from_be_bytes(&bytes, width, height)
}

/// Encode values in the raw big-endian layout read by [`load_raw`].
pub fn encode_raw(values: &[f32]) -> Vec<u8> {
    values.iter().flat_map(|v| v.to_be_bytes()).collect()
}
