use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use foundation::math::Vec3;
use serde::{Deserialize, Serialize};

use crate::heightmap::HeightRange;

pub const REPORT_VERSION: &str = "1.0";

/// Summary of one displacement run, written next to the mesh on request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    pub version: String,
    pub source: String,
    /// Logical heightmap grid `[width, height]`.
    pub heightmap_dims: [u32; 2],
    pub refinements: u32,
    pub samples_per_triangle: u32,
    pub seed: u64,
    pub height_range: HeightRange,
    pub vertex_count: usize,
    pub triangle_count: usize,
    pub radius: RadiusStats,
    pub output: OutputEntry,
}

#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct RadiusStats {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
}

impl RadiusStats {
    /// Magnitude statistics of `positions`; `None` when empty.
    pub fn from_positions(positions: &[Vec3]) -> Option<Self> {
        let first = positions.first()?.magnitude();
        let mut stats = RadiusStats {
            min: first,
            max: first,
            mean: 0.0,
        };
        let mut sum = 0.0;
        for p in positions {
            let r = p.magnitude();
            stats.min = stats.min.min(r);
            stats.max = stats.max.max(r);
            sum += r;
        }
        stats.mean = sum / positions.len() as f64;
        Some(stats)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputEntry {
    pub path: String,
    pub format: String,
    pub bytes: u64,
    pub content_hash: String,
}

#[derive(Debug)]
pub enum ReportError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Serialize(serde_json::Error),
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

impl fmt::Display for ReportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportError::Io { path, source } => {
                write!(f, "failed to write report {}: {source}", path.display())
            }
            ReportError::Serialize(err) => write!(f, "report serialization error: {err}"),
            ReportError::Parse { path, source } => {
                write!(f, "failed to parse report {}: {source}", path.display())
            }
        }
    }
}

impl std::error::Error for ReportError {}

impl RunReport {
    pub fn write(&self, path: impl AsRef<Path>) -> Result<(), ReportError> {
        let path = path.as_ref();
        let payload = serde_json::to_string_pretty(self).map_err(ReportError::Serialize)?;
        fs::write(path, payload).map_err(|source| ReportError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn read(path: impl AsRef<Path>) -> Result<Self, ReportError> {
        let path = path.as_ref();
        let payload = fs::read_to_string(path).map_err(|source| ReportError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&payload).map_err(|source| ReportError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}
