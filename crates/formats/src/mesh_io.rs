use std::fmt;
use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use foundation::math::Vec3;
use scene::TriMesh;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum MeshFormat {
    Obj,
    Ply,
}

impl MeshFormat {
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "obj" => Some(MeshFormat::Obj),
            "ply" => Some(MeshFormat::Ply),
            _ => None,
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            MeshFormat::Obj => "obj",
            MeshFormat::Ply => "ply",
        }
    }
}

#[derive(Debug)]
pub enum MeshWriteError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    UnsupportedExtension {
        path: PathBuf,
    },
    LengthMismatch {
        positions: usize,
        vertices: usize,
    },
}

impl fmt::Display for MeshWriteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MeshWriteError::Io { path, source } => {
                write!(f, "failed to write {}: {source}", path.display())
            }
            MeshWriteError::UnsupportedExtension { path } => write!(
                f,
                "unsupported mesh format for {} (expected .obj or .ply)",
                path.display()
            ),
            MeshWriteError::LengthMismatch {
                positions,
                vertices,
            } => write!(
                f,
                "{positions} positions supplied for a mesh with {vertices} vertices"
            ),
        }
    }
}

impl std::error::Error for MeshWriteError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            MeshWriteError::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// What was written by [`write_mesh`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrittenMesh {
    pub format: MeshFormat,
    pub bytes: u64,
    /// blake3 of the file contents, lowercase hex.
    pub content_hash: String,
}

/// Write `positions` over `mesh` to `path`, choosing the format by extension.
///
/// The mesh is written to a sibling temporary file and renamed over `path`
/// only once it has been flushed, so `path` never holds a truncated mesh.
pub fn write_mesh(
    path: impl AsRef<Path>,
    mesh: &TriMesh,
    positions: &[Vec3],
) -> Result<WrittenMesh, MeshWriteError> {
    let path = path.as_ref();
    let format = MeshFormat::from_path(path).ok_or_else(|| MeshWriteError::UnsupportedExtension {
        path: path.to_path_buf(),
    })?;
    check_lengths(mesh, positions)?;

    let io_err = |source: std::io::Error| MeshWriteError::Io {
        path: path.to_path_buf(),
        source,
    };
    let staging = staging_path(path);
    let result = write_staged(&staging, format, mesh, positions)
        .and_then(|written| fs::rename(&staging, path).map(|_| written));
    if result.is_err() {
        let _ = fs::remove_file(&staging);
    }
    result.map_err(io_err)
}

fn write_staged(
    staging: &Path,
    format: MeshFormat,
    mesh: &TriMesh,
    positions: &[Vec3],
) -> std::io::Result<WrittenMesh> {
    let file = fs::File::create(staging)?;
    let mut writer = HashingWriter::new(BufWriter::new(file));
    match format {
        MeshFormat::Obj => write_obj(&mut writer, mesh, positions)?,
        MeshFormat::Ply => write_ply(&mut writer, mesh, positions)?,
    }
    writer.flush()?;

    Ok(WrittenMesh {
        format,
        bytes: writer.written,
        content_hash: writer.finalize_hex(),
    })
}

/// `dir/.name.partial` next to `path`.
fn staging_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!(".{name}.partial"))
}

fn check_lengths(mesh: &TriMesh, positions: &[Vec3]) -> Result<(), MeshWriteError> {
    if positions.len() != mesh.vertex_count() {
        return Err(MeshWriteError::LengthMismatch {
            positions: positions.len(),
            vertices: mesh.vertex_count(),
        });
    }
    Ok(())
}

/// Wavefront OBJ: `v` records then 1-based `f` records.
pub fn write_obj<W: Write>(w: &mut W, mesh: &TriMesh, positions: &[Vec3]) -> std::io::Result<()> {
    for p in positions {
        writeln!(w, "v {} {} {}", p.x, p.y, p.z)?;
    }
    for [a, b, c] in mesh.elements() {
        writeln!(w, "f {} {} {}", a + 1, b + 1, c + 1)?;
    }
    Ok(())
}

/// ASCII PLY 1.0 with `vertex` and `face` elements.
pub fn write_ply<W: Write>(w: &mut W, mesh: &TriMesh, positions: &[Vec3]) -> std::io::Result<()> {
    writeln!(w, "ply")?;
    writeln!(w, "format ascii 1.0")?;
    writeln!(w, "element vertex {}", positions.len())?;
    writeln!(w, "property double x")?;
    writeln!(w, "property double y")?;
    writeln!(w, "property double z")?;
    writeln!(w, "element face {}", mesh.triangle_count())?;
    writeln!(w, "property list uchar uint vertex_indices")?;
    writeln!(w, "end_header")?;
    for p in positions {
        writeln!(w, "{} {} {}", p.x, p.y, p.z)?;
    }
    for [a, b, c] in mesh.elements() {
        writeln!(w, "3 {a} {b} {c}")?;
    }
    Ok(())
}

struct HashingWriter<W> {
    inner: W,
    hasher: blake3::Hasher,
    written: u64,
}

impl<W> HashingWriter<W> {
    fn new(inner: W) -> Self {
        Self {
            inner,
            hasher: blake3::Hasher::new(),
            written: 0,
        }
    }

    fn finalize_hex(&self) -> String {
        self.hasher.finalize().to_hex().to_string()
    }
}

impl<W: Write> Write for HashingWriter<W> {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        let n = self.inner.write(buf)?;
        if n > 0 {
            self.hasher.update(&buf[..n]);
            self.written += n as u64;
        }
        Ok(n)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.inner.flush()
    }
}
