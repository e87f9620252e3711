//! Heightmap-to-mesh pipeline: decode the heightmap, build the geodesic
//! sphere, displace its vertices and write the result.

use std::fmt;
use std::path::{Path, PathBuf};

use compute::{DisplaceConfig, DisplaceError, displace};
use formats::{
    HeightRange, HeightmapTexture, MeshWriteError, OutputEntry, REPORT_VERSION, RadiusStats,
    ReportError, RunReport, TextureError, WrittenMesh, write_mesh,
};
use foundation::math::Vec3;
use runtime::CancelToken;
use scene::sphere_mesh;
use tracing::info;

pub const DEFAULT_REFINEMENTS: u32 = 7;
/// Level 10 is already ~10.5M vertices.
pub const MAX_REFINEMENTS: u32 = 10;

#[derive(Debug, Clone, PartialEq)]
pub struct PipelineOptions {
    pub source: PathBuf,
    pub destination: PathBuf,
    pub refinements: u32,
    pub displace: DisplaceConfig,
    pub height_range: HeightRange,
    pub report: Option<PathBuf>,
}

impl PipelineOptions {
    pub fn new(source: impl Into<PathBuf>, destination: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            destination: destination.into(),
            refinements: DEFAULT_REFINEMENTS,
            displace: DisplaceConfig::default(),
            height_range: HeightRange::MOON_LOLA,
            report: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PipelineOutcome {
    pub vertex_count: usize,
    pub triangle_count: usize,
    pub written: WrittenMesh,
    pub radius: Option<RadiusStats>,
    /// Mean radius multiplier over all vertices.
    pub mean_height_scale: Option<f64>,
}

#[derive(Debug)]
pub enum PipelineError {
    TooManyRefinements { requested: u32 },
    Heightmap(TextureError),
    Displace(DisplaceError),
    Cancelled,
    WriteMesh(MeshWriteError),
    Report(ReportError),
}

impl fmt::Display for PipelineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineError::TooManyRefinements { requested } => write!(
                f,
                "refinement level {requested} exceeds the maximum of {MAX_REFINEMENTS}"
            ),
            PipelineError::Heightmap(err) => write!(f, "loading heightmap: {err}"),
            PipelineError::Displace(err) => write!(f, "displacing vertices: {err}"),
            PipelineError::Cancelled => write!(f, "interrupted, no mesh written"),
            PipelineError::WriteMesh(err) => write!(f, "writing mesh: {err}"),
            PipelineError::Report(err) => write!(f, "writing report: {err}"),
        }
    }
}

impl std::error::Error for PipelineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PipelineError::Heightmap(err) => Some(err),
            PipelineError::Displace(err) => Some(err),
            PipelineError::WriteMesh(err) => Some(err),
            PipelineError::Report(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DisplaceError> for PipelineError {
    fn from(err: DisplaceError) -> Self {
        match err {
            DisplaceError::Cancelled { .. } => PipelineError::Cancelled,
            other => PipelineError::Displace(other),
        }
    }
}

/// Run every stage in order. Nothing is written unless displacement
/// completes; the report is only written after the mesh.
pub fn run_pipeline(
    options: &PipelineOptions,
    cancel: &CancelToken,
) -> Result<PipelineOutcome, PipelineError> {
    if options.refinements > MAX_REFINEMENTS {
        return Err(PipelineError::TooManyRefinements {
            requested: options.refinements,
        });
    }
    options.displace.validate()?;

    info!("loading heightmap {}", options.source.display());
    let heightmap = HeightmapTexture::load(&options.source, options.height_range)
        .map_err(PipelineError::Heightmap)?;
    let (width, height) = heightmap.dims();
    let height_range = heightmap.range();
    info!(
        "heightmap resolution is {width}x{height}, radius {}..{} m",
        height_range.min_m, height_range.max_m
    );

    info!("generating initial mesh (refinements={})", options.refinements);
    let sphere = sphere_mesh(options.refinements, Vec3::ZERO, 1.0);

    let displaced = displace(
        &sphere.mesh,
        &sphere.positions,
        &heightmap,
        &options.displace,
        cancel,
    )?;

    info!("writing output {}", options.destination.display());
    let written = write_mesh(&options.destination, &sphere.mesh, &displaced.positions)
        .map_err(PipelineError::WriteMesh)?;
    let radius = RadiusStats::from_positions(&displaced.positions);
    let mean_height_scale = displaced
        .metrics
        .histogram("height_scale")
        .and_then(|h| h.mean());
    if let Some(mean) = mean_height_scale {
        info!(
            "mean height scale {mean:.6} over {} samples",
            displaced.metrics.counter("samples")
        );
    }

    let outcome = PipelineOutcome {
        vertex_count: sphere.mesh.vertex_count(),
        triangle_count: sphere.mesh.triangle_count(),
        written,
        radius,
        mean_height_scale,
    };

    if let Some(report_path) = &options.report {
        let report = build_report(options, (width, height), height_range, &outcome);
        report.write(report_path).map_err(PipelineError::Report)?;
        info!("wrote report {}", report_path.display());
    }

    Ok(outcome)
}

fn build_report(
    options: &PipelineOptions,
    (width, height): (u32, u32),
    height_range: HeightRange,
    outcome: &PipelineOutcome,
) -> RunReport {
    RunReport {
        version: REPORT_VERSION.to_string(),
        source: path_string(&options.source),
        heightmap_dims: [width, height],
        refinements: options.refinements,
        samples_per_triangle: options.displace.samples_per_triangle,
        seed: options.displace.seed,
        height_range,
        vertex_count: outcome.vertex_count,
        triangle_count: outcome.triangle_count,
        radius: outcome.radius.unwrap_or(RadiusStats {
            min: 0.0,
            max: 0.0,
            mean: 0.0,
        }),
        output: OutputEntry {
            path: path_string(&options.destination),
            format: outcome.written.format.extension().to_string(),
            bytes: outcome.written.bytes,
            content_hash: outcome.written.content_hash.clone(),
        },
    }
}

fn path_string(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

#[cfg(test)]
mod tests {
    use super::{PipelineError, PipelineOptions, run_pipeline};
    use formats::{HeightRange, RunReport};
    use image::{Rgb, RgbImage};
    use runtime::CancelToken;
    use std::fs;
    use std::path::{Path, PathBuf};

    fn temp_dir(label: &str) -> PathBuf {
        let mut dir = std::env::temp_dir();
        dir.push(format!("moonmesh_pipeline_{label}_{}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).expect("create temp dir");
        dir
    }

    fn write_uniform_png(dir: &Path, width: u32, rows: u32, value: u8) -> PathBuf {
        let path = dir.join("heightmap.png");
        RgbImage::from_pixel(width, rows, Rgb([value, value, value]))
            .save(&path)
            .expect("save png");
        path
    }

    fn obj_vertices(text: &str) -> Vec<[f64; 3]> {
        text.lines()
            .filter_map(|l| l.strip_prefix("v "))
            .map(|l| {
                let v: Vec<f64> = l.split(' ').map(|s| s.parse().expect("float")).collect();
                [v[0], v[1], v[2]]
            })
            .collect()
    }

    #[test]
    fn uniform_heightmap_end_to_end() {
        let dir = temp_dir("uniform");
        let source = write_uniform_png(&dir, 20, 30, 128);
        let mut options = PipelineOptions::new(&source, dir.join("moon.obj"));
        options.refinements = 0;
        options.report = Some(dir.join("report.json"));

        let outcome = run_pipeline(&options, &CancelToken::new()).expect("pipeline");
        assert_eq!(outcome.vertex_count, 12);
        assert_eq!(outcome.triangle_count, 20);

        let text = fs::read_to_string(&options.destination).expect("read mesh");
        let verts = obj_vertices(&text);
        assert_eq!(verts.len(), 12);
        assert_eq!(text.lines().filter(|l| l.starts_with("f ")).count(), 20);

        let expected = HeightRange::MOON_LOLA.scale(128);
        let mean = outcome.mean_height_scale.expect("mean height scale");
        assert!((mean - expected).abs() < 1e-12, "mean {mean}");
        for [x, y, z] in verts {
            let r = (x * x + y * y + z * z).sqrt();
            assert!((r - expected).abs() < 1e-9, "radius {r}");
        }

        let report = RunReport::read(dir.join("report.json")).expect("read report");
        assert_eq!(report.heightmap_dims, [20, 10]);
        assert_eq!(report.vertex_count, 12);
        assert_eq!(report.output.content_hash, outcome.written.content_hash);
        assert_eq!(report.output.format, "obj");
    }

    #[test]
    fn repeated_runs_write_identical_files() {
        let dir = temp_dir("repeat");
        let mut img = RgbImage::new(24, 36);
        for (x, y, p) in img.enumerate_pixels_mut() {
            *p = Rgb([((x * 11 + y * 5) % 256) as u8, 0, 0]);
        }
        let source = dir.join("gradient.png");
        img.save(&source).expect("save png");

        let mut a = PipelineOptions::new(&source, dir.join("a.ply"));
        a.refinements = 2;
        let mut b = a.clone();
        b.destination = dir.join("b.ply");

        let first = run_pipeline(&a, &CancelToken::new()).expect("first");
        let second = run_pipeline(&b, &CancelToken::new()).expect("second");
        assert_eq!(first.written.content_hash, second.written.content_hash);
        assert_eq!(
            fs::read(&a.destination).expect("a"),
            fs::read(&b.destination).expect("b")
        );
    }

    #[test]
    fn cancelled_run_writes_nothing() {
        let dir = temp_dir("cancel");
        let source = write_uniform_png(&dir, 8, 12, 50);
        let mut options = PipelineOptions::new(&source, dir.join("moon.obj"));
        options.refinements = 1;
        options.report = Some(dir.join("report.json"));

        let cancel = CancelToken::new();
        cancel.cancel();
        let err = run_pipeline(&options, &cancel).expect_err("cancelled");
        assert!(matches!(err, PipelineError::Cancelled));
        assert!(!options.destination.exists());
        assert!(!dir.join("report.json").exists());
    }

    #[test]
    fn malformed_heightmap_aborts_before_writing() {
        let dir = temp_dir("malformed");
        let source = write_uniform_png(&dir, 10, 31, 50);
        let mut options = PipelineOptions::new(&source, dir.join("moon.obj"));
        options.refinements = 0;

        let err = run_pipeline(&options, &CancelToken::new()).expect_err("rows");
        assert!(matches!(err, PipelineError::Heightmap(_)));
        assert!(err.to_string().contains("31 rows"));
        assert!(err.to_string().contains("heightmap.png"), "{err}");
        assert!(!options.destination.exists());
    }

    #[test]
    fn missing_source_is_reported() {
        let dir = temp_dir("missing");
        let options = PipelineOptions::new(dir.join("nope.jpg"), dir.join("moon.obj"));
        let err = run_pipeline(&options, &CancelToken::new()).expect_err("missing");
        assert!(matches!(err, PipelineError::Heightmap(_)));
        assert!(err.to_string().contains("nope.jpg"));
    }

    #[test]
    fn refinement_limit() {
        let mut options = PipelineOptions::new("in.jpg", "out.obj");
        options.refinements = 11;
        let err = run_pipeline(&options, &CancelToken::new()).expect_err("limit");
        assert!(matches!(
            err,
            PipelineError::TooManyRefinements { requested: 11 }
        ));
    }
}
