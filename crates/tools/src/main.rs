use std::path::PathBuf;

use clap::Parser;
use compute::{DEFAULT_SAMPLES_PER_TRIANGLE, DEFAULT_SEED, DisplaceConfig};
use formats::HeightRange;
use foundation::math::{MOON_LOLA_MAX_OFFSET_M, MOON_LOLA_MIN_OFFSET_M, MOON_RADIUS_M};
use runtime::CancelToken;
use tokio::signal;
use tools::{DEFAULT_REFINEMENTS, PipelineOptions, run_pipeline};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "moonmesh",
    version,
    about = "Displace a geodesic sphere by an equirectangular heightmap"
)]
struct Args {
    /// Source heightmap image (three vertically stacked copies of the map)
    source: PathBuf,

    /// Destination mesh file (.obj or .ply)
    destination: PathBuf,

    /// Icosahedron subdivision level
    #[arg(long, default_value_t = DEFAULT_REFINEMENTS)]
    refinements: u32,

    /// Monte Carlo samples per incident triangle
    #[arg(long, default_value_t = DEFAULT_SAMPLES_PER_TRIANGLE)]
    samples: u32,

    /// Random seed
    #[arg(long, default_value_t = DEFAULT_SEED)]
    seed: u64,

    /// Reference radius of the body (meters)
    #[arg(long, default_value_t = MOON_RADIUS_M)]
    h_base: f64,

    /// Depth of the darkest pixel below the reference radius (meters)
    #[arg(long, default_value_t = MOON_LOLA_MIN_OFFSET_M)]
    h_min_offset: f64,

    /// Height of the brightest pixel above the reference radius (meters)
    #[arg(long, default_value_t = MOON_LOLA_MAX_OFFSET_M)]
    h_max_offset: f64,

    /// Also write a JSON run report to this path
    #[arg(long)]
    report: Option<PathBuf>,
}

impl Args {
    fn into_options(self) -> PipelineOptions {
        let mut options = PipelineOptions::new(self.source, self.destination);
        options.refinements = self.refinements;
        options.displace = DisplaceConfig {
            samples_per_triangle: self.samples,
            seed: self.seed,
        };
        options.height_range = HeightRange::new(
            self.h_base - self.h_min_offset,
            self.h_base + self.h_max_offset,
        );
        options.report = self.report;
        options
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    if let Err(e) = real_main().await {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

async fn real_main() -> Result<(), Box<dyn std::error::Error>> {
    let options = Args::parse().into_options();

    let cancel = CancelToken::new();
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        if signal::ctrl_c().await.is_ok() {
            warn!("interrupt received, stopping at the next progress step");
            on_signal.cancel();
        }
    });

    let outcome = tokio::task::spawn_blocking(move || run_pipeline(&options, &cancel)).await??;

    info!(
        "wrote {} vertices / {} triangles ({} bytes, blake3={})",
        outcome.vertex_count,
        outcome.triangle_count,
        outcome.written.bytes,
        outcome.written.content_hash
    );
    if let Some(r) = outcome.radius {
        info!("radius scale min={} max={} mean={}", r.min, r.max, r.mean);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::Args;
    use clap::Parser;

    #[test]
    fn defaults_match_reference_dataset() {
        let args = Args::try_parse_from(["moonmesh", "moon.jpg", "moon.obj"]).expect("parse");
        let options = args.into_options();
        assert_eq!(options.refinements, 7);
        assert_eq!(options.displace.samples_per_triangle, 50);
        assert_eq!(options.displace.seed, 123_408);
        assert_eq!(options.height_range.min_m, 1_719_150.0);
        assert_eq!(options.height_range.max_m, 1_758_946.0);
        assert_eq!(options.report, None);
    }

    #[test]
    fn flags_override_defaults() {
        let args = Args::try_parse_from([
            "moonmesh",
            "in.jpg",
            "out.ply",
            "--refinements",
            "3",
            "--samples",
            "10",
            "--seed",
            "1",
            "--report",
            "run.json",
        ])
        .expect("parse");
        let options = args.into_options();
        assert_eq!(options.refinements, 3);
        assert_eq!(options.displace.samples_per_triangle, 10);
        assert_eq!(options.displace.seed, 1);
        assert_eq!(options.report.as_deref(), Some(std::path::Path::new("run.json")));
    }

    #[test]
    fn requires_both_paths() {
        assert!(Args::try_parse_from(["moonmesh", "moon.jpg"]).is_err());
    }
}
