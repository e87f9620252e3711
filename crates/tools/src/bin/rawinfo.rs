//! Inspect a raw big-endian `f32` heightmap.
//!
//! Usage:
//!   rawinfo <file> --width 5760 --height 2880

use std::path::PathBuf;

use clap::Parser;
use formats::load_raw;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "rawinfo", version, about = "Load a raw big-endian float heightmap")]
struct Args {
    /// Raw heightmap file
    file: PathBuf,

    /// Grid width (values per row)
    #[arg(long)]
    width: usize,

    /// Grid height (rows)
    #[arg(long)]
    height: usize,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    if let Err(e) = real_main() {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

fn real_main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    info!("loading {}", args.file.display());
    let grid = load_raw(&args.file, args.width, args.height)?;

    println!("{}x{}", grid.width(), grid.height());
    let last_row = grid.height().saturating_sub(1);
    let last_col = grid.width().saturating_sub(1);
    let corners = [(0, 0), (0, last_col), (last_row, 0), (last_row, last_col)];
    for (row, col) in corners {
        if let Some(v) = grid.get(row, col) {
            println!("[{row}, {col}] = {v}");
        }
    }
    match grid.stats() {
        Some((min, max, mean)) => println!("min={min} max={max} mean={mean}"),
        None => println!("no finite values"),
    }
    Ok(())
}
