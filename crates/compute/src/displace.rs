//! Monte Carlo vertex displacement.
//!
//! Every vertex is pushed along its base position by the mean height scale
//! sampled over the near-vertex third of each incident triangle.

use std::fmt;

use foundation::math::{Vec3, roll3, trident_sample};
use formats::HeightmapTexture;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use runtime::{CancelToken, Metrics, PercentProgress};
use scene::TriMesh;
use tracing::{debug, info};

use crate::config::DisplaceConfig;

/// Source of radius multipliers by direction.
pub trait HeightSampler {
    fn sample(&self, dir: Vec3) -> f64;
}

impl HeightSampler for HeightmapTexture {
    fn sample(&self, dir: Vec3) -> f64 {
        HeightmapTexture::sample(self, dir)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisplaceError {
    ZeroSamples,
    LengthMismatch { positions: usize, vertices: usize },
    /// The vertex is referenced by no triangle, so it has nothing to average.
    IsolatedVertex { vertex: usize },
    /// Stopped on request; no output was produced.
    Cancelled { completed: usize },
}

impl fmt::Display for DisplaceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DisplaceError::ZeroSamples => write!(f, "samples per triangle must be at least 1"),
            DisplaceError::LengthMismatch {
                positions,
                vertices,
            } => write!(
                f,
                "{positions} base positions supplied for a mesh with {vertices} vertices"
            ),
            DisplaceError::IsolatedVertex { vertex } => {
                write!(f, "vertex {vertex} has no incident triangles")
            }
            DisplaceError::Cancelled { completed } => {
                write!(f, "cancelled after {completed} vertices")
            }
        }
    }
}

impl std::error::Error for DisplaceError {}

/// Result of a completed displacement pass.
#[derive(Debug, Clone, PartialEq)]
pub struct Displacement {
    /// Displaced positions, indexed like the input mesh.
    pub positions: Vec<Vec3>,
    /// Mean radius multiplier applied to each vertex.
    pub heights: Vec<f64>,
    pub metrics: Metrics,
}

/// Run the displacement with a fresh stream seeded from `config.seed`.
pub fn displace(
    mesh: &TriMesh,
    base: &[Vec3],
    sampler: &impl HeightSampler,
    config: &DisplaceConfig,
    cancel: &CancelToken,
) -> Result<Displacement, DisplaceError> {
    config.validate()?;
    let mut rng = StdRng::seed_from_u64(config.seed);
    displace_with_rng(
        mesh,
        base,
        sampler,
        config.samples_per_triangle,
        &mut rng,
        cancel,
    )
}

/// Displace every vertex of `mesh`, drawing from `rng` in strict
/// (vertex, incident triangle, sample) order.
///
/// Progress is logged at integer-percent boundaries, which are also the only
/// points where `cancel` is polled.
pub fn displace_with_rng<R: Rng + ?Sized>(
    mesh: &TriMesh,
    base: &[Vec3],
    sampler: &impl HeightSampler,
    samples_per_triangle: u32,
    rng: &mut R,
    cancel: &CancelToken,
) -> Result<Displacement, DisplaceError> {
    if samples_per_triangle == 0 {
        return Err(DisplaceError::ZeroSamples);
    }
    if base.len() != mesh.vertex_count() {
        return Err(DisplaceError::LengthMismatch {
            positions: base.len(),
            vertices: mesh.vertex_count(),
        });
    }

    let n_verts = base.len();
    info!("processing {n_verts} vertices");
    let incident = mesh.incident_elements();

    let mut positions = Vec::with_capacity(n_verts);
    let mut heights = Vec::with_capacity(n_verts);
    let mut metrics = Metrics::new();
    let mut progress = PercentProgress::new(n_verts);

    for vid in 0..n_verts {
        let h = vertex_height(
            mesh,
            base,
            &incident[vid],
            vid,
            sampler,
            samples_per_triangle,
            rng,
        )?;
        positions.push(base[vid] * h);
        heights.push(h);

        metrics.inc_counter("vertices", 1);
        metrics.inc_counter(
            "samples",
            incident[vid].len() as u64 * u64::from(samples_per_triangle),
        );
        metrics.record("incident_triangles", incident[vid].len() as f64);
        metrics.record("height_scale", h);

        if let Some(percent) = progress.advance(vid) {
            info!("  at {percent}%");
            if cancel.is_cancelled() {
                return Err(DisplaceError::Cancelled { completed: vid + 1 });
            }
        }
    }

    debug!("displacement metrics: {:?}", metrics.snapshot());
    Ok(Displacement {
        positions,
        heights,
        metrics,
    })
}

/// Mean height scale around vertex `vid`.
///
/// Each incident triangle contributes the same number of samples whatever its
/// area; the result is the plain mean over all of them.
fn vertex_height<R: Rng + ?Sized>(
    mesh: &TriMesh,
    base: &[Vec3],
    incident: &[usize],
    vid: usize,
    sampler: &impl HeightSampler,
    samples_per_triangle: u32,
    rng: &mut R,
) -> Result<f64, DisplaceError> {
    let elements = mesh.elements();
    let mut total_h = 0.0;
    let mut total_w = 0.0;

    for &tid in incident {
        let verts = elements[tid];
        let Some(first) = verts.iter().position(|&v| v == vid) else {
            continue;
        };
        // Current vertex first, so trident samples land nearest to it.
        let [a, b, c] = roll3(verts, first);
        let tri = [base[a], base[b], base[c]];
        for _ in 0..samples_per_triangle {
            let u: f64 = rng.random();
            let v: f64 = rng.random();
            let point = trident_sample(u, v).point_on(&tri);
            total_h += sampler.sample(point);
            total_w += 1.0;
        }
    }

    if total_w == 0.0 {
        return Err(DisplaceError::IsolatedVertex { vertex: vid });
    }
    Ok(total_h / total_w)
}
