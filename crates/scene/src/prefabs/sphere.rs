use std::collections::HashMap;

use foundation::math::Vec3;

use crate::mesh::TriMesh;

/// Sphere topology plus its base vertex positions.
#[derive(Debug, Clone)]
pub struct SphereMesh {
    pub mesh: TriMesh,
    pub positions: Vec<Vec3>,
}

const ICOSAHEDRON_FACES: [[usize; 3]; 20] = [
    [0, 11, 5],
    [0, 5, 1],
    [0, 1, 7],
    [0, 7, 10],
    [0, 10, 11],
    [1, 5, 9],
    [5, 11, 4],
    [11, 10, 2],
    [10, 7, 6],
    [7, 1, 8],
    [3, 9, 4],
    [3, 4, 2],
    [3, 2, 6],
    [3, 6, 8],
    [3, 8, 9],
    [4, 9, 5],
    [2, 4, 11],
    [6, 2, 10],
    [8, 6, 7],
    [9, 8, 1],
];

fn icosahedron_directions() -> Vec<Vec3> {
    let phi = (1.0 + 5.0_f64.sqrt()) / 2.0;
    let norm = (1.0 + phi * phi).sqrt();
    [
        [-1.0, phi, 0.0],
        [1.0, phi, 0.0],
        [-1.0, -phi, 0.0],
        [1.0, -phi, 0.0],
        [0.0, -1.0, phi],
        [0.0, 1.0, phi],
        [0.0, -1.0, -phi],
        [0.0, 1.0, -phi],
        [phi, 0.0, -1.0],
        [phi, 0.0, 1.0],
        [-phi, 0.0, -1.0],
        [-phi, 0.0, 1.0],
    ]
    .iter()
    .map(|[x, y, z]| Vec3::new(x / norm, y / norm, z / norm))
    .collect()
}

/// Geodesic sphere: an icosahedron refined `refinements` times by 1-to-4
/// midpoint subdivision, every vertex projected onto the sphere.
///
/// Level `k` has `10 * 4^k + 2` vertices and `20 * 4^k` triangles.
pub fn sphere_mesh(refinements: u32, center: Vec3, radius: f64) -> SphereMesh {
    let mut dirs = icosahedron_directions();
    let mut faces: Vec<[usize; 3]> = ICOSAHEDRON_FACES.to_vec();

    for _ in 0..refinements {
        let mut midpoints: HashMap<(usize, usize), usize> = HashMap::new();
        let mut next = Vec::with_capacity(faces.len() * 4);

        let mut midpoint = |a: usize, b: usize, dirs: &mut Vec<Vec3>| -> usize {
            let key = if a < b { (a, b) } else { (b, a) };
            *midpoints.entry(key).or_insert_with(|| {
                let m = (dirs[a] + dirs[b]) * 0.5;
                // Midpoint of two non-antipodal unit vectors is never zero.
                dirs.push(m.normalized().unwrap_or(dirs[a]));
                dirs.len() - 1
            })
        };

        for &[a, b, c] in &faces {
            let ab = midpoint(a, b, &mut dirs);
            let bc = midpoint(b, c, &mut dirs);
            let ca = midpoint(c, a, &mut dirs);
            next.push([a, ab, ca]);
            next.push([b, bc, ab]);
            next.push([c, ca, bc]);
            next.push([ab, bc, ca]);
        }
        faces = next;
    }

    let positions = dirs.iter().map(|&d| center + d * radius).collect();
    let mesh = TriMesh {
        vertex_count: dirs.len(),
        elements: faces,
    };
    SphereMesh { mesh, positions }
}
