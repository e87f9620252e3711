use std::fmt;

/// Triangle topology over vertex indices.
///
/// Immutable once built; vertex positions live in a parallel array owned by
/// the caller so the same topology can carry several position sets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriMesh {
    pub(crate) vertex_count: usize,
    pub(crate) elements: Vec<[usize; 3]>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MeshError {
    IndexOutOfRange {
        triangle: usize,
        index: usize,
        vertex_count: usize,
    },
}

impl fmt::Display for MeshError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MeshError::IndexOutOfRange {
                triangle,
                index,
                vertex_count,
            } => write!(
                f,
                "triangle {triangle} references vertex {index} but mesh has {vertex_count} vertices"
            ),
        }
    }
}

impl std::error::Error for MeshError {}

impl TriMesh {
    pub fn new(vertex_count: usize, elements: Vec<[usize; 3]>) -> Result<Self, MeshError> {
        for (triangle, tri) in elements.iter().enumerate() {
            if let Some(&index) = tri.iter().find(|&&i| i >= vertex_count) {
                return Err(MeshError::IndexOutOfRange {
                    triangle,
                    index,
                    vertex_count,
                });
            }
        }
        Ok(Self {
            vertex_count,
            elements,
        })
    }

    pub fn vertex_count(&self) -> usize {
        self.vertex_count
    }

    pub fn triangle_count(&self) -> usize {
        self.elements.len()
    }

    pub fn elements(&self) -> &[[usize; 3]] {
        &self.elements
    }

    /// For every vertex, the triangles that reference it, in ascending order.
    pub fn incident_elements(&self) -> Vec<Vec<usize>> {
        let mut incident = vec![Vec::new(); self.vertex_count];
        for (t, tri) in self.elements.iter().enumerate() {
            for &v in tri {
                // Degenerate triangles may repeat a vertex; list them once.
                if incident[v].last() != Some(&t) {
                    incident[v].push(t);
                }
            }
        }
        incident
    }
}

#[cfg(test)]
mod tests {
    use super::{MeshError, TriMesh};

    #[test]
    fn rejects_out_of_range_index() {
        let err = TriMesh::new(3, vec![[0, 1, 2], [0, 2, 3]]).expect_err("expect range error");
        assert_eq!(
            err,
            MeshError::IndexOutOfRange {
                triangle: 1,
                index: 3,
                vertex_count: 3
            }
        );
    }

    #[test]
    fn incidence_lists_triangles_per_vertex() {
        let mesh = TriMesh::new(5, vec![[0, 1, 2], [0, 2, 3], [3, 2, 1]]).expect("mesh");
        let inc = mesh.incident_elements();
        assert_eq!(inc[0], vec![0, 1]);
        assert_eq!(inc[1], vec![0, 2]);
        assert_eq!(inc[2], vec![0, 1, 2]);
        assert_eq!(inc[3], vec![1, 2]);
        assert!(inc[4].is_empty());
        assert_eq!(mesh.triangle_count(), 3);
    }
}
