use super::Vec3;

/// Convex weights over a triangle's three vertices, in vertex order.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Barycentric(pub [f64; 3]);

impl Barycentric {
    /// Area-uniform map from the unit square onto the whole triangle.
    ///
    /// See <http://math.stackexchange.com/questions/18686/uniform-random-point-in-triangle>.
    pub fn from_unit_square(u: f64, v: f64) -> Self {
        let r1 = u.sqrt();
        Self([1.0 - r1, r1 * (1.0 - v), r1 * v])
    }

    /// Index of the largest weight; ties resolve to the lowest index.
    pub fn argmax(&self) -> usize {
        let w = &self.0;
        let mut best = 0;
        for i in 1..3 {
            if w[i] > w[best] {
                best = i;
            }
        }
        best
    }

    /// Cyclic rotation so that component `k` comes first.
    pub fn roll(self, k: usize) -> Self {
        Self(roll3(self.0, k))
    }

    /// Fold into the third of the triangle nearest vertex 0.
    pub fn into_trident(self) -> Self {
        let k = self.argmax();
        self.roll(k)
    }

    /// Point on the triangle `tri` with these weights.
    pub fn point_on(&self, tri: &[Vec3; 3]) -> Vec3 {
        let [a, b, c] = self.0;
        tri[0] * a + tri[1] * b + tri[2] * c
    }

    pub fn sum(&self) -> f64 {
        self.0.iter().sum()
    }
}

/// Map a unit-square sample to a point uniformly distributed over the third of
/// a triangle nearest its first vertex.
pub fn trident_sample(u: f64, v: f64) -> Barycentric {
    Barycentric::from_unit_square(u, v).into_trident()
}

/// `out[i] = arr[(i + k) % 3]`.
pub fn roll3<T: Copy>(arr: [T; 3], k: usize) -> [T; 3] {
    let k = k % 3;
    [arr[k], arr[(k + 1) % 3], arr[(k + 2) % 3]]
}

#[cfg(test)]
mod tests {
    use super::{Barycentric, roll3, trident_sample};
    use crate::math::Vec3;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    const N: usize = 40_000;

    #[test]
    fn roll_moves_component_to_front() {
        assert_eq!(roll3([10, 20, 30], 0), [10, 20, 30]);
        assert_eq!(roll3([10, 20, 30], 1), [20, 30, 10]);
        assert_eq!(roll3([10, 20, 30], 2), [30, 10, 20]);
        assert_eq!(roll3([10, 20, 30], 4), [20, 30, 10]);
    }

    #[test]
    fn unit_square_corners() {
        assert_eq!(Barycentric::from_unit_square(0.0, 0.0).0, [1.0, 0.0, 0.0]);
        assert_eq!(Barycentric::from_unit_square(1.0, 0.0).0, [0.0, 1.0, 0.0]);
        assert_eq!(Barycentric::from_unit_square(1.0, 1.0).0, [0.0, 0.0, 1.0]);
    }

    #[test]
    fn weights_are_convex() {
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..N {
            let b = Barycentric::from_unit_square(rng.random(), rng.random());
            assert!(b.0.iter().all(|&w| w >= 0.0));
            assert!((b.sum() - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn full_triangle_mean_is_centroid() {
        let mut rng = StdRng::seed_from_u64(2);
        let mut acc = [0.0f64; 3];
        for _ in 0..N {
            let b = Barycentric::from_unit_square(rng.random(), rng.random());
            for i in 0..3 {
                acc[i] += b.0[i];
            }
        }
        for w in acc {
            let mean = w / N as f64;
            assert!((mean - 1.0 / 3.0).abs() < 0.01, "mean weight {mean}");
        }
    }

    #[test]
    fn full_triangle_density_is_uniform() {
        // Midpoint subdivision splits the triangle into four equal-area cells:
        // three corner cells (weight i > 1/2) and the central cell.
        let mut rng = StdRng::seed_from_u64(3);
        let mut bins = [0usize; 4];
        for _ in 0..N {
            let b = Barycentric::from_unit_square(rng.random(), rng.random());
            let cell = (0..3).find(|&i| b.0[i] > 0.5).unwrap_or(3);
            bins[cell] += 1;
        }
        let expected = N as f64 / 4.0;
        let chi2: f64 = bins
            .iter()
            .map(|&o| {
                let d = o as f64 - expected;
                d * d / expected
            })
            .sum();
        // 3 degrees of freedom, p = 0.001.
        assert!(chi2 < 16.27, "chi-square {chi2} for bins {bins:?}");
    }

    #[test]
    fn trident_puts_largest_weight_first() {
        let mut rng = StdRng::seed_from_u64(4);
        for _ in 0..N {
            let b = trident_sample(rng.random(), rng.random());
            assert!(b.0[0] >= b.0[1] && b.0[0] >= b.0[2], "{b:?}");
            assert!((b.sum() - 1.0).abs() < 1e-12);
        }
        // Grid sweep including the unit-square edges.
        for i in 0..=64 {
            for j in 0..=64 {
                let b = trident_sample(i as f64 / 64.0, j as f64 / 64.0);
                assert_eq!(b.argmax(), 0, "{b:?}");
            }
        }
    }

    #[test]
    fn trident_is_uniform_over_its_third() {
        // The near-vertex third splits into two equal halves by b1 >= b2.
        let mut rng = StdRng::seed_from_u64(5);
        let mut left = 0usize;
        for _ in 0..N {
            let b = trident_sample(rng.random(), rng.random());
            if b.0[1] >= b.0[2] {
                left += 1;
            }
        }
        let frac = left as f64 / N as f64;
        assert!((frac - 0.5).abs() < 0.01, "fraction {frac}");
    }

    #[test]
    fn point_on_interpolates_vertices() {
        let tri = [
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
            Vec3::new(0.0, 0.0, 1.0),
        ];
        assert_eq!(Barycentric([1.0, 0.0, 0.0]).point_on(&tri), tri[0]);
        let c = Barycentric([0.25, 0.25, 0.5]).point_on(&tri);
        assert_eq!(c, Vec3::new(0.25, 0.25, 0.5));
    }
}
