use crate::displace::DisplaceError;

/// Default number of Monte Carlo samples drawn per incident triangle.
pub const DEFAULT_SAMPLES_PER_TRIANGLE: u32 = 50;
/// Default seed; a fixed value keeps output reproducible run to run.
pub const DEFAULT_SEED: u64 = 123_408;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct DisplaceConfig {
    pub samples_per_triangle: u32,
    pub seed: u64,
}

impl Default for DisplaceConfig {
    fn default() -> Self {
        Self {
            samples_per_triangle: DEFAULT_SAMPLES_PER_TRIANGLE,
            seed: DEFAULT_SEED,
        }
    }
}

impl DisplaceConfig {
    pub fn validate(&self) -> Result<(), DisplaceError> {
        if self.samples_per_triangle == 0 {
            return Err(DisplaceError::ZeroSamples);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::DisplaceConfig;
    use crate::displace::DisplaceError;

    #[test]
    fn defaults() {
        let c = DisplaceConfig::default();
        assert_eq!(c.samples_per_triangle, 50);
        assert_eq!(c.seed, 123_408);
        assert!(c.validate().is_ok());
    }

    #[test]
    fn zero_samples_rejected() {
        let c = DisplaceConfig {
            samples_per_triangle: 0,
            ..DisplaceConfig::default()
        };
        assert!(matches!(c.validate(), Err(DisplaceError::ZeroSamples)));
    }
}
