use crate::error::PipelineError;
use page_dedup_service::dto::DedupConfig;
use rand::rngs::StdRng;
use rand::SeedableRng;

/// Validated clustering parameters.
#[derive(Clone, Debug, PartialEq)]
pub struct ClusterConfig {
    /// Words per shingle (k).
    pub shingle_size: usize,
    /// Signature length (n).
    pub num_perm: usize,
    /// Number of bands (b). `num_perm / num_bands` is the number of rows per band.
    pub num_bands: usize,
    /// Explicit Jaccard threshold for pruning; derived from the banding when `None`.
    pub threshold: Option<f64>,
    /// Seed for the hash families; entropy when `None`.
    pub seed: Option<u64>,
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            shingle_size: 1,
            num_perm: 2000,
            num_bands: 500,
            threshold: None,
            seed: None,
        }
    }
}

impl ClusterConfig {
    pub fn validate(&self) -> Result<(), PipelineError> {
        if self.shingle_size == 0 {
            return Err(PipelineError::Config("shingleSize must be >= 1".into()));
        }
        if self.num_bands == 0 {
            return Err(PipelineError::Config("numBands must be >= 1".into()));
        }
        if self.num_perm < self.num_bands || self.num_perm % self.num_bands != 0 {
            return Err(PipelineError::Config(format!(
                "numPerm ({}) must be a positive multiple of numBands ({})",
                self.num_perm, self.num_bands
            )));
        }
        if let Some(t) = self.threshold {
            if !(0.0..=1.0).contains(&t) {
                return Err(PipelineError::Config(format!(
                    "threshold must lie in [0, 1] (got {t})"
                )));
            }
        }
        Ok(())
    }

    pub fn rows_per_band(&self) -> usize {
        self.num_perm / self.num_bands
    }

    /// The explicit threshold, or `(1/b)^(1/r)`.
    pub fn threshold(&self) -> f64 {
        self.threshold.unwrap_or_else(|| {
            (1.0 / self.num_bands as f64).powf(1.0 / self.rows_per_band() as f64)
        })
    }

    /// Generator for hash family coefficients.
    pub fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }
}

impl TryFrom<&DedupConfig> for ClusterConfig {
    type Error = PipelineError;

    fn try_from(request: &DedupConfig) -> Result<Self, Self::Error> {
        let config = ClusterConfig {
            shingle_size: request.shingle_size,
            num_perm: request.num_perm,
            num_bands: request.num_bands,
            threshold: request.threshold,
            seed: request.seed,
        };
        config.validate()?;
        Ok(config)
    }
}
