//! Runtime configuration for the tiled pipeline.

use std::num::NonZeroUsize;

// ── PipelineConfig ─────────────────────────────────────────────────

/// Configuration for [`predict_tiled`](crate::pipeline::predict_tiled).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PipelineConfig {
    /// Upper bound on worker threads. `None` = one per available core.
    pub worker_count: Option<usize>,
    /// Id budget per tile. Default: 65 536, which fits grids of up to
    /// 65 535 tiles into `u32`.
    pub max_objects_per_tile: u32,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            worker_count: None,
            max_objects_per_tile: 65_536,
        }
    }
}

impl PipelineConfig {
    /// Workers to start for a grid of `n_tiles` tiles.
    ///
    /// Each worker holds one tile at a time, so there are never more
    /// workers than tiles, and always at least one.
    pub fn workers_for(&self, n_tiles: usize) -> usize {
        let wanted = self.worker_count.unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(NonZeroUsize::get)
                .unwrap_or(1)
        });
        wanted.min(n_tiles).max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::IdScheme;

    fn with_workers(n: usize) -> PipelineConfig {
        PipelineConfig {
            worker_count: Some(n),
            ..PipelineConfig::default()
        }
    }

    #[test]
    fn workers_never_exceed_tiles() {
        assert_eq!(with_workers(8).workers_for(3), 3);
        assert_eq!(with_workers(2).workers_for(30), 2);
        let auto = PipelineConfig::default().workers_for(2);
        assert!((1..=2).contains(&auto), "auto count {auto}");
    }

    #[test]
    fn at_least_one_worker() {
        assert_eq!(with_workers(0).workers_for(5), 1);
        assert_eq!(with_workers(4).workers_for(0), 1);
    }

    #[test]
    fn default_budget_fits_its_documented_grid() {
        let per_tile = PipelineConfig::default().max_objects_per_tile;
        assert!(IdScheme::new(65_535, per_tile).is_ok());
        assert!(IdScheme::new(65_536, per_tile).is_err());
    }
}
