//! Window tally engine
//!
//! Maintains the version histogram of the trailing window
//! `[tip - W + 1, tip]`. Advancing by `delta < W` blocks fetches the `delta`
//! entering heights and the `delta` heights at the old window start; a jump of
//! `W` or more rescans the whole window instead.
//!
//! Every fetch for a call is staged before the histogram changes, so a failed
//! call leaves the engine exactly as it was.

use futures_util::stream::{self, StreamExt, TryStreamExt};
use rpc_core::{BlockVersion, ChainReader};
use std::ops::RangeInclusive;
use tracing::{debug, info};
use crate::constants::DEFAULT_FETCH_CONCURRENCY;
use crate::error::{TallyError, TallyResult};
use crate::histogram::VersionHistogram;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TallyConfig {
    /// Number of blocks in the window (`W`).
    pub window_size: u64,
    /// Upper bound on block fetches in flight.
    pub fetch_concurrency: usize,
}

impl TallyConfig {
    pub fn new(window_size: u64) -> Self {
        Self {
            window_size,
            fetch_concurrency: DEFAULT_FETCH_CONCURRENCY,
        }
    }

    pub fn with_fetch_concurrency(mut self, fetch_concurrency: usize) -> Self {
        self.fetch_concurrency = fetch_concurrency;
        self
    }

    pub fn validate(&self) -> TallyResult<()> {
        if self.window_size == 0 {
            return Err(TallyError::InvalidConfig("window size must be at least 1".to_string()));
        }
        if self.fetch_concurrency == 0 {
            return Err(TallyError::InvalidConfig("fetch concurrency must be at least 1".to_string()));
        }
        Ok(())
    }
}

/// Point-in-time copy of the tally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowState {
    pub current_height: u64,
    pub window_size: u64,
    pub histogram: VersionHistogram,
}

impl WindowState {
    /// Lowest height inside the window, clamped at genesis.
    pub fn window_start(&self) -> u64 {
        self.current_height.saturating_sub(self.window_size.saturating_sub(1))
    }

    pub fn heights(&self) -> RangeInclusive<u64> {
        self.window_start()..=self.current_height
    }
}

/// What a [`TallyEngine::advance`] call did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdvanceOutcome {
    /// Tip did not move.
    Unchanged,
    /// Window slid forward block by block.
    Incremental { added: u64, removed: u64 },
    /// The tip moved a full window or more; the window was rescanned.
    Rebuilt { previous_height: u64 },
}

pub struct TallyEngine {
    state: WindowState,
    fetch_concurrency: usize,
}

impl TallyEngine {
    /// Scan the `W` blocks ending at `current_height`.
    pub async fn initialize<R>(reader: &R, current_height: u64, config: TallyConfig) -> TallyResult<Self>
    where
        R: ChainReader + ?Sized,
    {
        Self::initialize_with_progress(reader, current_height, config, |_| {}).await
    }

    /// Like [`TallyEngine::initialize`], calling `on_progress` with the number
    /// of blocks scanned so far after each fetch.
    pub async fn initialize_with_progress<R, F>(
        reader: &R,
        current_height: u64,
        config: TallyConfig,
        on_progress: F,
    ) -> TallyResult<Self>
    where
        R: ChainReader + ?Sized,
        F: FnMut(u64),
    {
        config.validate()?;
        let state = scan_window(
            reader,
            current_height,
            config.window_size,
            config.fetch_concurrency,
            on_progress,
        )
        .await?;

        info!(
            "Tallied {} blocks ({} to {}), {} distinct versions",
            state.window_size,
            state.window_start(),
            state.current_height,
            state.histogram.len()
        );

        Ok(Self {
            state,
            fetch_concurrency: config.fetch_concurrency,
        })
    }

    /// Slide the window so that it ends at `new_height`.
    pub async fn advance<R>(&mut self, reader: &R, new_height: u64) -> TallyResult<AdvanceOutcome>
    where
        R: ChainReader + ?Sized,
    {
        let current = self.state.current_height;
        if new_height < current {
            return Err(TallyError::HeightRegression {
                current,
                requested: new_height,
            });
        }

        let delta = new_height - current;
        if delta == 0 {
            return Ok(AdvanceOutcome::Unchanged);
        }

        let window_size = self.state.window_size;
        info!("New height: {} Old height: {} Diff: {}", new_height, current, delta);

        if delta >= window_size {
            info!("Tip moved past the whole {}-block window, rescanning", window_size);
            self.state = scan_window(reader, new_height, window_size, self.fetch_concurrency, |_| {}).await?;
            return Ok(AdvanceOutcome::Rebuilt {
                previous_height: current,
            });
        }

        // Entering and leaving heights share one stream so the concurrency bound covers both.
        let old_start = self.state.window_start();
        let entering = current + 1..=new_height;
        let leaving = old_start..=old_start + delta - 1;
        let mut added = fetch_versions(reader, entering.chain(leaving), self.fetch_concurrency, |_| {}).await?;
        let removed = added.split_off(delta as usize);

        let mut histogram = self.state.histogram.clone();
        for &(height, version) in &added {
            debug!("Adding {} (0x{:08x})", height, version);
            histogram.increment(version);
        }
        for &(height, version) in &removed {
            debug!("Removing {} (0x{:08x})", height, version);
            if !histogram.decrement(version) {
                return Err(TallyError::CountUnderflow { height, version });
            }
        }
        debug_assert_eq!(histogram.total(), window_size);

        self.state.histogram = histogram;
        self.state.current_height = new_height;

        Ok(AdvanceOutcome::Incremental {
            added: added.len() as u64,
            removed: removed.len() as u64,
        })
    }

    pub fn snapshot(&self) -> WindowState {
        self.state.clone()
    }

    pub fn current_height(&self) -> u64 {
        self.state.current_height
    }

    pub fn window_size(&self) -> u64 {
        self.state.window_size
    }

    pub fn window_start(&self) -> u64 {
        self.state.window_start()
    }

    pub fn histogram(&self) -> &VersionHistogram {
        &self.state.histogram
    }
}

async fn scan_window<R, F>(
    reader: &R,
    tip: u64,
    window_size: u64,
    concurrency: usize,
    on_progress: F,
) -> TallyResult<WindowState>
where
    R: ChainReader + ?Sized,
    F: FnMut(u64),
{
    let start = tip
        .checked_add(1)
        .and_then(|end| end.checked_sub(window_size))
        .ok_or(TallyError::ChainTooShort {
            height: tip,
            window_size,
        })?;

    let fetched = fetch_versions(reader, start..=tip, concurrency, on_progress).await?;

    Ok(WindowState {
        current_height: tip,
        window_size,
        histogram: fetched.into_iter().map(|(_, version)| version).collect(),
    })
}

/// Fetch every height in `heights`, at most `concurrency` at a time.
/// Results come back in the order `heights` yields them; the first failure aborts the rest.
async fn fetch_versions<R, I, F>(
    reader: &R,
    heights: I,
    concurrency: usize,
    mut on_progress: F,
) -> TallyResult<Vec<(u64, BlockVersion)>>
where
    R: ChainReader + ?Sized,
    I: IntoIterator<Item = u64>,
    F: FnMut(u64),
{
    let mut done = 0u64;
    stream::iter(heights)
        .map(|height| async move {
            reader
                .block_version_at(height)
                .await
                .map(|version| (height, version))
                .map_err(|source| TallyError::Fetch { height, source })
        })
        .buffered(concurrency)
        .inspect_ok(|_| {
            done += 1;
            on_progress(done);
        })
        .try_collect()
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use rpc_core::MemoryChain;

    #[test]
    fn test_config_validation() {
        assert!(TallyConfig::new(4).validate().is_ok());
        assert!(matches!(TallyConfig::new(0).validate(), Err(TallyError::InvalidConfig(_))));
        assert!(matches!(
            TallyConfig::new(4).with_fetch_concurrency(0).validate(),
            Err(TallyError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_window_state_bounds() {
        let state = WindowState {
            current_height: 13,
            window_size: 4,
            histogram: VersionHistogram::new(),
        };
        assert_eq!(state.window_start(), 10);
        assert_eq!(state.heights(), 10..=13);
    }

    #[test]
    fn test_window_start_clamps_at_genesis() {
        let state = WindowState {
            current_height: 2,
            window_size: 10,
            histogram: VersionHistogram::new(),
        };
        assert_eq!(state.window_start(), 0);

        let state = WindowState {
            current_height: u64::MAX,
            window_size: 1,
            histogram: VersionHistogram::new(),
        };
        assert_eq!(state.window_start(), u64::MAX);
    }

    #[tokio::test]
    async fn test_window_may_start_at_genesis() {
        let chain = MemoryChain::from_versions(vec![1, 2, 2, 3]);
        let engine = TallyEngine::initialize(&chain, 3, TallyConfig::new(4)).await.unwrap();
        assert_eq!(engine.window_start(), 0);
        assert_eq!(engine.histogram().count(2), 2);
    }

    #[tokio::test]
    async fn test_chain_shorter_than_window() {
        let chain = MemoryChain::from_versions(vec![1, 2, 2]);
        let result = TallyEngine::initialize(&chain, 2, TallyConfig::new(4)).await;
        assert!(matches!(
            result,
            Err(TallyError::ChainTooShort { height: 2, window_size: 4 })
        ));
        assert_eq!(chain.fetch_count(), 0);
    }

    #[tokio::test]
    async fn test_progress_reports_each_block() {
        let chain = MemoryChain::generate(100, |h| (h % 3) as u32);
        let mut seen = Vec::new();
        TallyEngine::initialize_with_progress(&chain, 99, TallyConfig::new(5), |done| seen.push(done))
            .await
            .unwrap();
        assert_eq!(seen, vec![1, 2, 3, 4, 5]);
    }

    #[tokio::test]
    async fn test_fetch_failure_carries_height() {
        let chain = MemoryChain::generate(50, |_| 1);
        chain.fail_at(47);
        let err = TallyEngine::initialize(&chain, 49, TallyConfig::new(10)).await.err().unwrap();
        assert_eq!(err.failed_height(), Some(47));
    }
}
