//! Display model for a tally snapshot

use rpc_core::BlockVersion;
use crate::engine::WindowState;
use crate::retarget::RetargetSchedule;
use crate::versionbits::{bit_signal_counts, uses_version_bits};

#[derive(Debug, Clone, PartialEq)]
pub struct VersionShare {
    pub version: BlockVersion,
    pub count: u64,
    /// Percentage of the window.
    pub share: f64,
    pub uses_version_bits: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BitShare {
    pub bit: u8,
    pub count: u64,
    pub share: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TallyReport {
    pub tip_height: u64,
    pub window_start: u64,
    pub window_size: u64,
    pub next_retarget: u64,
    pub blocks_until_retarget: u64,
    /// Most common version first; ties in ascending version order.
    pub versions: Vec<VersionShare>,
    /// Ascending bit order.
    pub bits: Vec<BitShare>,
    pub total_blocks: u64,
}

impl TallyReport {
    pub fn from_snapshot(state: &WindowState, schedule: RetargetSchedule) -> Self {
        let window_size = state.window_size;

        let mut versions: Vec<VersionShare> = state
            .histogram
            .iter()
            .map(|(version, count)| VersionShare {
                version,
                count,
                share: share_of(count, window_size),
                uses_version_bits: uses_version_bits(version),
            })
            .collect();
        versions.sort_by(|a, b| b.count.cmp(&a.count).then(a.version.cmp(&b.version)));

        let bits = bit_signal_counts(&state.histogram)
            .into_iter()
            .map(|(bit, count)| BitShare {
                bit,
                count,
                share: share_of(count, window_size),
            })
            .collect();

        Self {
            tip_height: state.current_height,
            window_start: state.window_start(),
            window_size,
            next_retarget: schedule.next_after(state.current_height),
            blocks_until_retarget: schedule.blocks_until(state.current_height),
            versions,
            bits,
            total_blocks: state.histogram.total(),
        }
    }
}

fn share_of(count: u64, window_size: u64) -> f64 {
    if window_size == 0 {
        return 0.0;
    }
    count as f64 / window_size as f64 * 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::histogram::VersionHistogram;

    fn state(current_height: u64, versions: &[BlockVersion]) -> WindowState {
        WindowState {
            current_height,
            window_size: versions.len() as u64,
            histogram: versions.iter().copied().collect::<VersionHistogram>(),
        }
    }

    #[test]
    fn test_rows_sorted_by_count() {
        let report = TallyReport::from_snapshot(
            &state(2015, &[4, 0x2000_0002, 0x2000_0002, 0x2000_0000]),
            RetargetSchedule::default(),
        );

        assert_eq!(report.tip_height, 2015);
        assert_eq!(report.window_start, 2012);
        assert_eq!(report.next_retarget, 2016);
        assert_eq!(report.blocks_until_retarget, 1);
        assert_eq!(report.total_blocks, 4);

        let order: Vec<_> = report.versions.iter().map(|row| row.version).collect();
        assert_eq!(order, vec![0x2000_0002, 4, 0x2000_0000]);
        assert_eq!(report.versions[0].share, 50.0);
        assert!(!report.versions[1].uses_version_bits);
    }

    #[test]
    fn test_bit_rows() {
        let report = TallyReport::from_snapshot(
            &state(100, &[0x2000_0002, 0x2000_0003, 0x2000_0000, 0x2000_0000, 1]),
            RetargetSchedule::new(144).unwrap(),
        );

        assert_eq!(report.bits.len(), 2);
        assert_eq!((report.bits[0].bit, report.bits[0].count), (0, 1));
        assert_eq!((report.bits[1].bit, report.bits[1].count), (1, 2));
        assert!((report.bits[1].share - 40.0).abs() < 1e-9);
        assert_eq!(report.next_retarget, 144);
    }
}
