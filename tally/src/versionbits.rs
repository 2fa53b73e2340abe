//! BIP9 version bits decoding
//!
//! A version signals through bits `0..29` only when its top three bits are
//! `001`. Any other top pattern carries no deployment signals.

use rpc_core::BlockVersion;
use std::collections::BTreeMap;
use crate::histogram::VersionHistogram;

pub const VERSIONBITS_TOP_MASK: BlockVersion = 0xE000_0000;
pub const VERSIONBITS_TOP_BITS: BlockVersion = 0x2000_0000;
pub const VERSIONBITS_NUM_BITS: u8 = 29;

pub fn uses_version_bits(version: BlockVersion) -> bool {
    version & VERSIONBITS_TOP_MASK == VERSIONBITS_TOP_BITS
}

/// Deployment bits set in `version`, lowest first.
pub fn signalled_bits(version: BlockVersion) -> impl Iterator<Item = u8> {
    let signals = uses_version_bits(version);
    (0..VERSIONBITS_NUM_BITS).filter(move |bit| signals && version & (1 << bit) != 0)
}

/// Blocks in the histogram signaling each bit. Bits nobody signals are omitted.
pub fn bit_signal_counts(histogram: &VersionHistogram) -> BTreeMap<u8, u64> {
    let mut counts = BTreeMap::new();
    for (version, count) in histogram.iter() {
        for bit in signalled_bits(version) {
            *counts.entry(bit).or_insert(0) += count;
        }
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_top_bits() {
        assert!(uses_version_bits(0x2000_0000));
        assert!(uses_version_bits(0x3fff_ffff));
        assert!(!uses_version_bits(4));
        assert!(!uses_version_bits(0xe000_0000));
        assert!(!uses_version_bits(0x4000_0000));
    }

    #[test]
    fn test_signalled_bits() {
        assert_eq!(signalled_bits(0x2000_0002).collect::<Vec<_>>(), vec![1]);
        assert_eq!(signalled_bits(0x2000_0005).collect::<Vec<_>>(), vec![0, 2]);
        assert_eq!(signalled_bits(0x2000_0000).count(), 0);
        // legacy versions never signal, whatever their low bits
        assert_eq!(signalled_bits(0x0000_0007).count(), 0);
        assert_eq!(signalled_bits(0x3fff_ffff).count(), 29);
    }

    #[test]
    fn test_bit_signal_counts() {
        let histogram: VersionHistogram = [0x2000_0002, 0x2000_0002, 0x2000_0006, 0x2000_0000, 4]
            .into_iter()
            .collect();
        let counts = bit_signal_counts(&histogram);
        assert_eq!(counts.get(&1), Some(&3));
        assert_eq!(counts.get(&2), Some(&1));
        assert_eq!(counts.len(), 2);
    }
}
