/// Blocks between difficulty adjustments on Bitcoin and Litecoin.
pub const RETARGET_INTERVAL: u64 = 2016;

/// Default tally window: four retarget periods.
pub const SIGNAL_WINDOW: u64 = RETARGET_INTERVAL * 4;

/// BIP9 confirmation window used by regtest.
pub const REGTEST_SIGNAL_WINDOW: u64 = 144;

/// Block fetches kept in flight while scanning.
pub const DEFAULT_FETCH_CONCURRENCY: usize = 8;
