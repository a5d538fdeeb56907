//! Table-wide constants exposed to clients via the view projection (C7).

pub const N_SEATS: usize = 6;
pub const SMALL_BLIND: u64 = 10;
pub const BIG_BLIND: u64 = 20;
pub const MIN_BUYIN: u64 = 100;
pub const MAX_BUYIN: u64 = 1_000_000;
