//! Stable identifier hashing used for content hashes and shard assignment.
//!
//! The hash is persisted in every output row and decides which shard file a record lands in,
//! so it must never depend on the process, platform or toolchain. Any change to
//! [`stable_hash`] requires bumping [`HASH_VERSION`] and reprocessing every output.

use std::num::NonZeroU32;

use crate::types::TrialId;

/// Version of the [`stable_hash`] function, recorded in run statistics.
pub const HASH_VERSION: u32 = 1;

const FNV_OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

/// FNV-1a over the bytes of `value`, finalized with the MurmurHash3 `fmix64` step.
pub fn stable_hash(value: &str) -> u64 {
    let mut hash = FNV_OFFSET_BASIS;
    for byte in value.as_bytes() {
        hash ^= u64::from(*byte);
        hash = hash.wrapping_mul(FNV_PRIME);
    }

    fmix64(hash)
}

fn fmix64(mut hash: u64) -> u64 {
    hash ^= hash >> 33;
    hash = hash.wrapping_mul(0xff51_afd7_ed55_8ccd);
    hash ^= hash >> 33;
    hash = hash.wrapping_mul(0xc4ce_b9fe_1a85_ec53);
    hash ^= hash >> 33;
    hash
}

/// Returns the shard of `id` among `shard_count` shards.
pub fn shard_id(id: &TrialId, shard_count: NonZeroU32) -> u32 {
    (stable_hash(id.as_str()) % u64::from(shard_count.get())) as u32
}
