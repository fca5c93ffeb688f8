//! Matrix geometry, the H0 seed digest, and first-column seeding.

use blake2::digest::Digest;
use blake2::Blake2b512;
use zeroize::Zeroize;

use crate::block::Block;
use crate::error::Result;
use crate::hprime::blake2b_long;
use crate::params::{Algorithm, Params, Version};

/// Segments per lane; lanes synchronize at segment boundaries.
pub(crate) const SYNC_POINTS: u32 = 4;

/// (J1, J2) pairs carried by one address block.
pub(crate) const ADDRESSES_PER_BLOCK: u32 = 128;

/// Geometry of the rounded block matrix: `p` lanes of `q` columns, each
/// lane split into four segments.
#[derive(Debug, Clone, Copy)]
pub(crate) struct MemoryLayout {
    pub(crate) lanes: u32,
    pub(crate) lane_len: u32,
    pub(crate) segment_len: u32,
    pub(crate) total_blocks: u32,
}

impl MemoryLayout {
    pub(crate) fn new(params: &Params) -> Self {
        let lanes = params.lanes();
        let total_blocks = params.block_count() as u32;
        let lane_len = total_blocks / lanes;
        Self {
            lanes,
            lane_len,
            segment_len: lane_len / SYNC_POINTS,
            total_blocks,
        }
    }

    /// Linear index of the block at `column` in `lane`.
    #[inline]
    pub(crate) fn index(&self, lane: u32, column: u32) -> usize {
        (lane * self.lane_len + column) as usize
    }
}

/// H0, the 64-byte digest binding every parameter and input:
/// `BLAKE2b-512(LE32(p) || LE32(T) || LE32(m) || LE32(t) || LE32(v) ||
/// LE32(y) || LE32(|P|) || P || LE32(|S|) || S || LE32(|K|) || K ||
/// LE32(|X|) || X)`. Note `m` is the requested memory, not the rounded
/// block count.
#[allow(clippy::too_many_arguments)]
pub(crate) fn initial_hash(
    algorithm: Algorithm,
    version: Version,
    params: &Params,
    tag_len: u32,
    password: &[u8],
    salt: &[u8],
    secret: &[u8],
    ad: &[u8],
) -> [u8; 64] {
    let mut digest = Blake2b512::new();
    digest.update(params.lanes().to_le_bytes());
    digest.update(tag_len.to_le_bytes());
    digest.update(params.memory_kib().to_le_bytes());
    digest.update(params.time_cost().to_le_bytes());
    digest.update(version.id().to_le_bytes());
    digest.update(algorithm.id().to_le_bytes());
    digest.update((password.len() as u32).to_le_bytes());
    digest.update(password);
    digest.update((salt.len() as u32).to_le_bytes());
    digest.update(salt);
    digest.update((secret.len() as u32).to_le_bytes());
    digest.update(secret);
    digest.update((ad.len() as u32).to_le_bytes());
    digest.update(ad);

    let mut h0 = [0u8; 64];
    h0.copy_from_slice(&digest.finalize());
    h0
}

/// Seeds columns 0 and 1 of every lane from H0:
/// `B[l][j] = H'(H0 || LE32(j) || LE32(l), 1024)` for j in {0, 1}.
pub(crate) fn seed_lanes(h0: &[u8; 64], layout: &MemoryLayout, memory: &mut [Block]) -> Result<()> {
    let mut bytes = [0u8; Block::SIZE];
    for lane in 0..layout.lanes {
        for column in 0..2u32 {
            blake2b_long(
                &[h0, &column.to_le_bytes(), &lane.to_le_bytes()],
                &mut bytes,
            )?;
            memory[layout.index(lane, column)].load(&bytes);
        }
    }
    bytes.zeroize();
    Ok(())
}
