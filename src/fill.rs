//! Pass/segment/lane traversal, block production, and finalization.
//!
//! A segment is the unit of addressing state, so the segment body lives in
//! a resumable stepper ([`SegmentFill`]) that produces one block per call.
//! The blocking driver runs each stepper to completion; the cooperative
//! driver interleaves steps with scheduler yields whenever the pacer's
//! budget runs out. Both produce bit-identical matrices.

use zeroize::Zeroize;

use crate::block::Block;
use crate::error::Result;
use crate::hprime::blake2b_long;
use crate::memory::{MemoryLayout, ADDRESSES_PER_BLOCK, SYNC_POINTS};
use crate::pacer::{ProgressMeter, YieldPacer};
use crate::params::{Algorithm, Version};
use crate::reference::reference_position;

/// Everything the traversal needs beyond the matrix itself.
pub(crate) struct FillContext {
    pub(crate) layout: MemoryLayout,
    pub(crate) algorithm: Algorithm,
    pub(crate) version: Version,
    pub(crate) time_cost: u32,
}

impl FillContext {
    /// Blocks produced by G across all passes; the two seeded columns per
    /// lane are derived by H' instead.
    pub(crate) fn produced_blocks(&self) -> u64 {
        self.time_cost as u64 * self.layout.total_blocks as u64 - 2 * self.layout.lanes as u64
    }
}

/// Resumable fill of one segment: one produced block per `step` call.
///
/// Holds the data-independent addressing state (the `address`/`input` pair
/// mixed against the implicit zero block), which is refreshed every 128
/// blocks and zeroized by `finish`.
pub(crate) struct SegmentFill {
    pass: u32,
    slice: u32,
    lane: u32,
    index: u32,
    cur_offset: usize,
    prev_offset: usize,
    data_independent: bool,
    xor_output: bool,
    address: Block,
    input: Block,
}

impl SegmentFill {
    pub(crate) fn new(ctx: &FillContext, pass: u32, slice: u32, lane: u32) -> Self {
        let data_independent = ctx.algorithm.data_independent(pass, slice);

        let mut input = Block::ZERO;
        if data_independent {
            input.0[0] = pass as u64;
            input.0[1] = lane as u64;
            input.0[2] = slice as u64;
            input.0[3] = ctx.layout.total_blocks as u64;
            input.0[4] = ctx.time_cost as u64;
            input.0[5] = ctx.algorithm.id() as u64;
        }

        // Columns 0 and 1 of every lane are seeded before the first pass.
        let start_index = if pass == 0 && slice == 0 { 2 } else { 0 };

        let mut address = Block::ZERO;
        if data_independent && start_index != 0 {
            // The first segment starts past the address-regeneration point
            // at index 0, so prime the pair here.
            next_addresses(&mut address, &mut input);
        }

        let cur_offset = ctx
            .layout
            .index(lane, slice * ctx.layout.segment_len + start_index);
        let prev_offset = if slice == 0 && start_index == 0 {
            // Lane-start blocks chain from the lane's last column.
            cur_offset + ctx.layout.lane_len as usize - 1
        } else {
            cur_offset - 1
        };

        Self {
            pass,
            slice,
            lane,
            index: start_index,
            cur_offset,
            prev_offset,
            data_independent,
            xor_output: pass != 0 && ctx.version == Version::V0x13,
            address,
            input,
        }
    }

    /// Produces the next block of the segment. Returns `false` once the
    /// segment is complete.
    pub(crate) fn step(&mut self, ctx: &FillContext, memory: &mut [Block]) -> bool {
        if self.index >= ctx.layout.segment_len {
            return false;
        }

        let rand = if self.data_independent {
            if self.index % ADDRESSES_PER_BLOCK == 0 {
                next_addresses(&mut self.address, &mut self.input);
            }
            self.address.0[(self.index % ADDRESSES_PER_BLOCK) as usize]
        } else {
            memory[self.prev_offset].0[0]
        };

        let (ref_lane, ref_col) = reference_position(
            &ctx.layout,
            self.pass,
            self.slice,
            self.lane,
            self.index,
            rand,
        );
        let ref_offset = ctx.layout.index(ref_lane, ref_col);

        debug_assert!(ref_offset < memory.len());
        debug_assert_ne!(ref_offset, self.cur_offset);
        debug_assert_ne!(ref_offset, self.prev_offset);
        debug_assert_ne!(self.prev_offset, self.cur_offset);
        // The first slice of the first pass never leaves its own lane.
        debug_assert!(self.pass != 0 || self.slice != 0 || ref_lane == self.lane);

        let compressed = Block::compress(&memory[self.prev_offset], &memory[ref_offset]);
        if self.xor_output {
            memory[self.cur_offset] ^= &compressed;
        } else {
            memory[self.cur_offset] = compressed;
        }

        self.prev_offset = self.cur_offset;
        self.cur_offset += 1;
        self.index += 1;
        true
    }

    /// Clears the addressing state. Called once per segment; cheap next to
    /// the segment's compress work.
    pub(crate) fn finish(&mut self) {
        self.address.zeroize();
        self.input.zeroize();
    }

    #[cfg(test)]
    pub(crate) fn scratch_words(&self) -> impl Iterator<Item = u64> + '_ {
        self.address.0.iter().chain(self.input.0.iter()).copied()
    }
}

/// Two G applications against the zero block turn the counter state into a
/// fresh block of 128 (J1, J2) pairs.
fn next_addresses(address: &mut Block, input: &mut Block) {
    input.0[6] = input.0[6].wrapping_add(1);
    *address = Block::compress(&Block::ZERO, input);
    *address = Block::compress(&Block::ZERO, address);
}

/// Runs every pass to completion on the current thread.
pub(crate) fn fill_blocking(
    ctx: &FillContext,
    memory: &mut [Block],
    progress: &mut ProgressMeter<'_>,
) {
    for pass in 0..ctx.time_cost {
        for slice in 0..SYNC_POINTS {
            for lane in 0..ctx.layout.lanes {
                let mut segment = SegmentFill::new(ctx, pass, slice, lane);
                while segment.step(ctx, memory) {
                    progress.record();
                }
                segment.finish();
            }
        }
    }
    progress.finish();
}

/// Identical traversal, but hands control back to the scheduler between
/// blocks whenever the pacer's budget is spent. Dropping the returned
/// future mid-fill releases the matrix and the addressing state.
pub(crate) async fn fill_cooperative(
    ctx: &FillContext,
    memory: &mut [Block],
    progress: &mut ProgressMeter<'_>,
    pacer: &mut YieldPacer,
) {
    for pass in 0..ctx.time_cost {
        for slice in 0..SYNC_POINTS {
            for lane in 0..ctx.layout.lanes {
                let mut segment = SegmentFill::new(ctx, pass, slice, lane);
                while segment.step(ctx, memory) {
                    progress.record();
                    if pacer.due() {
                        tokio::task::yield_now().await;
                        pacer.rearm();
                    }
                }
                segment.finish();
            }
        }
    }
    progress.finish();
}

/// XORs the last column into the accumulator C and expands it through H':
/// `tag = H'(B[0][q-1] ^ ... ^ B[p-1][q-1], tag_len)`.
pub(crate) fn finalize_into(layout: &MemoryLayout, memory: &[Block], out: &mut [u8]) -> Result<()> {
    let last_column = layout.lane_len - 1;
    let mut acc = memory[layout.index(0, last_column)].clone();
    for lane in 1..layout.lanes {
        acc ^= &memory[layout.index(lane, last_column)];
    }

    let mut bytes = [0u8; Block::SIZE];
    acc.store(&mut bytes);
    let result = blake2b_long(&[&bytes], out);
    acc.zeroize();
    bytes.zeroize();
    result
}
