//! Reference block selection (RFC 9106 section 3.4.1.3).

use crate::memory::{MemoryLayout, SYNC_POINTS};

/// Maps the pseudorandom word for the block at `(pass, slice, lane, index)`
/// to the `(lane, column)` of its reference block.
///
/// `J1` (low half) picks a position inside the allowed window with a
/// quadratic bias toward recent blocks; `J2` (high half) picks the lane,
/// except in the first slice of the first pass where the lane's own prefix
/// is the only written memory. The window never includes the block being
/// written or the one immediately before it in the same lane.
#[inline]
pub(crate) fn reference_position(
    layout: &MemoryLayout,
    pass: u32,
    slice: u32,
    lane: u32,
    index: u32,
    rand: u64,
) -> (u32, u32) {
    let j1 = rand as u32 as u64;
    let j2 = (rand >> 32) as u32;

    let ref_lane = if pass == 0 && slice == 0 {
        lane
    } else {
        j2 % layout.lanes
    };
    let same_lane = ref_lane == lane;

    let segment_len = layout.segment_len;
    let lane_len = layout.lane_len;

    // Size of the window of referencable blocks. An index-0 block may not
    // use the final block of the preceding segment group: that is its own
    // `prev` input.
    let area = if pass == 0 {
        if slice == 0 {
            index - 1
        } else if same_lane {
            slice * segment_len + index - 1
        } else {
            slice * segment_len - u32::from(index == 0)
        }
    } else if same_lane {
        lane_len - segment_len + index - 1
    } else {
        lane_len - segment_len - u32::from(index == 0)
    };
    debug_assert!(area > 0, "pass={pass} slice={slice} index={index}");

    // rel = area - 1 - floor(area * floor(J1^2 / 2^32) / 2^32)
    let mapped = (j1 * j1) >> 32;
    let rel = area as u64 - 1 - ((area as u64 * mapped) >> 32);

    // After the first pass the window starts at the segment after this one
    // (the remainder of the previous pass), wrapping inside the lane.
    let start = if pass != 0 && slice != SYNC_POINTS - 1 {
        (slice + 1) * segment_len
    } else {
        0
    };

    (ref_lane, ((start as u64 + rel) % lane_len as u64) as u32)
}
