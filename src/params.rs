//! Cost parameters, variant and version tags, and their validation.

use std::time::Duration;

use crate::error::{Error, Result};
use crate::memory::SYNC_POINTS;

/// Argon2 variant. The three variants differ only in when block addressing
/// is derived from position counters instead of block contents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Algorithm {
    /// Data-dependent addressing throughout. Fastest, no timing resistance.
    Argon2d,
    /// Data-independent addressing throughout.
    Argon2i,
    /// Data-independent for the first two segments of the first pass,
    /// data-dependent afterwards. The RFC 9106 recommended default.
    Argon2id,
}

impl Algorithm {
    /// Numeric tag hashed into H0 (RFC 9106 field `y`).
    pub const fn id(self) -> u32 {
        match self {
            Algorithm::Argon2d => 0,
            Algorithm::Argon2i => 1,
            Algorithm::Argon2id => 2,
        }
    }

    /// Whether the segment at `(pass, slice)` uses address blocks instead
    /// of the previous block's contents.
    pub(crate) const fn data_independent(self, pass: u32, slice: u32) -> bool {
        match self {
            Algorithm::Argon2d => false,
            Algorithm::Argon2i => true,
            Algorithm::Argon2id => pass == 0 && slice < 2,
        }
    }
}

impl std::fmt::Display for Algorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Algorithm::Argon2d => "Argon2d",
            Algorithm::Argon2i => "Argon2i",
            Algorithm::Argon2id => "Argon2id",
        })
    }
}

impl TryFrom<u32> for Algorithm {
    type Error = Error;

    fn try_from(tag: u32) -> Result<Self> {
        match tag {
            0 => Ok(Algorithm::Argon2d),
            1 => Ok(Algorithm::Argon2i),
            2 => Ok(Algorithm::Argon2id),
            _ => Err(Error::InvalidAlgorithm),
        }
    }
}

/// Argon2 version. 0x13 XOR-accumulates blocks on passes after the first;
/// 0x10 always overwrites.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Version {
    V0x10 = 0x10,
    #[default]
    V0x13 = 0x13,
}

impl Version {
    /// Numeric value hashed into H0 (RFC 9106 field `v`).
    pub const fn id(self) -> u32 {
        self as u32
    }
}

impl TryFrom<u32> for Version {
    type Error = Error;

    fn try_from(tag: u32) -> Result<Self> {
        match tag {
            0x10 => Ok(Version::V0x10),
            0x13 => Ok(Version::V0x13),
            _ => Err(Error::InvalidVersion),
        }
    }
}

/// Cost and policy parameters for one derivation.
///
/// `new` takes the three required costs; everything else has a default and
/// a `with_*` setter. Validation happens on use, before any allocation,
/// with one error kind per violated precondition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Params {
    memory_kib: u32,
    time_cost: u32,
    lanes: u32,
    tag_len: u32,
    version: Version,
    max_memory: u64,
    yield_interval: Duration,
}

impl Params {
    /// Inclusive upper bound on lane count (`p < 2^24`).
    pub const MAX_LANES: u32 = 0xFF_FFFF;
    /// Minimum output length in bytes.
    pub const MIN_TAG_LEN: u32 = 4;
    /// Minimum salt length in bytes.
    pub const MIN_SALT_LEN: usize = 8;
    /// Default output length in bytes.
    pub const DEFAULT_TAG_LEN: u32 = 32;
    /// Default memory budget: the full 2^32 - 1 addressable bytes.
    pub const DEFAULT_MAX_MEMORY: u64 = u32::MAX as u64;
    /// Default cooperative yield budget.
    pub const DEFAULT_YIELD_INTERVAL: Duration = Duration::from_millis(10);

    pub fn new(memory_kib: u32, time_cost: u32, lanes: u32) -> Self {
        Self {
            memory_kib,
            time_cost,
            lanes,
            tag_len: Self::DEFAULT_TAG_LEN,
            version: Version::default(),
            max_memory: Self::DEFAULT_MAX_MEMORY,
            yield_interval: Self::DEFAULT_YIELD_INTERVAL,
        }
    }

    /// Output length for the allocating entry points.
    pub fn with_tag_len(mut self, tag_len: u32) -> Self {
        self.tag_len = tag_len;
        self
    }

    pub fn with_version(mut self, version: Version) -> Self {
        self.version = version;
        self
    }

    /// Upper bound in bytes on the rounded block matrix.
    pub fn with_max_memory(mut self, max_memory: u64) -> Self {
        self.max_memory = max_memory;
        self
    }

    /// How long the cooperative driver computes between yields.
    pub fn with_yield_interval(mut self, yield_interval: Duration) -> Self {
        self.yield_interval = yield_interval;
        self
    }

    pub const fn memory_kib(&self) -> u32 {
        self.memory_kib
    }

    pub const fn time_cost(&self) -> u32 {
        self.time_cost
    }

    pub const fn lanes(&self) -> u32 {
        self.lanes
    }

    pub const fn tag_len(&self) -> u32 {
        self.tag_len
    }

    pub const fn version(&self) -> Version {
        self.version
    }

    pub const fn max_memory(&self) -> u64 {
        self.max_memory
    }

    pub const fn yield_interval(&self) -> Duration {
        self.yield_interval
    }

    /// Usable block count `m' = 4 * p * floor(m / (4 * p))`.
    ///
    /// Callers sizing a reusable matrix for [`crate::Argon2::hash_into_with_memory`]
    /// allocate this many [`crate::Block`]s. Zero when `lanes` is zero; the
    /// hashing entry points reject that configuration outright.
    pub const fn block_count(&self) -> usize {
        let group = SYNC_POINTS as u64 * self.lanes as u64;
        if group == 0 {
            return 0;
        }
        ((self.memory_kib as u64 / group) * group) as usize
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if self.lanes < 1 || self.lanes > Self::MAX_LANES {
            return Err(Error::InvalidLanes);
        }
        if self.time_cost < 1 {
            return Err(Error::InvalidTimeCost);
        }
        if self.memory_kib < 8 * self.lanes {
            return Err(Error::InvalidMemory);
        }
        if self.tag_len < Self::MIN_TAG_LEN {
            return Err(Error::InvalidTagLength);
        }
        let needed = self.block_count() as u64 * crate::block::Block::SIZE as u64;
        if needed > self.max_memory {
            return Err(Error::MemoryBudgetExceeded {
                needed,
                budget: self.max_memory,
            });
        }
        Ok(())
    }
}

impl Default for Params {
    /// RFC 9106 second recommended profile: 19 MiB, 2 passes, 1 lane.
    fn default() -> Self {
        Self::new(19 * 1024, 2, 1)
    }
}
