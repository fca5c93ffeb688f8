/// Errors reported before any block of the matrix is computed.
///
/// Every precondition on parameters and inputs maps to its own variant so
/// callers can tell a misconfigured cost apart from a bad salt without
/// string-matching. The fill phase itself never fails: all arithmetic is
/// wrapping and every index is in range by construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// Output length below 4 bytes or not representable as a `u32`.
    #[error("tag length must be in 4..2^32 bytes")]
    InvalidTagLength,
    /// Lane count outside `1..2^24`.
    #[error("lane count must be in 1..2^24")]
    InvalidLanes,
    /// Memory cost below the 8-blocks-per-lane floor.
    #[error("memory cost must be at least 8 KiB per lane")]
    InvalidMemory,
    /// Zero passes requested.
    #[error("time cost must be at least 1")]
    InvalidTimeCost,
    /// Version tag other than 0x10 or 0x13.
    #[error("version must be 0x10 or 0x13")]
    InvalidVersion,
    /// Variant tag other than 0 (Argon2d), 1 (Argon2i), 2 (Argon2id).
    #[error("unknown Argon2 variant tag")]
    InvalidAlgorithm,
    /// Salt shorter than the 8-byte minimum.
    #[error("salt must be at least 8 bytes")]
    SaltTooShort,
    /// Password, salt, secret, or associated data of 2^32 bytes or more.
    #[error("input length exceeds 2^32 - 1 bytes")]
    InputTooLong,
    /// The rounded block matrix would exceed the configured memory budget.
    #[error("block matrix of {needed} bytes exceeds the {budget}-byte memory budget")]
    MemoryBudgetExceeded { needed: u64, budget: u64 },
    /// A caller-provided block buffer holds fewer blocks than the matrix needs.
    #[error("memory buffer too small: {needed} blocks required")]
    MemoryTooSmall { needed: usize },
}

pub type Result<T> = core::result::Result<T, Error>;
