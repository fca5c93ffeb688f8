//! Memory-hard Argon2 password hashing and key derivation (RFC 9106).
//!
//! Implements Argon2d, Argon2i, and Argon2id for versions 0x10 and 0x13,
//! driven either to completion on the calling thread or cooperatively,
//! yielding to the async scheduler between blocks so multi-second
//! derivations never monopolize an event loop.
//!
//! ```
//! # fn main() -> weir::Result<()> {
//! let params = weir::Params::new(19 * 1024, 2, 1);
//! let tag = weir::argon2id(b"hunter2", b"example salt", &params)?;
//! assert_eq!(tag.len(), 32);
//! # Ok(())
//! # }
//! ```
//!
//! The fill cost is dominated by the block matrix: `m` KiB rounded down to
//! a multiple of `4 * p` blocks of 1 KiB, written `t` times. Callers in a
//! hot loop can keep the matrix alive across derivations with
//! [`Argon2::hash_into_with_memory`].

mod block;
mod error;
mod fill;
mod hprime;
mod memory;
mod pacer;
mod params;
mod reference;

pub use block::Block;
pub use error::{Error, Result};
pub use params::{Algorithm, Params, Version};

use zeroize::Zeroize;

use crate::fill::{fill_blocking, fill_cooperative, finalize_into, FillContext};
use crate::memory::{initial_hash, seed_lanes, MemoryLayout};
use crate::pacer::{ProgressMeter, YieldPacer};

/// A configured Argon2 instance: variant, costs, and the optional keyed
/// inputs (secret `K` and associated data `X`) that are hashed into H0
/// but never stored in the matrix.
#[derive(Clone)]
pub struct Argon2<'key> {
    algorithm: Algorithm,
    params: Params,
    secret: Option<&'key [u8]>,
    ad: Option<&'key [u8]>,
}

impl<'key> Argon2<'key> {
    pub fn new(algorithm: Algorithm, params: Params) -> Self {
        Self {
            algorithm,
            params,
            secret: None,
            ad: None,
        }
    }

    /// Like [`Argon2::new`] with a secret key mixed into H0. The key is
    /// borrowed, never copied.
    pub fn new_with_secret(secret: &'key [u8], algorithm: Algorithm, params: Params) -> Self {
        Self {
            algorithm,
            params,
            secret: Some(secret),
            ad: None,
        }
    }

    /// Attaches associated data (RFC 9106 field `X`).
    pub fn with_ad(mut self, ad: &'key [u8]) -> Self {
        self.ad = Some(ad);
        self
    }

    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    pub fn params(&self) -> &Params {
        &self.params
    }

    /// Derives a tag of the configured [`Params::tag_len`].
    pub fn hash(&self, password: &[u8], salt: &[u8]) -> Result<Vec<u8>> {
        let mut out = vec![0u8; self.params.tag_len() as usize];
        self.hash_into(password, salt, &mut out)?;
        Ok(out)
    }

    /// Derives `out.len()` bytes into a caller-owned buffer. The buffer
    /// length takes the role of `tag_len` and must be at least 4 bytes.
    pub fn hash_into(&self, password: &[u8], salt: &[u8], out: &mut [u8]) -> Result<()> {
        self.hash_blocking(password, salt, out, None)
    }

    /// [`Argon2::hash_into`] with a progress sink receiving fractions in
    /// `[0, 1]`, throttled to roughly ten thousand reports and finishing
    /// with an exact `1.0`. The sink never influences the tag.
    pub fn hash_into_with_progress(
        &self,
        password: &[u8],
        salt: &[u8],
        out: &mut [u8],
        mut on_progress: impl FnMut(f64),
    ) -> Result<()> {
        self.hash_blocking(password, salt, out, Some(&mut on_progress))
    }

    /// [`Argon2::hash_into`] against a caller-owned block matrix, for hot
    /// loops that amortize the allocation. `blocks` needs at least
    /// [`Params::block_count`] entries; stale contents are overwritten
    /// before use.
    pub fn hash_into_with_memory(
        &self,
        password: &[u8],
        salt: &[u8],
        out: &mut [u8],
        blocks: &mut [Block],
    ) -> Result<()> {
        let ctx = self.prepare(password, salt, out.len())?;
        let needed = ctx.layout.total_blocks as usize;
        let blocks = blocks
            .get_mut(..needed)
            .ok_or(Error::MemoryTooSmall { needed })?;
        self.run_blocking(&ctx, password, salt, out, blocks, None)
    }

    /// Cooperative form of [`Argon2::hash`]: between blocks, once the
    /// configured [`Params::yield_interval`] is spent, control returns to
    /// the scheduler. The tag is identical to the blocking form's.
    pub async fn hash_async(&self, password: &[u8], salt: &[u8]) -> Result<Vec<u8>> {
        let mut out = vec![0u8; self.params.tag_len() as usize];
        self.hash_into_async(password, salt, &mut out).await?;
        Ok(out)
    }

    /// Cooperative form of [`Argon2::hash_into`]. Dropping the future
    /// mid-derivation frees the matrix and auxiliary state.
    pub async fn hash_into_async(
        &self,
        password: &[u8],
        salt: &[u8],
        out: &mut [u8],
    ) -> Result<()> {
        self.hash_cooperative(password, salt, out, None).await
    }

    /// Cooperative form of [`Argon2::hash_into_with_progress`].
    pub async fn hash_into_async_with_progress(
        &self,
        password: &[u8],
        salt: &[u8],
        out: &mut [u8],
        mut on_progress: impl FnMut(f64),
    ) -> Result<()> {
        self.hash_cooperative(password, salt, out, Some(&mut on_progress))
            .await
    }

    fn hash_blocking(
        &self,
        password: &[u8],
        salt: &[u8],
        out: &mut [u8],
        progress: Option<&mut dyn FnMut(f64)>,
    ) -> Result<()> {
        let ctx = self.prepare(password, salt, out.len())?;
        let mut memory = vec![Block::ZERO; ctx.layout.total_blocks as usize];
        self.run_blocking(&ctx, password, salt, out, &mut memory, progress)
    }

    fn run_blocking(
        &self,
        ctx: &FillContext,
        password: &[u8],
        salt: &[u8],
        out: &mut [u8],
        memory: &mut [Block],
        progress: Option<&mut dyn FnMut(f64)>,
    ) -> Result<()> {
        self.seed(ctx, password, salt, out.len() as u32, memory)?;
        let mut meter = ProgressMeter::new(ctx.produced_blocks(), progress);
        fill_blocking(ctx, memory, &mut meter);
        finalize_into(&ctx.layout, memory, out)?;
        tracing::trace!(algorithm = %self.algorithm, "derivation complete");
        Ok(())
    }

    async fn hash_cooperative(
        &self,
        password: &[u8],
        salt: &[u8],
        out: &mut [u8],
        progress: Option<&mut dyn FnMut(f64)>,
    ) -> Result<()> {
        let ctx = self.prepare(password, salt, out.len())?;
        let mut memory = vec![Block::ZERO; ctx.layout.total_blocks as usize];
        self.seed(&ctx, password, salt, out.len() as u32, &mut memory)?;
        let mut meter = ProgressMeter::new(ctx.produced_blocks(), progress);
        let mut pacer = YieldPacer::new(self.params.yield_interval());
        fill_cooperative(&ctx, &mut memory, &mut meter, &mut pacer).await;
        finalize_into(&ctx.layout, &memory, out)?;
        tracing::trace!(algorithm = %self.algorithm, "cooperative derivation complete");
        Ok(())
    }

    /// Validates parameters and inputs, then fixes the matrix geometry.
    /// Everything here runs before the first heavy allocation.
    fn prepare(&self, password: &[u8], salt: &[u8], out_len: usize) -> Result<FillContext> {
        self.params.validate()?;
        if out_len < Params::MIN_TAG_LEN as usize || out_len > u32::MAX as usize {
            return Err(Error::InvalidTagLength);
        }
        if salt.len() < Params::MIN_SALT_LEN {
            return Err(Error::SaltTooShort);
        }
        for input in [
            password,
            salt,
            self.secret.unwrap_or_default(),
            self.ad.unwrap_or_default(),
        ] {
            if input.len() > u32::MAX as usize {
                return Err(Error::InputTooLong);
            }
        }

        let layout = MemoryLayout::new(&self.params);
        tracing::debug!(
            algorithm = %self.algorithm,
            blocks = layout.total_blocks,
            lanes = layout.lanes,
            passes = self.params.time_cost(),
            "filling Argon2 block matrix"
        );
        Ok(FillContext {
            layout,
            algorithm: self.algorithm,
            version: self.params.version(),
            time_cost: self.params.time_cost(),
        })
    }

    fn seed(
        &self,
        ctx: &FillContext,
        password: &[u8],
        salt: &[u8],
        tag_len: u32,
        memory: &mut [Block],
    ) -> Result<()> {
        let mut h0 = initial_hash(
            self.algorithm,
            self.params.version(),
            &self.params,
            tag_len,
            password,
            salt,
            self.secret.unwrap_or_default(),
            self.ad.unwrap_or_default(),
        );
        let result = seed_lanes(&h0, &ctx.layout, memory);
        h0.zeroize();
        result
    }
}

impl std::fmt::Debug for Argon2<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Argon2")
            .field("algorithm", &self.algorithm)
            .field("params", &self.params)
            .field("secret", &self.secret.map(|s| s.len()))
            .field("ad", &self.ad.map(|a| a.len()))
            .finish()
    }
}

/// Argon2d: data-dependent addressing throughout.
pub fn argon2d(password: &[u8], salt: &[u8], params: &Params) -> Result<Vec<u8>> {
    Argon2::new(Algorithm::Argon2d, params.clone()).hash(password, salt)
}

/// Argon2i: data-independent addressing throughout.
pub fn argon2i(password: &[u8], salt: &[u8], params: &Params) -> Result<Vec<u8>> {
    Argon2::new(Algorithm::Argon2i, params.clone()).hash(password, salt)
}

/// Argon2id: the RFC 9106 recommended hybrid.
pub fn argon2id(password: &[u8], salt: &[u8], params: &Params) -> Result<Vec<u8>> {
    Argon2::new(Algorithm::Argon2id, params.clone()).hash(password, salt)
}

/// Cooperative [`argon2d`]; yields per [`Params::yield_interval`].
pub async fn argon2d_async(password: &[u8], salt: &[u8], params: &Params) -> Result<Vec<u8>> {
    Argon2::new(Algorithm::Argon2d, params.clone())
        .hash_async(password, salt)
        .await
}

/// Cooperative [`argon2i`]; yields per [`Params::yield_interval`].
pub async fn argon2i_async(password: &[u8], salt: &[u8], params: &Params) -> Result<Vec<u8>> {
    Argon2::new(Algorithm::Argon2i, params.clone())
        .hash_async(password, salt)
        .await
}

/// Cooperative [`argon2id`]; yields per [`Params::yield_interval`].
pub async fn argon2id_async(password: &[u8], salt: &[u8], params: &Params) -> Result<Vec<u8>> {
    Argon2::new(Algorithm::Argon2id, params.clone())
        .hash_async(password, salt)
        .await
}
