//! The variable-length hash H' over BLAKE2b (RFC 9106 section 3.3).

use blake2::digest::{Digest, Update, VariableOutput};
use blake2::{Blake2b512, Blake2bVar};
use zeroize::Zeroize;

use crate::error::{Error, Result};

/// Bytes kept from each intermediate digest on the long-output path.
const HALF_DIGEST: usize = 32;

/// Fills `out` with H'(inputs), hashing `LE32(out.len())` ahead of the
/// concatenated input slices.
///
/// Outputs of up to 64 bytes are a single variable-length BLAKE2b call.
/// Longer outputs chain full-width digests, emitting the first 32 bytes of
/// each until at most 64 bytes remain for the final variable-length call.
pub(crate) fn blake2b_long(inputs: &[&[u8]], out: &mut [u8]) -> Result<()> {
    if out.is_empty() || out.len() > u32::MAX as usize {
        return Err(Error::InvalidTagLength);
    }
    let len_bytes = (out.len() as u32).to_le_bytes();

    if out.len() <= Blake2b512::output_size() {
        let mut digest = Blake2bVar::new(out.len()).map_err(|_| Error::InvalidTagLength)?;
        Update::update(&mut digest, &len_bytes);
        for input in inputs {
            Update::update(&mut digest, input);
        }
        return digest
            .finalize_variable(out)
            .map_err(|_| Error::InvalidTagLength);
    }

    let mut digest = Blake2b512::new();
    Digest::update(&mut digest, len_bytes);
    for input in inputs {
        Digest::update(&mut digest, input);
    }
    let mut chain = [0u8; 64];
    chain.copy_from_slice(&digest.finalize());
    out[..HALF_DIGEST].copy_from_slice(&chain[..HALF_DIGEST]);

    let mut pos = HALF_DIGEST;
    while out.len() - pos > 64 {
        let digest = Blake2b512::digest(chain);
        chain.copy_from_slice(&digest);
        out[pos..pos + HALF_DIGEST].copy_from_slice(&chain[..HALF_DIGEST]);
        pos += HALF_DIGEST;
    }

    let mut tail = Blake2bVar::new(out.len() - pos).map_err(|_| Error::InvalidTagLength)?;
    Update::update(&mut tail, &chain);
    tail.finalize_variable(&mut out[pos..])
        .map_err(|_| Error::InvalidTagLength)?;
    chain.zeroize();
    Ok(())
}
