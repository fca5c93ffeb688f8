//! The 1024-byte memory block and the BlaMka compression function G.

use std::ops::{BitXor, BitXorAssign};

use zeroize::Zeroize;

/// Low 32 bits of a word, the multiplicand in the BlaMka step.
const TRUNC: u64 = u32::MAX as u64;

// BLAKE2b's G with the BlaMka multiply folded in:
// a <- a + b + 2 * lo32(a) * lo32(b). The 32x32 product never overflows
// u64; only the doubling wraps.
macro_rules! blamka_step {
    ($a:expr, $b:expr, $c:expr, $d:expr) => {
        let t = (($a & TRUNC) * ($b & TRUNC)).wrapping_mul(2);
        $a = $a.wrapping_add($b).wrapping_add(t);
        $d = ($d ^ $a).rotate_right(32);

        let t = (($c & TRUNC) * ($d & TRUNC)).wrapping_mul(2);
        $c = $c.wrapping_add($d).wrapping_add(t);
        $b = ($b ^ $c).rotate_right(24);

        let t = (($a & TRUNC) * ($b & TRUNC)).wrapping_mul(2);
        $a = $a.wrapping_add($b).wrapping_add(t);
        $d = ($d ^ $a).rotate_right(16);

        let t = (($c & TRUNC) * ($d & TRUNC)).wrapping_mul(2);
        $c = $c.wrapping_add($d).wrapping_add(t);
        $b = ($b ^ $c).rotate_right(63);
    };
}

// Permutation P over 16 words: four column mixes then four diagonal mixes,
// mirroring the BLAKE2b round schedule.
macro_rules! permute {
    (
        $v0:expr, $v1:expr, $v2:expr, $v3:expr,
        $v4:expr, $v5:expr, $v6:expr, $v7:expr,
        $v8:expr, $v9:expr, $v10:expr, $v11:expr,
        $v12:expr, $v13:expr, $v14:expr, $v15:expr,
    ) => {
        blamka_step!($v0, $v4, $v8, $v12);
        blamka_step!($v1, $v5, $v9, $v13);
        blamka_step!($v2, $v6, $v10, $v14);
        blamka_step!($v3, $v7, $v11, $v15);
        blamka_step!($v0, $v5, $v10, $v15);
        blamka_step!($v1, $v6, $v11, $v12);
        blamka_step!($v2, $v7, $v8, $v13);
        blamka_step!($v3, $v4, $v9, $v14);
    };
}

/// One 1024-byte block of the working matrix, viewed as a 16x16 matrix of
/// little-endian 64-bit words. Blocks zeroize themselves on drop, so every
/// scratch block is wiped no matter which path releases it.
#[derive(Clone, Debug)]
#[repr(align(64))]
pub struct Block(pub(crate) [u64; Self::WORDS]);

impl Block {
    /// Size of a block in bytes.
    pub const SIZE: usize = 1024;
    pub(crate) const WORDS: usize = Self::SIZE / 8;
    pub(crate) const ZERO: Self = Self([0u64; Self::WORDS]);

    #[inline]
    pub(crate) fn load(&mut self, bytes: &[u8; Self::SIZE]) {
        for (word, chunk) in self.0.iter_mut().zip(bytes.chunks_exact(8)) {
            *word = u64::from_le_bytes(chunk.try_into().expect("chunk is 8 bytes"));
        }
    }

    #[inline]
    pub(crate) fn store(&self, bytes: &mut [u8; Self::SIZE]) {
        for (chunk, word) in bytes.chunks_exact_mut(8).zip(self.0.iter()) {
            chunk.copy_from_slice(&word.to_le_bytes());
        }
    }

    /// The compression function G: permute `prev XOR reference` row-wise
    /// then column-wise and XOR the pre-permutation value back in. The
    /// caller decides whether the result overwrites or XOR-accumulates
    /// into its output slot. The pre-permutation scratch is wiped before
    /// the result is returned.
    pub(crate) fn compress(prev: &Self, reference: &Self) -> Self {
        let mut r = prev ^ reference;
        let mut q = r.clone();

        for row in q.0.chunks_exact_mut(16) {
            permute!(
                row[0], row[1], row[2], row[3],
                row[4], row[5], row[6], row[7],
                row[8], row[9], row[10], row[11],
                row[12], row[13], row[14], row[15],
            );
        }

        // Columns are pairs of adjacent words at stride 16.
        for idx in 0..8 {
            let base = idx * 2;
            permute!(
                q.0[base], q.0[base + 1],
                q.0[base + 16], q.0[base + 17],
                q.0[base + 32], q.0[base + 33],
                q.0[base + 48], q.0[base + 49],
                q.0[base + 64], q.0[base + 65],
                q.0[base + 80], q.0[base + 81],
                q.0[base + 96], q.0[base + 97],
                q.0[base + 112], q.0[base + 113],
            );
        }

        q ^= &r;
        r.zeroize();
        q
    }
}

impl Default for Block {
    fn default() -> Self {
        Self::ZERO
    }
}

impl AsRef<[u64]> for Block {
    fn as_ref(&self) -> &[u64] {
        &self.0
    }
}

impl BitXor<&Block> for Block {
    type Output = Block;

    fn bitxor(mut self, rhs: &Block) -> Block {
        self ^= rhs;
        self
    }
}

impl BitXor<&Block> for &Block {
    type Output = Block;

    fn bitxor(self, rhs: &Block) -> Block {
        let mut out = self.clone();
        out ^= rhs;
        out
    }
}

impl BitXorAssign<&Block> for Block {
    fn bitxor_assign(&mut self, rhs: &Block) {
        for (dst, src) in self.0.iter_mut().zip(rhs.0.iter()) {
            *dst ^= src;
        }
    }
}

impl Zeroize for Block {
    fn zeroize(&mut self) {
        self.0.zeroize();
    }
}

impl Drop for Block {
    fn drop(&mut self) {
        self.zeroize();
    }
}

impl zeroize::ZeroizeOnDrop for Block {}

#[cfg(test)]
mod tests {
    use super::*;

    fn counting_block(seed: u64) -> Block {
        let mut block = Block::ZERO;
        for (idx, word) in block.0.iter_mut().enumerate() {
            *word = seed.wrapping_mul(0x9E37_79B9_7F4A_7C15) ^ idx as u64;
        }
        block
    }

    #[test]
    fn compress_is_deterministic_and_diffuses() {
        let a = counting_block(1);
        let b = counting_block(2);
        let first = Block::compress(&a, &b);
        let second = Block::compress(&a, &b);
        assert_eq!(first.0, second.0);
        // Not the trivial XOR of the inputs.
        assert_ne!(first.0, (&a ^ &b).0);
        // A single flipped input bit changes the output.
        let mut tweaked = b;
        tweaked.0[127] ^= 1;
        assert_ne!(Block::compress(&a, &tweaked).0, first.0);
    }

    #[test]
    fn compress_fixes_zero_and_diffuses_nonzero() {
        // The permutation has no constants, so the all-zero state is fixed.
        let out = Block::compress(&Block::ZERO, &Block::ZERO);
        assert_eq!(out.0, Block::ZERO.0);
        // Any nonzero input diffuses into most words.
        let out = Block::compress(&Block::ZERO, &counting_block(3));
        let nonzero = out.0.iter().filter(|w| **w != 0).count();
        assert!(nonzero > 120, "only {nonzero} of 128 words diffused");
    }

    #[test]
    fn xor_assign_round_trips() {
        let a = counting_block(7);
        let b = counting_block(11);
        let mut x = a.clone();
        x ^= &b;
        x ^= &b;
        assert_eq!(x.0, a.0);
    }

    #[test]
    fn zeroize_clears_every_word() {
        let mut block = counting_block(5);
        block.zeroize();
        assert!(block.0.iter().all(|w| *w == 0));
    }

    #[test]
    fn blocks_wipe_themselves_on_drop() {
        fn assert_zeroize_on_drop<T: zeroize::ZeroizeOnDrop>() {}
        assert_zeroize_on_drop::<Block>();
    }

    #[test]
    fn blamka_matches_widening_reference() {
        // a + b + 2 * lo(a) * lo(b) computed via u128, against the macro.
        let cases = [
            (0u64, 0u64),
            (1, 1),
            (u64::MAX, u64::MAX),
            (0xFFFF_FFFF, 0xFFFF_FFFF),
            (0x0123_4567_89AB_CDEF, 0xFEDC_BA98_7654_3210),
        ];
        for (a0, b0) in cases {
            let expected = (a0 as u128
                + b0 as u128
                + 2 * (a0 & TRUNC) as u128 * (b0 & TRUNC) as u128)
                as u64;
            let (mut a, b) = (a0, b0);
            let t = ((a & TRUNC) * (b & TRUNC)).wrapping_mul(2);
            a = a.wrapping_add(b).wrapping_add(t);
            assert_eq!(a, expected, "a={a0:#x} b={b0:#x}");
        }
    }
}
