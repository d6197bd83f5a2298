use aes::Aes128;
use aes::cipher::generic_array::GenericArray;
use aes::cipher::{BlockEncrypt, KeyInit};
use rand_core::RngCore;
use zeroize::Zeroize;

const BLOCK_SIZE: usize = 16;

/// Deterministic counter-mode byte stream over AES-128.
///
/// The generator holds a 16 byte counter seeded from a nonce. Whenever the
/// output buffer runs empty, the counter is incremented as a big-endian
/// integer and the buffer is replaced with the AES-128-ECB encryption of
/// the counter under the generator key. Bytes are consumed left to right,
/// so the same key and nonce always reproduce the same stream.
///
/// All cipher and counter state is overwritten with zero when the
/// generator is dropped.
pub struct Prng {
    cipher: Aes128,
    counter: [u8; BLOCK_SIZE],
    buffer: [u8; BLOCK_SIZE],
    pos: usize,
}

impl Prng {
    /// Create a new [Prng] from a 16 byte key and a 16 byte nonce.
    ///
    /// The nonce becomes the initial counter value. The first block of
    /// output is the encryption of `nonce + 1`, as the counter increments
    /// before every buffer refill.
    pub fn new(key: &[u8; 16], nonce: &[u8; 16]) -> Self {
        Prng {
            cipher: Aes128::new(GenericArray::from_slice(key)),
            counter: *nonce,
            buffer: [0u8; BLOCK_SIZE],
            // Start with an empty buffer so the first read refills
            pos: BLOCK_SIZE,
        }
    }

    /// Create a [Prng] from 32 bytes of derived key material: the first 16
    /// bytes become the key, the remaining 16 the nonce.
    ///
    /// When `zero_nonce_tail` is set, the last two nonce bytes are cleared
    /// before use. This separates the stream from the one obtained from the
    /// same material with the nonce unchanged.
    pub(crate) fn from_derived_key(material: &[u8; 32], zero_nonce_tail: bool) -> Self {
        let mut key = [0u8; 16];
        let mut nonce = [0u8; 16];
        key.copy_from_slice(&material[..16]);
        nonce.copy_from_slice(&material[16..]);
        if zero_nonce_tail {
            nonce[14] = 0;
            nonce[15] = 0;
        }
        let prng = Prng::new(&key, &nonce);
        key.zeroize();
        nonce.zeroize();
        prng
    }

    fn refill(&mut self) {
        // Big-endian increment: the last byte wraps into the one before it
        for byte in self.counter.iter_mut().rev() {
            *byte = byte.wrapping_add(1);
            if *byte != 0 {
                break;
            }
        }
        self.cipher.encrypt_block_b2b(
            GenericArray::from_slice(&self.counter),
            GenericArray::from_mut_slice(&mut self.buffer),
        );
        self.pos = 0;
    }

    /// Fill `out` with the next bytes of the stream.
    pub fn next_bytes(&mut self, out: &mut [u8]) {
        let mut filled = 0;
        while filled < out.len() {
            if self.pos >= BLOCK_SIZE {
                self.refill();
            }
            let take = (out.len() - filled).min(BLOCK_SIZE - self.pos);
            out[filled..filled + take]
                .copy_from_slice(&self.buffer[self.pos..self.pos + take]);
            self.pos += take;
            filled += take;
        }
    }

    /// Return a value uniformly distributed in `[0, bound)`.
    ///
    /// Uses multiply-then-reject sampling, so no modulo bias is introduced
    /// for any bound.
    ///
    /// # Panics
    /// Panics if `bound` is zero.
    pub fn uniform(&mut self, bound: u32) -> u32 {
        assert!(bound > 0, "uniform bound must be nonzero");
        let threshold = bound.wrapping_neg() % bound;
        loop {
            let r = self.next_u32();
            let product = u64::from(r) * u64::from(bound);
            if (product as u32) >= threshold {
                return (product >> 32) as u32;
            }
        }
    }
}

impl RngCore for Prng {
    /// Return the next 4 stream bytes as a big-endian `u32`.
    fn next_u32(&mut self) -> u32 {
        let mut bytes = [0u8; 4];
        self.next_bytes(&mut bytes);
        u32::from_be_bytes(bytes)
    }

    /// Return the next 8 stream bytes as a big-endian `u64`.
    fn next_u64(&mut self) -> u64 {
        let mut bytes = [0u8; 8];
        self.next_bytes(&mut bytes);
        u64::from_be_bytes(bytes)
    }

    fn fill_bytes(&mut self, dst: &mut [u8]) {
        self.next_bytes(dst);
    }
}

impl Drop for Prng {
    fn drop(&mut self) {
        // The aes crate zeroizes the expanded round keys on drop
        self.counter.zeroize();
        self.buffer.zeroize();
        self.pos = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bound_one_always_zero() {
        let mut prng = Prng::new(&[7u8; 16], &[0u8; 16]);
        for _ in 0..64 {
            assert_eq!(prng.uniform(1), 0);
        }
    }

    #[test]
    fn uniform_stays_below_bound() {
        let mut prng = Prng::new(&[1u8; 16], &[2u8; 16]);
        for bound in [2u32, 3, 10, 255, 256, 1000, u32::MAX] {
            for _ in 0..32 {
                assert!(prng.uniform(bound) < bound);
            }
        }
    }

    #[test]
    fn nonce_tail_separates_streams() {
        let mut material = [0u8; 32];
        material[30] = 0xAA;
        material[31] = 0xBB;
        let mut pool_stream = Prng::from_derived_key(&material, false);
        let mut seq_stream = Prng::from_derived_key(&material, true);
        let mut a = [0u8; 32];
        let mut b = [0u8; 32];
        pool_stream.next_bytes(&mut a);
        seq_stream.next_bytes(&mut b);
        assert_ne!(a, b);
    }

    #[test]
    fn partial_reads_match_block_reads() {
        let key = [0x5Au8; 16];
        let nonce = [0x33u8; 16];
        let mut whole = [0u8; 48];
        Prng::new(&key, &nonce).next_bytes(&mut whole);

        let mut pieces = [0u8; 48];
        let mut prng = Prng::new(&key, &nonce);
        prng.next_bytes(&mut pieces[..5]);
        prng.next_bytes(&mut pieces[5..27]);
        prng.next_bytes(&mut pieces[27..48]);
        assert_eq!(whole, pieces);
    }
}
