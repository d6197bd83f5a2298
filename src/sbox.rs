use zeroize::Zeroize;

use crate::errors::FastError;
use crate::prng::Prng;

/// A permutation of the alphabet `{0, .., radix-1}` with its precomputed
/// inverse.
pub(crate) struct Sbox {
    perm: Vec<u8>,
    inv: Vec<u8>,
}

impl Sbox {
    /// Draw a fresh uniform permutation from the PRNG stream.
    ///
    /// The shuffle runs from the high end down: for every prefix length `k`
    /// from `radix` to 2, one index below `k` is drawn and swapped into
    /// position `k - 1`. The draw count and order are fixed; changing either
    /// changes every derived S-box.
    fn shuffled(radix: u32, prng: &mut Prng) -> Self {
        let mut perm: Vec<u8> = (0..radix).map(|v| v as u8).collect();
        for k in (1..radix).rev() {
            let j = prng.uniform(k + 1);
            perm.swap(k as usize, j as usize);
        }
        let mut inv = vec![0u8; radix as usize];
        for (v, &p) in perm.iter().enumerate() {
            inv[p as usize] = v as u8;
        }
        Sbox { perm, inv }
    }

    #[inline]
    pub fn apply(&self, symbol: u8) -> u8 {
        self.perm[symbol as usize]
    }

    #[inline]
    pub fn apply_inv(&self, symbol: u8) -> u8 {
        self.inv[symbol as usize]
    }
}

impl Drop for Sbox {
    fn drop(&mut self) {
        self.perm.zeroize();
        self.inv.zeroize();
    }
}

/// The pool of S-boxes a context draws its round permutations from.
pub(crate) struct SboxPool {
    sboxes: Vec<Sbox>,
}

impl SboxPool {
    /// Build a pool of `count` S-boxes of the given radix from 32 bytes of
    /// derived key material. The first 16 bytes seed the PRNG key, the
    /// remaining 16 the nonce, used unchanged.
    pub fn derive(
        material: &[u8; 32],
        radix: u32,
        count: u32,
    ) -> Result<Self, FastError> {
        let mut prng = Prng::from_derived_key(material, false);
        let mut sboxes = Vec::new();
        sboxes
            .try_reserve_exact(count as usize)
            .map_err(|_| FastError::AllocFailure)?;
        for _ in 0..count {
            sboxes.push(Sbox::shuffled(radix, &mut prng));
        }
        Ok(SboxPool { sboxes })
    }

    #[inline]
    pub fn get(&self, index: usize) -> &Sbox {
        &self.sboxes[index]
    }
}
