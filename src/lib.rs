//! A Rust implementation of the FAST format-preserving encryption cipher.
//!
//! FAST is a tweakable, length-preserving block cipher over words of
//! symbols drawn from a small alphabet `{0, .., a-1}`: encrypting a word of
//! `l` symbols yields a word of the same length over the same alphabet, and
//! decrypting with the same key and tweak recovers it exactly. The cipher
//! is a substitution-permutation network whose S-boxes and per-layer S-box
//! schedule are derived deterministically from the master key: an
//! AES-CMAC key derivation feeds an AES-128 counter-mode generator, which
//! samples a pool of alphabet permutations and, per tweak, a sequence of
//! pool indices naming the S-box each layer uses.
//!
//! # Features
//! - Radices from 4 to 256, words of 2 or more symbols.
//! - Tweakable: distinct tweaks act as independent ciphers under one key.
//! - Deterministic derivation; no entropy source is ever consulted.
//! - Recommended parameters for 128-bit security via [Params::recommended].
//! - Secure memory zeroization on drop.
//!
//! # Example
//! ```
//! use fast_fpe::{Fast, Params};
//! use hex_literal::hex;
//!
//! let params = Params::recommended(10, 8).expect("parameters");
//! let key = hex!("2b7e151628aed2a6abf7158809cf4f3c");
//! let mut cipher = Fast::new(&params, &key).expect("context");
//!
//! let plaintext = [1, 2, 3, 4, 5, 6, 7, 8];
//! let ciphertext = cipher.encrypt(b"account-4711", &plaintext).expect("encrypt");
//! let recovered = cipher.decrypt(b"account-4711", &ciphertext).expect("decrypt");
//! assert_eq!(recovered, plaintext);
//! ```

mod errors;
mod params;
mod prf;
mod prng;
mod rounds;
mod sbox;

pub use errors::FastError;
pub use params::{DEFAULT_POOL_SIZE, MAX_RADIX, Params};
pub use prng::Prng;

use sbox::SboxPool;
use zeroize::{Zeroize, Zeroizing};

/// Master key length in bytes.
pub const KEY_SIZE: usize = 16;

// SETUP-1 and SETUP-2 each produce a PRNG key plus a PRNG nonce.
const DERIVED_KEY_SIZE: usize = 32;

/// A FAST cipher context.
///
/// A context binds a parameter set and a master key to the S-box pool
/// derived from them. Encryption and decryption take `&mut self`: the
/// context keeps a single-slot cache of the round sequence for the most
/// recently used tweak, so repeated calls under one tweak never touch the
/// key derivation again. Any new tweak evicts the previous entry.
///
/// Contexts are independent; distinct contexts may be used from separate
/// threads freely.
///
/// # Security Considerations
/// The transformation is deterministic: the same key, tweak, and plaintext
/// always produce the same ciphertext. Callers who need distinct
/// ciphertexts for repeated plaintexts must vary the tweak. The master
/// key, the parameters, the cached sequence, and the pool permutations
/// are overwritten with zero when the context is dropped.
pub struct Fast {
    params: Params,
    key: [u8; KEY_SIZE],
    pool: SboxPool,
    seq: Vec<u32>,
    cached_tweak: Option<Vec<u8>>,
}

impl Fast {
    /// Create a context from a validated parameter set and a 16 byte
    /// master key.
    ///
    /// Validation enforces the structural invariants of [Params]; a
    /// `security_level` of 0 is read as 128. Building the context derives
    /// the full S-box pool, which costs one pass of the key-stream
    /// generator over `m * a` draws; per-tweak state is derived lazily on
    /// the first [Fast::encrypt] or [Fast::decrypt] call.
    pub fn new(params: &Params, key: &[u8; KEY_SIZE]) -> Result<Self, FastError> {
        params.validate()?;
        let mut params = *params;
        if params.security_level == 0 {
            params.security_level = 128;
        }

        let setup1 = prf::encode_parts(&[
            prf::LABEL_INSTANCE1,
            &params.radix.to_be_bytes(),
            &params.sbox_count.to_be_bytes(),
            prf::LABEL_FPE_POOL,
        ]);
        let mut material = Zeroizing::new([0u8; DERIVED_KEY_SIZE]);
        prf::derive(key, &setup1, &mut material[..])?;
        let pool = SboxPool::derive(&material, params.radix, params.sbox_count)?;

        let mut seq = Vec::new();
        seq.try_reserve_exact(params.num_layers as usize)
            .map_err(|_| FastError::AllocFailure)?;
        seq.resize(params.num_layers as usize, 0u32);

        Ok(Fast {
            params,
            key: *key,
            pool,
            seq,
            cached_tweak: None,
        })
    }

    /// The parameters this context was built with.
    pub fn params(&self) -> &Params {
        &self.params
    }

    /// Encrypt one word of `word_length` symbols under the given tweak.
    ///
    /// The tweak may be empty. Every symbol must be below the radix.
    pub fn encrypt(&mut self, tweak: &[u8], plaintext: &[u8]) -> Result<Vec<u8>, FastError> {
        let mut word = plaintext.to_vec();
        self.encrypt_in_place(tweak, &mut word)?;
        Ok(word)
    }

    /// Decrypt one word of `word_length` symbols under the given tweak,
    /// inverting [Fast::encrypt].
    pub fn decrypt(&mut self, tweak: &[u8], ciphertext: &[u8]) -> Result<Vec<u8>, FastError> {
        let mut word = ciphertext.to_vec();
        self.decrypt_in_place(tweak, &mut word)?;
        Ok(word)
    }

    /// Encrypt a word in its own buffer.
    ///
    /// When the tweak is already cached this performs no allocation. On
    /// error the buffer is left unchanged.
    pub fn encrypt_in_place(&mut self, tweak: &[u8], word: &mut [u8]) -> Result<(), FastError> {
        self.check_length(word)?;
        self.ensure_sequence(tweak)?;
        rounds::cenc(&self.params, &self.pool, &self.seq, word)
    }

    /// Decrypt a word in its own buffer, inverting [Fast::encrypt_in_place].
    pub fn decrypt_in_place(&mut self, tweak: &[u8], word: &mut [u8]) -> Result<(), FastError> {
        self.check_length(word)?;
        self.ensure_sequence(tweak)?;
        rounds::cdec(&self.params, &self.pool, &self.seq, word)
    }

    /// A word of the wrong length is rejected up front, before any
    /// per-tweak state is touched.
    fn check_length(&self, word: &[u8]) -> Result<(), FastError> {
        if word.len() != self.params.word_length as usize {
            return Err(FastError::InvalidLength {
                expected: self.params.word_length as usize,
                actual: word.len(),
            });
        }
        Ok(())
    }

    /// Make sure the cached round sequence belongs to `tweak`, deriving a
    /// fresh one when it does not.
    fn ensure_sequence(&mut self, tweak: &[u8]) -> Result<(), FastError> {
        if self.cached_tweak.as_deref() == Some(tweak) {
            return Ok(());
        }
        // Invalidate before the sequence buffer is overwritten, so a
        // failure below can only cost a re-derivation, never serve a stale
        // sequence
        if let Some(mut old) = self.cached_tweak.take() {
            old.zeroize();
        }
        let mut cache = Vec::new();
        cache
            .try_reserve_exact(tweak.len())
            .map_err(|_| FastError::AllocFailure)?;
        cache.extend_from_slice(tweak);

        let input = setup2_input(&self.params, tweak);
        let mut material = Zeroizing::new([0u8; DERIVED_KEY_SIZE]);
        prf::derive(&self.key, &input, &mut material[..])?;
        derive_sequence(&material, self.params.sbox_count, &mut self.seq);

        self.cached_tweak = Some(cache);
        Ok(())
    }
}

impl Drop for Fast {
    fn drop(&mut self) {
        self.key.zeroize();
        self.params.zeroize();
        self.seq.zeroize();
        if let Some(tweak) = &mut self.cached_tweak {
            tweak.zeroize();
        }
    }
}

fn setup2_input(params: &Params, tweak: &[u8]) -> Vec<u8> {
    prf::encode_parts(&[
        prf::LABEL_INSTANCE1,
        &params.radix.to_be_bytes(),
        &params.sbox_count.to_be_bytes(),
        prf::LABEL_INSTANCE2,
        &params.word_length.to_be_bytes(),
        &params.num_layers.to_be_bytes(),
        &params.branch_dist1.to_be_bytes(),
        &params.branch_dist2.to_be_bytes(),
        prf::LABEL_FPE_SEQ,
        prf::LABEL_TWEAK,
        tweak,
    ])
}

fn derive_sequence(material: &[u8; DERIVED_KEY_SIZE], pool_size: u32, seq: &mut [u32]) {
    // The nonce tail is cleared so this stream can never collide with the
    // pool stream, whatever the derived material looks like
    let mut prng = Prng::from_derived_key(material, true);
    for slot in seq.iter_mut() {
        *slot = prng.uniform(pool_size);
    }
}
