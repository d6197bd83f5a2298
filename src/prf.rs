use aes::Aes128;
use cmac::{Cmac, Mac};

use crate::errors::FastError;

// Domain separation labels. Each carries its terminating NUL byte, so the
// encoded parts are bit-compatible with other FAST implementations.
pub(crate) const LABEL_INSTANCE1: &[u8] = b"instance1\0";
pub(crate) const LABEL_INSTANCE2: &[u8] = b"instance2\0";
pub(crate) const LABEL_FPE_POOL: &[u8] = b"FPE Pool\0";
pub(crate) const LABEL_FPE_SEQ: &[u8] = b"FPE SEQ\0";
pub(crate) const LABEL_TWEAK: &[u8] = b"tweak\0";

/// Fill `output` with key material derived from `master_key` and `input`.
///
/// Block `c` of the output is `AES-CMAC(master_key, c_be32 || input)` for a
/// 32 bit big-endian counter starting at zero; the final block is truncated
/// to fit.
pub(crate) fn derive(
    master_key: &[u8; 16],
    input: &[u8],
    output: &mut [u8],
) -> Result<(), FastError> {
    let mut counter: u32 = 0;
    let mut offset = 0;
    while offset < output.len() {
        let mut mac = Cmac::<Aes128>::new_from_slice(master_key)
            .map_err(|_| FastError::DerivationFailure)?;
        mac.update(&counter.to_be_bytes());
        mac.update(input);
        let tag = mac.finalize().into_bytes();
        let take = (output.len() - offset).min(tag.len());
        output[offset..offset + take].copy_from_slice(&tag[..take]);
        offset += take;
        counter += 1;
    }
    Ok(())
}

/// Encode a list of byte strings unambiguously: a big-endian 32 bit part
/// count, then for each part a big-endian 32 bit length followed by the
/// part's bytes. Distinct part lists never encode to the same bytes.
pub(crate) fn encode_parts(parts: &[&[u8]]) -> Vec<u8> {
    let total = 4 + parts.iter().map(|part| 4 + part.len()).sum::<usize>();
    let mut out = Vec::with_capacity(total);
    out.extend_from_slice(&(parts.len() as u32).to_be_bytes());
    for part in parts {
        out.extend_from_slice(&(part.len() as u32).to_be_bytes());
        out.extend_from_slice(part);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_layout() {
        let encoded = encode_parts(&[b"ab", b"", b"xyz"]);
        let expected = [
            0, 0, 0, 3, // part count
            0, 0, 0, 2, b'a', b'b', // "ab"
            0, 0, 0, 0, // empty part
            0, 0, 0, 3, b'x', b'y', b'z', // "xyz"
        ];
        assert_eq!(encoded, expected);
    }

    #[test]
    fn encoding_is_injective_across_boundaries() {
        // Same concatenation, different split
        assert_ne!(encode_parts(&[b"ab", b"c"]), encode_parts(&[b"a", b"bc"]));
        assert_ne!(encode_parts(&[b"abc"]), encode_parts(&[b"abc", b""]));
    }

    #[test]
    fn labels_carry_terminator() {
        for label in [
            LABEL_INSTANCE1,
            LABEL_INSTANCE2,
            LABEL_FPE_POOL,
            LABEL_FPE_SEQ,
            LABEL_TWEAK,
        ] {
            assert_eq!(label.last(), Some(&0u8));
        }
    }

    #[test]
    fn longer_outputs_extend_shorter_ones() {
        let key = [0x11u8; 16];
        let input = b"derivation input";
        let mut short = [0u8; 16];
        let mut long = [0u8; 40];
        derive(&key, input, &mut short).unwrap();
        derive(&key, input, &mut long).unwrap();
        assert_eq!(short, long[..16]);
        // Trailing block is a truncated CMAC, not a repeat of the first
        assert_ne!(long[..8], long[32..40]);
    }

    #[test]
    fn distinct_inputs_distinct_outputs() {
        let key = [0x22u8; 16];
        let mut a = [0u8; 32];
        let mut b = [0u8; 32];
        derive(&key, b"input a", &mut a).unwrap();
        derive(&key, b"input b", &mut b).unwrap();
        assert_ne!(a, b);
    }
}
