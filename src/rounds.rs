use crate::errors::FastError;
use crate::params::Params;
use crate::sbox::{Sbox, SboxPool};

#[inline]
fn add_mod(a: u8, b: u8, radix: u16) -> u8 {
    ((u16::from(a) + u16::from(b)) % radix) as u8
}

#[inline]
fn sub_mod(a: u8, b: u8, radix: u16) -> u8 {
    ((u16::from(a) + radix - u16::from(b)) % radix) as u8
}

/// One forward SPN round.
///
/// The word becomes `(x1, .., x_{l-1}, y)` where
/// `y = S(S(x0 + x_{l-w'}) - x_w)`. With `w = 0` the subtraction would
/// cancel the symbol just mixed in, so the round degenerates to a double
/// S-box application instead.
fn es_layer(word: &mut [u8], sbox: &Sbox, params: &Params) {
    let ell = word.len();
    let radix = params.radix as u16;
    let w = params.branch_dist1 as usize;
    let wp = params.branch_dist2 as usize;

    let mixed = sbox.apply(add_mod(word[0], word[ell - wp], radix));
    let last = if w > 0 {
        sbox.apply(sub_mod(mixed, word[w], radix))
    } else {
        sbox.apply(mixed)
    };
    word.rotate_left(1);
    word[ell - 1] = last;
}

/// Exact inverse of [es_layer], operating on the rotated word.
fn ds_layer(word: &mut [u8], sbox: &Sbox, params: &Params) {
    let ell = word.len();
    let radix = params.radix as u16;
    let w = params.branch_dist1 as usize;
    let wp = params.branch_dist2 as usize;

    // Branch symbols are read at their pre-rotation positions
    let undone = sbox.apply_inv(word[ell - 1]);
    let recovered = if w > 0 {
        sbox.apply_inv(add_mod(undone, word[w - 1], radix))
    } else {
        sbox.apply_inv(undone)
    };
    let first = sub_mod(recovered, word[ell - wp - 1], radix);
    word.rotate_right(1);
    word[0] = first;
}

fn check_word(params: &Params, word: &[u8]) -> Result<(), FastError> {
    if word.len() != params.word_length as usize {
        return Err(FastError::InvalidLength {
            expected: params.word_length as usize,
            actual: word.len(),
        });
    }
    for (position, &value) in word.iter().enumerate() {
        if u32::from(value) >= params.radix {
            return Err(FastError::InvalidSymbol { position, value });
        }
    }
    Ok(())
}

/// Apply all `n` forward rounds in place, each using the S-box the round
/// sequence names for that layer.
pub(crate) fn cenc(
    params: &Params,
    pool: &SboxPool,
    seq: &[u32],
    word: &mut [u8],
) -> Result<(), FastError> {
    check_word(params, word)?;
    for &idx in seq {
        es_layer(word, pool.get(idx as usize), params);
    }
    Ok(())
}

/// Apply the inverse rounds in reverse order, undoing [cenc].
pub(crate) fn cdec(
    params: &Params,
    pool: &SboxPool,
    seq: &[u32],
    word: &mut [u8],
) -> Result<(), FastError> {
    check_word(params, word)?;
    for &idx in seq.iter().rev() {
        ds_layer(word, pool.get(idx as usize), params);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pool(radix: u32) -> SboxPool {
        let mut material = [0u8; 32];
        for (i, byte) in material.iter_mut().enumerate() {
            *byte = (i as u8).wrapping_mul(37).wrapping_add(5);
        }
        SboxPool::derive(&material, radix, 4).unwrap()
    }

    fn params(radix: u32, ell: u32, w: u32, wp: u32, n: u32) -> Params {
        Params {
            radix,
            word_length: ell,
            sbox_count: 4,
            num_layers: n,
            branch_dist1: w,
            branch_dist2: wp,
            security_level: 128,
        }
    }

    #[test]
    fn single_layer_inverts() {
        let pool = pool(10);
        for (w, wp) in [(3u32, 2u32), (2, 1), (1, 1), (0, 2), (0, 1)] {
            let params = params(10, 6, w, wp, 6);
            let original = [9u8, 1, 4, 0, 7, 3];
            let mut word = original;
            es_layer(&mut word, pool.get(2), &params);
            ds_layer(&mut word, pool.get(2), &params);
            assert_eq!(word, original, "w={} w'={}", w, wp);
        }
    }

    #[test]
    fn two_symbol_degenerate_case() {
        let pool = pool(4);
        let params = params(4, 2, 0, 1, 4);
        let seq = [0u32, 3, 1, 2];
        let mut word = [0u8, 3];
        cenc(&params, &pool, &seq, &mut word).unwrap();
        cdec(&params, &pool, &seq, &mut word).unwrap();
        assert_eq!(word, [0, 3]);
    }

    #[test]
    fn composition_inverts_with_layer_dependent_sboxes() {
        let pool = pool(12);
        let params = params(12, 5, 2, 1, 10);
        let seq = [0u32, 1, 2, 3, 0, 2, 1, 3, 3, 0];
        let original = [11u8, 0, 5, 7, 2];
        let mut word = original;
        cenc(&params, &pool, &seq, &mut word).unwrap();
        assert_ne!(word, original);
        cdec(&params, &pool, &seq, &mut word).unwrap();
        assert_eq!(word, original);
    }

    #[test]
    fn rejects_bad_words() {
        let pool = pool(10);
        let params = params(10, 4, 0, 2, 8);
        let seq = [0u32; 8];

        let mut short = [1u8, 2, 3];
        assert_eq!(
            cenc(&params, &pool, &seq, &mut short),
            Err(FastError::InvalidLength { expected: 4, actual: 3 })
        );

        let mut bad = [1u8, 2, 10, 3];
        assert_eq!(
            cenc(&params, &pool, &seq, &mut bad),
            Err(FastError::InvalidSymbol { position: 2, value: 10 })
        );
        // Rejected input is left untouched
        assert_eq!(bad, [1, 2, 10, 3]);
    }
}
