use zeroize::Zeroize;

use crate::errors::FastError;

/// Largest supported radix. Symbols are single bytes.
pub const MAX_RADIX: u32 = 256;

/// Pool size used by [Params::recommended].
pub const DEFAULT_POOL_SIZE: u32 = 256;

/// Cipher parameters.
///
/// All fields are public values; only the master key is secret. A parameter
/// set is immutable once a context has been built from it.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Params {
    /// Alphabet size `a`. Symbols are integers in `[0, a)`.
    pub radix: u32,
    /// Word length `l`: the number of symbols per plaintext/ciphertext.
    pub word_length: u32,
    /// Number of S-boxes in the derived pool, `m`.
    pub sbox_count: u32,
    /// Number of SPN layers `n`; must be a multiple of the word length.
    pub num_layers: u32,
    /// Branch distance `w` for the subtractive mix.
    pub branch_dist1: u32,
    /// Branch distance `w'` for the additive mix.
    pub branch_dist2: u32,
    /// Targeted security level in bits. Informational; 0 means 128.
    pub security_level: u32,
}

// Rounds per symbol for 128-bit security, indexed by radix row and word
// length column. Values between grid points are interpolated.
const ROUND_ELLS: [u32; 15] = [2, 3, 4, 5, 6, 7, 8, 9, 10, 12, 16, 32, 50, 64, 100];
const ROUND_RADICES: [u32; 20] = [
    4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15, 16, 100, 128, 256, 1000, 1024, 10000, 65536,
];
const ROUND_TABLE: [[u16; 15]; 20] = [
    [165, 135, 117, 105, 96, 89, 83, 78, 74, 68, 59, 52, 52, 53, 57], // a = 4
    [131, 107, 93, 83, 76, 70, 66, 62, 59, 54, 48, 46, 47, 48, 53],   // a = 5
    [113, 92, 80, 72, 65, 61, 57, 54, 51, 46, 44, 43, 44, 46, 52],    // a = 6
    [102, 83, 72, 64, 59, 55, 51, 48, 46, 43, 41, 41, 43, 45, 50],    // a = 7
    [94, 76, 66, 59, 54, 50, 47, 44, 42, 41, 39, 39, 42, 44, 50],     // a = 8
    [88, 72, 62, 56, 51, 47, 44, 42, 40, 39, 38, 38, 41, 43, 49],     // a = 9
    [83, 68, 59, 53, 48, 45, 42, 39, 39, 38, 37, 37, 40, 43, 49],     // a = 10
    [79, 65, 56, 50, 46, 43, 40, 38, 38, 37, 36, 37, 40, 42, 48],     // a = 11
    [76, 62, 54, 48, 44, 41, 38, 37, 37, 36, 35, 36, 39, 42, 48],     // a = 12
    [73, 60, 52, 47, 43, 39, 37, 36, 36, 35, 34, 36, 39, 41, 48],     // a = 13
    [71, 58, 50, 45, 41, 38, 36, 36, 35, 34, 34, 35, 39, 41, 47],     // a = 14
    [69, 57, 49, 44, 40, 37, 36, 35, 34, 34, 33, 35, 38, 41, 47],     // a = 15
    [67, 55, 48, 43, 39, 36, 35, 34, 34, 33, 33, 35, 38, 41, 47],     // a = 16
    [40, 33, 28, 27, 26, 26, 25, 25, 25, 26, 26, 30, 34, 37, 44],     // a = 100
    [38, 31, 27, 26, 25, 25, 25, 25, 25, 25, 26, 30, 34, 37, 44],     // a = 128
    [33, 27, 25, 24, 23, 23, 23, 23, 23, 24, 25, 29, 33, 37, 44],     // a = 256
    [32, 22, 21, 21, 21, 21, 21, 21, 21, 22, 23, 28, 32, 36, 43],     // a = 1000
    [32, 22, 21, 21, 21, 21, 21, 21, 21, 22, 23, 28, 32, 36, 43],     // a = 1024
    [32, 22, 18, 18, 18, 18, 19, 19, 19, 20, 21, 27, 32, 35, 42],     // a = 10000
    [32, 22, 17, 17, 17, 17, 17, 18, 18, 19, 21, 26, 31, 35, 42],     // a = 65536
];

fn interpolate(x: f64, x0: f64, x1: f64, y0: f64, y1: f64) -> f64 {
    if x1 == x0 {
        return y0;
    }
    let t = (x - x0) / (x1 - x0);
    if t <= 0.0 {
        y0
    } else if t >= 1.0 {
        y1
    } else {
        y0 + t * (y1 - y0)
    }
}

fn rounds_for_row(row: &[u16; 15], ell: f64) -> f64 {
    if ell <= ROUND_ELLS[0] as f64 {
        return row[0] as f64;
    }
    let last_ell = ROUND_ELLS[ROUND_ELLS.len() - 1] as f64;
    if ell >= last_ell {
        // Past the table, grow with the square root of the length ratio
        let last = row[row.len() - 1] as f64;
        let projected = last * (ell / last_ell).sqrt();
        return projected.max(last);
    }
    for i in 1..ROUND_ELLS.len() {
        if ell <= ROUND_ELLS[i] as f64 {
            return interpolate(
                ell,
                ROUND_ELLS[i - 1] as f64,
                ROUND_ELLS[i] as f64,
                row[i - 1] as f64,
                row[i] as f64,
            );
        }
    }
    row[row.len() - 1] as f64
}

fn lookup_rounds(radix: u32, ell: f64) -> f64 {
    if radix <= ROUND_RADICES[0] {
        return rounds_for_row(&ROUND_TABLE[0], ell);
    }
    let last = ROUND_RADICES.len() - 1;
    if radix >= ROUND_RADICES[last] {
        return rounds_for_row(&ROUND_TABLE[last], ell);
    }
    for i in 1..ROUND_RADICES.len() {
        if radix <= ROUND_RADICES[i] {
            let lo = rounds_for_row(&ROUND_TABLE[i - 1], ell);
            let hi = rounds_for_row(&ROUND_TABLE[i], ell);
            // Radix interpolation is linear in log(a)
            return interpolate(
                (radix as f64).ln(),
                (ROUND_RADICES[i - 1] as f64).ln(),
                (ROUND_RADICES[i] as f64).ln(),
                lo,
                hi,
            );
        }
    }
    rounds_for_row(&ROUND_TABLE[last], ell)
}

impl Params {
    /// Return recommended parameters for an alphabet of `radix` symbols and
    /// words of `word_length` symbols.
    ///
    /// The branch distances follow `w = min(ceil(sqrt(l)), l-2, l/2)` and
    /// `w' = max(1, w-1)`, and the layer count is the tabulated
    /// rounds-per-symbol figure for 128-bit security, rounded up and
    /// multiplied by the word length.
    pub fn recommended(radix: u32, word_length: u32) -> Result<Self, FastError> {
        if radix < 4 {
            return Err(FastError::InvalidParams("radix must be at least 4"));
        }
        if word_length < 2 {
            return Err(FastError::InvalidParams(
                "word length must be at least 2",
            ));
        }

        let branch_dist1 = if word_length <= 2 {
            0
        } else {
            let candidate = (word_length as f64).sqrt().ceil() as u32;
            // The l/2 bound keeps w + w' within the word
            candidate.min(word_length - 2).min(word_length / 2)
        };
        let branch_dist2 = if branch_dist1 > 1 { branch_dist1 - 1 } else { 1 };

        let rounds = lookup_rounds(radix, word_length as f64).max(1.0);
        let per_symbol = rounds.ceil() as u32;

        Ok(Params {
            radix,
            word_length,
            sbox_count: DEFAULT_POOL_SIZE,
            num_layers: per_symbol * word_length,
            branch_dist1,
            branch_dist2,
            security_level: 128,
        })
    }

    /// Check the structural invariants every live context relies on.
    pub fn validate(&self) -> Result<(), FastError> {
        if self.radix < 4 || self.radix > MAX_RADIX {
            return Err(FastError::InvalidParams("radix must be in 4..=256"));
        }
        if self.word_length < 2 {
            return Err(FastError::InvalidParams(
                "word length must be at least 2",
            ));
        }
        if self.num_layers == 0 || self.num_layers % self.word_length != 0 {
            return Err(FastError::InvalidParams(
                "layer count must be a nonzero multiple of the word length",
            ));
        }
        if self.sbox_count == 0 {
            return Err(FastError::InvalidParams("pool must hold at least one S-box"));
        }
        if self.branch_dist1 > self.word_length - 2 {
            return Err(FastError::InvalidParams(
                "branch distance w must not exceed word length - 2",
            ));
        }
        if self.branch_dist2 == 0
            || self.branch_dist2 > self.word_length - 1
            || self.branch_dist2 > self.word_length - self.branch_dist1 - 1
        {
            return Err(FastError::InvalidParams(
                "branch distance w' must be in 1..=word length - w - 1",
            ));
        }
        Ok(())
    }
}

impl Zeroize for Params {
    fn zeroize(&mut self) {
        self.radix.zeroize();
        self.word_length.zeroize();
        self.sbox_count.zeroize();
        self.num_layers.zeroize();
        self.branch_dist1.zeroize();
        self.branch_dist2.zeroize();
        self.security_level.zeroize();
    }
}
