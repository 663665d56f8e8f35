use crate::error::Error;
use crate::IResult;

/// Smallest capacity accepted by `Params::new`.
pub const MIN_ENTRIES: u64 = 1000;

// ln(2)^2 and ln(2), kept at the precision older bloomdisk files were sized with.
const LN2_SQUARED: f64 = 0.480453013918201;
const LN2: f64 = 0.693147180559945;

/// Optimal Bloom filter dimensions for a capacity and a false positive rate.
///
/// Computed the usual way:
///
/// ```text
/// bpe    = -ln(error) / ln(2)^2
/// bits   = floor(entries * bpe)
/// bytes  = ceil(bits / 8)
/// hashes = ceil(bpe * ln(2))
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Params {
    pub entries: u64,
    pub error: f64,
    pub bpe: f64,
    pub bits: u64,
    pub bytes: u64,
    pub hashes: u8,
}

impl Params {
    pub fn new(entries: u64, error: f64) -> IResult<Self> {
        if entries < MIN_ENTRIES {
            return Err(Error::InvalidParam(format!(
                "entries must be at least {}, got {}",
                MIN_ENTRIES, entries
            )));
        }
        // `!(a < b)` also rejects NaN.
        if !(error > 0.0 && error < 1.0) {
            return Err(Error::InvalidParam(format!(
                "error must lie in (0, 1), got {}",
                error
            )));
        }

        let bpe = -error.ln() / LN2_SQUARED;
        let all_bits = entries as f64 * bpe;
        if all_bits < 1.0 || all_bits >= u64::MAX as f64 {
            return Err(Error::InvalidParam(format!(
                "{} entries at error {} need {} bits",
                entries, error, all_bits
            )));
        }
        let bits = all_bits as u64;
        let bytes = bits / 8 + if bits % 8 != 0 { 1 } else { 0 };

        let k = (LN2 * bpe).ceil();
        if k > u8::MAX as f64 {
            return Err(Error::InvalidParam(format!(
                "error {} needs {} hash functions, at most {} are supported",
                error,
                k,
                u8::MAX
            )));
        }

        Ok(Params {
            entries,
            error,
            bpe,
            bits,
            bytes,
            hashes: (k as u8).max(1),
        })
    }

    /// Returns true iff the persisted dimensions agree with `other`.
    pub fn same_layout(&self, other: &Params) -> bool {
        self.entries == other.entries
            && self.bits == other.bits
            && self.bytes == other.bytes
            && self.hashes == other.hashes
    }
}
