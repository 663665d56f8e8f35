use crate::error::Error;
use crate::filter::params::Params;
use crate::util::coding::{decode_fixed_64, put_fixed_64};
use crate::IResult;

/// Size of the metadata record on disk.
///
/// ```text
/// |ready(1)|entries(8)|current_entries(8)|collisions(8)|bits(8)|bytes(8)|hashes(1)|
/// ```
///
/// Integers are little-endian, there is no padding.
pub const META_SIZE: usize = 1 + 8 * 5 + 1;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Meta {
    pub ready: bool,
    pub entries: u64,
    pub current_entries: u64,
    pub collisions: u64,
    pub bits: u64,
    pub bytes: u64,
    pub hashes: u8,
}

impl Meta {
    pub fn new(params: &Params, current_entries: u64, collisions: u64) -> Self {
        Meta {
            ready: true,
            entries: params.entries,
            current_entries,
            collisions,
            bits: params.bits,
            bytes: params.bytes,
            hashes: params.hashes,
        }
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut dst = Vec::with_capacity(META_SIZE);
        dst.push(self.ready as u8);
        put_fixed_64(&mut dst, self.entries);
        put_fixed_64(&mut dst, self.current_entries);
        put_fixed_64(&mut dst, self.collisions);
        put_fixed_64(&mut dst, self.bits);
        put_fixed_64(&mut dst, self.bytes);
        dst.push(self.hashes);
        dst
    }

    pub fn decode(src: &[u8]) -> IResult<Self> {
        if src.len() < META_SIZE {
            return Err(Error::Corruption(format!(
                "metadata record has {} bytes, expected {}",
                src.len(),
                META_SIZE
            )));
        }
        Ok(Meta {
            ready: src[0] != 0,
            entries: decode_fixed_64(&src[1..]),
            current_entries: decode_fixed_64(&src[9..]),
            collisions: decode_fixed_64(&src[17..]),
            bits: decode_fixed_64(&src[25..]),
            bytes: decode_fixed_64(&src[33..]),
            hashes: src[41],
        })
    }

    /// Fails with `Error::Mismatch` unless the record describes a filter laid
    /// out exactly like `params`.
    pub fn check_layout(&self, params: &Params) -> IResult<()> {
        let stored = Params {
            entries: self.entries,
            bits: self.bits,
            bytes: self.bytes,
            hashes: self.hashes,
            ..Params::default()
        };
        if stored.same_layout(params) {
            return Ok(());
        }
        Err(Error::Mismatch(format!(
            "stored entries={} bits={} bytes={} hashes={}, requested entries={} bits={} bytes={} hashes={}",
            self.entries,
            self.bits,
            self.bytes,
            self.hashes,
            params.entries,
            params.bits,
            params.bytes,
            params.hashes
        )))
    }
}
