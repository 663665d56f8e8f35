use xxhash_rust::xxh64::xxh64;

/// Seed of the first of the two base hashes.
pub const SEED: u64 = 0x59f2_815b_16f8_1798;

/// Bit positions probed for one element, using the Kirsch-Mitzenmacher
/// construction `x_i = (a + i * b) mod bits` with `a = xxh64(key, SEED)` and
/// `b = xxh64(key, a)`.
#[derive(Debug, Clone)]
pub struct Probes {
    a: u64,
    b: u64,
    bits: u64,
    i: u8,
    hashes: u8,
}

impl Probes {
    pub fn new(key: &[u8], hashes: u8, bits: u64) -> Self {
        assert!(bits > 0, "[Probes] a filter needs at least one bit");
        let a = xxh64(key, SEED);
        let b = xxh64(key, a);
        Probes {
            a,
            b,
            bits,
            i: 0,
            hashes,
        }
    }
}

impl Iterator for Probes {
    type Item = u64;

    fn next(&mut self) -> Option<u64> {
        if self.i >= self.hashes {
            return None;
        }
        let x = self.a.wrapping_add(self.b.wrapping_mul(self.i as u64)) % self.bits;
        self.i += 1;
        Some(x)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = (self.hashes - self.i) as usize;
        (left, Some(left))
    }
}

impl ExactSizeIterator for Probes {}
