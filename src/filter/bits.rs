use crate::storage::File;
use crate::IResult;

/// Tests bit `bit` of the data file and, if `set` is true and the bit is
/// clear, sets it.
///
/// Returns true iff the bit was already set. Bit `x` lives in byte `x >> 3`
/// under mask `1 << (x % 8)`. The read and the write are not atomic with
/// respect to other writers of the same file, callers must serialize.
pub fn test_bit_set_bit<F: File>(f: &F, bit: u64, set: bool) -> IResult<bool> {
    let offset = bit >> 3;
    let mask = 1u8 << (bit % 8);
    let mut c = [0u8; 1];
    f.read_exact_at(&mut c, offset)?;
    if c[0] & mask != 0 {
        return Ok(true);
    }
    if set {
        c[0] |= mask;
        f.write_all_at(&c, offset)?;
    }
    Ok(false)
}
