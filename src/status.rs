//! Integer status codes of the classic bloomdisk interface.
//!
//! | call | codes |
//! |---|---|
//! | init | 0 failure, 1 fresh files, 2 existing files adopted |
//! | check / add | 1 present or collision, 0 absent or newly added, -1 not usable |
//! | save | 1 saved, 0 failure |

use crate::bloom::Outcome;
use crate::IResult;

pub fn init(result: &IResult<Outcome>) -> i32 {
    match result {
        Ok(outcome) => outcome.code(),
        Err(_) => 0,
    }
}

/// Maps a `check` or `add` result. Every error, not only `Error::NotReady`,
/// yields -1.
pub fn probe(result: &IResult<bool>) -> i32 {
    match result {
        Ok(true) => 1,
        Ok(false) => 0,
        Err(_) => -1,
    }
}

pub fn save(result: &IResult<()>) -> i32 {
    match result {
        Ok(()) => 1,
        Err(_) => 0,
    }
}
