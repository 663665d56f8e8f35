//! Bloom filter whose bit array lives in a file instead of RAM.
//!
//! Meant for filters larger than the available memory, on storage that copes
//! well with random single byte reads and writes (SSD, NVMe). Sizing follows
//! the usual optimal parameters for a capacity and a false positive rate, and
//! each key is mapped to its bits with xxh64 double hashing.
//!
//! ```no_run
//! use bloomdisk::{BloomDisk, Outcome};
//!
//! # fn main() -> bloomdisk::IResult<()> {
//! let mut bloom = BloomDisk::new();
//! if bloom.init(1_000_000, 0.000001, "seen")? == Outcome::Fresh {
//!     bloom.add(b"first key")?;
//! }
//! assert!(bloom.check(b"first key")?);
//! bloom.free()?;
//! # Ok(())
//! # }
//! ```

mod error;
pub mod bloom;
pub mod filter;
pub mod opt;
pub mod status;
pub mod storage;
mod util;

pub use bloom::{BloomDisk, Outcome, VERSION_MAJOR, VERSION_MINOR};
pub use error::{Error, IResult};
pub use opt::Options;

/// Version string compiled into the library.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
