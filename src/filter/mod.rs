//! Building blocks of the disk filter: sizing, probe derivation, single bit
//! I/O and the metadata record.

pub mod bits;
pub mod hash;
pub mod meta;
pub mod params;

pub use hash::Probes;
pub use meta::{Meta, META_SIZE};
pub use params::{Params, MIN_ENTRIES};
