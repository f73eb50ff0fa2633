// Engine-agnostic vehicle math: probing, springs, drive, wheel spin, recovery.
pub mod types;
pub mod probe;
pub mod suspension;
pub mod drive;
pub mod spin;
pub mod upright;

#[cfg(test)]
pub(crate) mod testing;

pub use types::*;
