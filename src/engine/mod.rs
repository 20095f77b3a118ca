//! The tick driver and the recursive update protocol.
//!
//! [`Hsm`] owns the node arena and exposes the per-tick entry point; the
//! routing algorithm itself lives in `update`. Each tick is a single
//! synchronous recursive walk, bounded by the tree depth fixed at build
//! time.

mod error;
mod machine;
mod update;

pub use error::TickError;
pub use machine::Hsm;
