//! Entry point contract bindings
//!
//! Compile-time `abigen!` bindings for the packed (v0.7) entry point,
//! trimmed to the call surface the relay actually uses, plus a thin
//! wrapper that produces `handleOps` calldata.

mod entry_point;
mod gen;

pub use entry_point::EntryPoint;
pub use gen::{HandleOpsCall, PackedUserOperation};
