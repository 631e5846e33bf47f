//! User operation relay primitive types
//!
//! This crate contains the wire and canonical representations of packed
//! (entry point v0.7) user operations, the hex codec between them, the
//! relayer wallet, and helpers for creating execution client providers.

pub mod constants;
pub mod provider;
mod user_operation;
mod wallet;

pub use user_operation::{
    CanonicalUserOperation, UserOperation, UserOperationRequest, ValidationError,
    ValidationErrorKind,
};
pub use wallet::{Wallet, WalletError};
