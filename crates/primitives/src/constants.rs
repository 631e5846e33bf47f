//! Constants shared across the relay.

/// JSON-RPC error codes returned by the relay API.
pub mod rpc_error_codes {
    /// Wire input failed validation (the caller must correct and resubmit)
    pub const VALIDATION: i32 = -32602;
    /// The pending ledger is unavailable
    pub const STORAGE: i32 = -32010;
    /// Building, signing, or broadcasting the relay transaction failed
    pub const SUBMISSION: i32 = -32011;
}

/// Gas for the relay transaction wrapping one `handleOps` call.
pub mod gas {
    /// Default gas ceiling for a single-operation `handleOps` transaction.
    pub const DEFAULT_HANDLE_OPS_GAS: u64 = 1_000_000;

    /// Floor for the configurable ceiling. Under-provisioning does not fail
    /// locally, it reverts on chain after the transaction lands, so values
    /// below this are rejected at startup.
    pub const MIN_HANDLE_OPS_GAS: u64 = 300_000;
}
