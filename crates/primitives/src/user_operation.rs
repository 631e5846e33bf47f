use ethers::types::{Address, Bytes, H256, U256};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Reason a wire field failed validation.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ValidationErrorKind {
    #[error("missing 0x prefix")]
    MissingPrefix,
    #[error("odd hex length")]
    OddLength,
    #[error("invalid hex")]
    InvalidHex,
    #[error("bad length: expected {expected} bytes, got {got}")]
    BadLength { expected: usize, got: usize },
}

/// A wire field that could not be decoded. Never retried; the caller must
/// resubmit corrected input.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("invalid {field}: {reason}")]
pub struct ValidationError {
    pub field: &'static str,
    pub reason: ValidationErrorKind,
}

impl ValidationError {
    fn new(field: &'static str, reason: ValidationErrorKind) -> Self {
        Self { field, reason }
    }
}

/// Wire representation of a packed user operation as submitted over the
/// request interface. Every byte-string field is a `0x`-prefixed,
/// even-length hex string.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserOperationRequest {
    /// Sender account address, 20 bytes
    pub sender: String,

    /// The operation's own nonce (sender-scoped anti-replay key, distinct
    /// from the relayer account's chain nonce)
    pub nonce: U256,

    /// Account factory call, empty unless the sender is being deployed
    pub init_code: String,

    /// The data passed to the sender during the main execution call
    pub call_data: String,

    /// Verification and call gas limits packed as two 16-byte big-endian limbs
    pub account_gas_limits: String,

    /// Gas to compensate the relayer for pre-verification work and calldata
    pub pre_verification_gas: U256,

    /// Max priority fee and max fee packed as two 16-byte big-endian limbs
    pub gas_fees: String,

    /// Paymaster address plus paymaster payload, empty if self-funded
    pub paymaster_and_data: String,

    /// Data passed to the account during the verification step
    pub signature: String,
}

impl UserOperationRequest {
    /// Decodes and validates the wire form into the canonical in-memory
    /// form. Pure; no network or storage side effects.
    pub fn decode(&self) -> Result<UserOperation, ValidationError> {
        Ok(UserOperation {
            sender: decode_address("sender", &self.sender)?,
            nonce: self.nonce,
            init_code: decode_bytes("initCode", &self.init_code)?.into(),
            call_data: decode_bytes("callData", &self.call_data)?.into(),
            account_gas_limits: decode_word("accountGasLimits", &self.account_gas_limits)?,
            pre_verification_gas: self.pre_verification_gas,
            gas_fees: decode_word("gasFees", &self.gas_fees)?,
            paymaster_and_data: decode_bytes("paymasterAndData", &self.paymaster_and_data)?.into(),
            signature: decode_bytes("signature", &self.signature)?.into(),
        })
    }
}

fn strip_prefix<'a>(field: &'static str, value: &'a str) -> Result<&'a str, ValidationError> {
    value
        .strip_prefix("0x")
        .or_else(|| value.strip_prefix("0X"))
        .ok_or_else(|| ValidationError::new(field, ValidationErrorKind::MissingPrefix))
}

fn decode_bytes(field: &'static str, value: &str) -> Result<Vec<u8>, ValidationError> {
    let raw = strip_prefix(field, value)?;
    if raw.len() % 2 != 0 {
        return Err(ValidationError::new(field, ValidationErrorKind::OddLength));
    }
    hex::decode(raw).map_err(|_| ValidationError::new(field, ValidationErrorKind::InvalidHex))
}

fn decode_word(field: &'static str, value: &str) -> Result<H256, ValidationError> {
    let bytes = decode_bytes(field, value)?;
    if bytes.len() != 32 {
        return Err(ValidationError::new(
            field,
            ValidationErrorKind::BadLength { expected: 32, got: bytes.len() },
        ));
    }
    Ok(H256::from_slice(&bytes))
}

fn decode_address(field: &'static str, value: &str) -> Result<Address, ValidationError> {
    let bytes = decode_bytes(field, value)?;
    if bytes.len() != 20 {
        return Err(ValidationError::new(
            field,
            ValidationErrorKind::BadLength { expected: 20, got: bytes.len() },
        ));
    }
    Ok(Address::from_slice(&bytes))
}

/// Canonical in-memory form of a packed user operation. The two 32-byte
/// limb fields are `H256` so the exact-length invariant holds by
/// construction once decoding succeeds.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserOperation {
    pub sender: Address,
    pub nonce: U256,
    pub init_code: Bytes,
    pub call_data: Bytes,
    pub account_gas_limits: H256,
    pub pre_verification_gas: U256,
    pub gas_fees: H256,
    pub paymaster_and_data: Bytes,
    pub signature: Bytes,
}

impl UserOperation {
    // Builder pattern helpers

    /// Sets the sender of the user operation
    pub fn sender(mut self, sender: Address) -> Self {
        self.sender = sender;
        self
    }

    /// Sets the nonce of the user operation
    pub fn nonce(mut self, nonce: U256) -> Self {
        self.nonce = nonce;
        self
    }

    /// Sets the init code of the user operation
    pub fn init_code(mut self, init_code: Bytes) -> Self {
        self.init_code = init_code;
        self
    }

    /// Sets the call data of the user operation
    pub fn call_data(mut self, call_data: Bytes) -> Self {
        self.call_data = call_data;
        self
    }

    /// Sets the packed gas limits of the user operation
    pub fn account_gas_limits(mut self, account_gas_limits: H256) -> Self {
        self.account_gas_limits = account_gas_limits;
        self
    }

    /// Sets the pre-verification gas of the user operation
    pub fn pre_verification_gas(mut self, pre_verification_gas: U256) -> Self {
        self.pre_verification_gas = pre_verification_gas;
        self
    }

    /// Sets the packed fee limbs of the user operation
    pub fn gas_fees(mut self, gas_fees: H256) -> Self {
        self.gas_fees = gas_fees;
        self
    }

    /// Sets the paymaster and data of the user operation
    pub fn paymaster_and_data(mut self, paymaster_and_data: Bytes) -> Self {
        self.paymaster_and_data = paymaster_and_data;
        self
    }

    /// Sets the signature of the user operation
    pub fn signature(mut self, signature: Bytes) -> Self {
        self.signature = signature;
        self
    }
}

/// Storage projection of a decoded operation: every byte-string field is
/// lower-case hex without a leading prefix, so stored and re-transmitted
/// data is canonical regardless of how the caller cased or prefixed its
/// input.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanonicalUserOperation {
    pub sender: String,
    pub nonce: U256,
    pub init_code: String,
    pub call_data: String,
    pub account_gas_limits: String,
    pub pre_verification_gas: U256,
    pub gas_fees: String,
    pub paymaster_and_data: String,
    pub signature: String,
}

impl From<&UserOperation> for CanonicalUserOperation {
    fn from(uo: &UserOperation) -> Self {
        Self {
            sender: hex::encode(uo.sender.as_bytes()),
            nonce: uo.nonce,
            init_code: hex::encode(&uo.init_code),
            call_data: hex::encode(&uo.call_data),
            account_gas_limits: hex::encode(uo.account_gas_limits.as_bytes()),
            pre_verification_gas: uo.pre_verification_gas,
            gas_fees: hex::encode(uo.gas_fees.as_bytes()),
            paymaster_and_data: hex::encode(&uo.paymaster_and_data),
            signature: hex::encode(&uo.signature),
        }
    }
}

impl CanonicalUserOperation {
    /// Decodes the canonical projection back into the in-memory form.
    /// Lossless for anything produced by `From<&UserOperation>`.
    pub fn decode(&self) -> Result<UserOperation, ValidationError> {
        Ok(UserOperation {
            sender: canonical_address("sender", &self.sender)?,
            nonce: self.nonce,
            init_code: canonical_bytes("initCode", &self.init_code)?.into(),
            call_data: canonical_bytes("callData", &self.call_data)?.into(),
            account_gas_limits: canonical_word("accountGasLimits", &self.account_gas_limits)?,
            pre_verification_gas: self.pre_verification_gas,
            gas_fees: canonical_word("gasFees", &self.gas_fees)?,
            paymaster_and_data: canonical_bytes("paymasterAndData", &self.paymaster_and_data)?
                .into(),
            signature: canonical_bytes("signature", &self.signature)?.into(),
        })
    }
}

// The canonical form carries no prefix by definition.

fn canonical_bytes(field: &'static str, value: &str) -> Result<Vec<u8>, ValidationError> {
    if value.len() % 2 != 0 {
        return Err(ValidationError::new(field, ValidationErrorKind::OddLength));
    }
    hex::decode(value).map_err(|_| ValidationError::new(field, ValidationErrorKind::InvalidHex))
}

fn canonical_word(field: &'static str, value: &str) -> Result<H256, ValidationError> {
    let bytes = canonical_bytes(field, value)?;
    if bytes.len() != 32 {
        return Err(ValidationError::new(
            field,
            ValidationErrorKind::BadLength { expected: 32, got: bytes.len() },
        ));
    }
    Ok(H256::from_slice(&bytes))
}

fn canonical_address(field: &'static str, value: &str) -> Result<Address, ValidationError> {
    let bytes = canonical_bytes(field, value)?;
    if bytes.len() != 20 {
        return Err(ValidationError::new(
            field,
            ValidationErrorKind::BadLength { expected: 20, got: bytes.len() },
        ));
    }
    Ok(Address::from_slice(&bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wire_op() -> UserOperationRequest {
        UserOperationRequest {
            sender: "0x9c5754De1443984659E1b3a8d1931D83475ba29C".into(),
            nonce: 7.into(),
            init_code: "0x".into(),
            call_data: "0xb61d27f6".into(),
            account_gas_limits: format!("0x{}", "00".repeat(32)),
            pre_verification_gas: 21_000.into(),
            gas_fees: format!("0x{}", "00".repeat(32)),
            paymaster_and_data: "0x".into(),
            signature: "0x7cb39607585dee8e297d0d7a669ad8c5e43975220b6773c10a138dea".into(),
        }
    }

    #[test]
    fn decode_accepts_well_formed_wire_input() {
        let uo = wire_op().decode().unwrap();
        assert_eq!(uo.sender, "0x9c5754De1443984659E1b3a8d1931D83475ba29C".parse().unwrap());
        assert_eq!(uo.nonce, U256::from(7));
        assert!(uo.init_code.is_empty());
        assert_eq!(uo.account_gas_limits, H256::zero());
        assert_eq!(uo.gas_fees, H256::zero());
        assert!(uo.paymaster_and_data.is_empty());
    }

    #[test]
    fn decode_accepts_upper_case_prefix_and_digits() {
        let mut wire = wire_op();
        wire.call_data = "0XB61D27F6".into();
        let uo = wire.decode().unwrap();
        assert_eq!(uo.call_data, "0xb61d27f6".parse::<Bytes>().unwrap());
    }

    #[test]
    fn decode_rejects_missing_prefix() {
        let mut wire = wire_op();
        wire.call_data = "b61d27f6".into();
        let err = wire.decode().unwrap_err();
        assert_eq!(err.field, "callData");
        assert_eq!(err.reason, ValidationErrorKind::MissingPrefix);
    }

    #[test]
    fn decode_rejects_odd_length() {
        let mut wire = wire_op();
        wire.signature = "0xabc".into();
        let err = wire.decode().unwrap_err();
        assert_eq!(err.field, "signature");
        assert_eq!(err.reason, ValidationErrorKind::OddLength);
    }

    #[test]
    fn decode_rejects_non_hex_characters() {
        let mut wire = wire_op();
        wire.init_code = "0xzz".into();
        let err = wire.decode().unwrap_err();
        assert_eq!(err.field, "initCode");
        assert_eq!(err.reason, ValidationErrorKind::InvalidHex);
    }

    #[test]
    fn decode_rejects_short_gas_limit_limbs() {
        let mut wire = wire_op();
        wire.account_gas_limits = "0x1234".into();
        let err = wire.decode().unwrap_err();
        assert_eq!(err.field, "accountGasLimits");
        assert_eq!(err.reason, ValidationErrorKind::BadLength { expected: 32, got: 2 });
    }

    #[test]
    fn decode_rejects_oversized_fee_limbs() {
        let mut wire = wire_op();
        wire.gas_fees = format!("0x{}", "11".repeat(33));
        let err = wire.decode().unwrap_err();
        assert_eq!(err.field, "gasFees");
        assert_eq!(err.reason, ValidationErrorKind::BadLength { expected: 32, got: 33 });
    }

    #[test]
    fn decode_accepts_exactly_32_byte_limbs_with_leading_zeros() {
        let mut wire = wire_op();
        wire.gas_fees = format!("0x{}{}", "00".repeat(16), "3b9aca00".repeat(4));
        assert!(wire.decode().is_ok());
    }

    #[test]
    fn decode_rejects_bad_sender_length() {
        let mut wire = wire_op();
        wire.sender = "0x1234".into();
        let err = wire.decode().unwrap_err();
        assert_eq!(err.field, "sender");
        assert_eq!(err.reason, ValidationErrorKind::BadLength { expected: 20, got: 2 });
    }

    #[test]
    fn canonical_round_trip_is_lossless() {
        let uo = wire_op().decode().unwrap();
        let canonical = CanonicalUserOperation::from(&uo);
        assert_eq!(canonical.decode().unwrap(), uo);
    }

    #[test]
    fn canonical_form_is_lower_case_without_prefix() {
        let mut wire = wire_op();
        wire.call_data = "0XB61D27F6".into();
        let canonical = CanonicalUserOperation::from(&wire.decode().unwrap());
        assert_eq!(canonical.call_data, "b61d27f6");
        assert_eq!(canonical.sender, "9c5754de1443984659e1b3a8d1931d83475ba29c");
        assert_eq!(canonical.account_gas_limits, "00".repeat(32));
    }

    #[test]
    fn wire_serde_uses_camel_case_field_names() {
        let wire = wire_op();
        let json = serde_json::to_value(&wire).unwrap();
        assert!(json.get("initCode").is_some());
        assert!(json.get("accountGasLimits").is_some());
        assert!(json.get("preVerificationGas").is_some());
        assert!(json.get("gasFees").is_some());
        assert!(json.get("paymasterAndData").is_some());
    }
}
