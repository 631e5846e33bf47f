use crate::gen::{HandleOpsCall, PackedUserOperation};
use ethers::{
    abi::AbiEncode,
    types::{Address, Bytes},
};
use pylon_primitives::UserOperation;

/// The entry point contract the relay submits to. Call encoding is typed
/// and happens at compile time, so no client connection is required here.
#[derive(Clone, Copy, Debug)]
pub struct EntryPoint {
    address: Address,
}

impl EntryPoint {
    pub fn new(address: Address) -> Self {
        Self { address }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    /// ABI-encodes a `handleOps` call carrying the given operations, with
    /// the beneficiary receiving the gas refund.
    pub fn handle_ops_calldata(
        &self,
        ops: Vec<PackedUserOperation>,
        beneficiary: Address,
    ) -> Bytes {
        HandleOpsCall { ops, beneficiary }.encode().into()
    }
}

impl From<UserOperation> for PackedUserOperation {
    fn from(uo: UserOperation) -> Self {
        Self {
            sender: uo.sender,
            nonce: uo.nonce,
            init_code: uo.init_code,
            call_data: uo.call_data,
            account_gas_limits: uo.account_gas_limits.0,
            pre_verification_gas: uo.pre_verification_gas,
            gas_fees: uo.gas_fees.0,
            paymaster_and_data: uo.paymaster_and_data,
            signature: uo.signature,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ethers::utils::id;

    const HANDLE_OPS_SIG: &str =
        "handleOps((address,uint256,bytes,bytes,bytes32,uint256,bytes32,bytes,bytes)[],address)";

    #[test]
    fn handle_ops_calldata_carries_the_selector() {
        let ep = EntryPoint::new("0x5FF137D4b0FDCD49DcA30c7CF57E578a026d2789".parse().unwrap());
        let op = PackedUserOperation::from(UserOperation::default());
        let data = ep.handle_ops_calldata(vec![op], Address::zero());

        assert_eq!(&data[0..4], &id(HANDLE_OPS_SIG)[..]);
        assert!(data.len() > 4);
    }

    #[test]
    fn packed_conversion_preserves_limb_bytes() {
        let uo = UserOperation::default()
            .account_gas_limits("0x0101010101010101010101010101010101010101010101010101010101010101"
                .parse()
                .unwrap());
        let packed = PackedUserOperation::from(uo);
        assert_eq!(packed.account_gas_limits, [1u8; 32]);
        assert_eq!(packed.gas_fees, [0u8; 32]);
    }
}
