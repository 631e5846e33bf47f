use ethers::contract::abigen;

abigen!(
    EntryPointAPI,
    r#"[
        struct PackedUserOperation {address sender;uint256 nonce;bytes initCode;bytes callData;bytes32 accountGasLimits;uint256 preVerificationGas;bytes32 gasFees;bytes paymasterAndData;bytes signature;}
        function handleOps(PackedUserOperation[] calldata ops,address payable beneficiary) external
    ]"#
);
