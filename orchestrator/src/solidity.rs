//! Definitions of the Solidity interfaces the orchestrator calls into

use alloy::sol;

sol! {
    #[allow(missing_docs)]
    #[sol(rpc)]
    interface IMulticall {
        struct Call {
            address target;
            bytes callData;
        }

        function aggregate(Call[] calldata calls) external returns (uint256 blockNumber, bytes[] memory returnData);
    }
}

sol! {
    #[allow(missing_docs)]
    #[sol(rpc)]
    interface IOwnable {
        function owner() external view returns (address);
    }
}

sol! {
    #[allow(missing_docs)]
    interface ITimelock {
        function queueTransaction(address target, uint256 value, string memory signature, bytes memory data, uint256 eta) external returns (bytes32);
        function executeTransaction(address target, uint256 value, string memory signature, bytes memory data, uint256 eta) external payable returns (bytes memory);
    }
}
