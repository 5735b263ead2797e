use alloy::sol;

sol! {
    #[sol(rpc)]
    contract Timelock {
        function admin() external view returns (address admin);
        function pendingAdmin() external view returns (address pendingAdmin);
        function delay() external view returns (uint256 delay);
        function GRACE_PERIOD() external view returns (uint256 gracePeriod);
        function MINIMUM_DELAY() external view returns (uint256 minimumDelay);
        function MAXIMUM_DELAY() external view returns (uint256 maximumDelay);
        function queuedTransactions(bytes32 txHash) external view returns (bool queued);

        function setDelay(uint256 newDelay) external;
        function setPendingAdmin(address newPendingAdmin) external;
        function acceptAdmin() external;

        function queueTransaction(address target, uint256 value, string memory signature, bytes memory data, uint256 eta) external returns (bytes32 txHash);
        function executeTransaction(address target, uint256 value, string memory signature, bytes memory data, uint256 eta) external payable returns (bytes memory result);
    }
}
