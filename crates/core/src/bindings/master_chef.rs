use alloy::sol;

sol! {
    #[sol(rpc)]
    contract BeethovenxMasterChef {
        function add(uint256 allocPoint, address lpToken, address rewarder) external;
        function set(uint256 pid, uint256 allocPoint, address rewarder, bool overwrite) external;
        function poolLength() external view returns (uint256 length);
    }
}
