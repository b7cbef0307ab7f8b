//! Heartbeat registry contract bindings.

use alloy::sol;

// Registry interface: heartbeat parameters and access control.
sol! {
    #[sol(all_derives)]
    interface IRegistry {
        function heartbeatPeriodSeconds() external view returns (uint256);
        function heartbeatReward() external view returns (uint256);
        function setHeartbeatPeriodSeconds(uint256 periodSeconds) external;
        function setHeartbeatReward(uint256 rewardWei) external;

        function authority() external view returns (address);
        function setAuthority(address newAuthority) external;

        function hasRole(bytes32 role, address account) external view returns (bool);
    }
}
