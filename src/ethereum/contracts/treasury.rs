//! Treasury contract bindings.

use alloy::sol;

// Treasury interface: source-token custody, unlock options and unlocks.
sol! {
    #[sol(all_derives)]
    interface ITreasury {
        struct UnlockOption {
            uint8 id;
            string name;
            string description;
            uint64 cliffSeconds;
            uint8 conversionRatePercentage;
        }

        struct Unlock {
            bytes32 id;
            uint256 sourceAmount;
            uint256 targetAmount;
            uint64 lockTime;
            uint64 unlockTime;
            bool fulfilled;
        }

        struct TokenReceiver {
            address receiver;
            uint256 amount;
        }

        function unlockOptions() external view returns (UnlockOption[] memory);

        function setUnlockOption(
            uint8 id,
            string calldata name,
            string calldata description,
            uint64 cliffSeconds,
            uint8 conversionRatePercentage,
            bool enabled
        ) external;

        function transferSourceTokensTo(address recipient, uint256 amount) external;
        function sendSourceTokens(TokenReceiver[] calldata receivers) external;

        function unlock(uint256 amount, uint8 unlockOptionId) external;
        function fulfill(bytes32 unlockId) external;
        function cancelUnlock(bytes32 unlockId) external;

        function getUnlocksCount(bool fulfilled, address owner) external view returns (uint256);
        function getUnlocks(bool fulfilled, address owner, uint256 offset, uint256 limit)
            external
            view
            returns (Unlock[] memory);
    }
}
