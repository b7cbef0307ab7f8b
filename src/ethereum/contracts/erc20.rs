//! ERC20 and source token contract bindings.

use alloy::sol;

// Standard ERC20 interface
sol! {
    #[sol(all_derives)]
    interface IERC20 {
        function symbol() external view returns (string memory);
        function balanceOf(address account) external view returns (uint256);
    }
}

// Source token: ERC20 with an owner-gated mint.
sol! {
    #[sol(all_derives)]
    interface ISourceToken {
        function balanceOf(address account) external view returns (uint256);
        function approve(address spender, uint256 amount) external returns (bool);
        function mint(address to, uint256 amount) external;
    }
}
