//! Mintable/burnable ERC20 token bindings

use alloy::sol;

sol! {
    /// Token interface consumed by the engine
    interface IToken {
        /// Returns the name of the token
        function name() external view returns (string memory);

        /// Returns the symbol of the token
        function symbol() external view returns (string memory);

        /// Returns the decimals of the token
        function decimals() external view returns (uint8);

        /// Returns the total supply of the token
        function totalSupply() external view returns (uint256);

        /// Returns the balance of an account
        function balanceOf(address account) external view returns (uint256);

        /// Transfers tokens to a recipient
        function transfer(address to, uint256 amount) external returns (bool);

        /// Creates tokens for a recipient (restricted to the owner on-chain)
        function mint(address to, uint256 amount) external;

        /// Destroys tokens held by the caller
        function burn(uint256 amount) external;

        /// Emitted when tokens move, including mint (from zero) and burn (to zero)
        event Transfer(address indexed from, address indexed to, uint256 value);
    }
}
