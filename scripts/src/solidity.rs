//! Definitions of Solidity functions called during migration

use alloy::sol;

sol! {
    function transferOwnership(address newOwner) external;
    function initialize() external;
}
