//! Constants used in the migration scripts

use alloy::primitives::{address, Address};

/// The name of the local development network
pub const DEVELOPMENT_NETWORK: &str = "development";

/// The name of the local test network
pub const TEST_NETWORK: &str = "test";

/// The name of the Ropsten testnet
pub const ROPSTEN_NETWORK: &str = "ropsten";

/// The host of a locally running development node
pub const LOCAL_NODE_HOST: &str = "localhost";

/// The port of a locally running development node
pub const LOCAL_NODE_PORT: u16 = 8545;

/// The gas limit used for transactions on the local networks
pub const LOCAL_GAS_LIMIT: u64 = 5_000_000;

/// The default Ropsten RPC endpoint, expected to be overridden with a keyed URL
pub const ROPSTEN_RPC_URL: &str = "https://ropsten.infura.io/v3/";

/// The chain ID of the Ropsten testnet
pub const ROPSTEN_CHAIN_ID: u64 = 3;

/// The gas limit used for transactions on Ropsten
pub const ROPSTEN_GAS_LIMIT: u64 = 4_500_000;

/// The gas price used for transactions on Ropsten, in wei (20 gwei)
pub const ROPSTEN_GAS_PRICE: u128 = 20_000_000_000;

/// The environment variable holding the Ropsten deployer's private key
pub const ROPSTEN_PRIVATE_KEY_ENV_VAR: &str = "ROPSTEN_PRIVATE_KEY";

/// The wildcard network ID, matching any chain
pub const ANY_NETWORK_ID: &str = "*";

/// The number of confirmations to wait for on every migration transaction
pub const NUM_CONFIRMATIONS: u64 = 1;

/// The default directory containing the compiled contract artifacts
pub const DEFAULT_ARTIFACTS_DIR: &str = "build/contracts";

/// The default path of the deployments file
pub const DEFAULT_DEPLOYMENTS_PATH: &str = "deployments.json";

/// The extension of a compiled contract artifact
pub const ARTIFACT_EXTENSION: &str = "json";

/// The artifact name of the token contract
pub const TOKEN_CONTRACT_NAME: &str = "FilesFMToken";

/// The artifact name of the token controller contract
pub const CONTROLLER_CONTRACT_NAME: &str = "FilesFMTokenController";

/// The artifact name of the EIP-820 registry contract
pub const REGISTRY_CONTRACT_NAME: &str = "ERC820Registry";

/// The token contract key in the `deployments.json` file
pub const TOKEN_CONTRACT_KEY: &str = "token_contract";

/// The token controller contract key in the `deployments.json` file
pub const CONTROLLER_CONTRACT_KEY: &str = "controller_contract";

/// The EIP-820 registry contract key in the `deployments.json` file
pub const REGISTRY_CONTRACT_KEY: &str = "registry_contract";

/// The address the EIP-820 registry occupies on every chain
pub const REGISTRY_ADDRESS: Address = address!("820b586c8c28125366c998641b09dcbe7d4cbf06");

/// The sender of the registry's presigned deployment transaction
pub const REGISTRY_DEPLOYER: Address = address!("e6c244a1c10aa0085b0cf92f04cdad947c2f896b");

/// The amount of wei sent to the registry's one-time deployer address when the
/// registry artifact does not specify one: 800,000 gas at 100 gwei
pub const DEFAULT_REGISTRY_FUNDING: u128 = 80_000_000_000_000_000;
