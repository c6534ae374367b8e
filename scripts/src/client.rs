//! The chain client through which every migration transaction is sent
//!
//! [`ChainClient`] is the deploy/call interface the migration steps are written
//! against. [`RpcClient`] implements it on top of an `alloy` provider.

use alloy::{
    network::{Ethereum, EthereumWallet, TransactionBuilder},
    primitives::{Address, Bytes, TxHash, U256},
    providers::{DynProvider, PendingTransactionBuilder, Provider, ProviderBuilder},
    rpc::types::{TransactionReceipt, TransactionRequest},
    transports::http::reqwest::Url,
};
use tracing::{debug, info};

use crate::{
    config::NetworkProfile,
    constants::NUM_CONFIRMATIONS,
    errors::ScriptError,
};

/// The operations the migrations need from a blockchain node.
///
/// Every state-changing method resolves only once its transaction has been
/// confirmed, and fails if the transaction reverted.
#[allow(async_fn_in_trait)]
pub trait ChainClient {
    /// The accounts transactions can be sent from, the first being the default deployer
    async fn accounts(&self) -> Result<Vec<Address>, ScriptError>;

    /// The chain ID reported by the node
    async fn chain_id(&self) -> Result<u64, ScriptError>;

    /// The runtime code stored at the given address
    async fn code_at(&self, address: Address) -> Result<Bytes, ScriptError>;

    /// Deploys a contract from `from` with the given creation code (bytecode followed
    /// by ABI-encoded constructor arguments), returning the new contract's address
    async fn deploy(&self, from: Address, code: Bytes) -> Result<Address, ScriptError>;

    /// Sends a transaction from `from` to `to` with the given calldata and value
    async fn send(
        &self,
        from: Address,
        to: Address,
        calldata: Bytes,
        value: U256,
    ) -> Result<TxHash, ScriptError>;

    /// Broadcasts an already signed transaction
    async fn send_raw(&self, raw_tx: Bytes) -> Result<TxHash, ScriptError>;
}

/// A [`ChainClient`] backed by a JSON-RPC node
#[derive(Clone)]
pub struct RpcClient {
    /// The underlying provider
    provider: DynProvider<Ethereum>,
    /// The local signer's address, if transactions are signed locally
    signer: Option<Address>,
    /// The gas limit applied to every transaction
    gas: u64,
    /// The legacy gas price applied to every transaction, if any
    gas_price: Option<u128>,
}

/// Connects to the node of the given network, checking that it serves the expected chain.
///
/// `rpc_url` overrides the endpoint configured in the profile.
pub async fn connect(
    profile: &NetworkProfile,
    rpc_url: Option<&str>,
) -> Result<RpcClient, ScriptError> {
    let rpc_url = rpc_url
        .map(str::to_string)
        .unwrap_or_else(|| profile.rpc_url());
    let url = Url::parse(&rpc_url)
        .map_err(|e| ScriptError::ClientInitialization(format!("{}: {}", rpc_url, e)))?;

    let (provider, signer) = match profile.credential()? {
        Some(signer) => {
            let address = signer.address();
            let provider = ProviderBuilder::new()
                .wallet(EthereumWallet::new(signer))
                .connect_http(url);
            (DynProvider::new(provider), Some(address))
        }
        None => (DynProvider::new(ProviderBuilder::new().connect_http(url)), None),
    };

    let client = RpcClient {
        provider,
        signer,
        gas: profile.gas,
        gas_price: profile.gas_price,
    };

    let chain_id = client.chain_id().await?;
    profile.network_id.check(chain_id)?;

    info!(network = %profile.name, %chain_id, "connected to {}", rpc_url);
    Ok(client)
}

impl RpcClient {
    /// A transaction request from `from` carrying the network's gas settings
    fn tx_request(&self, from: Address) -> TransactionRequest {
        let tx = TransactionRequest::default()
            .with_from(from)
            .with_gas_limit(self.gas);

        match self.gas_price {
            Some(gas_price) => tx.with_gas_price(gas_price),
            None => tx,
        }
    }

    /// Waits for the given transaction to be confirmed, failing if it reverted
    async fn confirm(
        pending: PendingTransactionBuilder<Ethereum>,
    ) -> Result<TransactionReceipt, String> {
        let tx_hash = *pending.tx_hash();
        debug!(%tx_hash, "waiting for confirmation");

        let receipt = pending
            .with_required_confirmations(NUM_CONFIRMATIONS)
            .get_receipt()
            .await
            .map_err(|e| e.to_string())?;

        if !receipt.status() {
            return Err(format!("transaction {} reverted", tx_hash));
        }

        Ok(receipt)
    }

    /// Sends the given transaction and waits for it to be confirmed
    async fn submit(&self, tx: TransactionRequest) -> Result<TransactionReceipt, String> {
        let pending = self
            .provider
            .send_transaction(tx)
            .await
            .map_err(|e| e.to_string())?;

        Self::confirm(pending).await
    }
}

impl ChainClient for RpcClient {
    async fn accounts(&self) -> Result<Vec<Address>, ScriptError> {
        if let Some(signer) = self.signer {
            return Ok(vec![signer]);
        }

        self.provider
            .get_accounts()
            .await
            .map_err(|e| ScriptError::ClientInitialization(e.to_string()))
    }

    async fn chain_id(&self) -> Result<u64, ScriptError> {
        self.provider
            .get_chain_id()
            .await
            .map_err(|e| ScriptError::ClientInitialization(e.to_string()))
    }

    async fn code_at(&self, address: Address) -> Result<Bytes, ScriptError> {
        self.provider
            .get_code_at(address)
            .await
            .map_err(|e| ScriptError::ContractInteraction(e.to_string()))
    }

    async fn deploy(&self, from: Address, code: Bytes) -> Result<Address, ScriptError> {
        let tx = self.tx_request(from).with_deploy_code(code);
        let receipt = self
            .submit(tx)
            .await
            .map_err(ScriptError::ContractDeployment)?;

        receipt.contract_address.ok_or_else(|| {
            ScriptError::ContractDeployment(format!(
                "receipt of {} carries no contract address",
                receipt.transaction_hash
            ))
        })
    }

    async fn send(
        &self,
        from: Address,
        to: Address,
        calldata: Bytes,
        value: U256,
    ) -> Result<TxHash, ScriptError> {
        let tx = self
            .tx_request(from)
            .with_to(to)
            .with_input(calldata)
            .with_value(value);

        let receipt = self
            .submit(tx)
            .await
            .map_err(ScriptError::ContractInteraction)?;
        Ok(receipt.transaction_hash)
    }

    async fn send_raw(&self, raw_tx: Bytes) -> Result<TxHash, ScriptError> {
        let pending = self
            .provider
            .send_raw_transaction(&raw_tx)
            .await
            .map_err(|e| ScriptError::ContractDeployment(e.to_string()))?;

        let receipt = Self::confirm(pending)
            .await
            .map_err(ScriptError::ContractDeployment)?;
        Ok(receipt.transaction_hash)
    }
}
