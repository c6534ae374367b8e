//! An in-memory chain client recording every transaction it is asked to send

use std::{
    collections::HashMap,
    fs,
    path::Path,
    sync::Mutex,
};

use alloy::primitives::{bytes, keccak256, Address, Bytes, TxHash, U256};

use crate::{
    artifacts::RegistryArtifact,
    client::ChainClient,
    constants::{DEFAULT_REGISTRY_FUNDING, REGISTRY_DEPLOYER},
    errors::ScriptError,
};

/// A state-changing request made to the [`MockClient`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Deploy {
        from: Address,
        code: Bytes,
    },
    Send {
        from: Address,
        to: Address,
        calldata: Bytes,
        value: U256,
    },
    SendRaw(Bytes),
}

type FailurePredicate = Box<dyn Fn(&Call) -> bool + Send + Sync>;

#[derive(Default)]
struct MockState {
    calls: Vec<Call>,
    code: HashMap<Address, Bytes>,
    next_address: u8,
}

pub struct MockClient {
    accounts: Vec<Address>,
    chain_id: u64,
    raw_deployment: Option<Address>,
    fail_when: Option<FailurePredicate>,
    state: Mutex<MockState>,
}

impl MockClient {
    pub fn new(accounts: Vec<Address>) -> Self {
        Self {
            accounts,
            chain_id: 1337,
            raw_deployment: None,
            fail_when: None,
            state: Mutex::new(MockState {
                next_address: 0x10,
                ..Default::default()
            }),
        }
    }

    /// Seed code at the given address
    pub fn with_code(self, address: Address, code: Bytes) -> Self {
        self.state.lock().unwrap().code.insert(address, code);
        self
    }

    /// Raw transactions create code at the given address
    pub fn with_raw_deployment(mut self, address: Address) -> Self {
        self.raw_deployment = Some(address);
        self
    }

    /// Reject every call matching the predicate, as a reverted transaction would be
    pub fn failing_when(mut self, predicate: impl Fn(&Call) -> bool + Send + Sync + 'static) -> Self {
        self.fail_when = Some(Box::new(predicate));
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn deploy_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|call| matches!(call, Call::Deploy { .. }))
            .count()
    }

    /// Records the call, returning whether it should fail
    fn record(&self, call: Call) -> bool {
        let fails = self.fail_when.as_ref().is_some_and(|p| p(&call));
        self.state.lock().unwrap().calls.push(call);
        fails
    }

    fn tx_hash(&self) -> TxHash {
        keccak256(self.state.lock().unwrap().calls.len().to_be_bytes())
    }
}

impl ChainClient for MockClient {
    async fn accounts(&self) -> Result<Vec<Address>, ScriptError> {
        Ok(self.accounts.clone())
    }

    async fn chain_id(&self) -> Result<u64, ScriptError> {
        Ok(self.chain_id)
    }

    async fn code_at(&self, address: Address) -> Result<Bytes, ScriptError> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .code
            .get(&address)
            .cloned()
            .unwrap_or_default())
    }

    async fn deploy(&self, from: Address, code: Bytes) -> Result<Address, ScriptError> {
        if self.record(Call::Deploy {
            from,
            code: code.clone(),
        }) {
            return Err(ScriptError::ContractDeployment("reverted".to_string()));
        }

        let mut state = self.state.lock().unwrap();
        let address = Address::with_last_byte(state.next_address);
        state.next_address += 1;
        state.code.insert(address, code);

        Ok(address)
    }

    async fn send(
        &self,
        from: Address,
        to: Address,
        calldata: Bytes,
        value: U256,
    ) -> Result<TxHash, ScriptError> {
        if self.record(Call::Send {
            from,
            to,
            calldata,
            value,
        }) {
            return Err(ScriptError::ContractInteraction("reverted".to_string()));
        }

        Ok(self.tx_hash())
    }

    async fn send_raw(&self, raw_tx: Bytes) -> Result<TxHash, ScriptError> {
        if self.record(Call::SendRaw(raw_tx)) {
            return Err(ScriptError::ContractDeployment("reverted".to_string()));
        }

        if let Some(address) = self.raw_deployment {
            self.state
                .lock()
                .unwrap()
                .code
                .insert(address, bytes!("6080"));
        }

        Ok(self.tx_hash())
    }
}

pub fn registry_artifact() -> RegistryArtifact {
    RegistryArtifact {
        deployer: REGISTRY_DEPLOYER,
        raw_tx: bytes!("f8a58085174876e800830c35008080"),
        funding: U256::from(DEFAULT_REGISTRY_FUNDING),
    }
}

/// The token's creation bytecode in [`write_artifacts`]
pub const TOKEN_BYTECODE: Bytes = bytes!("6001");
/// The controller's creation bytecode in [`write_artifacts`]
pub const CONTROLLER_BYTECODE: Bytes = bytes!("6002");

/// Writes token, controller, and registry artifacts into `dir`
pub fn write_artifacts(dir: &Path) {
    fs::write(
        dir.join("FilesFMToken.json"),
        format!(r#"{{ "contractName": "FilesFMToken", "bytecode": "{}" }}"#, TOKEN_BYTECODE),
    )
    .unwrap();
    fs::write(
        dir.join("FilesFMTokenController.json"),
        format!(
            r#"{{ "contractName": "FilesFMTokenController", "bytecode": "{}" }}"#,
            CONTROLLER_BYTECODE
        ),
    )
    .unwrap();

    let registry = registry_artifact();
    fs::write(
        dir.join("ERC820Registry.json"),
        format!(
            r#"{{ "deployer": "{}", "rawTx": "{}" }}"#,
            registry.deployer, registry.raw_tx
        ),
    )
    .unwrap();
}
