use std::fmt::Display;

use alloy::{
    contract,
    primitives::Bytes,
    providers::PendingTransactionError,
    signers::local::LocalSignerError,
    transports,
};

use crate::{artifact::ArtifactError, config::ConfigError};

pub type Result<T> = std::result::Result<T, Error>;

/// Error surfaced by the deployment and pool initialization procedures.
///
/// The first group mirrors what the RPC provider reports for calls and
/// transactions, the rest are local failures detected before or between them.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("fatal error: {0}")]
    Fatal(String),

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("unexpected empty RPC response")]
    NullResp,

    #[error("transaction ran out of gas")]
    OutOfGas,

    #[error("transaction reverted: {0}")]
    Reverted(String),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("transaction timed out")]
    Timeout,

    #[error("node is on chain {actual}, expected {expected}")]
    ChainMismatch { expected: u64, actual: u64 },

    #[error("deployment receipt of {0} carries no contract address")]
    MissingContractAddress(String),

    #[error("pool factory returned no pool for {0}")]
    PoolNotFound(String),

    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("environment configuration error: {0}")]
    EnvConfig(#[from] envy::Error),

    #[error("invalid private key: {0}")]
    InvalidKey(#[from] LocalSignerError),

    #[error("invalid RPC URL: {0}")]
    InvalidRpcUrl(#[from] url::ParseError),

    #[error("artifact error: {0}")]
    Artifact(#[from] ArtifactError),
}

impl From<contract::Error> for Error {
    fn from(value: contract::Error) -> Self {
        match value {
            contract::Error::UnknownFunction(_) => Self::Fatal(value.to_string()),
            contract::Error::UnknownSelector(_) => Self::Fatal(value.to_string()),
            contract::Error::NotADeploymentTransaction => Self::Fatal(value.to_string()),
            contract::Error::ContractNotDeployed => Self::Fatal(value.to_string()),
            contract::Error::ZeroData(_, _) => Self::Fatal(value.to_string()),
            contract::Error::AbiError(_) => Self::Fatal(value.to_string()),
            contract::Error::TransportError(rpc_err) => Self::from(rpc_err),
            contract::Error::PendingTransactionError(err) => err.into(),
        }
    }
}

/// Confirmation wait failures. The watcher timeout set by
/// [`crate::client::NodePending`] surfaces as [`Error::Timeout`].
impl From<PendingTransactionError> for Error {
    fn from(value: PendingTransactionError) -> Self {
        match value {
            PendingTransactionError::FailedToRegister => Self::Fatal(value.to_string()),
            PendingTransactionError::TransportError(rpc_err) => Self::from(rpc_err),
            PendingTransactionError::Recv(_) => Self::Transport(value.to_string()),
            PendingTransactionError::TxWatcher(err) => match err {
                alloy::providers::WatchTxError::Timeout => Self::Timeout,
            },
        }
    }
}

/// Classifies JSON-RPC error responses by code and message. Revert data,
/// when present, is decoded into the revert reason.
impl<E: Display> From<transports::RpcError<E>> for Error {
    fn from(value: transports::RpcError<E>) -> Self {
        match value {
            transports::RpcError::ErrorResp(ref resp) => {
                // Heuristic to determine if eth_call failed due to OutOfGas or
                // if transaction was reverted during the gas estimation
                let msg = resp.message.to_ascii_lowercase();
                if (resp.code == -32603) && (msg.contains("gas") || msg.contains("oog")) {
                    Self::OutOfGas
                } else if ((resp.code == -32600 || resp.code == -32601 || resp.code == -32602)
                    && (msg.contains("invalid") || msg.contains("not found")))
                    || (resp.code == -32603
                        && (msg.contains("block by number") || msg.contains("getting block")))
                {
                    Self::InvalidRequest(msg)
                } else if resp.code == 3 && msg.contains("reverted") {
                    Self::Reverted(
                        resp.as_revert_data()
                            .as_ref()
                            .and_then(revert_reason)
                            .unwrap_or(msg),
                    )
                } else {
                    Self::Transport(value.to_string())
                }
            }
            transports::RpcError::NullResp => Self::NullResp,
            _ => Self::Transport(value.to_string()),
        }
    }
}

/// Decodes `Error(string)`/`Panic(uint256)` revert data, falling back to the
/// raw hex when it is a custom error.
fn revert_reason(data: &Bytes) -> Option<String> {
    if data.is_empty() {
        return None;
    }
    Some(alloy_sol_types::decode_revert_reason(data).unwrap_or_else(|| data.to_string()))
}

/// Process exit status of a procedure outcome.
pub fn exit_code<T>(result: &Result<T>) -> i32 {
    match result {
        Ok(_) => 0,
        Err(_) => 1,
    }
}
