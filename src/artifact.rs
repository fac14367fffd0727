//! Compiled contract artifacts.
//!
//! Artifacts follow the Hardhat layout: `<dir>/contracts/<Name>.sol/<Name>.json`
//! holding the contract ABI and creation bytecode.

use std::path::{Path, PathBuf};

use alloy::{
    dyn_abi::{DynSolValue, JsonAbiExt},
    json_abi::JsonAbi,
    primitives::Bytes,
};

#[derive(Debug, thiserror::Error)]
pub enum ArtifactError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("{0} has no creation bytecode, is it abstract?")]
    EmptyBytecode(String),

    #[error("{contract} constructor takes {expected} argument(s), got {got}")]
    ConstructorArity {
        contract: String,
        expected: usize,
        got: usize,
    },

    #[error("failed to encode {contract} constructor arguments: {reason}")]
    Encode { contract: String, reason: String },
}

#[derive(Clone, Debug, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Artifact {
    pub contract_name: String,
    #[serde(default)]
    pub source_name: Option<String>,
    pub abi: JsonAbi,
    pub bytecode: Bytes,
}

impl Artifact {
    /// Path of the artifact of contract `name` under a Hardhat artifacts directory.
    pub fn path(dir: &Path, name: &str) -> PathBuf {
        dir.join("contracts")
            .join(format!("{name}.sol"))
            .join(format!("{name}.json"))
    }

    pub fn load(dir: &Path, name: &str) -> Result<Self, ArtifactError> {
        Self::from_file(&Self::path(dir, name))
    }

    pub fn from_file(path: &Path) -> Result<Self, ArtifactError> {
        let json = std::fs::read_to_string(path).map_err(|source| ArtifactError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&json).map_err(|source| ArtifactError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Creation bytecode followed by the ABI-encoded constructor arguments.
    pub fn init_code(&self, args: &[DynSolValue]) -> Result<Bytes, ArtifactError> {
        if self.bytecode.is_empty() {
            return Err(ArtifactError::EmptyBytecode(self.contract_name.clone()));
        }

        let constructor = self.abi.constructor();
        let expected = constructor.map_or(0, |c| c.inputs.len());
        if expected != args.len() {
            return Err(ArtifactError::ConstructorArity {
                contract: self.contract_name.clone(),
                expected,
                got: args.len(),
            });
        }

        let mut code = self.bytecode.to_vec();
        if let Some(constructor) = constructor {
            let encoded =
                constructor
                    .abi_encode_input(args)
                    .map_err(|e| ArtifactError::Encode {
                        contract: self.contract_name.clone(),
                        reason: e.to_string(),
                    })?;
            code.extend_from_slice(&encoded);
        }
        Ok(code.into())
    }
}

/// Artifacts of the two contracts the deployer creates.
#[derive(Clone, Debug)]
pub struct Artifacts {
    pub token: Artifact,
    pub factory: Artifact,
}

impl Artifacts {
    pub fn load(dir: &Path, token: &str, factory: &str) -> Result<Self, ArtifactError> {
        Ok(Self {
            token: Artifact::load(dir, token)?,
            factory: Artifact::load(dir, factory)?,
        })
    }
}
