//! Deployment of the My404 token and the LaunchpadFactory pointing at it.

use alloy::{
    dyn_abi::DynSolValue,
    primitives::{Address, TxHash},
};
use tracing::info;

use crate::{
    artifact::{Artifact, Artifacts},
    client::{Client, Confirm},
    error::{Error, Result},
};

#[derive(Clone, Copy, Debug, Default)]
pub struct DeployOptions {
    /// Whitelist the deployer account on the token once both contracts are up.
    pub whitelist_deployer: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Deployment {
    pub token: Address,
    pub token_tx: TxHash,
    pub factory: Address,
    pub factory_tx: TxHash,
    pub whitelist_tx: Option<TxHash>,
}

/// Deploys the token, then the factory with the token as its implementation.
///
/// Each deployment is confirmed before the next call is issued. A failure
/// after the token is deployed leaves it on chain: its address is logged as
/// soon as it is known.
pub async fn run<C: Client>(
    client: &C,
    artifacts: &Artifacts,
    options: &DeployOptions,
) -> Result<Deployment> {
    info!(deployer = %client.signer(), "Contract is deploying...");

    let (token, token_tx) = deploy_contract(client, &artifacts.token, &[]).await?;
    info!(
        %token,
        tx = %token_tx,
        "{} contract is deployed", artifacts.token.contract_name
    );

    let (factory, factory_tx) =
        deploy_contract(client, &artifacts.factory, &[DynSolValue::Address(token)]).await?;
    info!(
        %factory,
        implementation = %token,
        tx = %factory_tx,
        "{} is deployed", artifacts.factory.contract_name
    );

    let whitelist_tx = if options.whitelist_deployer {
        let confirmation = client
            .set_whitelist(token, client.signer(), true)
            .await?
            .confirm()
            .await?;
        info!(tx = %confirmation.tx_hash, deployer = %client.signer(), "Deployer address whitelisted");
        Some(confirmation.tx_hash)
    } else {
        None
    };

    Ok(Deployment {
        token,
        token_tx,
        factory,
        factory_tx,
        whitelist_tx,
    })
}

async fn deploy_contract<C: Client>(
    client: &C,
    artifact: &Artifact,
    args: &[DynSolValue],
) -> Result<(Address, TxHash)> {
    let init_code = artifact.init_code(args)?;
    let confirmation = client.deploy(init_code).await?.confirm().await?;
    let address = confirmation
        .contract_address
        .ok_or_else(|| Error::MissingContractAddress(artifact.contract_name.clone()))?;
    Ok((address, confirmation.tx_hash))
}

#[cfg(test)]
mod tests {
    use alloy::{
        json_abi::JsonAbi,
        primitives::{Bytes, bytes},
    };

    use super::*;
    use crate::testing::{Call, MockClient, Step};

    fn artifact(name: &str, abi: &str) -> Artifact {
        Artifact {
            contract_name: name.to_string(),
            source_name: None,
            abi: serde_json::from_str::<JsonAbi>(abi).unwrap(),
            bytecode: bytes!("600a600c600039600a6000f3602a60005260206000f3"),
        }
    }

    fn artifacts() -> Artifacts {
        Artifacts {
            token: artifact("My404", "[]"),
            factory: artifact(
                "LaunchpadFactory",
                r#"[{"type":"constructor","stateMutability":"nonpayable","inputs":[{"name":"_implementation","type":"address"}]}]"#,
            ),
        }
    }

    fn init_codes(client: &MockClient) -> Vec<Bytes> {
        client
            .calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Deploy { init_code } => Some(init_code),
                _ => None,
            })
            .collect()
    }

    #[tokio::test]
    async fn test_deploys_factory_with_token_address() {
        let client = MockClient::new();
        let artifacts = artifacts();

        let deployment = run(&client, &artifacts, &DeployOptions::default())
            .await
            .unwrap();

        assert_eq!(deployment.token, client.deployed_address(0));
        assert_eq!(deployment.factory, client.deployed_address(1));
        assert_eq!(deployment.whitelist_tx, None);

        let codes = init_codes(&client);
        assert_eq!(codes.len(), 2);
        assert_eq!(codes[0], artifacts.token.bytecode);
        let (bytecode, args) = codes[1].split_at(artifacts.factory.bytecode.len());
        assert_eq!(bytecode, &artifacts.factory.bytecode[..]);
        assert_eq!(args, deployment.token.into_word().as_slice());
        assert_eq!(client.confirmed(), vec![deployment.token_tx, deployment.factory_tx]);
    }

    #[tokio::test]
    async fn test_token_failure_skips_factory() {
        let client = MockClient::new().fail_submit(Step::Deploy);

        let res = run(&client, &artifacts(), &DeployOptions::default()).await;

        assert!(matches!(res, Err(Error::Transport(_))));
        assert_eq!(client.count(Step::Deploy), 1);
    }

    #[tokio::test]
    async fn test_token_revert_skips_factory() {
        let client = MockClient::new().revert(Step::Deploy);

        let res = run(&client, &artifacts(), &DeployOptions::default()).await;

        assert!(matches!(res, Err(Error::Reverted(_))));
        assert_eq!(client.count(Step::Deploy), 1);
        assert!(client.confirmed().is_empty());
    }

    #[tokio::test]
    async fn test_bad_artifact_issues_nothing() {
        let client = MockClient::new();
        let mut artifacts = artifacts();
        artifacts.token.bytecode = Bytes::new();

        let res = run(&client, &artifacts, &DeployOptions::default()).await;

        assert!(matches!(res, Err(Error::Artifact(_))));
        assert!(client.calls().is_empty());
    }

    #[tokio::test]
    async fn test_whitelists_deployer_when_asked() {
        let client = MockClient::new();

        let deployment = run(
            &client,
            &artifacts(),
            &DeployOptions {
                whitelist_deployer: true,
            },
        )
        .await
        .unwrap();

        assert!(deployment.whitelist_tx.is_some());
        assert_eq!(
            client.calls().last(),
            Some(&Call::SetWhitelist {
                token: deployment.token,
                target: client.signer(),
                state: true,
            })
        );
    }
}
