//! Privileged node setup.
//!
//! Steps run strictly in order; each depends on chain state left by the
//! previous one. A configured proof is verified before anything else.

use crate::chain::signer::author_identity;
use crate::chain::{ChainApi, ChainResult};
use crate::config::RunConfig;
use crate::events::FailReason;
use crate::observability::metrics;

/// One step of the sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetupStep {
    VerifyProof,
    InsertAuthorKey,
    SetEndpoint,
    AddRelayer,
    DepositFund,
}

impl SetupStep {
    pub fn as_str(&self) -> &'static str {
        match self {
            SetupStep::VerifyProof => "verify_proof",
            SetupStep::InsertAuthorKey => "insert_author_key",
            SetupStep::SetEndpoint => "set_endpoint",
            SetupStep::AddRelayer => "add_relayer",
            SetupStep::DepositFund => "deposit_fund",
        }
    }
}

/// How the sequence ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SetupOutcome {
    Completed,
    /// The proof check returned `false`; no other step ran.
    Rejected(FailReason),
}

/// The ordered setup steps for one configuration.
#[derive(Debug)]
pub struct SetupSequence<'a> {
    config: &'a RunConfig,
}

impl<'a> SetupSequence<'a> {
    pub fn new(config: &'a RunConfig) -> Self {
        Self { config }
    }

    /// Steps this configuration will run, in order.
    pub fn steps(&self) -> Vec<SetupStep> {
        let mut steps = Vec::with_capacity(5);
        if self.config.proof.is_some() {
            steps.push(SetupStep::VerifyProof);
        }
        steps.extend([
            SetupStep::InsertAuthorKey,
            SetupStep::SetEndpoint,
            SetupStep::AddRelayer,
        ]);
        if self.config.setup.deposit.is_some() {
            steps.push(SetupStep::DepositFund);
        }
        steps
    }

    /// Run every step, awaiting each before starting the next.
    pub async fn execute<C: ChainApi>(&self, api: &C) -> ChainResult<SetupOutcome> {
        let (public_key, account) =
            author_identity(self.config.author.address.as_deref(), &self.config.author.suri)?;

        if self.config.proof.is_none() {
            tracing::warn!("No proof configured, skipping verification");
        }

        for step in self.steps() {
            tracing::info!(step = step.as_str(), "Running setup step");
            match step {
                SetupStep::VerifyProof => {
                    let Some(proof) = &self.config.proof else {
                        continue;
                    };
                    if !api.verify_proof(proof).await? {
                        tracing::error!(cid = %proof.cid, "Proof verification returned false");
                        return Ok(SetupOutcome::Rejected(FailReason::ProofRejected {
                            cid: proof.cid.clone(),
                        }));
                    }
                    tracing::info!(cid = %proof.cid, "Proof verified");
                }
                SetupStep::InsertAuthorKey => {
                    let author = &self.config.author;
                    api.insert_author_key(&author.id, &author.suri, &public_key)
                        .await?;
                    tracing::info!(key_type = %author.id, public_key = %public_key, "Author key inserted");
                }
                SetupStep::SetEndpoint => {
                    api.set_endpoint(&self.config.setup.filecoin_rpc).await?;
                    tracing::info!(endpoints = ?self.config.setup.filecoin_rpc, "Filecoin RPC endpoint set");
                }
                SetupStep::AddRelayer => {
                    let tx_hash = api.add_relayer(&account).await?;
                    tracing::info!(relayer = %account, tx_hash = ?tx_hash, "Relayer registration submitted");
                }
                SetupStep::DepositFund => {
                    let Some(deposit) = &self.config.setup.deposit else {
                        continue;
                    };
                    let tx_hash = api
                        .deposit_fund(&account, u128::from(deposit.amount))
                        .await?;
                    tracing::info!(account = %account, amount = deposit.amount, tx_hash = ?tx_hash, "Deposit submitted");
                }
            }
            metrics::record_setup_step(step.as_str());
        }

        Ok(SetupOutcome::Completed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DepositConfig, ProofRecord};

    #[test]
    fn test_default_steps() {
        let config = RunConfig::default();
        assert_eq!(
            SetupSequence::new(&config).steps(),
            vec![
                SetupStep::InsertAuthorKey,
                SetupStep::SetEndpoint,
                SetupStep::AddRelayer
            ]
        );
    }

    #[test]
    fn test_optional_steps_placement() {
        let mut config = RunConfig::default();
        config.proof = Some(ProofRecord {
            proof: "p".into(),
            cid: "c".into(),
            kind: Default::default(),
        });
        config.setup.deposit = Some(DepositConfig {
            amount: 10,
            transfer_call: "transfer".into(),
        });

        let steps = SetupSequence::new(&config).steps();
        assert_eq!(steps.first(), Some(&SetupStep::VerifyProof));
        assert_eq!(steps.last(), Some(&SetupStep::DepositFund));
        assert_eq!(steps.len(), 5);
    }
}
