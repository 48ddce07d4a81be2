//! Loop B: periodically fetches pending operations, signs the ones this
//! relayer hasn't signed yet, and — when quorum is reached and this relayer
//! is the deterministically designated submitter — broadcasts the
//! multi-signed transaction to XRPL.

use std::sync::Arc;

use contract_client::msg::Operation;
use contract_client::{ContractClient, CoreumSigner};
use xrpl_client::engine_result::{classify, EngineResultClass};
use xrpl_client::XrplClient;

use crate::error::Result;
use crate::keys::XrplKeyringSigner;
use crate::metrics::RelayerMetrics;
use crate::tx_builder::build_unsigned_tx;

pub struct CoreumToXrplLoop<S: CoreumSigner> {
    contract: Arc<ContractClient<S>>,
    xrpl: Arc<XrplClient>,
    xrpl_signer: Arc<XrplKeyringSigner>,
    our_coreum_address: String,
    metrics: Arc<RelayerMetrics>,
    repeat_delay: std::time::Duration,
}

impl<S: CoreumSigner> CoreumToXrplLoop<S> {
    pub fn new(
        contract: Arc<ContractClient<S>>,
        xrpl: Arc<XrplClient>,
        xrpl_signer: Arc<XrplKeyringSigner>,
        our_coreum_address: String,
        metrics: Arc<RelayerMetrics>,
        repeat_delay: std::time::Duration,
    ) -> Self {
        Self { contract, xrpl, xrpl_signer, our_coreum_address, metrics, repeat_delay }
    }

    pub async fn run(&self) -> Result<()> {
        loop {
            if let Err(err) = self.run_once().await {
                self.metrics.loop_b_errors.inc();
                tracing::warn!(error = %err, "loop b: cycle failed");
            }
            tokio::time::sleep(self.repeat_delay).await;
        }
    }

    async fn run_once(&self) -> Result<()> {
        let config = self.contract.config().await?;
        if config.bridge_state == contract_client::msg::BridgeState::Halted {
            tracing::debug!("bridge halted, loop b pausing submissions");
            return Ok(());
        }

        let pending = self.contract.pending_operations().await?.operations;
        self.metrics.pending_operations.set(pending.len() as i64);

        let submitter_index = |operation_id: u64| -> usize { (operation_id % config.relayers.len().max(1) as u64) as usize };
        let our_index = config.relayers.iter().position(|r| r.coreum_address == self.our_coreum_address);

        for operation in &pending {
            if let Err(err) = self.process_operation(operation, &config, submitter_index, our_index).await {
                tracing::warn!(operation_id = operation.id, error = %err, "loop b: operation processing failed");
            }
        }
        Ok(())
    }

    async fn process_operation(
        &self,
        operation: &Operation,
        config: &contract_client::msg::ConfigResponse,
        submitter_index: impl Fn(u64) -> usize,
        our_index: Option<usize>,
    ) -> Result<()> {
        let already_signed = operation.signatures.iter().any(|s| s.relayer_coreum_address == self.our_coreum_address);
        let unsigned_tx = build_unsigned_tx(operation, config)?;

        let mut signatures = operation.signatures.clone();
        if !already_signed {
            let blob = unsigned_tx.multi_signing_blob(&self.xrpl_signer.address)?;
            let signature_bytes = self.xrpl_signer.sign(&blob)?;
            let signature_hex = hex::encode_upper(&signature_bytes);

            match self.contract.save_signature(operation.id, operation.version, signature_hex.clone()).await {
                Ok(_) => {
                    self.metrics.loop_b_signatures_uploaded.inc();
                    signatures.push(contract_client::msg::Signature {
                        relayer_coreum_address: self.our_coreum_address.clone(),
                        signature: signature_hex,
                    });
                }
                Err(err) if err.is_benign_idempotent() => {
                    tracing::debug!(operation_id = operation.id, error = %err, "signature already uploaded");
                }
                Err(err) => return Err(err.into()),
            }
        }

        if signatures.len() < config.evidence_threshold as usize {
            return Ok(());
        }
        if our_index != Some(submitter_index(operation.id)) {
            return Ok(());
        }

        self.broadcast(operation, &unsigned_tx, &signatures, config).await
    }

    async fn broadcast(
        &self,
        operation: &Operation,
        unsigned_tx: &xrpl_client::binary::UnsignedTransaction,
        signatures: &[contract_client::msg::Signature],
        config: &contract_client::msg::ConfigResponse,
    ) -> Result<()> {
        // The contract tracks signatures by the signer's Coreum address;
        // the XRPL signer list is keyed by the signer's XRPL address, so
        // each signature is re-keyed through the relayer set before assembly.
        let signer_entries: Vec<(String, Vec<u8>)> = signatures
            .iter()
            .filter_map(|s| {
                let xrpl_address = config.relayers.iter().find(|r| r.coreum_address == s.relayer_coreum_address)?.xrpl_address.clone();
                Some((xrpl_address, hex::decode(&s.signature).unwrap_or_default()))
            })
            .collect();
        let assembled = unsigned_tx.assemble_multisigned(&signer_entries)?;
        let tx_blob = hex::encode_upper(&assembled);

        match self.xrpl.submit(&tx_blob).await {
            Ok(_) => {
                self.metrics.loop_b_submissions.inc();
                tracing::info!(operation_id = operation.id, "submitted multi-signed transaction to xrpl");
                Ok(())
            }
            Err(xrpl_client::XrplClientError::SubmitRejected { code, .. }) if classify(&code) == EngineResultClass::ClaimedCost => {
                // The transaction entered the ledger but failed; Loop A will
                // observe the tec* result and submit a Rejected evidence.
                self.metrics.loop_b_submissions.inc();
                tracing::warn!(operation_id = operation.id, code = %code, "submission applied but failed on-ledger");
                Ok(())
            }
            Err(err) => Err(err.into()),
        }
    }
}
