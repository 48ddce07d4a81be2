//! Loop A: consumes the scanner's deduplicated transaction stream and
//! derives zero or more evidences per transaction, submitting each serially.

use std::sync::Arc;

use contract_client::msg::{Evidence, OperationResult, Operation, OperationType, TransactionResult};
use contract_client::{ContractClient, CoreumSigner};
use serde_json::Value;
use xrpl_client::engine_result::{final_outcome, FinalOutcome};
use xrpl_scanner::ScannedTx;

use crate::error::{RelayerError, Result};
use crate::memo::decode_recipient_memo;
use crate::metrics::RelayerMetrics;

/// The bridge-account-local identity a `Payment`/`TicketCreate`/`TrustSet`/
/// `SignerListSet`/`AccountSet` binds to a pending operation: either the
/// ticket it consumed or the account sequence it used (when allocating new
/// tickets, account sequence is used instead of a ticket).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OperationRef {
    Ticket(u64),
    AccountSequence(u64),
}

fn operation_ref_of(op: &Operation) -> OperationRef {
    match op.ticket_sequence {
        Some(t) => OperationRef::Ticket(t),
        None => OperationRef::AccountSequence(op.account_sequence.unwrap_or(0)),
    }
}

fn tx_operation_ref(tx: &Value) -> Option<OperationRef> {
    if let Some(ticket) = tx.get("TicketSequence").and_then(Value::as_u64) {
        return Some(OperationRef::Ticket(ticket));
    }
    tx.get("Sequence").and_then(Value::as_u64).map(OperationRef::AccountSequence)
}

fn operation_result_for(op_type: &OperationType, meta: &Value) -> OperationResult {
    match op_type {
        OperationType::AllocateTickets { .. } => OperationResult::TicketsAllocation { tickets: extract_created_tickets(meta) },
        OperationType::TrustSet { .. } => OperationResult::TrustSet {},
        OperationType::RotateKeys { .. } => OperationResult::KeysRotation {},
        OperationType::CoreumToXRPLTransfer { .. } => OperationResult::CoreumToXRPLTransfer {},
    }
}

/// Scrapes a `TicketCreate`'s metadata for the `TicketSequence`s of every
/// newly created `Ticket` ledger entry.
fn extract_created_tickets(meta: &Value) -> Option<Vec<u64>> {
    let nodes = meta.get("AffectedNodes")?.as_array()?;
    let tickets: Vec<u64> = nodes
        .iter()
        .filter_map(|node| node.get("CreatedNode"))
        .filter(|created| created.get("LedgerEntryType").and_then(Value::as_str) == Some("Ticket"))
        .filter_map(|created| created.get("NewFields")?.get("TicketSequence")?.as_u64())
        .collect();
    if tickets.is_empty() {
        None
    } else {
        Some(tickets)
    }
}

fn amount_to_issuer_currency_value(amount: &Value) -> Option<(String, String, String)> {
    match amount {
        Value::String(drops) => Some(("".to_string(), "XRP".to_string(), drops.clone())),
        Value::Object(fields) => {
            let issuer = fields.get("issuer")?.as_str()?.to_string();
            let currency = fields.get("currency")?.as_str()?.to_string();
            let value = fields.get("value")?.as_str()?.to_string();
            Some((issuer, currency, value))
        }
        _ => None,
    }
}

/// Derives candidate evidence from one scanned, validated transaction. A
/// `Payment` inbound to the bridge that doesn't carry a recognizable
/// recipient memo yields `None` (refund-pending, nothing to vote on yet, per
/// refund-pending case).
fn derive_evidence(scanned: &ScannedTx, bridge_xrpl_address: &str, pending: &[Operation]) -> Option<Evidence> {
    let tx_type = scanned.tx.get("TransactionType")?.as_str()?;
    let account = scanned.tx.get("Account")?.as_str()?;

    if tx_type == "Payment" && scanned.tx.get("Destination").and_then(Value::as_str) == Some(bridge_xrpl_address) {
        let (issuer, currency, amount) = amount_to_issuer_currency_value(scanned.tx.get("Amount")?)?;
        let recipient = decode_recipient_memo(scanned.tx.get("Memos")?.as_array()?)?;
        return Some(Evidence::XRPLToCoreumTransfer {
            tx_hash: scanned.tx_hash.clone(),
            issuer,
            currency,
            amount,
            recipient: recipient.to_string(),
            memo: None,
        });
    }

    if account != bridge_xrpl_address {
        return None;
    }
    let op_ref = tx_operation_ref(&scanned.tx)?;
    let operation = pending.iter().find(|op| operation_ref_of(op) == op_ref)?;

    let engine_result = scanned.meta.get("TransactionResult").and_then(Value::as_str).unwrap_or("tesSUCCESS");
    let result = match final_outcome(engine_result) {
        FinalOutcome::Accepted => TransactionResult::Accepted,
        FinalOutcome::Rejected => TransactionResult::Rejected,
        FinalOutcome::Invalid => TransactionResult::Invalid,
    };

    let (account_sequence, ticket_sequence) = match op_ref {
        OperationRef::Ticket(t) => (None, Some(t)),
        OperationRef::AccountSequence(s) => (Some(s), None),
    };

    Some(Evidence::XRPLTransactionResult {
        tx_hash: Some(scanned.tx_hash.clone()),
        account_sequence,
        ticket_sequence,
        transaction_result: result,
        operation_result: Some(operation_result_for(&operation.operation_type, &scanned.meta)),
    })
}

pub struct XrplToCoreumLoop<S: CoreumSigner> {
    contract: Arc<ContractClient<S>>,
    bridge_xrpl_address: String,
    metrics: Arc<RelayerMetrics>,
    retry_delay: std::time::Duration,
}

impl<S: CoreumSigner> XrplToCoreumLoop<S> {
    pub fn new(
        contract: Arc<ContractClient<S>>,
        bridge_xrpl_address: String,
        metrics: Arc<RelayerMetrics>,
        retry_delay: std::time::Duration,
    ) -> Self {
        Self { contract, bridge_xrpl_address, metrics, retry_delay }
    }

    pub async fn run(&self, receiver: &mut tokio::sync::mpsc::UnboundedReceiver<ScannedTx>) -> Result<()> {
        while let Some(scanned) = receiver.recv().await {
            if let Err(err) = self.process_one(&scanned).await {
                self.metrics.loop_a_errors.inc();
                tracing::warn!(tx_hash = %scanned.tx_hash, error = %err, "loop a: failed to process transaction");
            }
        }
        Err(RelayerError::ChannelClosed)
    }

    async fn process_one(&self, scanned: &ScannedTx) -> Result<()> {
        let pending = self.contract.pending_operations().await?.operations;
        let Some(evidence) = derive_evidence(scanned, &self.bridge_xrpl_address, &pending) else {
            tracing::debug!(tx_hash = %scanned.tx_hash, "no derivable evidence, skipping (refund-pending or unrelated)");
            return Ok(());
        };

        match self.contract.save_evidence(evidence).await {
            Ok(_) => {
                self.metrics.loop_a_evidences_submitted.inc();
                Ok(())
            }
            Err(err) if err.is_benign_idempotent() => {
                tracing::debug!(tx_hash = %scanned.tx_hash, error = %err, "evidence already recorded, treating as success");
                Ok(())
            }
            Err(err) if err.is_transient() => {
                tracing::warn!(tx_hash = %scanned.tx_hash, error = %err, "transient error submitting evidence, backing off");
                tokio::time::sleep(self.retry_delay).await;
                Err(err.into())
            }
            Err(err) => {
                tracing::error!(tx_hash = %scanned.tx_hash, error = %err, "terminal error submitting evidence");
                Err(err.into())
            }
        }
    }
}
