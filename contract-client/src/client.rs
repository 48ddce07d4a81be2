//! Typed façade over the bridge contract, talking to a Coreum node
//! over gRPC. Queries go through `cosmwasm.wasm.v1.Query/SmartContractState`;
//! commands are built as `MsgExecuteContract`, gas-simulated, signed and
//! broadcast through `cosmos.tx.v1beta1.Service`.

use std::str::FromStr;
use std::time::{Duration, Instant};

use cosmrs::cosmwasm::MsgExecuteContract;
use cosmrs::crypto::PublicKey;
use cosmrs::proto::cosmos::auth::v1beta1::{query_client::QueryClient as AuthQueryClient, BaseAccount, QueryAccountRequest};
use cosmrs::proto::cosmos::tx::v1beta1::{
    service_client::ServiceClient as TxServiceClient, BroadcastMode, BroadcastTxRequest, GetTxRequest,
    SimulateRequest,
};
use cosmrs::proto::cosmwasm::wasm::v1::{query_client::QueryClient as WasmQueryClient, QuerySmartContractStateRequest};
use cosmrs::tx::{self, Fee, SignDoc, SignerInfo};
use cosmrs::{AccountId, Coin as CosmrsCoin, Denom};
use serde::{de::DeserializeOwned, Serialize};
use tonic::transport::Channel;

use crate::config::CoreumClientConfig;
use crate::error::{classify_raw_log, ContractClientError, Result};
use crate::msg::*;

/// Signs bytes with a relayer's Coreum key without handing the key itself to
/// this crate; the relayer's keyring (encrypted on disk) is the only
/// thing that ever touches private key material.
pub trait CoreumSigner: Send + Sync {
    fn account_id(&self) -> AccountId;
    fn public_key(&self) -> PublicKey;
    fn sign(&self, bytes: &[u8]) -> Result<Vec<u8>>;
}

pub struct ContractClient<S: CoreumSigner> {
    channel: Channel,
    config: CoreumClientConfig,
    contract_address: AccountId,
    signer: S,
}

/// Summary of a broadcast-and-confirmed transaction, enough for the
/// orchestrator to log and for tests to assert on.
#[derive(Debug, Clone)]
pub struct TxOutcome {
    pub tx_hash: String,
    pub height: i64,
    pub gas_used: i64,
}

impl<S: CoreumSigner> ContractClient<S> {
    pub async fn connect(config: CoreumClientConfig, signer: S) -> Result<Self> {
        let channel = Channel::from_shared(config.grpc_url.clone())
            .map_err(|e| ContractClientError::TxBuild(e.to_string()))?
            .timeout(config.request_timeout)
            .connect()
            .await?;
        let contract_address = AccountId::from_str(&config.contract_address)
            .map_err(|e| ContractClientError::TxBuild(format!("invalid contract address: {e}")))?;
        Ok(Self { channel, config, contract_address, signer })
    }

    // ---------------------------------------------------------------- query

    async fn query_smart<Q: Serialize, R: DeserializeOwned>(&self, msg: &Q) -> Result<R> {
        let query_data = serde_json::to_vec(msg)?;
        let mut client = WasmQueryClient::new(self.channel.clone());
        let response = client
            .smart_contract_state(QuerySmartContractStateRequest {
                address: self.contract_address.to_string(),
                query_data,
            })
            .await?
            .into_inner();
        Ok(serde_json::from_slice(&response.data)?)
    }

    pub async fn config(&self) -> Result<ConfigResponse> {
        self.query_smart(&QueryMsg::Config {}).await
    }

    pub async fn ownership(&self) -> Result<OwnershipResponse> {
        self.query_smart(&QueryMsg::Ownership {}).await
    }

    pub async fn xrpl_tokens(&self, offset: Option<u64>, limit: Option<u32>) -> Result<XrplTokensResponse> {
        self.query_smart(&QueryMsg::XRPLTokens { offset, limit }).await
    }

    pub async fn xrpl_token(&self, issuer: &str, currency: &str) -> Result<XrplTokenResponse> {
        self.query_smart(&QueryMsg::XRPLToken { issuer: issuer.to_string(), currency: currency.to_string() }).await
    }

    pub async fn coreum_tokens(&self, offset: Option<u64>, limit: Option<u32>) -> Result<CoreumTokensResponse> {
        self.query_smart(&QueryMsg::CoreumTokens { offset, limit }).await
    }

    pub async fn coreum_token(&self, denom: &str) -> Result<CoreumTokenResponse> {
        self.query_smart(&QueryMsg::CoreumToken { denom: denom.to_string() }).await
    }

    pub async fn available_tickets(&self) -> Result<AvailableTicketsResponse> {
        self.query_smart(&QueryMsg::AvailableTickets {}).await
    }

    /// Loop B's entry point: the set of operations awaiting signatures
    /// or broadcast.
    pub async fn pending_operations(&self) -> Result<PendingOperationsResponse> {
        self.query_smart(&QueryMsg::PendingOperations {}).await
    }

    pub async fn pending_refunds(&self, address: &str) -> Result<PendingRefundsResponse> {
        self.query_smart(&QueryMsg::PendingRefunds { address: address.to_string() }).await
    }

    pub async fn fees_collected(&self) -> Result<FeesCollectedResponse> {
        self.query_smart(&QueryMsg::FeesCollected {}).await
    }

    pub async fn processed_tx(&self, hash: &str) -> Result<ProcessedTxResponse> {
        self.query_smart(&QueryMsg::ProcessedTx { hash: hash.to_string() }).await
    }

    pub async fn prohibited_xrpl_recipients(&self) -> Result<ProhibitedXRPLRecipientsResponse> {
        self.query_smart(&QueryMsg::ProhibitedXRPLRecipients {}).await
    }

    // -------------------------------------------------------------- execute

    pub async fn save_evidence(&self, evidence: Evidence) -> Result<TxOutcome> {
        self.execute(ExecuteMsg::SaveEvidence { evidence }, vec![]).await
    }

    pub async fn save_signature(&self, operation_id: u64, operation_version: u64, signature: String) -> Result<TxOutcome> {
        self.execute(ExecuteMsg::SaveSignature { operation_id, operation_version, signature }, vec![]).await
    }

    pub async fn send_to_xrpl(&self, recipient: String, deliver_amount: Option<String>, funds: Vec<Coin>) -> Result<TxOutcome> {
        self.execute(ExecuteMsg::SendToXRPL { recipient, deliver_amount }, funds).await
    }

    pub async fn claim_refund(&self, pending_refund_id: u64) -> Result<TxOutcome> {
        self.execute(ExecuteMsg::ClaimRefund { pending_refund_id }, vec![]).await
    }

    pub async fn claim_relayer_fees(&self) -> Result<TxOutcome> {
        self.execute(ExecuteMsg::ClaimRelayerFees {}, vec![]).await
    }

    pub async fn recover_tickets(&self, account_sequence: u64, number_of_tickets: Option<u32>) -> Result<TxOutcome> {
        self.execute(ExecuteMsg::RecoverTickets { account_sequence, number_of_tickets }, vec![]).await
    }

    pub async fn recover_xrpl_token_registration(&self, issuer: String, currency: String) -> Result<TxOutcome> {
        self.execute(ExecuteMsg::RecoverXRPLTokenRegistration { issuer, currency }, vec![]).await
    }

    pub async fn halt_bridge(&self) -> Result<TxOutcome> {
        self.execute(ExecuteMsg::HaltBridge {}, vec![]).await
    }

    pub async fn resume_bridge(&self) -> Result<TxOutcome> {
        self.execute(ExecuteMsg::ResumeBridge {}, vec![]).await
    }

    pub async fn rotate_keys(&self, new_relayers: Vec<Relayer>, new_evidence_threshold: u32) -> Result<TxOutcome> {
        self.execute(ExecuteMsg::RotateKeys { new_relayers, new_evidence_threshold }, vec![]).await
    }

    pub async fn register_coreum_token(
        &self,
        denom: String,
        decimals: u32,
        sending_precision: i32,
        max_holding_amount: String,
        bridging_fee: String,
    ) -> Result<TxOutcome> {
        self.execute(
            ExecuteMsg::RegisterCoreumToken { denom, decimals, sending_precision, max_holding_amount, bridging_fee },
            vec![],
        )
        .await
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn register_xrpl_token(
        &self,
        issuer: Option<String>,
        currency: Option<String>,
        sending_precision: i32,
        max_holding_amount: String,
        bridging_fee: String,
        transfer_rate: Option<String>,
        issue_fee: Vec<Coin>,
    ) -> Result<TxOutcome> {
        self.execute(
            ExecuteMsg::RegisterXRPLToken { issuer, currency, sending_precision, max_holding_amount, bridging_fee, transfer_rate },
            issue_fee,
        )
        .await
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn update_xrpl_token(
        &self,
        issuer: String,
        currency: String,
        state: Option<TokenState>,
        sending_precision: Option<i32>,
        bridging_fee: Option<String>,
        max_holding_amount: Option<String>,
        transfer_rate: Option<String>,
    ) -> Result<TxOutcome> {
        self.execute(
            ExecuteMsg::UpdateXRPLToken { issuer, currency, state, sending_precision, bridging_fee, max_holding_amount, transfer_rate },
            vec![],
        )
        .await
    }

    pub async fn update_coreum_token(
        &self,
        denom: String,
        state: Option<TokenState>,
        sending_precision: Option<i32>,
        bridging_fee: Option<String>,
        max_holding_amount: Option<String>,
    ) -> Result<TxOutcome> {
        self.execute(
            ExecuteMsg::UpdateCoreumToken { denom, state, sending_precision, bridging_fee, max_holding_amount },
            vec![],
        )
        .await
    }

    pub async fn update_prohibited_xrpl_recipients(&self, prohibited_xrpl_recipients: Vec<String>) -> Result<TxOutcome> {
        self.execute(ExecuteMsg::UpdateProhibitedXRPLRecipients { prohibited_xrpl_recipients }, vec![]).await
    }

    pub async fn update_xrpl_base_fee(&self, xrpl_base_fee: u64) -> Result<TxOutcome> {
        self.execute(ExecuteMsg::UpdateXRPLBaseFee { xrpl_base_fee }, vec![]).await
    }

    pub async fn cancel_pending_operation(&self, operation_id: u64) -> Result<TxOutcome> {
        self.execute(ExecuteMsg::CancelPendingOperation { operation_id }, vec![]).await
    }

    pub async fn transfer_ownership(&self, new_owner: String, expiry: Option<u64>) -> Result<TxOutcome> {
        self.execute(ExecuteMsg::UpdateOwnership(OwnershipAction::TransferOwnership { new_owner, expiry }), vec![]).await
    }

    pub async fn accept_ownership(&self) -> Result<TxOutcome> {
        self.execute(ExecuteMsg::UpdateOwnership(OwnershipAction::AcceptOwnership), vec![]).await
    }

    // --------------------------------------------------------- tx plumbing

    async fn account_info(&self) -> Result<(u64, u64)> {
        let mut client = AuthQueryClient::new(self.channel.clone());
        let response = client
            .account(QueryAccountRequest { address: self.signer.account_id().to_string() })
            .await?
            .into_inner();
        let any = response.account.ok_or_else(|| ContractClientError::TxBuild("account not found".into()))?;
        let base: BaseAccount = prost::Message::decode(any.value.as_slice())
            .map_err(|e| ContractClientError::TxBuild(format!("decoding BaseAccount: {e}")))?;
        Ok((base.account_number, base.sequence))
    }

    fn build_msg(&self, msg: &ExecuteMsg, funds: Vec<Coin>) -> Result<MsgExecuteContract> {
        let funds = funds
            .into_iter()
            .map(|c| {
                Ok(CosmrsCoin { denom: Denom::from_str(&c.denom).map_err(|e| ContractClientError::TxBuild(e.to_string()))?, amount: c.amount.parse().map_err(|_| ContractClientError::TxBuild("invalid coin amount".into()))? })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(MsgExecuteContract {
            sender: self.signer.account_id(),
            contract: self.contract_address.clone(),
            msg: serde_json::to_vec(msg)?,
            funds,
        })
    }

    fn sign(&self, body: &tx::Body, account_number: u64, sequence: u64, fee: Fee) -> Result<Vec<u8>> {
        let signer_info = SignerInfo::single_direct(Some(self.signer.public_key()), sequence);
        let auth_info = signer_info.auth_info(fee);
        let chain_id = self.config.chain_id.parse().map_err(|e: cosmrs::ErrorReport| ContractClientError::TxBuild(e.to_string()))?;
        let sign_doc = SignDoc::new(body, &auth_info, &chain_id, account_number).map_err(|e| ContractClientError::TxBuild(e.to_string()))?;
        let signature = self.signer.sign(&sign_doc.clone().into_bytes().map_err(|e| ContractClientError::TxBuild(e.to_string()))?)?;

        let tx_raw = cosmrs::tx::Raw {
            body_bytes: sign_doc.body_bytes,
            auth_info_bytes: sign_doc.auth_info_bytes,
            signatures: vec![signature],
        };
        tx_raw.to_bytes().map_err(|e| ContractClientError::TxBuild(e.to_string()))
    }

    async fn execute(&self, msg: ExecuteMsg, funds: Vec<Coin>) -> Result<TxOutcome> {
        let proto_msg = self.build_msg(&msg, funds)?;
        self.submit_msgs(vec![proto_msg.to_any().map_err(|e| ContractClientError::TxBuild(e.to_string()))?]).await
    }

    /// Gas policy: simulate with a throwaway fee, scale the reported
    /// gas by `gas_adjustment`, price it at `gas_price * gas_price_adjustment`,
    /// sign for real and broadcast; retries the whole cycle on `OutOfGas`.
    ///
    /// Public so the CLI's `contract deploy|instantiate|migrate` commands can
    /// submit `MsgStoreCode`/`MsgInstantiateContract2`/`MsgMigrateContract`
    /// through the same gas and signing plumbing as `ExecuteMsg` commands.
    pub async fn submit_msgs(&self, messages: Vec<cosmrs::Any>) -> Result<TxOutcome> {
        let body = tx::Body::new(messages, "", 0u16);

        let mut attempt = 0;
        loop {
            let (account_number, sequence) = self.account_info().await?;
            let gas_used = self.simulate(&body, account_number, sequence).await?;
            let gas_limit = ((gas_used as f64) * self.config.gas_adjustment).ceil() as u64;
            let gas_price = 0.0625_f64 * self.config.gas_price_adjustment;
            let fee_amount = (gas_limit as f64 * gas_price).ceil() as u128;
            let fee = Fee::from_amount_and_gas(
                CosmrsCoin {
                    denom: self.config.gas_price_denom.parse().map_err(|_| ContractClientError::TxBuild("invalid gas denom".into()))?,
                    amount: fee_amount,
                },
                gas_limit,
            );

            let tx_bytes = self.sign(&body, account_number, sequence, fee)?;

            match self.broadcast(tx_bytes).await {
                Ok(outcome) => return Ok(outcome),
                Err(ContractClientError::OutOfGas) if attempt < self.config.out_of_gas_retry_attempts => {
                    attempt += 1;
                    tracing::warn!(attempt, "out of gas, retrying with a fresh simulation");
                    tokio::time::sleep(self.config.out_of_gas_retry_delay).await;
                    continue;
                }
                Err(err) => return Err(err),
            }
        }
    }

    async fn simulate(&self, body: &tx::Body, account_number: u64, sequence: u64) -> Result<u64> {
        // A throwaway 1-gas fee: simulation in cosmos-sdk does not validate
        // the signature, only decodes the tx, so any syntactically valid
        // signature works here.
        let placeholder_fee = Fee::from_amount_and_gas(
            CosmrsCoin { denom: self.config.gas_price_denom.parse().map_err(|_| ContractClientError::TxBuild("invalid gas denom".into()))?, amount: 0u8.into() },
            2_000_000u64,
        );
        let tx_bytes = self.sign(body, account_number, sequence, placeholder_fee)?;

        let mut client = TxServiceClient::new(self.channel.clone());
        let response = client
            .simulate(SimulateRequest { tx_bytes, tx: None })
            .await
            .map_err(|status| {
                if status.message().contains("out of gas") {
                    ContractClientError::OutOfGas
                } else {
                    ContractClientError::SimulationFailed(status.message().to_string())
                }
            })?
            .into_inner();
        let gas_info = response.gas_info.ok_or_else(|| ContractClientError::SimulationFailed("missing gas_info".into()))?;
        Ok(gas_info.gas_used)
    }

    async fn broadcast(&self, tx_bytes: Vec<u8>) -> Result<TxOutcome> {
        let mut client = TxServiceClient::new(self.channel.clone());
        let response = client
            .broadcast_tx(BroadcastTxRequest { tx_bytes, mode: BroadcastMode::Sync as i32 })
            .await?
            .into_inner();
        let tx_response = response.tx_response.ok_or_else(|| ContractClientError::TxBuild("missing tx_response".into()))?;

        if tx_response.code != 0 {
            return Err(classify_broadcast_error(tx_response.code, tx_response.raw_log));
        }

        self.await_confirmation(tx_response.txhash).await
    }

    /// Polls `GetTx` until the transaction lands in a block (~100ms
    /// poll interval, bounded by `tx_timeout`).
    async fn await_confirmation(&self, tx_hash: String) -> Result<TxOutcome> {
        let deadline = Instant::now() + self.config.tx_timeout;
        let mut client = TxServiceClient::new(self.channel.clone());
        loop {
            match client.get_tx(GetTxRequest { hash: tx_hash.clone() }).await {
                Ok(response) => {
                    let inner = response.into_inner();
                    if let Some(tx_response) = inner.tx_response {
                        if tx_response.code != 0 {
                            return Err(classify_broadcast_error(tx_response.code, tx_response.raw_log));
                        }
                        return Ok(TxOutcome { tx_hash, height: tx_response.height, gas_used: tx_response.gas_used });
                    }
                }
                Err(status) if status.code() == tonic::Code::NotFound => {}
                Err(status) => return Err(status.into()),
            }

            if Instant::now() >= deadline {
                return Err(ContractClientError::TxBuild(format!("tx {tx_hash} not confirmed within timeout")));
            }
            tokio::time::sleep(self.config.tx_status_poll_interval).await;
        }
    }
}

fn classify_broadcast_error(code: u32, raw_log: String) -> ContractClientError {
    let classified = classify_raw_log(&raw_log);
    if matches!(classified, ContractClientError::Other(_)) {
        ContractClientError::BroadcastRejected { code, raw_log }
    } else {
        classified
    }
}
