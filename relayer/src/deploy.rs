//! Backs the `contract deploy|instantiate|migrate` and `bootstrap-bridge`
//! CLI commands: these send raw `cosmwasm.wasm.v1` messages rather than the
//! bridge's own `ExecuteMsg`, so they go through
//! [`contract_client::ContractClient::submit_msgs`] directly instead of the
//! typed `ExecuteMsg` wrappers.

use cosmrs::proto::cosmwasm::wasm::v1::{MsgInstantiateContract2, MsgMigrateContract, MsgStoreCode};
use cosmrs::AccountId;
use cosmrs::Any;
use contract_client::{ContractClient, CoreumSigner, Result as ContractResult, TxOutcome};
use prost::Message;

fn any_of(type_url: &str, message: &impl Message) -> Any {
    Any { type_url: type_url.to_string(), value: message.encode_to_vec() }
}

/// Uploads `wasm_bytes` and returns the broadcast outcome; the resulting
/// code id is read back from the tx's ABCI events by the caller (the CLI
/// command surfaces the full `TxOutcome` when `--output json` is set).
pub async fn store_code<S: CoreumSigner>(client: &ContractClient<S>, sender: AccountId, wasm_bytes: Vec<u8>) -> ContractResult<TxOutcome> {
    let msg = MsgStoreCode { sender: sender.to_string(), wasm_byte_code: wasm_bytes, instantiate_permission: None };
    client.submit_msgs(vec![any_of("/cosmwasm.wasm.v1.MsgStoreCode", &msg)]).await
}

#[allow(clippy::too_many_arguments)]
pub async fn instantiate2<S: CoreumSigner>(
    client: &ContractClient<S>,
    sender: AccountId,
    admin: AccountId,
    code_id: u64,
    label: String,
    init_msg: Vec<u8>,
    salt: Vec<u8>,
) -> ContractResult<TxOutcome> {
    let msg = MsgInstantiateContract2 {
        sender: sender.to_string(),
        admin: admin.to_string(),
        code_id,
        label,
        msg: init_msg,
        funds: vec![],
        salt,
        fix_msg: false,
    };
    client.submit_msgs(vec![any_of("/cosmwasm.wasm.v1.MsgInstantiateContract2", &msg)]).await
}

pub async fn migrate<S: CoreumSigner>(
    client: &ContractClient<S>,
    sender: AccountId,
    contract: AccountId,
    code_id: u64,
    migrate_msg: Vec<u8>,
) -> ContractResult<TxOutcome> {
    let msg = MsgMigrateContract { sender: sender.to_string(), contract: contract.to_string(), code_id, msg: migrate_msg };
    client.submit_msgs(vec![any_of("/cosmwasm.wasm.v1.MsgMigrateContract", &msg)]).await
}
