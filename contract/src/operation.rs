use coreum_wasm_sdk::{
    core::CoreumMsg,
    types::{coreum::asset::ft::v1::MsgBurn, cosmos::base::v1beta1::Coin as FtCoin},
};
use cosmwasm_schema::cw_serde;
use cosmwasm_std::{coin, Addr, Coin, CosmosMsg, Response, Storage, Uint128};

use crate::{
    contract::{convert_amount_decimals, XRPL_TOKENS_DECIMALS},
    error::ContractError,
    evidence::{OperationResult, TransactionResult},
    relayer::{handle_rotate_keys_confirmation, Relayer},
    signatures::Signature,
    state::{
        BridgeState, Config, PendingRefund, TokenState, COREUM_TOKENS, NET_BRIDGED_IN,
        PENDING_OPERATIONS, PENDING_REFUNDS, PENDING_ROTATE_KEYS, XRPL_CURRENCIES, XRPL_TOKENS,
    },
    tickets::return_ticket,
    token::{build_xrpl_token_key, is_token_xrp},
};

#[cw_serde]
pub struct Operation {
    /// ticket_sequence if set, else account_sequence. Identifies the pending
    /// operation and doubles as its XRPL storage slot.
    pub id: u64,
    /// Bumped by one whenever xrpl_base_fee changes while this operation is
    /// pending, so stale relayer signatures are rejected rather than replayed
    /// against a transaction whose fee no longer matches.
    pub version: u64,
    pub ticket_sequence: Option<u64>,
    pub account_sequence: Option<u64>,
    pub signatures: Vec<Signature>,
    pub operation_type: OperationType,
    pub xrpl_base_fee: u64,
}

#[cw_serde]
pub enum OperationType {
    AllocateTickets {
        number: u32,
    },
    TrustSet {
        issuer: String,
        currency: String,
        trust_set_limit_amount: Uint128,
    },
    RotateKeys {
        new_relayers: Vec<Relayer>,
        new_evidence_threshold: u32,
    },
    #[serde(rename = "coreum_to_xrpl_transfer")]
    CoreumToXRPLTransfer {
        issuer: String,
        currency: String,
        amount: Uint128,
        max_amount: Option<Uint128>,
        sender: Addr,
        recipient: String,
    },
}

impl OperationType {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::AllocateTickets { .. } => "allocate_tickets",
            Self::TrustSet { .. } => "trust_set",
            Self::RotateKeys { .. } => "rotate_keys",
            Self::CoreumToXRPLTransfer { .. } => "coreum_to_xrpl_transfer",
        }
    }
}

pub fn check_operation_exists(
    storage: &dyn Storage,
    operation_id: u64,
) -> Result<Operation, ContractError> {
    PENDING_OPERATIONS
        .load(storage, operation_id)
        .map_err(|_| ContractError::PendingOperationNotFound {})
}

pub fn create_pending_operation(
    storage: &mut dyn Storage,
    config: &Config,
    ticket_sequence: Option<u64>,
    account_sequence: Option<u64>,
    operation_type: OperationType,
) -> Result<u64, ContractError> {
    check_valid_operation_if_halt(storage, config, &operation_type)?;

    let operation_id = ticket_sequence.unwrap_or_else(|| account_sequence.unwrap());

    if PENDING_OPERATIONS.has(storage, operation_id) {
        return Err(ContractError::PendingOperationAlreadyExists {});
    }

    let operation = Operation {
        id: operation_id,
        version: 1,
        ticket_sequence,
        account_sequence,
        signatures: vec![],
        operation_type,
        xrpl_base_fee: config.xrpl_base_fee,
    };
    PENDING_OPERATIONS.save(storage, operation_id, &operation)?;

    Ok(operation_id)
}

/// Bumps the version of every pending operation so relayers know to discard
/// and re-sign under the new `xrpl_base_fee`.
pub fn bump_pending_operation_versions(storage: &mut dyn Storage) -> Result<(), ContractError> {
    let ids: Vec<u64> = PENDING_OPERATIONS
        .keys(storage, None, None, cosmwasm_std::Order::Ascending)
        .collect::<Result<_, _>>()?;
    for id in ids {
        let mut operation = PENDING_OPERATIONS.load(storage, id)?;
        operation.version += 1;
        operation.signatures.clear();
        PENDING_OPERATIONS.save(storage, id, &operation)?;
    }
    Ok(())
}

#[allow(clippy::too_many_arguments)]
pub fn handle_operation(
    storage: &mut dyn Storage,
    signer: Addr,
    operation: &Operation,
    operation_result: &Option<OperationResult>,
    transaction_result: &TransactionResult,
    tx_hash: &Option<String>,
    operation_id: u64,
    ticket_sequence: Option<u64>,
    response: &mut Response<CoreumMsg>,
) -> Result<(), ContractError> {
    match &operation.operation_type {
        OperationType::AllocateTickets { .. } => match operation_result {
            Some(OperationResult::TicketsAllocation { tickets }) => {
                crate::tickets::handle_ticket_allocation_confirmation(
                    storage,
                    tickets.clone(),
                    transaction_result,
                )?;
            }
            None => return Err(ContractError::InvalidOperationResult {}),
        },
        OperationType::TrustSet {
            issuer, currency, ..
        } => {
            handle_trust_set_confirmation(storage, issuer, currency, transaction_result)?;
        }
        OperationType::RotateKeys {
            new_relayers,
            new_evidence_threshold,
        } => {
            handle_rotate_keys_confirmation(
                storage,
                new_relayers.to_owned(),
                *new_evidence_threshold,
                transaction_result,
            )?;
        }
        OperationType::CoreumToXRPLTransfer { .. } => {
            handle_coreum_to_xrpl_transfer_confirmation(
                storage,
                signer,
                transaction_result,
                tx_hash.clone(),
                operation_id,
                response,
            )?;
        }
    }

    PENDING_OPERATIONS.remove(storage, operation_id);

    // An Invalid result means XRPL never consumed the ticket, so give it back
    // to the pool instead of leaking it.
    if transaction_result.eq(&TransactionResult::Invalid) {
        if let Some(ticket_sequence) = ticket_sequence {
            return_ticket(storage, ticket_sequence)?;
        }
    }

    Ok(())
}

pub fn handle_trust_set_confirmation(
    storage: &mut dyn Storage,
    issuer: &str,
    currency: &str,
    transaction_result: &TransactionResult,
) -> Result<(), ContractError> {
    let key = build_xrpl_token_key(issuer, currency);

    let mut token = XRPL_TOKENS
        .load(storage, key.clone())
        .map_err(|_| ContractError::TokenNotRegistered {})?;

    token.state = if transaction_result.eq(&TransactionResult::Accepted) {
        TokenState::Enabled
    } else {
        TokenState::Inactive
    };

    XRPL_TOKENS.save(storage, key, &token)?;
    Ok(())
}

pub fn handle_coreum_to_xrpl_transfer_confirmation(
    storage: &mut dyn Storage,
    signer: Addr,
    transaction_result: &TransactionResult,
    tx_hash: Option<String>,
    operation_id: u64,
    response: &mut Response<CoreumMsg>,
) -> Result<(), ContractError> {
    let pending_operation = PENDING_OPERATIONS
        .load(storage, operation_id)
        .map_err(|_| ContractError::PendingOperationNotFound {})?;

    match pending_operation.operation_type {
        OperationType::CoreumToXRPLTransfer {
            issuer,
            currency,
            amount,
            max_amount,
            sender,
            ..
        } => {
            let key = build_xrpl_token_key(&issuer, &currency);
            match XRPL_TOKENS.may_load(storage, key.clone())? {
                Some(xrpl_token) => {
                    // The token being sent back is XRPL-originated: the amount
                    // we minted on the way in must be burned (or refunded) on
                    // the way back, never kept on the Coreum side.
                    let amount_sent = max_amount.unwrap_or(amount);
                    if transaction_result.eq(&TransactionResult::Accepted) {
                        let burn_msg = CosmosMsg::Any(
                            MsgBurn {
                                sender: signer.to_string(),
                                coin: Some(FtCoin {
                                    amount: amount_sent.to_string(),
                                    denom: xrpl_token.coreum_denom,
                                }),
                            }
                            .to_any(),
                        );
                        *response = response.to_owned().add_message(burn_msg);
                    } else {
                        // The transfer never reached XRPL, so the amount
                        // `send_to_xrpl` optimistically debited from
                        // NET_BRIDGED_IN never actually left Coreum; credit
                        // it back before refunding the sender.
                        if !is_token_xrp(&issuer, &currency) {
                            let net = NET_BRIDGED_IN.may_load(storage, key.clone())?.unwrap_or(0);
                            NET_BRIDGED_IN.save(storage, key, &net.saturating_add(amount_sent.u128() as i128))?;
                        }
                        store_pending_refund(
                            storage,
                            operation_id,
                            tx_hash,
                            sender,
                            coin(amount_sent.u128(), xrpl_token.coreum_denom),
                        )?;
                    }
                }
                None => {
                    // The token is Coreum-originated: nothing was minted on
                    // the way out, so a failure only needs a refund, never a
                    // burn.
                    if transaction_result.ne(&TransactionResult::Accepted) {
                        let denom = XRPL_CURRENCIES
                            .load(storage, currency)
                            .map_err(|_| ContractError::TokenNotRegistered {})?;
                        let token = COREUM_TOKENS
                            .load(storage, denom)
                            .map_err(|_| ContractError::TokenNotRegistered {})?;
                        let amount_to_send_back = convert_amount_decimals(
                            XRPL_TOKENS_DECIMALS,
                            token.decimals,
                            max_amount.unwrap_or(amount),
                        )?;
                        store_pending_refund(
                            storage,
                            operation_id,
                            tx_hash,
                            sender,
                            coin(amount_to_send_back.u128(), token.denom),
                        )?;
                    }
                }
            }
        }
        _ => return Err(ContractError::InvalidOperationResult {}),
    }

    Ok(())
}

pub fn store_pending_refund(
    storage: &mut dyn Storage,
    operation_id: u64,
    xrpl_tx_hash: Option<String>,
    receiver: Addr,
    coin: Coin,
) -> Result<(), ContractError> {
    let pending_refund = PendingRefund { xrpl_tx_hash, coin };
    PENDING_REFUNDS.save(storage, (receiver, operation_id), &pending_refund)?;
    Ok(())
}

pub fn remove_pending_refund(
    storage: &mut dyn Storage,
    sender: &Addr,
    operation_id: u64,
) -> Result<Coin, ContractError> {
    let pending_refund = PENDING_REFUNDS
        .load(storage, (sender.clone(), operation_id))
        .map_err(|_| ContractError::PendingRefundNotFound {})?;

    PENDING_REFUNDS.remove(storage, (sender.clone(), operation_id));

    Ok(pending_refund.coin)
}

/// While halted, only ticket allocation and an already-pending key rotation
/// may create or progress operations; everything else is rejected.
pub fn check_valid_operation_if_halt(
    storage: &dyn Storage,
    config: &Config,
    operation_type: &OperationType,
) -> Result<(), ContractError> {
    if config.bridge_state.eq(&BridgeState::Halted) {
        match operation_type {
            OperationType::RotateKeys { .. } => {
                if !PENDING_ROTATE_KEYS.load(storage)? {
                    return Err(ContractError::BridgeHalted {});
                }
            }
            OperationType::AllocateTickets { .. } => (),
            _ => return Err(ContractError::BridgeHalted {}),
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{BridgeState, Config};
    use cosmwasm_std::testing::mock_dependencies;

    fn config() -> Config {
        Config {
            relayers: vec![],
            evidence_threshold: 1,
            used_ticket_sequence_threshold: 150,
            trust_set_limit_amount: Uint128::new(1),
            bridge_xrpl_address: "rBridge".to_string(),
            xrpl_base_fee: 10,
            bridge_state: BridgeState::Active,
        }
    }

    #[test]
    fn duplicate_operation_id_is_rejected() {
        let mut deps = mock_dependencies();
        let config = config();
        create_pending_operation(
            deps.as_mut().storage,
            &config,
            Some(1),
            None,
            OperationType::AllocateTickets { number: 5 },
        )
        .unwrap();

        let err = create_pending_operation(
            deps.as_mut().storage,
            &config,
            Some(1),
            None,
            OperationType::AllocateTickets { number: 5 },
        )
        .unwrap_err();
        assert!(matches!(err, ContractError::PendingOperationAlreadyExists {}));
    }

    #[test]
    fn halted_bridge_rejects_transfer_but_allows_ticket_allocation() {
        let mut config = config();
        config.bridge_state = BridgeState::Halted;
        let deps = mock_dependencies();

        assert!(check_valid_operation_if_halt(
            &deps.storage,
            &config,
            &OperationType::AllocateTickets { number: 1 }
        )
        .is_ok());

        let err = check_valid_operation_if_halt(
            &deps.storage,
            &config,
            &OperationType::TrustSet {
                issuer: "rIssuer".to_string(),
                currency: "USD".to_string(),
                trust_set_limit_amount: Uint128::new(1),
            },
        )
        .unwrap_err();
        assert!(matches!(err, ContractError::BridgeHalted {}));
    }

    #[test]
    fn pending_refund_round_trips() {
        let mut deps = mock_dependencies();
        let receiver = Addr::unchecked("receiver");
        store_pending_refund(
            deps.as_mut().storage,
            7,
            Some("HASH".to_string()),
            receiver.clone(),
            coin(100, "ucore"),
        )
        .unwrap();

        let refunded = remove_pending_refund(deps.as_mut().storage, &receiver, 7).unwrap();
        assert_eq!(refunded, coin(100, "ucore"));

        let err = remove_pending_refund(deps.as_mut().storage, &receiver, 7).unwrap_err();
        assert!(matches!(err, ContractError::PendingRefundNotFound {}));
    }
}
