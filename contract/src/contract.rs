use crate::{
    address::validate_xrpl_address,
    error::ContractError,
    evidence::{handle_evidence, Evidence, TransactionResult},
    fees::{amount_after_bridge_fees, amount_after_transfer_fees, claim_fees_for_relayers, handle_fee_collection},
    msg::{
        AvailableTicketsResponse, ConfigResponse, CoreumTokenResponse, CoreumTokensResponse,
        ExecuteMsg, FeesCollectedResponse, InstantiateMsg, PendingOperationsResponse,
        PendingRefundResponse, PendingRefundsResponse, ProcessedTxResponse,
        ProhibitedXRPLRecipientsResponse, QueryMsg, XRPLTokenResponse, XRPLTokensResponse,
    },
    operation::{
        check_operation_exists, create_pending_operation, handle_operation, remove_pending_refund,
        store_pending_refund, OperationType,
    },
    relayer::{assert_relayer, validate_relayers},
    signatures::add_signature,
    state::{
        BridgeState, Config, CoreumToken, TokenState, XRPLToken, AVAILABLE_TICKETS, CONFIG,
        COREUM_DENOMS, COREUM_TOKENS, FEES_COLLECTED, NET_BRIDGED_IN, PENDING_OPERATIONS,
        PENDING_REFUNDS, PENDING_ROTATE_KEYS, PENDING_TICKET_UPDATE, PROHIBITED_XRPL_RECIPIENTS,
        USED_TICKETS_COUNTER, XRPL_CURRENCIES, XRPL_TOKENS, XRPL_TOKENS_BY_DENOM,
    },
    tickets::{allocate_ticket, recover_tickets, register_used_ticket, MAX_TICKETS_TO_ALLOCATE},
    token::{
        build_xrpl_token_key, derive_xrpl_currency_for_coreum_token, is_token_xrp,
        set_token_bridging_fee, set_token_max_holding_amount, set_token_sending_precision,
        set_token_state, set_token_transfer_rate,
    },
};
use coreum_wasm_sdk::{
    assetft::{self, Msg::Issue, ParamsResponse, Query, BURNING, IBC, MINTING},
    core::{CoreumMsg, CoreumQueries, CoreumResult},
};
use cosmwasm_std::{
    coin, coins, entry_point, to_binary, Addr, BankMsg, Binary, CosmosMsg, Deps, DepsMut, Empty,
    Env, MessageInfo, Order, Response, StdResult, Uint128,
};
use cw2::set_contract_version;
use cw_ownable::{assert_owner, get_ownership, initialize_owner};
use cw_utils::one_coin;
use xrpl_amount::{
    check_max_holding_amount, decimal_to_home_amount, home_amount_to_decimal, truncate_amount,
    validate_significant_digits, MAX_SENDING_PRECISION, MIN_SENDING_PRECISION,
    XRPL_ISSUED_TOKEN_DECIMALS, XRPL_NATIVE_TOKEN_DECIMALS,
};

const CONTRACT_NAME: &str = env!("CARGO_PKG_NAME");
const CONTRACT_VERSION: &str = env!("CARGO_PKG_VERSION");

pub const MAX_RELAYERS: u32 = 32;
const DEFAULT_MAX_LIMIT: u32 = 250;

const XRP_SYMBOL: &str = "XRP";
const XRP_SUBUNIT: &str = "drop";
/// Sentinel issuer/currency identifying the native XRP entry in `XRPL_TOKENS`
/// (native XRP has no issuer and its "currency code" is the literal symbol).
pub const XRP_ISSUER: &str = "";
pub const XRP_CURRENCY: &str = XRP_SYMBOL;

const XRPL_DENOM_PREFIX: &str = "xrpl";
/// Precision every non-native asset-ft denom is issued with on Coreum, so
/// amounts can move between the two ledgers without a decimals conversion.
pub const XRPL_TOKENS_DECIMALS: u32 = XRPL_ISSUED_TOKEN_DECIMALS;

/// A `TransferRate` of 1_000_000_000 (1.0) means the issuer charges no fee;
/// see `fees::amount_after_transfer_fees`.
pub const XRPL_MIN_TRANSFER_RATE: u128 = 1_000_000_000;

const MAX_COREUM_TOKEN_DECIMALS: u32 = 20;

/// Well-known XRPL placeholder accounts that must never receive bridged
/// funds, seeded into `PROHIBITED_XRPL_RECIPIENTS` at instantiation alongside
/// the bridge's own account.
pub const INITIAL_PROHIBITED_XRPL_RECIPIENTS: [&str; 2] = [
    "rrrrrrrrrrrrrrrrrrrrrhoLvTp", // ACCOUNT_ZERO
    "rrrrrrrrrrrrrrrrrrrrBZbvji",  // ACCOUNT_ONE
];

#[cfg_attr(not(feature = "library"), entry_point)]
pub fn instantiate(
    deps: DepsMut<CoreumQueries>,
    env: Env,
    info: MessageInfo,
    msg: InstantiateMsg,
) -> CoreumResult<ContractError> {
    set_contract_version(deps.storage, CONTRACT_NAME, CONTRACT_VERSION)?;
    initialize_owner(
        deps.storage,
        deps.api,
        Some(deps.api.addr_validate(msg.owner.as_ref())?.as_ref()),
    )?;

    validate_relayers(&deps, &msg.relayers)?;
    if msg.evidence_threshold == 0 || msg.evidence_threshold > msg.relayers.len() as u32 {
        return Err(ContractError::InvalidThreshold {});
    }
    if msg.used_ticket_sequence_threshold < 2 {
        return Err(ContractError::InvalidUsedTicketSequenceThreshold {});
    }
    validate_xrpl_address(msg.bridge_xrpl_address.clone())?;

    let config = Config {
        relayers: msg.relayers,
        evidence_threshold: msg.evidence_threshold,
        used_ticket_sequence_threshold: msg.used_ticket_sequence_threshold,
        trust_set_limit_amount: msg.trust_set_limit_amount,
        bridge_xrpl_address: msg.bridge_xrpl_address.clone(),
        xrpl_base_fee: msg.xrpl_base_fee,
        bridge_state: BridgeState::Active,
    };
    CONFIG.save(deps.storage, &config)?;

    AVAILABLE_TICKETS.save(deps.storage, &std::collections::VecDeque::new())?;
    USED_TICKETS_COUNTER.save(deps.storage, &0)?;
    PENDING_TICKET_UPDATE.save(deps.storage, &false)?;
    PENDING_ROTATE_KEYS.save(deps.storage, &false)?;

    for address in INITIAL_PROHIBITED_XRPL_RECIPIENTS {
        PROHIBITED_XRPL_RECIPIENTS.save(deps.storage, address.to_string(), &Empty {})?;
    }
    PROHIBITED_XRPL_RECIPIENTS.save(deps.storage, msg.bridge_xrpl_address, &Empty {})?;

    // The bridge mints its own Coreum-side representation of native XRP, the
    // same way it will for every XRPL-issued token registered afterwards.
    let xrp_issue_msg = CosmosMsg::from(CoreumMsg::AssetFT(Issue {
        symbol: XRP_SYMBOL.to_string(),
        subunit: XRP_SUBUNIT.to_string(),
        precision: XRPL_NATIVE_TOKEN_DECIMALS,
        initial_amount: Uint128::zero(),
        description: None,
        features: Some(vec![MINTING, BURNING, IBC]),
        burn_rate: Some("0.0".to_string()),
        send_commission_rate: Some("0.0".to_string()),
    }));
    let xrp_denom = format!("{}-{}", XRP_SUBUNIT, env.contract.address).to_lowercase();

    XRPL_TOKENS.save(
        deps.storage,
        build_xrpl_token_key(XRP_ISSUER, XRP_CURRENCY),
        &XRPLToken {
            issuer: None,
            currency: None,
            coreum_denom: xrp_denom.clone(),
            sending_precision: XRPL_NATIVE_TOKEN_DECIMALS as i32,
            max_holding_amount: Uint128::MAX,
            bridging_fee: Uint128::zero(),
            state: TokenState::Enabled,
            transfer_rate: None,
        },
    )?;
    XRPL_TOKENS_BY_DENOM.save(
        deps.storage,
        xrp_denom,
        &build_xrpl_token_key(XRP_ISSUER, XRP_CURRENCY),
    )?;

    Ok(Response::new()
        .add_attribute("action", "instantiate")
        .add_attribute("contract_name", CONTRACT_NAME)
        .add_attribute("contract_version", CONTRACT_VERSION)
        .add_attribute("owner", info.sender)
        .add_message(xrp_issue_msg))
}

#[cfg_attr(not(feature = "library"), entry_point)]
pub fn execute(
    deps: DepsMut<CoreumQueries>,
    env: Env,
    info: MessageInfo,
    msg: ExecuteMsg,
) -> CoreumResult<ContractError> {
    match msg {
        ExecuteMsg::UpdateOwnership(action) => {
            let ownership = cw_ownable::update_ownership(deps.into_empty(), &env.block, &info.sender, action)?;
            Ok(Response::new().add_attributes(ownership.into_attributes()))
        }
        ExecuteMsg::RegisterCoreumToken {
            denom,
            decimals,
            sending_precision,
            max_holding_amount,
            bridging_fee,
        } => register_coreum_token(
            deps.into_empty(),
            info,
            denom,
            decimals,
            sending_precision,
            max_holding_amount,
            bridging_fee,
        ),
        ExecuteMsg::RegisterXRPLToken {
            issuer,
            currency,
            sending_precision,
            max_holding_amount,
            bridging_fee,
            transfer_rate,
        } => register_xrpl_token(
            deps,
            env,
            info,
            issuer,
            currency,
            sending_precision,
            max_holding_amount,
            bridging_fee,
            transfer_rate,
        ),
        ExecuteMsg::SaveEvidence { evidence } => save_evidence(deps.into_empty(), info.sender, evidence),
        ExecuteMsg::SaveSignature {
            operation_id,
            operation_version,
            signature,
        } => {
            add_signature(deps.into_empty(), operation_id, operation_version, info.sender, signature)?;
            Ok(Response::new()
                .add_attribute("action", "save_signature")
                .add_attribute("operation_id", operation_id.to_string()))
        }
        ExecuteMsg::SendToXRPL {
            recipient,
            deliver_amount,
        } => send_to_xrpl(deps.into_empty(), info, recipient, deliver_amount),
        ExecuteMsg::ClaimRefund { pending_refund_id } => {
            claim_refund(deps.into_empty(), info.sender, pending_refund_id)
        }
        ExecuteMsg::ClaimRelayerFees {} => {
            assert_relayer(deps.as_ref().into_empty(), &info.sender)?;
            Ok(claim_fees_for_relayers(deps.storage)?.add_attribute("action", "claim_relayer_fees"))
        }
        ExecuteMsg::RecoverTickets {
            account_sequence,
            number_of_tickets,
        } => {
            assert_owner(deps.storage, &info.sender)?;
            let config = CONFIG.load(deps.storage)?;
            let operation_id = recover_tickets(
                deps.storage,
                &config,
                account_sequence,
                number_of_tickets.unwrap_or(MAX_TICKETS_TO_ALLOCATE),
            )?;
            Ok(Response::new()
                .add_attribute("action", "recover_tickets")
                .add_attribute("operation_id", operation_id.to_string()))
        }
        ExecuteMsg::RecoverXRPLTokenRegistration { issuer, currency } => {
            recover_xrpl_token_registration(deps.into_empty(), info, issuer, currency)
        }
        ExecuteMsg::HaltBridge {} => {
            assert_owner(deps.storage, &info.sender)?;
            let mut config = CONFIG.load(deps.storage)?;
            config.bridge_state = BridgeState::Halted;
            CONFIG.save(deps.storage, &config)?;
            Ok(Response::new().add_attribute("action", "halt_bridge"))
        }
        ExecuteMsg::ResumeBridge {} => {
            assert_owner(deps.storage, &info.sender)?;
            let mut config = CONFIG.load(deps.storage)?;
            config.bridge_state = BridgeState::Active;
            CONFIG.save(deps.storage, &config)?;
            Ok(Response::new().add_attribute("action", "resume_bridge"))
        }
        ExecuteMsg::RotateKeys {
            new_relayers,
            new_evidence_threshold,
        } => rotate_keys(deps, info, new_relayers, new_evidence_threshold),
        ExecuteMsg::UpdateXRPLToken {
            issuer,
            currency,
            state,
            sending_precision,
            bridging_fee,
            max_holding_amount,
            transfer_rate,
        } => update_xrpl_token(
            deps.into_empty(),
            info,
            issuer,
            currency,
            state,
            sending_precision,
            bridging_fee,
            max_holding_amount,
            transfer_rate,
        ),
        ExecuteMsg::UpdateCoreumToken {
            denom,
            state,
            sending_precision,
            bridging_fee,
            max_holding_amount,
        } => update_coreum_token(
            deps.into_empty(),
            info,
            denom,
            state,
            sending_precision,
            bridging_fee,
            max_holding_amount,
        ),
        ExecuteMsg::UpdateProhibitedXRPLRecipients {
            prohibited_xrpl_recipients,
        } => {
            assert_owner(deps.storage, &info.sender)?;
            let keys: Vec<String> = PROHIBITED_XRPL_RECIPIENTS
                .keys(deps.storage, None, None, Order::Ascending)
                .collect::<Result<_, _>>()?;
            for key in keys {
                PROHIBITED_XRPL_RECIPIENTS.remove(deps.storage, key);
            }
            for address in &prohibited_xrpl_recipients {
                PROHIBITED_XRPL_RECIPIENTS.save(deps.storage, address.clone(), &Empty {})?;
            }
            Ok(Response::new().add_attribute("action", "update_prohibited_xrpl_recipients"))
        }
        ExecuteMsg::UpdateXRPLBaseFee { xrpl_base_fee } => {
            assert_owner(deps.storage, &info.sender)?;
            let mut config = CONFIG.load(deps.storage)?;
            config.xrpl_base_fee = xrpl_base_fee;
            CONFIG.save(deps.storage, &config)?;
            crate::operation::bump_pending_operation_versions(deps.storage)?;
            Ok(Response::new()
                .add_attribute("action", "update_xrpl_base_fee")
                .add_attribute("xrpl_base_fee", xrpl_base_fee.to_string()))
        }
        ExecuteMsg::CancelPendingOperation { operation_id } => {
            assert_owner(deps.storage, &info.sender)?;
            let operation = check_operation_exists(deps.storage, operation_id)?;
            PENDING_OPERATIONS.remove(deps.storage, operation_id);
            if let Some(ticket_sequence) = operation.ticket_sequence {
                crate::tickets::return_ticket(deps.storage, ticket_sequence)?;
            }
            if matches!(operation.operation_type, OperationType::AllocateTickets { .. }) {
                PENDING_TICKET_UPDATE.save(deps.storage, &false)?;
            }
            Ok(Response::new()
                .add_attribute("action", "cancel_pending_operation")
                .add_attribute("operation_id", operation_id.to_string()))
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn register_coreum_token(
    deps: DepsMut,
    info: MessageInfo,
    denom: String,
    decimals: u32,
    sending_precision: i32,
    max_holding_amount: Uint128,
    bridging_fee: Uint128,
) -> CoreumResult<ContractError> {
    assert_owner(deps.storage, &info.sender)?;

    if decimals > MAX_COREUM_TOKEN_DECIMALS {
        return Err(ContractError::InvalidSendingPrecision {});
    }
    validate_sending_precision(sending_precision, decimals)?;

    if COREUM_TOKENS.has(deps.storage, denom.clone()) {
        return Err(ContractError::CoreumTokenAlreadyRegistered { denom });
    }

    let mut nonce = 0u64;
    let xrpl_currency = loop {
        let candidate = derive_xrpl_currency_for_coreum_token(&denom, decimals, nonce);
        if !XRPL_CURRENCIES.has(deps.storage, candidate.clone()) {
            break candidate;
        }
        nonce += 1;
        if nonce > 16 {
            return Err(ContractError::RegistrationFailure {});
        }
    };
    XRPL_CURRENCIES.save(deps.storage, xrpl_currency.clone(), &denom)?;

    let token = CoreumToken {
        denom: denom.clone(),
        decimals,
        xrpl_currency: xrpl_currency.clone(),
        sending_precision,
        max_holding_amount,
        bridging_fee,
        state: TokenState::Enabled,
    };
    COREUM_TOKENS.save(deps.storage, denom.clone(), &token)?;

    Ok(Response::new()
        .add_attribute("action", "register_coreum_token")
        .add_attribute("denom", denom)
        .add_attribute("xrpl_currency", xrpl_currency))
}

#[allow(clippy::too_many_arguments)]
fn register_xrpl_token(
    deps: DepsMut<CoreumQueries>,
    env: Env,
    info: MessageInfo,
    issuer: Option<String>,
    currency: Option<String>,
    sending_precision: i32,
    max_holding_amount: Uint128,
    bridging_fee: Uint128,
    transfer_rate: Option<Uint128>,
) -> CoreumResult<ContractError> {
    assert_owner(deps.storage, &info.sender)?;
    check_issue_fee(&deps, &info)?;
    validate_sending_precision(sending_precision, XRPL_TOKENS_DECIMALS)?;

    let (issuer_key, currency_key) = match (&issuer, &currency) {
        (Some(issuer), Some(currency)) => {
            validate_xrpl_address(issuer.clone())?;
            (issuer.clone(), currency.clone())
        }
        (None, None) => (XRP_ISSUER.to_string(), XRP_CURRENCY.to_string()),
        _ => return Err(ContractError::InvalidXRPLCurrency {}),
    };
    let key = build_xrpl_token_key(&issuer_key, &currency_key);
    if XRPL_TOKENS.has(deps.storage, key.clone()) {
        return Err(ContractError::XRPLTokenAlreadyRegistered {
            issuer: issuer_key,
            currency: currency_key,
        });
    }

    let hash = crate::evidence::hash_bytes(
        format!("{issuer_key}{currency_key}{}", env.block.time.nanos()).into_bytes(),
    );
    let symbol_and_subunit = format!("{XRPL_DENOM_PREFIX}{}", &hash[..10]);
    let denom = format!("{symbol_and_subunit}-{}", env.contract.address).to_lowercase();
    if COREUM_DENOMS.has(deps.storage, denom.clone()) {
        return Err(ContractError::RegistrationFailure {});
    }
    COREUM_DENOMS.save(deps.storage, denom.clone(), &Empty {})?;

    let issue_msg = CosmosMsg::from(CoreumMsg::AssetFT(Issue {
        symbol: symbol_and_subunit.to_uppercase(),
        subunit: symbol_and_subunit,
        precision: XRPL_TOKENS_DECIMALS,
        initial_amount: Uint128::zero(),
        description: None,
        features: Some(vec![MINTING, BURNING, IBC]),
        burn_rate: Some("0.0".to_string()),
        send_commission_rate: Some("0.0".to_string()),
    }));

    XRPL_TOKENS.save(
        deps.storage,
        key,
        &XRPLToken {
            issuer: issuer.clone(),
            currency: currency.clone(),
            coreum_denom: denom.clone(),
            sending_precision,
            max_holding_amount,
            bridging_fee,
            state: TokenState::Processing,
            transfer_rate,
        },
    )?;
    XRPL_TOKENS_BY_DENOM.save(deps.storage, denom.clone(), &build_xrpl_token_key(&issuer_key, &currency_key))?;

    let config = CONFIG.load(deps.storage)?;
    let ticket_sequence = allocate_ticket(deps.storage)?;
    let operation_id = create_pending_operation(
        deps.storage,
        &config,
        Some(ticket_sequence),
        None,
        OperationType::TrustSet {
            issuer: issuer_key.clone(),
            currency: currency_key.clone(),
            trust_set_limit_amount: config.trust_set_limit_amount,
        },
    )?;

    Ok(Response::new()
        .add_message(issue_msg)
        .add_attribute("action", "register_xrpl_token")
        .add_attribute("issuer", issuer_key)
        .add_attribute("currency", currency_key)
        .add_attribute("denom", denom)
        .add_attribute("operation_id", operation_id.to_string()))
}

fn recover_xrpl_token_registration(
    deps: DepsMut,
    info: MessageInfo,
    issuer: String,
    currency: String,
) -> CoreumResult<ContractError> {
    assert_owner(deps.storage, &info.sender)?;
    let key = build_xrpl_token_key(&issuer, &currency);
    let mut token = XRPL_TOKENS
        .load(deps.storage, key.clone())
        .map_err(|_| ContractError::TokenNotRegistered {})?;
    if token.state != TokenState::Inactive {
        return Err(ContractError::XRPLTokenNotInactive {});
    }

    let config = CONFIG.load(deps.storage)?;
    let ticket_sequence = allocate_ticket(deps.storage)?;
    let operation_id = create_pending_operation(
        deps.storage,
        &config,
        Some(ticket_sequence),
        None,
        OperationType::TrustSet {
            issuer,
            currency,
            trust_set_limit_amount: config.trust_set_limit_amount,
        },
    )?;

    token.state = TokenState::Processing;
    XRPL_TOKENS.save(deps.storage, key, &token)?;

    Ok(Response::new()
        .add_attribute("action", "recover_xrpl_token_registration")
        .add_attribute("operation_id", operation_id.to_string()))
}

fn save_evidence(deps: DepsMut, sender: Addr, evidence: Evidence) -> CoreumResult<ContractError> {
    evidence.validate()?;
    assert_relayer(deps.as_ref(), &sender)?;

    let mut response = Response::new().add_attribute("action", "save_evidence");

    match evidence.clone() {
        Evidence::XRPLToCoreumTransfer {
            tx_hash,
            issuer,
            currency,
            amount,
            recipient,
            memo,
        } => {
            let key = build_xrpl_token_key(&issuer, &currency);
            let xrpl_token = XRPL_TOKENS.may_load(deps.storage, key.clone())?;

            // Coreum-originated tokens never get a reverse XRPL_TOKENS entry
            // (register_coreum_token only ever writes COREUM_TOKENS/XRPL_CURRENCIES),
            // so a Payment returning one from XRPL resolves through the same
            // issuer/currency -> denom indirection `send_to_xrpl` built it with.
            let coreum_token = if xrpl_token.is_none() {
                let config = CONFIG.load(deps.storage)?;
                if issuer != config.bridge_xrpl_address {
                    return Err(ContractError::TokenNotRegistered {});
                }
                let denom = XRPL_CURRENCIES
                    .load(deps.storage, currency.clone())
                    .map_err(|_| ContractError::TokenNotRegistered {})?;
                let token = COREUM_TOKENS
                    .load(deps.storage, denom)
                    .map_err(|_| ContractError::TokenNotRegistered {})?;
                if token.state != TokenState::Enabled {
                    return Err(ContractError::TokenNotEnabled {});
                }
                Some(token)
            } else {
                None
            };

            if let Some(token) = &xrpl_token {
                if token.state != TokenState::Enabled {
                    return Err(ContractError::TokenNotEnabled {});
                }
            }

            let threshold_reached = handle_evidence(deps.storage, sender, &evidence)?;
            response = response
                .add_attribute("tx_hash", tx_hash)
                .add_attribute("threshold_reached", threshold_reached.to_string());
            if let Some(memo) = memo {
                response = response.add_attribute("memo", memo);
            }

            if threshold_reached {
                if let Some(token) = xrpl_token {
                    if !is_token_xrp(&issuer, &currency) {
                        let net = NET_BRIDGED_IN.may_load(deps.storage, key.clone())?.unwrap_or(0);
                        let updated =
                            check_max_holding_amount(net, amount.u128() as i128, token.max_holding_amount.u128())?;
                        NET_BRIDGED_IN.save(deps.storage, key, &updated)?;
                    }

                    let after_fee = amount_after_bridge_fees(amount, token.bridging_fee)?;
                    handle_fee_collection(deps.storage, token.bridging_fee, token.coreum_denom.clone(), Uint128::zero(), None)?;

                    response = add_mint_and_send(response, after_fee, token.coreum_denom.clone(), recipient.clone())
                        .add_attribute("issuer", issuer)
                        .add_attribute("currency", currency)
                        .add_attribute("amount", amount.to_string())
                        .add_attribute("recipient", recipient.to_string());
                } else if let Some(token) = coreum_token {
                    // The token left as home-denom coin escrowed by the contract
                    // (send_to_xrpl never burns it), so the return leg sends the
                    // same coin back rather than minting a fresh supply.
                    let holding_key = format!("coreum:{}", token.denom);
                    let net = NET_BRIDGED_IN.may_load(deps.storage, holding_key.clone())?.unwrap_or(0);

                    let after_fee = amount_after_bridge_fees(amount, token.bridging_fee)?;
                    handle_fee_collection(deps.storage, token.bridging_fee, token.denom.clone(), Uint128::zero(), None)?;
                    let home_after_fee = convert_amount_decimals(XRPL_TOKENS_DECIMALS, token.decimals, after_fee)?;

                    let updated = net.saturating_sub(amount.u128() as i128).max(0);
                    NET_BRIDGED_IN.save(deps.storage, holding_key, &updated)?;

                    response = response
                        .add_message(BankMsg::Send {
                            to_address: recipient.to_string(),
                            amount: coins(home_after_fee.u128(), token.denom.clone()),
                        })
                        .add_attribute("issuer", issuer)
                        .add_attribute("currency", currency)
                        .add_attribute("amount", amount.to_string())
                        .add_attribute("recipient", recipient.to_string());
                }
            }
        }
        Evidence::XRPLTransactionResult {
            tx_hash,
            account_sequence,
            ticket_sequence,
            transaction_result,
            operation_result,
        } => {
            let operation_id = ticket_sequence
                .or(account_sequence)
                .ok_or(ContractError::InvalidTicketAllocationEvidence {})?;
            let operation = check_operation_exists(deps.storage, operation_id)?;

            let threshold_reached = handle_evidence(deps.storage, sender.clone(), &evidence)?;
            response = response.add_attribute("threshold_reached", threshold_reached.to_string());

            if threshold_reached {
                handle_operation(
                    deps.storage,
                    sender,
                    &operation,
                    &operation_result,
                    &transaction_result,
                    &tx_hash,
                    operation_id,
                    ticket_sequence,
                    &mut response,
                )?;

                if ticket_sequence.is_some() && transaction_result != TransactionResult::Invalid {
                    let config = CONFIG.load(deps.storage)?;
                    register_used_ticket(deps.storage, &config)?;
                }
            }
        }
    }

    Ok(response)
}

#[allow(clippy::too_many_arguments)]
fn send_to_xrpl(
    deps: DepsMut,
    info: MessageInfo,
    recipient: String,
    deliver_amount: Option<Uint128>,
) -> CoreumResult<ContractError> {
    let config = CONFIG.load(deps.storage)?;
    if config.bridge_state == BridgeState::Halted {
        return Err(ContractError::BridgeHalted {});
    }
    validate_xrpl_address(recipient.clone())?;
    if PROHIBITED_XRPL_RECIPIENTS.has(deps.storage, recipient.clone()) {
        return Err(ContractError::ProhibitedRecipient {});
    }

    let sent = one_coin(&info)?;

    let (issuer, currency, amount_for_operation, max_amount, net_holding_key, net_holding_delta) =
        if let Some(xrpl_key) = XRPL_TOKENS_BY_DENOM.may_load(deps.storage, sent.denom.clone())? {
            // Bridging an XRPL-originated (or native XRP) asset back out: the
            // coin the user sent was already minted at the XRPL scale.
            let token = XRPL_TOKENS.load(deps.storage, xrpl_key.clone())?;
            if token.state != TokenState::Enabled {
                return Err(ContractError::XRPLTokenNotEnabled {});
            }
            let decimals = if is_token_xrp(token.issuer.as_deref().unwrap_or(XRP_ISSUER), token.currency.as_deref().unwrap_or(XRP_CURRENCY)) {
                XRPL_NATIVE_TOKEN_DECIMALS
            } else {
                XRPL_TOKENS_DECIMALS
            };
            let amount_decimal = home_amount_to_decimal(sent.amount.u128(), decimals)?;
            let (truncated, truncated_out) = truncate_amount(amount_decimal, token.sending_precision)?;
            let (after_transfer_fee, transfer_fee) =
                amount_after_transfer_fees(decimal_to_home_amount(truncated, decimals)?.into(), token.transfer_rate)?;
            handle_fee_collection(
                deps.storage,
                token.bridging_fee,
                sent.denom.clone(),
                decimal_to_home_amount(truncated_out, decimals)?.into(),
                Some(transfer_fee),
            )?;
            let amount_after_fee = amount_after_bridge_fees(after_transfer_fee, token.bridging_fee)?;
            validate_significant_digits(home_amount_to_decimal(amount_after_fee.u128(), decimals)?, XRPL_ISSUED_TOKEN_DECIMALS)?;

            let issuer = token.issuer.unwrap_or_default();
            let currency = token.currency.unwrap_or_else(|| XRP_CURRENCY.to_string());

            // Mirrors the inbound increment at the other end of this key: the
            // asset is leaving Coreum custody headed back to XRPL.
            let (net_holding_key, net_holding_value) = if is_token_xrp(&issuer, &currency) {
                (None, 0i128)
            } else {
                let net = NET_BRIDGED_IN.may_load(deps.storage, xrpl_key.clone())?.unwrap_or(0);
                let updated = net.saturating_sub(amount_after_fee.u128() as i128).max(0);
                (Some(xrpl_key), updated)
            };

            (issuer, currency, amount_after_fee, deliver_amount, net_holding_key, net_holding_value)
        } else {
            // Bridging a Coreum-originated asset out for the first time: the
            // contract itself is the XRPL-side issuer under its hex currency.
            let token = COREUM_TOKENS
                .load(deps.storage, sent.denom.clone())
                .map_err(|_| ContractError::TokenNotRegistered {})?;
            if token.state != TokenState::Enabled {
                return Err(ContractError::TokenNotEnabled {});
            }
            if deliver_amount.is_some() {
                return Err(ContractError::InvalidDeliverAmount {});
            }
            let xrpl_scale = convert_amount_decimals(token.decimals, XRPL_TOKENS_DECIMALS, sent.amount)?;
            let amount_decimal = home_amount_to_decimal(xrpl_scale.u128(), XRPL_TOKENS_DECIMALS)?;
            let (truncated, truncated_out) = truncate_amount(amount_decimal, token.sending_precision)?;
            let truncated_amount = decimal_to_home_amount(truncated, XRPL_TOKENS_DECIMALS)?.into();
            handle_fee_collection(
                deps.storage,
                token.bridging_fee,
                sent.denom.clone(),
                decimal_to_home_amount(truncated_out, XRPL_TOKENS_DECIMALS)?.into(),
                None,
            )?;
            let amount_after_fee = amount_after_bridge_fees(truncated_amount, token.bridging_fee)?;
            validate_significant_digits(home_amount_to_decimal(amount_after_fee.u128(), XRPL_TOKENS_DECIMALS)?, XRPL_ISSUED_TOKEN_DECIMALS)?;

            let key = format!("coreum:{}", token.denom);
            let net = NET_BRIDGED_IN.may_load(deps.storage, key.clone())?.unwrap_or(0);
            let updated = check_max_holding_amount(net, amount_after_fee.u128() as i128, token.max_holding_amount.u128())?;

            (
                config.bridge_xrpl_address.clone(),
                token.xrpl_currency,
                amount_after_fee,
                None,
                Some(key),
                updated,
            )
        };

    if let Some(key) = net_holding_key {
        NET_BRIDGED_IN.save(deps.storage, key, &net_holding_delta)?;
    }

    let ticket_sequence = allocate_ticket(deps.storage)?;
    let operation_id = create_pending_operation(
        deps.storage,
        &config,
        Some(ticket_sequence),
        None,
        OperationType::CoreumToXRPLTransfer {
            issuer,
            currency,
            amount: amount_for_operation,
            max_amount,
            sender: info.sender.clone(),
            recipient: recipient.clone(),
        },
    )?;

    Ok(Response::new()
        .add_attribute("action", "send_to_xrpl")
        .add_attribute("sender", info.sender)
        .add_attribute("recipient", recipient)
        .add_attribute("operation_id", operation_id.to_string()))
}

fn claim_refund(deps: DepsMut, sender: Addr, pending_refund_id: u64) -> CoreumResult<ContractError> {
    let coin = remove_pending_refund(deps.storage, &sender, pending_refund_id)?;
    Ok(Response::new()
        .add_message(cosmwasm_std::BankMsg::Send {
            to_address: sender.to_string(),
            amount: vec![coin],
        })
        .add_attribute("action", "claim_refund")
        .add_attribute("operation_id", pending_refund_id.to_string()))
}

fn rotate_keys(
    deps: DepsMut<CoreumQueries>,
    info: MessageInfo,
    new_relayers: Vec<crate::relayer::Relayer>,
    new_evidence_threshold: u32,
) -> CoreumResult<ContractError> {
    assert_owner(deps.storage, &info.sender)?;
    if PENDING_ROTATE_KEYS.load(deps.storage)? {
        return Err(ContractError::RotateKeysOngoing {});
    }
    validate_relayers(&deps, &new_relayers)?;
    if new_evidence_threshold == 0 || new_evidence_threshold > new_relayers.len() as u32 {
        return Err(ContractError::InvalidThreshold {});
    }

    let mut config = CONFIG.load(deps.storage)?;
    let ticket_sequence = allocate_ticket(deps.storage)?;
    let operation_id = create_pending_operation(
        deps.storage,
        &config,
        Some(ticket_sequence),
        None,
        OperationType::RotateKeys {
            new_relayers,
            new_evidence_threshold,
        },
    )?;
    PENDING_ROTATE_KEYS.save(deps.storage, &true)?;
    config.bridge_state = BridgeState::Halted;
    CONFIG.save(deps.storage, &config)?;

    Ok(Response::new()
        .add_attribute("action", "rotate_keys")
        .add_attribute("operation_id", operation_id.to_string()))
}

#[allow(clippy::too_many_arguments)]
fn update_xrpl_token(
    deps: DepsMut,
    info: MessageInfo,
    issuer: String,
    currency: String,
    state: Option<TokenState>,
    sending_precision: Option<i32>,
    bridging_fee: Option<Uint128>,
    max_holding_amount: Option<Uint128>,
    transfer_rate: Option<Uint128>,
) -> CoreumResult<ContractError> {
    assert_owner(deps.storage, &info.sender)?;
    let key = build_xrpl_token_key(&issuer, &currency);
    let mut token = XRPL_TOKENS
        .load(deps.storage, key.clone())
        .map_err(|_| ContractError::TokenNotRegistered {})?;

    set_token_state(&mut token.state, state)?;
    set_token_sending_precision(&mut token.sending_precision, sending_precision, XRPL_TOKENS_DECIMALS)?;
    set_token_bridging_fee(&mut token.bridging_fee, bridging_fee)?;
    let net = NET_BRIDGED_IN.may_load(deps.storage, key.clone())?.unwrap_or(0);
    set_token_max_holding_amount(Uint128::new(net.unsigned_abs()), &mut token.max_holding_amount, max_holding_amount)?;
    set_token_transfer_rate(&mut token.transfer_rate, transfer_rate);

    XRPL_TOKENS.save(deps.storage, key, &token)?;
    Ok(Response::new().add_attribute("action", "update_xrpl_token"))
}

fn update_coreum_token(
    deps: DepsMut,
    info: MessageInfo,
    denom: String,
    state: Option<TokenState>,
    sending_precision: Option<i32>,
    bridging_fee: Option<Uint128>,
    max_holding_amount: Option<Uint128>,
) -> CoreumResult<ContractError> {
    assert_owner(deps.storage, &info.sender)?;
    let mut token = COREUM_TOKENS
        .load(deps.storage, denom.clone())
        .map_err(|_| ContractError::TokenNotRegistered {})?;

    set_token_state(&mut token.state, state)?;
    set_token_sending_precision(&mut token.sending_precision, sending_precision, token.decimals)?;
    set_token_bridging_fee(&mut token.bridging_fee, bridging_fee)?;
    let key = format!("coreum:{denom}");
    let net = NET_BRIDGED_IN.may_load(deps.storage, key)?.unwrap_or(0);
    set_token_max_holding_amount(Uint128::new(net.unsigned_abs()), &mut token.max_holding_amount, max_holding_amount)?;

    COREUM_TOKENS.save(deps.storage, denom, &token)?;
    Ok(Response::new().add_attribute("action", "update_coreum_token"))
}

#[cfg_attr(not(feature = "library"), entry_point)]
pub fn query(deps: Deps, _env: Env, msg: QueryMsg) -> StdResult<Binary> {
    match msg {
        QueryMsg::Ownership {} => to_binary(&get_ownership(deps.storage)?),
        QueryMsg::Config {} => to_binary(&query_config(deps)?),
        QueryMsg::XRPLTokens { offset, limit } => to_binary(&query_xrpl_tokens(deps, offset, limit)?),
        QueryMsg::CoreumTokens { offset, limit } => to_binary(&query_coreum_tokens(deps, offset, limit)?),
        QueryMsg::XRPLToken { issuer, currency } => to_binary(&query_xrpl_token(deps, issuer, currency)?),
        QueryMsg::CoreumToken { denom } => to_binary(&CoreumTokenResponse {
            token: COREUM_TOKENS.load(deps.storage, denom)?,
        }),
        QueryMsg::AvailableTickets {} => to_binary(&AvailableTicketsResponse {
            tickets: AVAILABLE_TICKETS.load(deps.storage)?.into(),
        }),
        QueryMsg::PendingOperations {} => to_binary(&PendingOperationsResponse {
            operations: PENDING_OPERATIONS
                .range(deps.storage, None, None, Order::Ascending)
                .map(|r| r.map(|(_, v)| v))
                .collect::<StdResult<_>>()?,
        }),
        QueryMsg::PendingRefunds { address } => to_binary(&query_pending_refunds(deps, address)?),
        QueryMsg::FeesCollected {} => to_binary(&FeesCollectedResponse {
            fees_collected: FEES_COLLECTED
                .range(deps.storage, None, None, Order::Ascending)
                .map(|r| r.map(|(denom, amount)| coin(amount.u128(), denom)))
                .collect::<StdResult<_>>()?,
        }),
        QueryMsg::ProcessedTx { hash } => to_binary(&ProcessedTxResponse {
            processed: crate::state::PROCESSED_TXS.has(deps.storage, hash.to_lowercase()),
        }),
        QueryMsg::ProhibitedXRPLRecipients {} => to_binary(&ProhibitedXRPLRecipientsResponse {
            prohibited_xrpl_recipients: PROHIBITED_XRPL_RECIPIENTS
                .keys(deps.storage, None, None, Order::Ascending)
                .collect::<StdResult<_>>()?,
        }),
    }
}

fn query_config(deps: Deps) -> StdResult<ConfigResponse> {
    let config = CONFIG.load(deps.storage)?;
    Ok(ConfigResponse {
        relayers: config.relayers,
        evidence_threshold: config.evidence_threshold,
        used_ticket_sequence_threshold: config.used_ticket_sequence_threshold,
        trust_set_limit_amount: config.trust_set_limit_amount,
        bridge_xrpl_address: config.bridge_xrpl_address,
        xrpl_base_fee: config.xrpl_base_fee,
        bridge_state: config.bridge_state,
    })
}

fn query_xrpl_tokens(deps: Deps, offset: Option<u64>, limit: Option<u32>) -> StdResult<XRPLTokensResponse> {
    let limit = limit.unwrap_or(DEFAULT_MAX_LIMIT).min(DEFAULT_MAX_LIMIT) as usize;
    let offset = offset.unwrap_or(0) as usize;
    let tokens = XRPL_TOKENS
        .range(deps.storage, None, None, Order::Ascending)
        .skip(offset)
        .take(limit)
        .map(|r| r.map(|(_, v)| v))
        .collect::<StdResult<_>>()?;
    Ok(XRPLTokensResponse { tokens })
}

fn query_coreum_tokens(deps: Deps, offset: Option<u64>, limit: Option<u32>) -> StdResult<CoreumTokensResponse> {
    let limit = limit.unwrap_or(DEFAULT_MAX_LIMIT).min(DEFAULT_MAX_LIMIT) as usize;
    let offset = offset.unwrap_or(0) as usize;
    let tokens = COREUM_TOKENS
        .range(deps.storage, None, None, Order::Ascending)
        .skip(offset)
        .take(limit)
        .map(|r| r.map(|(_, v)| v))
        .collect::<StdResult<_>>()?;
    Ok(CoreumTokensResponse { tokens })
}

fn query_xrpl_token(deps: Deps, issuer: String, currency: String) -> StdResult<XRPLTokenResponse> {
    let key = build_xrpl_token_key(&issuer, &currency);
    let token = XRPL_TOKENS.load(deps.storage, key)?;
    Ok(XRPLTokenResponse { token })
}

fn query_pending_refunds(deps: Deps, address: String) -> StdResult<PendingRefundsResponse> {
    let addr = Addr::unchecked(address);
    let pending_refunds = PENDING_REFUNDS
        .prefix(addr)
        .range(deps.storage, None, None, Order::Ascending)
        .map(|r| {
            r.map(|(operation_id, refund)| PendingRefundResponse {
                operation_id,
                xrpl_tx_hash: refund.xrpl_tx_hash,
                coin: refund.coin,
            })
        })
        .collect::<StdResult<_>>()?;
    Ok(PendingRefundsResponse { pending_refunds })
}

// ---- helpers shared with other modules ----

pub fn validate_sending_precision(sending_precision: i32, decimals: u32) -> Result<(), ContractError> {
    if !(MIN_SENDING_PRECISION..=MAX_SENDING_PRECISION).contains(&sending_precision) {
        return Err(ContractError::InvalidSendingPrecision {});
    }
    if sending_precision > 0 && sending_precision as u32 > decimals {
        return Err(ContractError::InvalidSendingPrecision {});
    }
    Ok(())
}

/// Rescales `amount` from one decimal regime to another (e.g. a Coreum
/// token's own `decimals` to the 15-digit XRPL-issued scale, or back), used
/// whenever the two sides of a transfer disagree on scale.
pub fn convert_amount_decimals(
    from_decimals: u32,
    to_decimals: u32,
    amount: Uint128,
) -> Result<Uint128, ContractError> {
    let decimal = home_amount_to_decimal(amount.u128(), from_decimals)?;
    Ok(decimal_to_home_amount(decimal, to_decimals)?.into())
}

fn check_issue_fee(deps: &DepsMut<CoreumQueries>, info: &MessageInfo) -> Result<(), ContractError> {
    let query_params_res: ParamsResponse = deps
        .querier
        .query(&CoreumQueries::AssetFT(Query::Params {}).into())?;

    if query_params_res.params.issue_fee != one_coin(info)? {
        return Err(ContractError::InvalidIssueFee {});
    }
    Ok(())
}

fn add_mint_and_send(response: Response<CoreumMsg>, amount: Uint128, denom: String, recipient: Addr) -> Response<CoreumMsg> {
    let mint_msg = CosmosMsg::from(CoreumMsg::AssetFT(assetft::Msg::Mint {
        coin: coin(amount.u128(), denom.clone()),
    }));
    let send_msg = CosmosMsg::Bank(cosmwasm_std::BankMsg::Send {
        to_address: recipient.to_string(),
        amount: coins(amount.u128(), denom),
    });
    response.add_messages([mint_msg, send_msg])
}
