use std::collections::VecDeque;

use cosmwasm_std::Storage;

use crate::{
    error::ContractError,
    evidence::TransactionResult,
    operation::{create_pending_operation, OperationType},
    state::{Config, AVAILABLE_TICKETS, PENDING_TICKET_UPDATE, USED_TICKETS_COUNTER},
};

/// Maximum number of tickets that can be requested in a single allocation, per
/// the XRPL `TicketCreate` transaction's own limit.
pub const MAX_TICKETS_TO_ALLOCATE: u32 = 250;

/// Pops the next available ticket, refusing to hand out the last one: it is
/// reserved so a ticket-allocation operation always has a ticket of its own to
/// be submitted under.
pub fn allocate_ticket(storage: &mut dyn Storage) -> Result<u64, ContractError> {
    let mut available_tickets = AVAILABLE_TICKETS.load(storage)?;

    if available_tickets.len() < 2 {
        return Err(ContractError::LastTicketReserved {});
    }

    let ticket = available_tickets.pop_front().unwrap();
    AVAILABLE_TICKETS.save(storage, &available_tickets)?;

    Ok(ticket)
}

/// Returns a ticket to the pool (its operation was found Invalid on XRPL, so
/// the ticket was never actually consumed).
pub fn return_ticket(storage: &mut dyn Storage, ticket: u64) -> Result<(), ContractError> {
    let mut available_tickets = AVAILABLE_TICKETS.load(storage)?;
    available_tickets.push_back(ticket);
    AVAILABLE_TICKETS.save(storage, &available_tickets)?;
    Ok(())
}

/// Counts one more ticket consumed and, once usage crosses
/// `used_ticket_sequence_threshold` tickets remaining, carves the reserved
/// last ticket off into a self-replenishing AllocateTickets operation so the
/// pool never actually runs dry.
pub fn register_used_ticket(storage: &mut dyn Storage, config: &Config) -> Result<(), ContractError> {
    let used = USED_TICKETS_COUNTER.load(storage)?;
    let available_tickets = AVAILABLE_TICKETS.load(storage)?;

    let should_reallocate = (available_tickets.len() as u32) <= config.used_ticket_sequence_threshold
        && !PENDING_TICKET_UPDATE.load(storage)?;

    if should_reallocate && !available_tickets.is_empty() {
        let mut available_tickets = available_tickets;
        let ticket_to_update = available_tickets.pop_front().unwrap();
        AVAILABLE_TICKETS.save(storage, &available_tickets)?;

        create_pending_operation(
            storage,
            config,
            Some(ticket_to_update),
            None,
            OperationType::AllocateTickets {
                number: MAX_TICKETS_TO_ALLOCATE,
            },
        )?;
        PENDING_TICKET_UPDATE.save(storage, &true)?;
    }

    USED_TICKETS_COUNTER.save(storage, &(used + 1))?;
    Ok(())
}

/// Applies the outcome of a ticket-allocation operation: on success the newly
/// allocated tickets replace the pool; on failure the pool is left as-is and
/// a future allocation must be requested again.
pub fn handle_ticket_allocation_confirmation(
    storage: &mut dyn Storage,
    tickets: Option<Vec<u64>>,
    transaction_result: &TransactionResult,
) -> Result<(), ContractError> {
    if transaction_result.eq(&TransactionResult::Accepted) {
        let tickets = tickets.ok_or(ContractError::InvalidSuccessfulTransactionResultEvidence {})?;
        AVAILABLE_TICKETS.save(storage, &VecDeque::from(tickets))?;
    }

    PENDING_TICKET_UPDATE.save(storage, &false)?;
    Ok(())
}

/// Bootstraps (or re-bootstraps after the pool was fully drained) a ticket
/// allocation operation keyed by `account_sequence` rather than a ticket,
/// since there are no tickets left to key it by.
pub fn recover_tickets(
    storage: &mut dyn Storage,
    config: &Config,
    account_sequence: u64,
    number_of_tickets: u32,
) -> Result<u64, ContractError> {
    let available_tickets = AVAILABLE_TICKETS.load(storage)?;
    if !available_tickets.is_empty() {
        return Err(ContractError::StillHaveAvailableTickets {});
    }
    if number_of_tickets == 0 || number_of_tickets > MAX_TICKETS_TO_ALLOCATE {
        return Err(ContractError::InvalidTicketSequenceToAllocate {});
    }
    if PENDING_TICKET_UPDATE.load(storage)? {
        return Err(ContractError::PendingTicketUpdate {});
    }

    let operation_id = create_pending_operation(
        storage,
        config,
        None,
        Some(account_sequence),
        OperationType::AllocateTickets {
            number: number_of_tickets,
        },
    )?;
    PENDING_TICKET_UPDATE.save(storage, &true)?;

    Ok(operation_id)
}
