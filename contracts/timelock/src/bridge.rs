//! Proposal bridge: bypass prevention.
//!
//! The governance registry does not know about timelocking. Each block this
//! bridge runs strictly *before* the registry's own execution step, pulls
//! every proposal observed as `Passed` into a delayed operation, and
//! overwrites the proposal's status with the terminal `TimelockQueued` so
//! the registry's step treats it as already handled.
//!
//! The error discipline here is asymmetric and is the central property of
//! the whole module: a failed queue attempt is contained (the status is
//! overwritten anyway and an event records the quarantine), but a failed
//! status overwrite propagates as an error — trapping the invocation and
//! leaving the pending marker in place — because the alternative is a
//! proposal that remains executable without its delay.

use soroban_sdk::{contractclient, symbol_short, Address, Env, Symbol, Vec};

use common::{Proposal, ProposalStatus};

use crate::{events, ContractError};

// ── Storage key ───────────────────────────────────────────────────────────────

const PENDING: Symbol = symbol_short!("PENDING");

// ── Collaborator interface ────────────────────────────────────────────────────

/// The narrow contract the bridge consumes: a proposal store with a status
/// writer. No voting or deposit surface is assumed.
#[contractclient(name = "ProposalStoreClient")]
pub trait ProposalStore {
    fn get_proposal(env: Env, proposal_id: u64) -> Option<Proposal>;
    fn set_status(env: Env, caller: Address, proposal_id: u64, status: ProposalStatus);
}

// ── Pending-proposal markers ──────────────────────────────────────────────────

pub(crate) fn load_pending(env: &Env) -> Vec<u64> {
    env.storage()
        .instance()
        .get(&PENDING)
        .unwrap_or_else(|| Vec::new(env))
}

fn store_pending(env: &Env, pending: &Vec<u64>) {
    env.storage().instance().set(&PENDING, pending);
}

/// Record a proposal as observed-passed. Idempotent.
pub(crate) fn mark_pending(env: &Env, proposal_id: u64) {
    let mut pending = load_pending(env);
    if pending.iter().any(|id| id == proposal_id) {
        return;
    }
    pending.push_back(proposal_id);
    store_pending(env, &pending);
}

// ── Bridge step ───────────────────────────────────────────────────────────────

/// Drain the pending markers, queueing an operation per passed proposal.
///
/// Returns how many operations were queued. An `Err` from this function
/// means a status overwrite failed; nothing is committed in that case
/// (markers included), which halts the block pipeline rather than letting
/// the proposal stay executable.
pub(crate) fn process(env: &Env, governance: &Address, executor: &Address) -> Result<u32, ContractError> {
    let client = ProposalStoreClient::new(env, governance);
    let pending = load_pending(env);
    let mut queued: u32 = 0;

    for proposal_id in pending.iter() {
        let Some(proposal) = client.get_proposal(&proposal_id) else {
            // Gone out-of-band; drop the marker.
            continue;
        };
        if proposal.status != ProposalStatus::Passed {
            // Already handled elsewhere; drop the marker.
            continue;
        }

        let queue_result = crate::queue_internal(
            env,
            proposal_id,
            proposal.instructions.clone(),
            executor.clone(),
        );

        // Regardless of the queue outcome, the proposal must leave the
        // `Passed` set before the governance execution step runs.
        let lock = client.try_set_status(
            &env.current_contract_address(),
            &proposal_id,
            &ProposalStatus::TimelockQueued,
        );
        if lock.is_err() {
            return Err(ContractError::ProposalLockFailed);
        }

        match queue_result {
            Ok(operation_id) => {
                events::publish_proposal_timelocked(env, proposal_id, operation_id);
                queued = queued.saturating_add(1);
            }
            Err(err) => {
                events::publish_proposal_quarantined(env, proposal_id, err as u32);
            }
        }
    }

    store_pending(env, &Vec::new(env));
    Ok(queued)
}
