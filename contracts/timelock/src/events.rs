//! Structured event publishing for the timelock engine.
//!
//! Events are the audit surface: the emergency path in particular has no
//! dedicated terminal status, so its justification trail lives here.

use soroban_sdk::{symbol_short, Address, Env, String, Symbol};

use common::Instruction;

use crate::params::TimelockParams;

pub fn publish_operation_queued(
    env: &Env,
    operation_id: u64,
    proposal_id: u64,
    executable_at: u64,
    expires_at: u64,
) {
    env.events().publish(
        (symbol_short!("OP_QUE"), operation_id),
        (proposal_id, executable_at, expires_at),
    );
}

pub fn publish_operation_executed(env: &Env, operation_id: u64, executed_at: u64) {
    env.events()
        .publish((symbol_short!("OP_EXEC"), operation_id), executed_at);
}

pub fn publish_operation_auto_executed(env: &Env, operation_id: u64, executed_at: u64) {
    env.events()
        .publish((symbol_short!("OP_AEXE"), operation_id), executed_at);
}

pub fn publish_auto_execute_failed(
    env: &Env,
    operation_id: u64,
    reason: &Symbol,
    error_code: u32,
) {
    env.events().publish(
        (symbol_short!("OP_AFAIL"), operation_id),
        (reason.clone(), error_code),
    );
}

pub fn publish_operation_cancelled(
    env: &Env,
    operation_id: u64,
    canceller: &Address,
    reason: &String,
) {
    env.events().publish(
        (symbol_short!("OP_CANC"), operation_id),
        (canceller.clone(), reason.clone()),
    );
}

pub fn publish_operation_expired(env: &Env, operation_id: u64, expired_at: u64) {
    env.events()
        .publish((symbol_short!("OP_EXPR"), operation_id), expired_at);
}

pub fn publish_emergency_execution(
    env: &Env,
    operation_id: u64,
    guardian: &Address,
    justification: &String,
) {
    env.events().publish(
        (symbol_short!("EMERG_EXE"), operation_id),
        (guardian.clone(), justification.clone()),
    );
}

pub fn publish_params_updated(env: &Env, params: &TimelockParams) {
    env.events()
        .publish((symbol_short!("PAR_UPD"),), params.clone());
}

pub fn publish_guardian_updated(env: &Env, new_guardian: &Option<Address>) {
    env.events()
        .publish((symbol_short!("GRD_UPD"),), new_guardian.clone());
}

pub fn publish_proposal_timelocked(env: &Env, proposal_id: u64, operation_id: u64) {
    env.events()
        .publish((symbol_short!("PROP_TLK"), proposal_id), operation_id);
}

/// A passed proposal whose queue step failed; its status was still forced
/// terminal so the governance execution step cannot pick it up.
pub fn publish_proposal_quarantined(env: &Env, proposal_id: u64, error_code: u32) {
    env.events()
        .publish((symbol_short!("PROP_QUAR"), proposal_id), error_code);
}

pub fn publish_dispatch(env: &Env, operation_id: u64, index: u32, instruction: &Instruction) {
    env.events().publish(
        (symbol_short!("DISPATCH"), operation_id, index),
        instruction.clone(),
    );
}
