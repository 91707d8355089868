#![no_std]

//! # Timelock Engine
//!
//! The delayed-execution engine of the Aegis suite. Actions approved by
//! governance are intercepted here and deferred by a mandatory waiting
//! window before their instructions dispatch:
//!
//! - **Queueing** computes the execution window from the parameters in
//!   force and rejects duplicate batches via an integrity hash.
//! - **Execution** has three entry points — manual, emergency (guardian
//!   fast lane), automatic (per-block crank) — sharing one resource-bounded
//!   dispatch core.
//! - **Cancellation** is a single-actor circuit breaker for the guardian or
//!   the governance authority.
//! - **The proposal bridge** pulls passed proposals out of the governance
//!   registry and forces their status terminal so the registry cannot
//!   execute them without the delay.
//!
//! Time is the ledger timestamp; the engine has no timers of its own. Every
//! entry point runs to completion within one invocation, so correctness
//! rests on ordering and idempotence, not locking.
//!
//! ## Error discipline
//!
//! Caller errors return `Err` and change no state. Dispatch failures are
//! *recorded*: the operation transitions to `Failed` with the captured
//! cause and the entry point returns `Ok(Failed)` — returning `Err` would
//! roll the record back with everything else. The one deliberately trapping
//! error is `ProposalLockFailed` in the bridge.

pub mod bridge;
pub mod dispatch;
pub mod events;
pub mod operation;
pub mod params;

use soroban_sdk::{
    contract, contractimpl, contracttype, symbol_short, Address, BytesN, Env, String, Symbol, Vec,
};

use common::Instruction;

use dispatch::MAX_OPERATIONS_PER_BLOCK;
use operation::{effective_status, is_executable, Operation, OperationStatus};
use params::TimelockParams;

// ── Storage key constants ─────────────────────────────────────────────────────

const AUTHORITY: Symbol = symbol_short!("AUTHORITY");
const INITIALIZED: Symbol = symbol_short!("INIT");
const GOVERNANCE: Symbol = symbol_short!("GOV_CTR");

// ── Content policy bounds ─────────────────────────────────────────────────────

/// Shortest acceptable cancellation reason (bytes).
const MIN_REASON_LEN: u32 = 10;
/// Longest acceptable cancellation reason (bytes).
const MAX_REASON_LEN: u32 = 200;
/// Shortest acceptable emergency justification (bytes).
const MIN_JUSTIFICATION_LEN: u32 = 20;

// ── Error codes ───────────────────────────────────────────────────────────────

#[soroban_sdk::contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[repr(u32)]
pub enum ContractError {
    NotInitialized = 1,
    AlreadyInitialized = 2,
    Unauthorized = 10,
    NoInstructions = 100,
    TooManyInstructions = 101,
    OperationAlreadyExists = 102,
    OperationNotFound = 103,
    ExecutorMismatch = 104,
    NotQueued = 105,
    AlreadyExecuted = 106,
    OperationCancelled = 107,
    OperationExpired = 108,
    OperationFailed = 109,
    NotExecutable = 110,
    OperationHashMismatch = 111,
    NotGuardian = 112,
    NoGuardianSet = 113,
    ReasonTooShort = 114,
    ReasonTooLong = 115,
    JustificationTooShort = 116,
    InvalidParams = 117,
    GasBudgetExceeded = 118,
    InstructionFailed = 119,
    ProposalLockFailed = 122,
}

// ── Public return types ───────────────────────────────────────────────────────

/// Outcome counts of one automatic execution pass.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AutoRunReport {
    pub executed: u32,
    pub failed: u32,
    pub expired: u32,
}

// ── Contract ──────────────────────────────────────────────────────────────────

#[contract]
pub struct TimelockContract;

#[contractimpl]
impl TimelockContract {
    // ── Initialisation ────────────────────────────────────────────────────────

    /// Bootstrap the engine.
    ///
    /// * `authority`  — identity representing the governance voting outcome;
    ///                  normal executor of matured operations.
    /// * `governance` — address of the proposal registry the bridge reads
    ///                  and overwrites. Injected once here, never swapped.
    pub fn initialize(
        env: Env,
        authority: Address,
        governance: Address,
        initial_params: TimelockParams,
    ) -> Result<(), ContractError> {
        if env.storage().instance().has(&INITIALIZED) {
            return Err(ContractError::AlreadyInitialized);
        }
        authority.require_auth();
        initial_params.validate()?;

        env.storage().instance().set(&AUTHORITY, &authority);
        env.storage().instance().set(&GOVERNANCE, &governance);
        params::store(&env, &initial_params);
        env.storage().instance().set(&INITIALIZED, &true);

        Ok(())
    }

    // ── Queueing ──────────────────────────────────────────────────────────────

    /// Queue an operation directly. Authority-only; the bridge queues
    /// passed proposals through the same internal path.
    pub fn queue_operation(
        env: Env,
        caller: Address,
        proposal_id: u64,
        instructions: Vec<Instruction>,
        executor: Address,
    ) -> Result<u64, ContractError> {
        Self::require_initialized(&env)?;
        caller.require_auth();
        Self::require_authority(&env, &caller)?;

        queue_internal(&env, proposal_id, instructions, executor)
    }

    // ── Execution ─────────────────────────────────────────────────────────────

    /// Manual execution by the operation's stored executor.
    ///
    /// Returns the terminal status reached: `Executed` on success, `Failed`
    /// when dispatch stopped mid-batch (the failure is recorded, earlier
    /// instructions stand).
    pub fn execute_operation(
        env: Env,
        executor: Address,
        operation_id: u64,
    ) -> Result<OperationStatus, ContractError> {
        Self::require_initialized(&env)?;
        executor.require_auth();

        let mut op =
            operation::load(&env, operation_id).ok_or(ContractError::OperationNotFound)?;
        if executor != op.executor {
            return Err(ContractError::ExecutorMismatch);
        }
        Self::require_queued(&op)?;

        let now = env.ledger().timestamp();
        Self::check_not_expired(&op, now)?;
        if now < op.executable_at {
            return Err(ContractError::NotExecutable);
        }
        if !operation::verify_hash(&env, &op) {
            return Err(ContractError::OperationHashMismatch);
        }

        Ok(Self::dispatch_and_settle(&env, &mut op, now, false))
    }

    /// Emergency execution by the configured guardian.
    ///
    /// Waits only `emergency_delay` after queueing — a strictly shorter
    /// window than the normal path, reserved for urgent remediation. There
    /// is no separate emergency terminal status; the audit trail is the
    /// justification carried by the event.
    pub fn emergency_execute(
        env: Env,
        guardian: Address,
        operation_id: u64,
        justification: String,
    ) -> Result<OperationStatus, ContractError> {
        Self::require_initialized(&env)?;
        if justification.len() < MIN_JUSTIFICATION_LEN {
            return Err(ContractError::JustificationTooShort);
        }
        guardian.require_auth();
        Self::require_guardian(&env, &guardian)?;

        let mut op =
            operation::load(&env, operation_id).ok_or(ContractError::OperationNotFound)?;
        Self::require_queued(&op)?;

        let now = env.ledger().timestamp();
        Self::check_not_expired(&op, now)?;
        let emergency_delay = params::load(&env)?.emergency_delay;
        if now < op.queued_at.saturating_add(emergency_delay) {
            return Err(ContractError::NotExecutable);
        }
        if !operation::verify_hash(&env, &op) {
            return Err(ContractError::OperationHashMismatch);
        }

        let outcome = Self::dispatch_and_settle(&env, &mut op, now, false);
        if outcome == OperationStatus::Executed {
            events::publish_emergency_execution(&env, operation_id, &guardian, &justification);
        }
        Ok(outcome)
    }

    /// Automatic execution pass. Permissionless; the chain pipeline cranks
    /// it once per block, after [`Self::process_passed_proposals`] and
    /// before the governance execution step.
    ///
    /// Iterates in ascending-ID order for determinism, settles expiry in
    /// place, and stops producing terminal outcomes once
    /// `MAX_OPERATIONS_PER_BLOCK` is reached — the remainder stay `Queued`
    /// for the next block.
    pub fn auto_execute_ready(env: Env) -> Result<AutoRunReport, ContractError> {
        Self::require_initialized(&env)?;

        let now = env.ledger().timestamp();
        let mut report = AutoRunReport {
            executed: 0,
            failed: 0,
            expired: 0,
        };

        for id in 1..=operation::last_id(&env) {
            let Some(mut op) = operation::load(&env, id) else {
                continue;
            };
            if op.status != OperationStatus::Queued {
                continue;
            }
            if effective_status(&op, now) == OperationStatus::Expired {
                op.status = OperationStatus::Expired;
                operation::store(&env, &op);
                events::publish_operation_expired(&env, id, now);
                report.expired = report.expired.saturating_add(1);
                continue;
            }
            if now < op.executable_at {
                continue;
            }
            if report.executed.saturating_add(report.failed) >= MAX_OPERATIONS_PER_BLOCK {
                // Per-block cap reached; expiry settling above still runs
                // for the rest of the scan.
                continue;
            }

            if !operation::verify_hash(&env, &op) {
                op.status = OperationStatus::Failed;
                op.failure_reason = symbol_short!("HASH");
                operation::store(&env, &op);
                events::publish_auto_execute_failed(
                    &env,
                    id,
                    &op.failure_reason,
                    ContractError::OperationHashMismatch as u32,
                );
                report.failed = report.failed.saturating_add(1);
                continue;
            }

            match Self::dispatch_and_settle(&env, &mut op, now, true) {
                OperationStatus::Executed => {
                    report.executed = report.executed.saturating_add(1);
                }
                _ => {
                    report.failed = report.failed.saturating_add(1);
                }
            }
        }

        Ok(report)
    }

    // ── Cancellation & guardian control ───────────────────────────────────────

    /// Abort a queued operation. Guardian or authority only.
    ///
    /// A deliberate single-actor circuit breaker: no quorum, no second
    /// signature, because incident response cannot wait for either.
    pub fn cancel_operation(
        env: Env,
        canceller: Address,
        operation_id: u64,
        reason: String,
    ) -> Result<(), ContractError> {
        Self::require_initialized(&env)?;
        if reason.len() < MIN_REASON_LEN {
            return Err(ContractError::ReasonTooShort);
        }
        if reason.len() > MAX_REASON_LEN {
            return Err(ContractError::ReasonTooLong);
        }
        canceller.require_auth();
        Self::require_guardian_or_authority(&env, &canceller)?;

        let mut op =
            operation::load(&env, operation_id).ok_or(ContractError::OperationNotFound)?;
        Self::require_queued(&op)?;

        let now = env.ledger().timestamp();
        Self::check_not_expired(&op, now)?;

        op.status = OperationStatus::Cancelled;
        op.cancel_reason = reason.clone();
        operation::store(&env, &op);
        events::publish_operation_cancelled(&env, operation_id, &canceller, &reason);

        Ok(())
    }

    // ── Proposal bridge ───────────────────────────────────────────────────────

    /// Record a proposal observed as passed. Governance contract or
    /// authority only; idempotent.
    pub fn notify_proposal_passed(
        env: Env,
        caller: Address,
        proposal_id: u64,
    ) -> Result<(), ContractError> {
        Self::require_initialized(&env)?;
        caller.require_auth();

        let governance: Address = env
            .storage()
            .instance()
            .get(&GOVERNANCE)
            .ok_or(ContractError::NotInitialized)?;
        let authority: Address = env
            .storage()
            .instance()
            .get(&AUTHORITY)
            .ok_or(ContractError::NotInitialized)?;
        if caller != governance && caller != authority {
            return Err(ContractError::Unauthorized);
        }

        bridge::mark_pending(&env, proposal_id);
        Ok(())
    }

    /// Fold every pending passed proposal into a queued operation and force
    /// its governance status terminal. Permissionless; the chain pipeline
    /// cranks it once per block, strictly before the governance execution
    /// step.
    ///
    /// An `Err` here (the status overwrite failed) traps the invocation —
    /// failing closed on bypass risk rather than open on block production.
    pub fn process_passed_proposals(env: Env) -> Result<u32, ContractError> {
        Self::require_initialized(&env)?;

        let governance: Address = env
            .storage()
            .instance()
            .get(&GOVERNANCE)
            .ok_or(ContractError::NotInitialized)?;
        let authority: Address = env
            .storage()
            .instance()
            .get(&AUTHORITY)
            .ok_or(ContractError::NotInitialized)?;

        bridge::process(&env, &governance, &authority)
    }

    // ── Parameter governance ──────────────────────────────────────────────────

    /// Replace the parameter set. Authority-only; validated against both
    /// the absolute bounds and the previous value.
    pub fn update_params(
        env: Env,
        authority: Address,
        new_params: TimelockParams,
    ) -> Result<(), ContractError> {
        Self::require_initialized(&env)?;
        authority.require_auth();
        Self::require_authority(&env, &authority)?;

        let old = params::load(&env)?;
        new_params.validate_update(&old)?;

        params::store(&env, &new_params);
        events::publish_params_updated(&env, &new_params);
        Ok(())
    }

    /// Swap the guardian identity. Authority-only. High-trust: changes to
    /// this should themselves normally travel through the very delay
    /// mechanism it configures.
    pub fn update_guardian(
        env: Env,
        authority: Address,
        new_guardian: Option<Address>,
    ) -> Result<(), ContractError> {
        Self::require_initialized(&env)?;
        authority.require_auth();
        Self::require_authority(&env, &authority)?;

        let mut p = params::load(&env)?;
        p.guardian = new_guardian.clone();
        params::store(&env, &p);
        events::publish_guardian_updated(&env, &new_guardian);
        Ok(())
    }

    // ── View functions ────────────────────────────────────────────────────────

    pub fn get_params(env: Env) -> Result<TimelockParams, ContractError> {
        params::load(&env)
    }

    pub fn get_operation(env: Env, operation_id: u64) -> Option<Operation> {
        operation::load(&env, operation_id)
    }

    pub fn get_operation_by_hash(env: Env, hash: BytesN<32>) -> Option<Operation> {
        operation::lookup_by_hash(&env, &hash).and_then(|id| operation::load(&env, id))
    }

    pub fn operation_count(env: Env) -> u64 {
        operation::last_id(&env)
    }

    /// List operations in ascending-ID order, optionally filtered by stored
    /// status, starting at `start` (inclusive), at most `limit` records.
    pub fn list_operations(
        env: Env,
        status: Option<OperationStatus>,
        start: u64,
        limit: u32,
    ) -> Vec<Operation> {
        let mut out = Vec::new(&env);
        let first = start.max(1);
        for id in first..=operation::last_id(&env) {
            if out.len() >= limit {
                break;
            }
            let Some(op) = operation::load(&env, id) else {
                continue;
            };
            match &status {
                Some(wanted) if op.status != *wanted => continue,
                _ => out.push_back(op),
            }
        }
        out
    }

    /// Operations currently inside their execution window. Read-only: the
    /// window is evaluated against `now` without persisting expiry.
    pub fn list_executable(env: Env) -> Vec<Operation> {
        let now = env.ledger().timestamp();
        let mut out = Vec::new(&env);
        for id in 1..=operation::last_id(&env) {
            let Some(op) = operation::load(&env, id) else {
                continue;
            };
            if is_executable(&op, now) {
                out.push_back(op);
            }
        }
        out
    }

    /// Operations queued from one governance proposal.
    pub fn list_by_proposal(env: Env, proposal_id: u64) -> Vec<Operation> {
        let mut out = Vec::new(&env);
        for id in 1..=operation::last_id(&env) {
            let Some(op) = operation::load(&env, id) else {
                continue;
            };
            if op.proposal_id == proposal_id {
                out.push_back(op);
            }
        }
        out
    }

    /// Seconds until the operation's normal execution window opens; zero
    /// when already open (or past).
    pub fn time_until_executable(env: Env, operation_id: u64) -> Result<u64, ContractError> {
        let op = operation::load(&env, operation_id).ok_or(ContractError::OperationNotFound)?;
        Ok(op.executable_at.saturating_sub(env.ledger().timestamp()))
    }

    pub fn get_authority(env: Env) -> Result<Address, ContractError> {
        env.storage()
            .instance()
            .get(&AUTHORITY)
            .ok_or(ContractError::NotInitialized)
    }

    pub fn get_governance(env: Env) -> Result<Address, ContractError> {
        env.storage()
            .instance()
            .get(&GOVERNANCE)
            .ok_or(ContractError::NotInitialized)
    }

    pub fn is_initialized(env: Env) -> bool {
        env.storage().instance().has(&INITIALIZED)
    }

    // ── Internal helpers ──────────────────────────────────────────────────────

    fn require_initialized(env: &Env) -> Result<(), ContractError> {
        if !env.storage().instance().has(&INITIALIZED) {
            return Err(ContractError::NotInitialized);
        }
        Ok(())
    }

    fn require_authority(env: &Env, caller: &Address) -> Result<(), ContractError> {
        let authority: Address = env
            .storage()
            .instance()
            .get(&AUTHORITY)
            .ok_or(ContractError::NotInitialized)?;
        if *caller != authority {
            return Err(ContractError::Unauthorized);
        }
        Ok(())
    }

    fn require_guardian(env: &Env, caller: &Address) -> Result<(), ContractError> {
        match params::load(env)?.guardian {
            None => Err(ContractError::NoGuardianSet),
            Some(guardian) if guardian != *caller => Err(ContractError::NotGuardian),
            Some(_) => Ok(()),
        }
    }

    fn require_guardian_or_authority(env: &Env, caller: &Address) -> Result<(), ContractError> {
        let authority: Address = env
            .storage()
            .instance()
            .get(&AUTHORITY)
            .ok_or(ContractError::NotInitialized)?;
        if *caller == authority {
            return Ok(());
        }
        match params::load(env)?.guardian {
            Some(guardian) if guardian == *caller => Ok(()),
            _ => Err(ContractError::NotGuardian),
        }
    }

    /// Map a terminal stored status to its status-specific error.
    fn require_queued(op: &Operation) -> Result<(), ContractError> {
        match op.status {
            OperationStatus::Queued => Ok(()),
            OperationStatus::Executed => Err(ContractError::AlreadyExecuted),
            OperationStatus::Cancelled => Err(ContractError::OperationCancelled),
            OperationStatus::Expired => Err(ContractError::OperationExpired),
            OperationStatus::Failed => Err(ContractError::OperationFailed),
        }
    }

    /// Lazy expiry, checked before executability so no path can both
    /// execute and expire the same operation. Surfacing the error rolls
    /// the invocation back, so the durable `Expired` rewrite happens in
    /// [`Self::auto_execute_ready`], the one path that commits it.
    fn check_not_expired(op: &Operation, now: u64) -> Result<(), ContractError> {
        if effective_status(op, now) == OperationStatus::Expired {
            return Err(ContractError::OperationExpired);
        }
        Ok(())
    }

    /// Dispatch the batch and persist the terminal outcome.
    fn dispatch_and_settle(
        env: &Env,
        op: &mut Operation,
        now: u64,
        auto: bool,
    ) -> OperationStatus {
        match dispatch::dispatch_batch(env, op.id, &op.instructions) {
            Ok(_) => {
                op.status = OperationStatus::Executed;
                op.executed_at = now;
                operation::store(env, op);
                if auto {
                    events::publish_operation_auto_executed(env, op.id, now);
                } else {
                    events::publish_operation_executed(env, op.id, now);
                }
            }
            Err(failure) => {
                op.status = OperationStatus::Failed;
                op.failure_reason = failure.reason;
                operation::store(env, op);
                events::publish_auto_execute_failed(
                    env,
                    op.id,
                    &op.failure_reason,
                    failure.error as u32,
                );
            }
        }
        op.status.clone()
    }
}

// ── Queueing core ─────────────────────────────────────────────────────────────

/// Create an operation record from an approved action.
///
/// Timestamps come from the parameters in force *now*; later parameter
/// changes never move an existing window. The integrity hash doubles as
/// the duplicate-submission check — an identical `(instructions, executor,
/// queued_at)` triple cannot re-enter the queue to reset its timer.
pub(crate) fn queue_internal(
    env: &Env,
    proposal_id: u64,
    instructions: Vec<Instruction>,
    executor: Address,
) -> Result<u64, ContractError> {
    if instructions.is_empty() {
        return Err(ContractError::NoInstructions);
    }
    if instructions.len() > dispatch::MAX_INSTRUCTIONS_PER_OPERATION {
        return Err(ContractError::TooManyInstructions);
    }

    let p = params::load(env)?;
    let now = env.ledger().timestamp();
    let executable_at = now.saturating_add(p.min_delay);
    let expires_at = executable_at.saturating_add(p.grace_period);

    let hash = operation::compute_hash(env, &instructions, &executor, now);
    if operation::lookup_by_hash(env, &hash).is_some() {
        return Err(ContractError::OperationAlreadyExists);
    }

    let id = operation::next_id(env);
    let op = Operation {
        id,
        proposal_id,
        instructions,
        executor,
        queued_at: now,
        executable_at,
        expires_at,
        operation_hash: hash.clone(),
        status: OperationStatus::Queued,
        executed_at: 0,
        cancel_reason: String::from_str(env, ""),
        failure_reason: symbol_short!("NONE"),
    };
    operation::store(env, &op);
    operation::index_hash(env, &hash, id);
    events::publish_operation_queued(env, id, proposal_id, executable_at, expires_at);

    Ok(id)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
