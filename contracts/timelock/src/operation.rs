//! Operation record, status machine, storage, and integrity hashing.
//!
//! An operation is the unit of deferred work: one governance proposal's
//! instruction batch plus the timing window computed from the parameters in
//! force when it was queued. Records are mutated only by full rewrite and
//! never deleted, so the store doubles as an audit log.

use soroban_sdk::{
    contracttype, symbol_short, xdr::ToXdr, Address, Bytes, BytesN, Env, String, Symbol, Vec,
};

use common::storage::bump_persistent;
use common::Instruction;

// ── Storage key constants ─────────────────────────────────────────────────────

const OP_CTR: Symbol = symbol_short!("OP_CTR");
const OP: Symbol = symbol_short!("OP");
const OP_HASH: Symbol = symbol_short!("OP_HASH");

// ── Status ────────────────────────────────────────────────────────────────────

/// Lifecycle status of an operation.
///
/// ```text
/// Queued ──► Executed   (dispatched within the window)
///      └───► Cancelled  (guardian / authority abort)
///      └───► Expired    (window elapsed unexecuted)
///      └───► Failed     (dispatch or hash verification failed)
/// ```
///
/// `Queued` is the only non-terminal status; every transition is one-way.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum OperationStatus {
    Queued,
    Executed,
    Cancelled,
    Expired,
    Failed,
}

impl OperationStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, OperationStatus::Queued)
    }
}

// ── Operation record ──────────────────────────────────────────────────────────

/// A queued, delayed batch of instructions tied to one governance proposal.
#[contracttype]
#[derive(Clone, Debug)]
pub struct Operation {
    /// Assigned sequentially from 1, never reused.
    pub id: u64,
    /// Back-reference to the originating governance proposal.
    pub proposal_id: u64,
    /// Ordered instruction batch, immutable once queued.
    pub instructions: Vec<Instruction>,
    /// Account authorized to trigger manual execution.
    pub executor: Address,
    pub queued_at: u64,
    /// `queued_at + min_delay`, fixed at creation.
    pub executable_at: u64,
    /// `executable_at + grace_period`, fixed at creation.
    pub expires_at: u64,
    /// SHA-256 over `(instructions, executor, queued_at)`; checked before
    /// every dispatch and indexed for duplicate rejection.
    pub operation_hash: BytesN<32>,
    pub status: OperationStatus,
    /// Set on the `Executed` transition, zero otherwise.
    pub executed_at: u64,
    /// Set on the `Cancelled` transition, empty otherwise.
    pub cancel_reason: String,
    /// Set on the `Failed` transition, `NONE` otherwise.
    pub failure_reason: Symbol,
}

/// Status an operation holds once the clock is taken into account.
///
/// Pure function, applied at the top of every entry point that acts on an
/// operation. Expiry is evaluated before executability, so no path can both
/// execute and expire the same record. Callers persist the correction when
/// it differs from the stored status.
pub fn effective_status(op: &Operation, now: u64) -> OperationStatus {
    if op.status == OperationStatus::Queued && now >= op.expires_at {
        return OperationStatus::Expired;
    }
    op.status.clone()
}

/// True when the operation may be dispatched at `now` via the normal path.
pub fn is_executable(op: &Operation, now: u64) -> bool {
    op.status == OperationStatus::Queued && now >= op.executable_at && now < op.expires_at
}

// ── Integrity hash ────────────────────────────────────────────────────────────

/// Deterministic digest over `(instructions, executor, queued_at)`.
///
/// Serves two purposes: duplicate-submission rejection at queue time (the
/// sole defense against re-queueing an identical action to reset its timer)
/// and tamper detection at execution time.
pub fn compute_hash(
    env: &Env,
    instructions: &Vec<Instruction>,
    executor: &Address,
    queued_at: u64,
) -> BytesN<32> {
    let mut data = Bytes::new(env);
    data.append(&instructions.clone().to_xdr(env));
    data.append(&executor.clone().to_xdr(env));
    data.append(&queued_at.to_xdr(env));
    env.crypto().sha256(&data).to_bytes()
}

/// Recompute the digest from the stored fields and compare.
pub fn verify_hash(env: &Env, op: &Operation) -> bool {
    compute_hash(env, &op.instructions, &op.executor, op.queued_at) == op.operation_hash
}

// ── Storage helpers ──────────────────────────────────────────────────────────

pub(crate) fn next_id(env: &Env) -> u64 {
    let id: u64 = env
        .storage()
        .instance()
        .get(&OP_CTR)
        .unwrap_or(0u64)
        .saturating_add(1);
    env.storage().instance().set(&OP_CTR, &id);
    id
}

/// Highest ID handed out so far; IDs are dense in `1..=last_id`.
pub(crate) fn last_id(env: &Env) -> u64 {
    env.storage().instance().get(&OP_CTR).unwrap_or(0)
}

fn op_key(id: u64) -> (Symbol, u64) {
    (OP, id)
}

fn hash_key(hash: &BytesN<32>) -> (Symbol, BytesN<32>) {
    (OP_HASH, hash.clone())
}

pub(crate) fn store(env: &Env, op: &Operation) {
    let key = op_key(op.id);
    env.storage().persistent().set(&key, op);
    bump_persistent(env, &key);
}

pub(crate) fn load(env: &Env, id: u64) -> Option<Operation> {
    env.storage().persistent().get(&op_key(id))
}

pub(crate) fn index_hash(env: &Env, hash: &BytesN<32>, id: u64) {
    let key = hash_key(hash);
    env.storage().persistent().set(&key, &id);
    bump_persistent(env, &key);
}

pub(crate) fn lookup_by_hash(env: &Env, hash: &BytesN<32>) -> Option<u64> {
    env.storage().persistent().get(&hash_key(hash))
}
