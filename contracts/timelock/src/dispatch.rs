//! Resource-bounded batch dispatch.
//!
//! Every execution path (manual, emergency, automatic) funnels through
//! [`dispatch_batch`]. The dispatcher matches exhaustively over the closed
//! [`Instruction`] enum, executes strictly in order, and stops at the first
//! failing instruction. Effects already applied are **not** rolled back —
//! the surrounding ledger has no nested-transaction semantics across
//! independent instructions, and the `Failed` record plus per-instruction
//! dispatch events preserve the audit trail of what ran.
//!
//! Resource bounds are checked *before* any effect, never mid-dispatch:
//! the batch-size cap at queue time and again here, the shared gas budget
//! before each instruction.

use soroban_sdk::{symbol_short, Env, Symbol, Vec};

use common::Instruction;

use crate::events;
use crate::ContractError;

// ── Resource bounds ───────────────────────────────────────────────────────────

/// Maximum instructions a single operation may carry.
pub const MAX_INSTRUCTIONS_PER_OPERATION: u32 = 10;

/// Fixed unit budget shared across a whole batch.
pub const MAX_AUTO_EXECUTION_GAS: u64 = 2_000_000;

/// Terminal outcomes (`Executed` + `Failed`) the automatic pass may produce
/// in one block; eligible operations beyond the cap stay `Queued`.
pub const MAX_OPERATIONS_PER_BLOCK: u32 = 5;

// ── Failure reporting ─────────────────────────────────────────────────────────

/// Why a dispatch stopped, with a short tag persisted as `failure_reason`.
pub struct DispatchFailure {
    pub error: ContractError,
    pub reason: Symbol,
}

/// Unit cost charged against the shared budget per instruction kind.
///
/// Costs are deliberately coarse; they exist to bound per-operation work
/// inside the block budget, not to price execution precisely.
fn gas_cost(instruction: &Instruction) -> u64 {
    match instruction {
        Instruction::SetParam(..) => 150_000,
        Instruction::Spend(..) => 200_000,
        Instruction::Upgrade(..) => 400_000,
        Instruction::SetPolicy(..) => 150_000,
        Instruction::Halt(..) => 50_000,
    }
}

// ── Dispatch core ─────────────────────────────────────────────────────────────

/// Dispatch a whole batch in order under the shared gas budget.
///
/// Returns the number of instructions dispatched, or the failure that
/// stopped the batch. Instructions before the failing one have already
/// taken effect.
pub fn dispatch_batch(
    env: &Env,
    operation_id: u64,
    instructions: &Vec<Instruction>,
) -> Result<u32, DispatchFailure> {
    if instructions.len() > MAX_INSTRUCTIONS_PER_OPERATION {
        return Err(DispatchFailure {
            error: ContractError::TooManyInstructions,
            reason: symbol_short!("BATCHSIZE"),
        });
    }

    let mut spent: u64 = 0;
    let mut dispatched: u32 = 0;

    for (index, instruction) in instructions.iter().enumerate() {
        let cost = gas_cost(&instruction);
        if spent.saturating_add(cost) > MAX_AUTO_EXECUTION_GAS {
            return Err(DispatchFailure {
                error: ContractError::GasBudgetExceeded,
                reason: symbol_short!("GAS"),
            });
        }
        spent = spent.saturating_add(cost);

        apply(env, operation_id, index as u32, &instruction)?;
        dispatched = dispatched.saturating_add(1);
    }

    Ok(dispatched)
}

/// Apply one instruction.
///
/// The effect of each instruction is a published dispatch event carrying
/// the exact call intent; off-chain executors and indexers act on it. The
/// validation here is what can fail on-chain.
fn apply(
    env: &Env,
    operation_id: u64,
    index: u32,
    instruction: &Instruction,
) -> Result<(), DispatchFailure> {
    match instruction {
        Instruction::Spend(_, amount) if *amount <= 0 => {
            return Err(DispatchFailure {
                error: ContractError::InstructionFailed,
                reason: symbol_short!("BADAMT"),
            });
        }
        Instruction::Halt(..) => {
            return Err(DispatchFailure {
                error: ContractError::InstructionFailed,
                reason: symbol_short!("HALT"),
            });
        }
        _ => {}
    }

    events::publish_dispatch(env, operation_id, index, instruction);
    Ok(())
}
