//! # Property-Based Test Generators
//!
//! Composable `proptest` strategies for generating valid and adversarial
//! inputs across the timelock's operations.
//!
//! ## Design Decisions
//!
//! - Generators produce *semantic* values (delays, instruction specs, action
//!   sequences), not raw bytes, so tests exercise real code paths rather than
//!   hitting deserialization errors.
//! - Soroban values need an `Env` to construct, so instruction generators
//!   emit plain [`InstructionSpec`] values that the harness materialises.
//! - Action sequence generators model realistic usage: queueing and time
//!   advancement are common, cancellation and emergency execution rare.

extern crate std;

use proptest::prelude::*;
use std::vec::Vec;

use timelock::params::{
    TimelockParams, EMERGENCY_DELAY_FLOOR, GRACE_PERIOD_FLOOR, MIN_DELAY_CEILING, MIN_DELAY_FLOOR,
};

// ── Scalar Generators ────────────────────────────────────────────────────────

/// Strategy for minimum delays inside the absolute bounds, leaving room
/// below for a valid emergency delay (which must be strictly shorter).
pub fn min_delay_strategy() -> impl Strategy<Value = u64> {
    prop_oneof![
        1 => Just(EMERGENCY_DELAY_FLOOR + 1),
        1 => Just(MIN_DELAY_CEILING),
        8 => (EMERGENCY_DELAY_FLOOR + 1..=MIN_DELAY_CEILING),
    ]
}

/// Strategy for grace periods.
pub fn grace_period_strategy() -> impl Strategy<Value = u64> {
    prop_oneof![
        1 => Just(GRACE_PERIOD_FLOOR),
        3 => (GRACE_PERIOD_FLOOR..=86_400u64),
        6 => (86_400u64..=2_592_000u64),
    ]
}

/// Strategy for time jumps in random action sequences.
pub fn time_jump_strategy() -> impl Strategy<Value = u64> {
    prop_oneof![
        2 => (1u64..=3_600u64),          // within an hour
        4 => (3_600u64..=86_400u64),     // up to a day
        3 => (86_400u64..=604_800u64),   // up to a week
        1 => (604_800u64..=5_184_000u64),// deep past any grace period
    ]
}

/// Strategy for complete, valid parameter sets.
///
/// `emergency_delay` is drawn strictly below `min_delay`, and `max_delay`
/// at or above it, so every produced set passes validation.
pub fn params_strategy() -> impl Strategy<Value = TimelockParams> {
    (min_delay_strategy(), grace_period_strategy()).prop_flat_map(|(min_delay, grace_period)| {
        let emergency = EMERGENCY_DELAY_FLOOR..min_delay;
        let max = min_delay..=MIN_DELAY_CEILING.max(min_delay);
        (emergency, max).prop_map(move |(emergency_delay, max_delay)| TimelockParams {
            min_delay,
            max_delay,
            grace_period,
            emergency_delay,
            guardian: None, // filled in by the harness
        })
    })
}

/// Strategy for parameter sets violating at least one absolute bound.
pub fn invalid_params_strategy() -> impl Strategy<Value = TimelockParams> {
    prop_oneof![
        // Below the delay floor.
        (0u64..MIN_DELAY_FLOOR).prop_map(|min_delay| TimelockParams {
            min_delay,
            max_delay: MIN_DELAY_CEILING,
            grace_period: GRACE_PERIOD_FLOOR,
            emergency_delay: 0,
            guardian: None,
        }),
        // Above the delay ceiling.
        (MIN_DELAY_CEILING + 1..=u64::MAX / 2).prop_map(|min_delay| TimelockParams {
            min_delay,
            max_delay: u64::MAX / 2,
            grace_period: GRACE_PERIOD_FLOOR,
            emergency_delay: EMERGENCY_DELAY_FLOOR,
            guardian: None,
        }),
        // Max below min.
        (MIN_DELAY_FLOOR + 1..=MIN_DELAY_CEILING).prop_map(|min_delay| TimelockParams {
            min_delay,
            max_delay: min_delay - 1,
            grace_period: GRACE_PERIOD_FLOOR,
            emergency_delay: EMERGENCY_DELAY_FLOOR,
            guardian: None,
        }),
        // Emergency lane at or past the normal delay.
        (MIN_DELAY_FLOOR..=MIN_DELAY_CEILING).prop_map(|min_delay| TimelockParams {
            min_delay,
            max_delay: MIN_DELAY_CEILING,
            grace_period: GRACE_PERIOD_FLOOR,
            emergency_delay: min_delay,
            guardian: None,
        }),
    ]
}

// ── Instruction Generators ───────────────────────────────────────────────────

/// Environment-free description of one instruction; the harness supplies
/// the addresses and hashes when building the Soroban batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstructionSpec {
    SetParam { value: i128 },
    Spend { amount: i128 },
    Upgrade { seed: u8 },
    SetPolicy { seed: u8 },
    Halt,
}

/// Strategy for instructions that dispatch successfully.
pub fn dispatchable_instruction_strategy() -> impl Strategy<Value = InstructionSpec> {
    prop_oneof![
        4 => any::<i128>().prop_map(|value| InstructionSpec::SetParam { value }),
        3 => (1i128..=1_000_000_000i128).prop_map(|amount| InstructionSpec::Spend { amount }),
        2 => any::<u8>().prop_map(|seed| InstructionSpec::Upgrade { seed }),
        2 => any::<u8>().prop_map(|seed| InstructionSpec::SetPolicy { seed }),
    ]
}

/// Strategy for arbitrary instructions, including ones that fail mid-batch
/// (`Halt`, non-positive spends).
pub fn instruction_strategy() -> impl Strategy<Value = InstructionSpec> {
    prop_oneof![
        8 => dispatchable_instruction_strategy(),
        1 => (i128::MIN..=0i128).prop_map(|amount| InstructionSpec::Spend { amount }),
        1 => Just(InstructionSpec::Halt),
    ]
}

/// A batch that queues successfully and dispatches to completion. Gas-wise
/// the worst case is 5 upgrades, exactly at the budget.
pub fn dispatchable_batch_strategy() -> impl Strategy<Value = Vec<InstructionSpec>> {
    prop::collection::vec(dispatchable_instruction_strategy(), 1..=5)
}

/// A batch within the size cap but with arbitrary dispatch behaviour.
pub fn batch_strategy() -> impl Strategy<Value = Vec<InstructionSpec>> {
    prop::collection::vec(instruction_strategy(), 1..=10)
}

// ── Action Generators ────────────────────────────────────────────────────────

/// Enumeration of timelock actions for randomised sequence testing.
///
/// Operation IDs are drawn from a small range so sequences hit both live
/// and nonexistent operations.
#[derive(Debug, Clone)]
pub enum TimelockAction {
    Queue { specs: Vec<InstructionSpec> },
    Execute { operation_id: u64 },
    EmergencyExecute { operation_id: u64 },
    Cancel { operation_id: u64 },
    AutoRun,
    AdvanceTime { delta: u64 },
}

/// Strategy for individual timelock actions.
pub fn timelock_action_strategy() -> impl Strategy<Value = TimelockAction> {
    let op_id = 1u64..=12u64;
    prop_oneof![
        25 => batch_strategy().prop_map(|specs| TimelockAction::Queue { specs }),
        15 => op_id.clone().prop_map(|operation_id| TimelockAction::Execute { operation_id }),
        4  => op_id.clone().prop_map(|operation_id| TimelockAction::EmergencyExecute { operation_id }),
        6  => op_id.prop_map(|operation_id| TimelockAction::Cancel { operation_id }),
        15 => Just(TimelockAction::AutoRun),
        25 => time_jump_strategy().prop_map(|delta| TimelockAction::AdvanceTime { delta }),
    ]
}

/// Strategy for a sequence of 1–`max_len` actions.
pub fn timelock_action_sequence(max_len: usize) -> impl Strategy<Value = Vec<TimelockAction>> {
    prop::collection::vec(timelock_action_strategy(), 1..=max_len)
}
