//! The closed instruction set carried by proposals and timelock operations.
//!
//! Dispatch over [`Instruction`] is an exhaustive `match`: adding a new
//! instruction kind is a compile-time change to every dispatcher, not a
//! runtime registry lookup that can silently miss a handler.

use soroban_sdk::{contracttype, symbol_short, Address, BytesN, Symbol};

/// A single serialized, typed instruction inside a batched proposal.
///
/// The batch is immutable once queued; the timelock engine re-verifies an
/// integrity hash over the whole batch before dispatching it.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Instruction {
    /// Change a numeric parameter on a target contract: (target, key, value).
    SetParam(Address, Symbol, i128),
    /// Authorise a treasury spend to a recipient: (to, amount).
    Spend(Address, i128),
    /// Upgrade a target contract to a new WASM hash: (target, new_wasm_hash).
    Upgrade(Address, BytesN<32>),
    /// Swap an access-control or compliance policy on a target:
    /// (target, policy_hash).
    SetPolicy(Address, BytesN<32>),
    /// Unconditionally failing instruction, reserved for drills and for
    /// verifying the failure-containment paths on a live deployment.
    Halt(Symbol),
}

impl Instruction {
    /// Short tag identifying the instruction kind, used in dispatch events.
    pub fn kind(&self) -> Symbol {
        match self {
            Instruction::SetParam(..) => symbol_short!("SETPARAM"),
            Instruction::Spend(..) => symbol_short!("SPEND"),
            Instruction::Upgrade(..) => symbol_short!("UPGRADE"),
            Instruction::SetPolicy(..) => symbol_short!("SETPOLICY"),
            Instruction::Halt(..) => symbol_short!("HALT"),
        }
    }
}
