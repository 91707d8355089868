//! Proposal record and status shared between governance and the timelock.
//!
//! The timelock engine consumes the governance registry purely through this
//! narrow contract: fetch a proposal, inspect its status and instruction
//! batch, and overwrite the status with a terminal value.

use soroban_sdk::{contracttype, Address, String, Vec};

use crate::instruction::Instruction;

/// Status of a governance proposal.
///
/// `Passed` is the only status the timelock engine will pick up.
/// `TimelockQueued` is terminal from governance's point of view: the
/// proposal's effect now lives in a timelock operation, and the governance
/// execution step must refuse it.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ProposalStatus {
    Voting,
    Passed,
    Rejected,
    Executed,
    TimelockQueued,
}

impl ProposalStatus {
    /// True when no further status transition is allowed.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, ProposalStatus::Voting | ProposalStatus::Passed)
    }
}

/// The on-chain proposal record.
#[contracttype]
#[derive(Clone, Debug)]
pub struct Proposal {
    pub id: u64,
    pub proposer: Address,
    /// Human-readable summary stored as a short on-chain string.
    pub title: String,
    /// Ordered instruction batch executed when the proposal passes.
    pub instructions: Vec<Instruction>,
    pub status: ProposalStatus,
    pub created_at: u64,
}
