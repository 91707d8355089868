#![no_std]

//! # Governance Proposal Registry
//!
//! A minimal proposal store for the Aegis suite. Voting, deposits, and
//! quorum logic live off this contract; it records proposals, lets the
//! admin mark them passed, and executes passed proposals on request.
//!
//! The timelock engine sits in front of this contract: its bridge runs
//! before [`GovernanceContract::execute_all_passed`] each block, pulls every
//! `Passed` proposal into a delayed operation, and overwrites the status
//! with `TimelockQueued` so the execution step here refuses it. Only the
//! configured timelock address (or the admin) may overwrite a status.

use soroban_sdk::{
    contract, contractimpl, contracttype, symbol_short, Address, Env, String, Symbol, Vec,
};

use common::storage::bump_persistent;
use common::{Instruction, Proposal, ProposalStatus};

// ── Storage key constants ─────────────────────────────────────────────────────

const ADMIN: Symbol = symbol_short!("ADMIN");
const INITIALIZED: Symbol = symbol_short!("INIT");
const TIMELOCK: Symbol = symbol_short!("TLK_CTR");
const PROPOSAL_CTR: Symbol = symbol_short!("PROP_CTR");
const PROPOSAL: Symbol = symbol_short!("PROP");

// ── Error codes ───────────────────────────────────────────────────────────────

#[soroban_sdk::contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[repr(u32)]
pub enum GovError {
    NotInitialized = 1,
    AlreadyInitialized = 2,
    Unauthorized = 10,
    ProposalNotFound = 100,
    NoInstructions = 101,
    NotInVoting = 102,
    StatusIsTerminal = 103,
}

// ── Public return types ───────────────────────────────────────────────────────

/// Outcome of an `execute_all_passed` sweep.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ExecutionSweep {
    /// Proposals whose instructions were dispatched this call.
    pub executed: u32,
    /// Proposals inspected but skipped (not `Passed`).
    pub skipped: u32,
}

// ── Contract ──────────────────────────────────────────────────────────────────

#[contract]
pub struct GovernanceContract;

#[contractimpl]
impl GovernanceContract {
    // ── Initialisation ────────────────────────────────────────────────────────

    /// Bootstrap the registry.
    ///
    /// * `timelock` — address of the timelock engine; the only identity
    ///                besides the admin allowed to overwrite proposal status.
    pub fn initialize(env: Env, admin: Address, timelock: Address) -> Result<(), GovError> {
        if env.storage().instance().has(&INITIALIZED) {
            return Err(GovError::AlreadyInitialized);
        }
        admin.require_auth();

        env.storage().instance().set(&ADMIN, &admin);
        env.storage().instance().set(&TIMELOCK, &timelock);
        env.storage().instance().set(&INITIALIZED, &true);

        Ok(())
    }

    // ── Proposal lifecycle ────────────────────────────────────────────────────

    /// Record a new proposal in `Voting` status.
    pub fn create_proposal(
        env: Env,
        proposer: Address,
        title: String,
        instructions: Vec<Instruction>,
    ) -> Result<u64, GovError> {
        Self::require_initialized(&env)?;
        proposer.require_auth();

        if instructions.is_empty() {
            return Err(GovError::NoInstructions);
        }

        let id = next_id(&env);
        let proposal = Proposal {
            id,
            proposer: proposer.clone(),
            title,
            instructions,
            status: ProposalStatus::Voting,
            created_at: env.ledger().timestamp(),
        };
        store_proposal(&env, &proposal);

        env.events()
            .publish((symbol_short!("PROP_NEW"), id), proposer);

        Ok(id)
    }

    /// Mark a proposal as passed. Admin-only; stands in for the tally step.
    pub fn mark_passed(env: Env, caller: Address, proposal_id: u64) -> Result<(), GovError> {
        Self::require_initialized(&env)?;
        caller.require_auth();
        Self::require_admin(&env, &caller)?;

        let mut proposal = load_proposal(&env, proposal_id).ok_or(GovError::ProposalNotFound)?;
        if proposal.status != ProposalStatus::Voting {
            return Err(GovError::NotInVoting);
        }

        proposal.status = ProposalStatus::Passed;
        store_proposal(&env, &proposal);

        env.events()
            .publish((symbol_short!("PROP_PASS"), proposal_id), ());

        Ok(())
    }

    /// Overwrite a proposal's status. Timelock or admin only.
    ///
    /// Once a proposal has reached a terminal status it stays there; the
    /// timelock relies on this to keep `TimelockQueued` sticky.
    pub fn set_status(
        env: Env,
        caller: Address,
        proposal_id: u64,
        status: ProposalStatus,
    ) -> Result<(), GovError> {
        Self::require_initialized(&env)?;
        caller.require_auth();

        let timelock: Address = env
            .storage()
            .instance()
            .get(&TIMELOCK)
            .ok_or(GovError::NotInitialized)?;
        let admin: Address = env
            .storage()
            .instance()
            .get(&ADMIN)
            .ok_or(GovError::NotInitialized)?;
        if caller != timelock && caller != admin {
            return Err(GovError::Unauthorized);
        }

        let mut proposal = load_proposal(&env, proposal_id).ok_or(GovError::ProposalNotFound)?;
        if proposal.status.is_terminal() {
            return Err(GovError::StatusIsTerminal);
        }

        proposal.status = status.clone();
        store_proposal(&env, &proposal);

        env.events()
            .publish((symbol_short!("PROP_STAT"), proposal_id), status);

        Ok(())
    }

    // ── Execution ─────────────────────────────────────────────────────────────

    /// Dispatch every `Passed` proposal. Permissionless block step.
    ///
    /// When the timelock bridge has run first there is nothing left in
    /// `Passed` and this sweep is a no-op — that ordering is the whole
    /// bypass-prevention design.
    pub fn execute_all_passed(env: Env) -> Result<ExecutionSweep, GovError> {
        Self::require_initialized(&env)?;

        let last = env
            .storage()
            .instance()
            .get(&PROPOSAL_CTR)
            .unwrap_or(0u64);
        let mut sweep = ExecutionSweep {
            executed: 0,
            skipped: 0,
        };

        for id in 1..=last {
            let Some(mut proposal) = load_proposal(&env, id) else {
                continue;
            };
            if proposal.status != ProposalStatus::Passed {
                sweep.skipped = sweep.skipped.saturating_add(1);
                continue;
            }

            for (i, instruction) in proposal.instructions.iter().enumerate() {
                env.events().publish(
                    (symbol_short!("GOV_DISP"), id, i as u32),
                    instruction.kind(),
                );
            }

            proposal.status = ProposalStatus::Executed;
            store_proposal(&env, &proposal);
            env.events().publish((symbol_short!("PROP_EXE"), id), ());
            sweep.executed = sweep.executed.saturating_add(1);
        }

        Ok(sweep)
    }

    // ── View functions ────────────────────────────────────────────────────────

    pub fn get_proposal(env: Env, proposal_id: u64) -> Option<Proposal> {
        load_proposal(&env, proposal_id)
    }

    pub fn proposal_count(env: Env) -> u64 {
        env.storage().instance().get(&PROPOSAL_CTR).unwrap_or(0)
    }

    pub fn get_admin(env: Env) -> Result<Address, GovError> {
        env.storage()
            .instance()
            .get(&ADMIN)
            .ok_or(GovError::NotInitialized)
    }

    pub fn is_initialized(env: Env) -> bool {
        env.storage().instance().has(&INITIALIZED)
    }

    // ── Internal helpers ──────────────────────────────────────────────────────

    fn require_initialized(env: &Env) -> Result<(), GovError> {
        if !env.storage().instance().has(&INITIALIZED) {
            return Err(GovError::NotInitialized);
        }
        Ok(())
    }

    fn require_admin(env: &Env, caller: &Address) -> Result<(), GovError> {
        let admin: Address = env
            .storage()
            .instance()
            .get(&ADMIN)
            .ok_or(GovError::NotInitialized)?;
        if *caller != admin {
            return Err(GovError::Unauthorized);
        }
        Ok(())
    }
}

// ── Storage helpers ──────────────────────────────────────────────────────────

fn next_id(env: &Env) -> u64 {
    let id: u64 = env
        .storage()
        .instance()
        .get(&PROPOSAL_CTR)
        .unwrap_or(0u64)
        .saturating_add(1);
    env.storage().instance().set(&PROPOSAL_CTR, &id);
    id
}

fn proposal_key(id: u64) -> (Symbol, u64) {
    (PROPOSAL, id)
}

fn store_proposal(env: &Env, proposal: &Proposal) {
    let key = proposal_key(proposal.id);
    env.storage().persistent().set(&key, proposal);
    bump_persistent(env, &key);
}

fn load_proposal(env: &Env, id: u64) -> Option<Proposal> {
    env.storage().persistent().get(&proposal_key(id))
}

// ── Tests ─────────────────────────────────────────────────────────────────────
