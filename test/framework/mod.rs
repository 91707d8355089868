//! # Aegis Contract Testing Framework
//!
//! A reusable testing harness for the timelock and governance contracts
//! supporting property-based testing and invariant checking.
//!
//! ## Architecture
//!
//! ```text
//! test/framework/
//! ├── mod.rs             — Core TestEnv, timelock harness, re-exports
//! ├── generators.rs      — Property-based test value generators
//! └── invariants.rs      — State invariant definitions & verification
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use test_framework::{TestEnv, TimelockHarness};
//!
//! let mut env = TestEnv::new();
//! let guardian = env.generate_address();
//! let harness = TimelockHarness::new(&mut env, TimelockHarness::default_params(&guardian));
//! let id = harness.queue(&[InstructionSpec::SetParam { value: 1 }]);
//! ```

extern crate std;

pub mod generators;

use soroban_sdk::{
    symbol_short,
    testutils::{Address as _, Ledger as _},
    Address, BytesN, Env, String, Vec as SorobanVec,
};

use common::Instruction;
use governance::{GovernanceContract, GovernanceContractClient};
use timelock::operation::OperationStatus;
use timelock::params::TimelockParams;
use timelock::{ContractError, TimelockContract, TimelockContractClient};

use generators::{InstructionSpec, TimelockAction};

// ── Core Test Environment ────────────────────────────────────────────────────

/// A high-level test environment that wraps the Soroban `Env` and provides
/// contract deployment, time control, and address management.
pub struct TestEnv {
    pub env: Env,
    generated_addresses: std::vec::Vec<Address>,
}

impl TestEnv {
    /// Create a new test environment with all auth mocked.
    pub fn new() -> Self {
        let env = Env::default();
        env.mock_all_auths();
        Self {
            env,
            generated_addresses: std::vec::Vec::new(),
        }
    }

    /// Generate a fresh Soroban address (cached for re-use).
    pub fn generate_address(&mut self) -> Address {
        let addr = Address::generate(&self.env);
        self.generated_addresses.push(addr.clone());
        addr
    }

    /// Set the ledger timestamp.
    pub fn set_timestamp(&self, ts: u64) {
        self.env.ledger().set_timestamp(ts);
    }

    /// Advance the ledger timestamp by `delta` seconds.
    pub fn advance_time(&self, delta: u64) {
        let current = self.env.ledger().timestamp();
        self.env.ledger().set_timestamp(current.saturating_add(delta));
    }

    /// Current ledger timestamp.
    pub fn timestamp(&self) -> u64 {
        self.env.ledger().timestamp()
    }
}

impl Default for TestEnv {
    fn default() -> Self {
        Self::new()
    }
}

// ── Timelock Harness ─────────────────────────────────────────────────────────

/// Pre-wired timelock fixture with the governance registry deployed and both
/// contracts cross-configured.
pub struct TimelockHarness<'a> {
    pub env: &'a TestEnv,
    pub client: TimelockContractClient<'static>,
    pub gov_client: GovernanceContractClient<'static>,
    pub contract_id: Address,
    pub gov_id: Address,
    pub authority: Address,
    pub guardian: Address,
    next_proposal_ref: std::cell::Cell<u64>,
}

impl<'a> TimelockHarness<'a> {
    /// A permissive parameter set used by most tests: 1 day delay, 7 day
    /// grace, 1 hour emergency lane.
    pub fn default_params(guardian: &Address) -> TimelockParams {
        TimelockParams {
            min_delay: 86_400,
            max_delay: 2_592_000,
            grace_period: 604_800,
            emergency_delay: 3_600,
            guardian: Some(guardian.clone()),
        }
    }

    /// Deploy and initialize the timelock plus a governance registry wired
    /// to it.
    pub fn new(env: &'a mut TestEnv, mut params: TimelockParams) -> Self {
        let authority = env.generate_address();
        let guardian = env.generate_address();
        if params.guardian.is_none() {
            params.guardian = Some(guardian.clone());
        }

        let contract_id = env.env.register(TimelockContract, ());
        let client = TimelockContractClient::new(&env.env, &contract_id);

        let gov_id = env.env.register(GovernanceContract, ());
        let gov_client = GovernanceContractClient::new(&env.env, &gov_id);
        gov_client.initialize(&authority, &contract_id);

        client.initialize(&authority, &gov_id, &params);

        Self {
            env,
            client,
            gov_client,
            contract_id,
            gov_id,
            authority,
            guardian,
            next_proposal_ref: std::cell::Cell::new(1),
        }
    }

    /// Materialise abstract instruction specs into a Soroban batch.
    pub fn build_batch(&self, specs: &[InstructionSpec]) -> SorobanVec<Instruction> {
        let e = &self.env.env;
        let mut batch = SorobanVec::new(e);
        for spec in specs {
            batch.push_back(match spec {
                InstructionSpec::SetParam { value } => Instruction::SetParam(Address::generate(e), symbol_short!("RATE"), *value),
                InstructionSpec::Spend { amount } => Instruction::Spend(Address::generate(e), *amount),
                InstructionSpec::Upgrade { seed } => Instruction::Upgrade(Address::generate(e), BytesN::from_array(e, &[*seed; 32])),
                InstructionSpec::SetPolicy { seed } => Instruction::SetPolicy(Address::generate(e), BytesN::from_array(e, &[*seed; 32])),
                InstructionSpec::Halt => Instruction::Halt(symbol_short!("STOP")),
            });
        }
        batch
    }

    /// Queue a batch directly as the authority; returns the operation ID.
    pub fn queue(&self, specs: &[InstructionSpec]) -> u64 {
        let batch = self.build_batch(specs);
        let proposal_ref = self.next_proposal_ref.get();
        self.next_proposal_ref.set(proposal_ref + 1);
        self.client
            .queue_operation(&self.authority, &proposal_ref, &batch, &self.authority)
    }

    /// Attempt to queue, surfacing the contract error on failure.
    pub fn try_queue(&self, specs: &[InstructionSpec]) -> Result<u64, ContractError> {
        let batch = self.build_batch(specs);
        let proposal_ref = self.next_proposal_ref.get();
        self.next_proposal_ref.set(proposal_ref + 1);
        self.client
            .try_queue_operation(&self.authority, &proposal_ref, &batch, &self.authority)
            .map(|v| v.unwrap())
            .map_err(|e| e.unwrap())
    }

    /// Apply one abstract action; errors are an expected part of random
    /// sequences and are reported, never panicked on.
    pub fn apply(&self, action: &TimelockAction) -> ActionOutcome {
        match action {
            TimelockAction::Queue { specs } => match self.try_queue(specs) {
                Ok(_) => ActionOutcome::Ok,
                Err(e) => ActionOutcome::Rejected(e as u32),
            },
            TimelockAction::Execute { operation_id } => {
                match self.client.try_execute_operation(&self.authority, operation_id) {
                    Ok(_) => ActionOutcome::Ok,
                    Err(e) => ActionOutcome::Rejected(e.unwrap() as u32),
                }
            }
            TimelockAction::EmergencyExecute { operation_id } => {
                let justification =
                    String::from_str(&self.env.env, "randomised emergency action under test");
                match self
                    .client
                    .try_emergency_execute(&self.guardian, operation_id, &justification)
                {
                    Ok(_) => ActionOutcome::Ok,
                    Err(e) => ActionOutcome::Rejected(e.unwrap() as u32),
                }
            }
            TimelockAction::Cancel { operation_id } => {
                let reason = String::from_str(&self.env.env, "randomised cancellation");
                match self
                    .client
                    .try_cancel_operation(&self.guardian, operation_id, &reason)
                {
                    Ok(_) => ActionOutcome::Ok,
                    Err(e) => ActionOutcome::Rejected(e.unwrap() as u32),
                }
            }
            TimelockAction::AutoRun => match self.client.try_auto_execute_ready() {
                Ok(_) => ActionOutcome::Ok,
                Err(e) => ActionOutcome::Rejected(e.unwrap() as u32),
            },
            TimelockAction::AdvanceTime { delta } => {
                self.env.advance_time(*delta);
                ActionOutcome::Ok
            }
        }
    }

    /// Snapshot of all observable timelock state for invariant checking.
    pub fn snapshot(&self) -> TimelockSnapshot {
        let count = self.client.operation_count();
        let mut operations = std::vec::Vec::with_capacity(count as usize);
        for id in 1..=count {
            if let Some(op) = self.client.get_operation(&id) {
                operations.push(OperationRecord {
                    id: op.id,
                    status: op.status,
                    queued_at: op.queued_at,
                    executable_at: op.executable_at,
                    expires_at: op.expires_at,
                    executed_at: op.executed_at,
                    hash: op.operation_hash.to_array(),
                });
            }
        }
        TimelockSnapshot {
            timestamp: self.env.timestamp(),
            operation_count: count,
            operations,
        }
    }
}

// ── Snapshots ────────────────────────────────────────────────────────────────

/// Flattened view of one operation, cheap to compare across snapshots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationRecord {
    pub id: u64,
    pub status: OperationStatus,
    pub queued_at: u64,
    pub executable_at: u64,
    pub expires_at: u64,
    pub executed_at: u64,
    pub hash: [u8; 32],
}

/// Immutable snapshot of timelock state at a point in time.
#[derive(Debug, Clone)]
pub struct TimelockSnapshot {
    pub timestamp: u64,
    pub operation_count: u64,
    pub operations: std::vec::Vec<OperationRecord>,
}

impl TimelockSnapshot {
    pub fn count_with_status(&self, status: &OperationStatus) -> usize {
        self.operations
            .iter()
            .filter(|op| op.status == *status)
            .count()
    }
}

// ── Test Outcome Tracking ────────────────────────────────────────────────────

/// Result of a single test action.
#[derive(Debug, Clone)]
pub enum ActionOutcome {
    /// The action succeeded.
    Ok,
    /// The action was rejected with a contract error code.
    Rejected(u32),
}
