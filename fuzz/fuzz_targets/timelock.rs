#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use soroban_sdk::{
    symbol_short,
    testutils::{Address as _, Ledger as _},
    Address, Env, String, Vec,
};

use common::Instruction;
use timelock::operation::OperationStatus;
use timelock::params::TimelockParams;
use timelock::{TimelockContract, TimelockContractClient};

/// Actions modelling all timelock entry points.
///
/// Each variant carries the minimal data needed for execution. Values are
/// bounded to realistic ranges to avoid wasting fuzz cycles on trivially
/// rejected inputs.
#[derive(Arbitrary, Debug)]
pub enum FuzzAction {
    Queue { batch_len: u8, value: u32 },
    Execute { operation_id: u8 },
    EmergencyExecute { operation_id: u8 },
    Cancel { operation_id: u8 },
    AutoRun,
    UpdateMinDelay { delay: u32 },
    AdvanceTime { delta: u32 },
}

fuzz_target!(|actions: std::vec::Vec<FuzzAction>| {
    let env = Env::default();
    env.mock_all_auths();

    let authority = Address::generate(&env);
    let guardian = Address::generate(&env);

    let contract_id = env.register(TimelockContract, ());
    let client = TimelockContractClient::new(&env, &contract_id);

    let params = TimelockParams {
        min_delay: 86_400,
        max_delay: 2_592_000,
        grace_period: 604_800,
        emergency_delay: 3_600,
        guardian: Some(guardian.clone()),
    };
    if client
        .try_initialize(&authority, &Address::generate(&env), &params)
        .is_err()
    {
        return;
    }

    let mut proposal_ref: u64 = 0;

    for action in actions {
        match action {
            FuzzAction::Queue { batch_len, value } => {
                let mut batch = Vec::new(&env);
                for i in 0..(batch_len % 12).max(1) {
                    batch.push_back(Instruction::SetParam(Address::generate(&env), symbol_short!("RATE"), value as i128 + i as i128));
                }
                proposal_ref += 1;
                let _ = client.try_queue_operation(&authority, &proposal_ref, &batch, &authority);
            }
            FuzzAction::Execute { operation_id } => {
                let _ = client.try_execute_operation(&authority, &(operation_id as u64));
            }
            FuzzAction::EmergencyExecute { operation_id } => {
                let justification = String::from_str(&env, "fuzzed emergency justification");
                let _ = client.try_emergency_execute(
                    &guardian,
                    &(operation_id as u64),
                    &justification,
                );
            }
            FuzzAction::Cancel { operation_id } => {
                let reason = String::from_str(&env, "fuzzed cancellation");
                let _ = client.try_cancel_operation(&guardian, &(operation_id as u64), &reason);
            }
            FuzzAction::AutoRun => {
                let _ = client.try_auto_execute_ready();
            }
            FuzzAction::UpdateMinDelay { delay } => {
                let mut p = params.clone();
                p.min_delay = delay as u64;
                let _ = client.try_update_params(&authority, &p);
            }
            FuzzAction::AdvanceTime { delta } => {
                let ts = env.ledger().timestamp().saturating_add(delta as u64);
                env.ledger().set_timestamp(ts);
            }
        }

        // ── Post-action invariant checks ──
        let now = env.ledger().timestamp();
        let count = client.operation_count();
        for id in 1..=count {
            let op = client
                .get_operation(&id)
                .expect("INVARIANT VIOLATION: operation record disappeared");
            assert_eq!(op.id, id, "INVARIANT VIOLATION: id mismatch in store");
            assert!(
                op.queued_at < op.executable_at && op.executable_at < op.expires_at,
                "INVARIANT VIOLATION: malformed window on operation {}",
                id
            );
            match op.status {
                OperationStatus::Executed => {
                    assert!(
                        op.executed_at >= op.queued_at && op.executed_at <= now,
                        "INVARIANT VIOLATION: executed_at outside the operation's lifetime"
                    );
                }
                _ => {
                    assert_eq!(
                        op.executed_at, 0,
                        "INVARIANT VIOLATION: executed_at set on a non-executed operation"
                    );
                }
            }
        }
    }
});
