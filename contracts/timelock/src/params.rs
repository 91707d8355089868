//! Timelock parameters and validation.
//!
//! Absolute bounds are hard-coded constants independent of governance: no
//! parameter vote, however it passes, can push the delay window outside
//! them. On top of the absolute bounds, `validate_update` enforces a
//! relative bound so a single vote cannot gut the security margin.

use soroban_sdk::{contracttype, symbol_short, Address, Env, Symbol};

use crate::ContractError;

// ── Storage key ───────────────────────────────────────────────────────────────

const PARAMS: Symbol = symbol_short!("PARAMS");

// ── Absolute bounds (seconds) ─────────────────────────────────────────────────

/// Lowest `min_delay` any parameter set may carry: 1 hour.
pub const MIN_DELAY_FLOOR: u64 = 3_600;
/// Highest `min_delay` any parameter set may carry: 30 days.
pub const MIN_DELAY_CEILING: u64 = 2_592_000;
/// Lowest grace period: 1 hour.
pub const GRACE_PERIOD_FLOOR: u64 = 3_600;
/// Lowest emergency delay: 1 hour. The guardian fast lane is shorter than
/// the normal path but never instant.
pub const EMERGENCY_DELAY_FLOOR: u64 = 3_600;

// ── Parameter set ─────────────────────────────────────────────────────────────

/// Chain-wide timelock configuration, a singleton in instance storage.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TimelockParams {
    /// Mandatory wait between queueing and the earliest execution.
    pub min_delay: u64,
    /// Upper bound accepted for `min_delay` updates.
    pub max_delay: u64,
    /// Window after `executable_at` during which execution is still valid.
    pub grace_period: u64,
    /// Reduced wait for the guardian's emergency path.
    pub emergency_delay: u64,
    /// Identity empowered to cancel and emergency-execute. `None` means no
    /// guardian override is configured.
    pub guardian: Option<Address>,
}

impl TimelockParams {
    /// Check this parameter set against the absolute bounds.
    pub fn validate(&self) -> Result<(), ContractError> {
        if self.min_delay < MIN_DELAY_FLOOR || self.min_delay > MIN_DELAY_CEILING {
            return Err(ContractError::InvalidParams);
        }
        if self.min_delay > self.max_delay {
            return Err(ContractError::InvalidParams);
        }
        if self.grace_period < GRACE_PERIOD_FLOOR {
            return Err(ContractError::InvalidParams);
        }
        if self.emergency_delay < EMERGENCY_DELAY_FLOOR
            || self.emergency_delay >= self.min_delay
        {
            return Err(ContractError::InvalidParams);
        }
        Ok(())
    }

    /// Check a replacement parameter set against both the absolute bounds
    /// and the previous value: `min_delay` may not drop below half of the
    /// old value in one update.
    pub fn validate_update(&self, old: &TimelockParams) -> Result<(), ContractError> {
        self.validate()?;
        if self.min_delay < old.min_delay / 2 {
            return Err(ContractError::InvalidParams);
        }
        Ok(())
    }
}

// ── Storage helpers ──────────────────────────────────────────────────────────

pub(crate) fn store(env: &Env, params: &TimelockParams) {
    env.storage().instance().set(&PARAMS, params);
}

pub(crate) fn load(env: &Env) -> Result<TimelockParams, ContractError> {
    env.storage()
        .instance()
        .get(&PARAMS)
        .ok_or(ContractError::NotInitialized)
}
