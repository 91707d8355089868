#![no_std]

//! Shared types and error codes for the Aegis contract suite.
//!
//! This crate provides:
//! - [`CommonError`] — standardised error codes for all contracts.
//! - [`instruction`] — the closed instruction set a proposal (and the
//!   timelock operation derived from it) may carry.
//! - [`proposal`] — the proposal record and status enum shared between the
//!   governance registry and the timelock engine.
//! - [`storage`] — persistent-entry TTL helpers.
//!
//! Contract-specific errors extend the range starting at code **100** and
//! above, ensuring no collisions with the common set.

use soroban_sdk::contracterror;

// ── Modules ──────────────────────────────────────────────────────────────────

pub mod instruction;
pub mod proposal;
pub mod storage;

pub use instruction::Instruction;
pub use proposal::{Proposal, ProposalStatus};

// ── Shared error enum ────────────────────────────────────────────────────────

/// Standardised error codes shared by every Aegis contract.
///
/// # Code ranges
/// | Range   | Purpose                        |
/// |---------|--------------------------------|
/// | 1 – 9   | Lifecycle / initialisation     |
/// | 10 – 19 | Authentication & authorisation |
/// | 20 – 29 | Resource not found             |
/// | 30 – 39 | Validation / input             |
/// | 100+    | Reserved for contract-specific |
#[contracterror]
#[derive(Clone, Debug, Eq, PartialEq, Copy)]
#[repr(u32)]
pub enum CommonError {
    NotInitialized = 1,
    AlreadyInitialized = 2,
    AccessDenied = 10,
    RecordNotFound = 21,
    InvalidInput = 30,
}
