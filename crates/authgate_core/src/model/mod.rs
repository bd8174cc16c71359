//! Account domain model.
//!
//! # Responsibility
//! - Define the single persisted record (`Account`) and its validation rules.
//! - Own the failed-attempt lockout state machine.
//!
//! # Invariants
//! - Every account is identified by a stable, non-nil `AccountId`.
//! - Lockout counters only move through `LockoutState` transitions.

pub mod account;
pub mod lockout;
pub mod national_id;
