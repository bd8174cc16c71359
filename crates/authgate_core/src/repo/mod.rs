//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the account data access contract used by the auth service.
//! - Isolate SQLite query details from authentication orchestration.
//!
//! # Invariants
//! - Repository writes enforce `Account::validate()` before persistence.
//! - Repository APIs return semantic errors (`NotFound`, `Duplicate`) in
//!   addition to DB transport errors.

pub mod account_repo;
