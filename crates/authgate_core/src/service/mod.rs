//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into login/registration entry points.
//! - Keep the HTTP and CLI layers decoupled from storage details.

pub mod auth_service;
