//! Employee Vault server library.
//!
//! Exposes the configuration loader, shared state, and HTML routes so the
//! `employee-vault` binary and tests can assemble the router.

pub mod config;
pub mod error;
pub mod routes;
pub mod state;
