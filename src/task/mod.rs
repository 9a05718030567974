//! Task record management.
//!
//! Creating, reading, replacing, completing and deleting task records,
//! filtered listings, overdue detection, and collection statistics. The
//! module follows hexagonal architecture:
//!
//! - Domain types in [`domain`]
//! - Field rules in [`validation`] and view conversion in [`mapping`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]
//! - Transport-neutral response mapping in [`http`]

pub mod adapters;
pub mod domain;
pub mod http;
pub mod mapping;
pub mod ports;
pub mod services;
pub mod validation;

#[cfg(test)]
mod tests;
