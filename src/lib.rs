//! Taskkeeper: task record management with optimistic concurrency.
//!
//! This crate provides the domain rules for a shared collection of task
//! records: validation, the completion state machine, filtered listings,
//! overdue detection, and aggregate statistics.
//!
//! # Architecture
//!
//! Taskkeeper follows hexagonal architecture principles:
//!
//! - **Domain**: Pure business logic with no infrastructure dependencies
//! - **Ports**: Abstract trait interfaces for external interactions
//! - **Adapters**: Concrete implementations of ports (database, memory)
//!
//! # Modules
//!
//! - [`task`]: Task records, storage ports and the task service
//! - [`config`]: Environment-driven settings
//! - [`telemetry`]: Structured logging setup
//! - [`bootstrap`]: Store and service wiring

pub mod bootstrap;
pub mod config;
pub mod task;
pub mod telemetry;
