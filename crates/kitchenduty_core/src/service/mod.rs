//! Use-case services.
//!
//! # Responsibility
//! - Orchestrate model, schedule, history and export logic over a store.
//! - Keep CLI and HTTP surfaces free of persistence details.

pub mod duty_engine;
