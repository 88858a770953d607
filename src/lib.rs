//! workdays library - business calendar arithmetic
//!
//! This module exports internal components for integration testing.

pub mod calendar;
pub mod cli;
pub mod config;
pub mod error;
pub mod health;
pub mod holidays;
pub mod orchestrator;
pub mod request;
pub mod schedule;
pub mod server;
