//! Shared utilities for the StudyHub signaling workspace.
//!
//! Hosts the pieces both the server and its test harnesses need:
//! logging setup and time helpers.

pub mod logger;
pub mod time;
