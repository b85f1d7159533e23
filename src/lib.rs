//! trunkpilot: guided interactive menu for everyday trunk-based git workflows.
//!
//! The library exposes the workflow core (repository guard, trunk
//! synchronizer, branch name validator, remote selector, transport gate and
//! the guarded actions) so that it can be driven by scripted input in tests.

pub mod actions;
pub mod app;
pub mod branch_name;
pub mod cli;
pub mod config;
pub mod error;
pub mod exit_codes;
pub mod git;
pub mod guard;
pub mod menu;
pub mod output;
pub mod prompt;
pub mod remote;
pub mod session;
pub mod transport;
pub mod trunk;

#[cfg(test)]
mod test_support;
