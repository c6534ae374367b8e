//! Scripts for migrating the token contracts onto a network: deploying the
//! token, its registry dependency and its controller, and wiring them together.

#![deny(missing_docs)]
#![deny(clippy::missing_docs_in_private_items)]

pub mod artifacts;
pub mod cli;
pub mod client;
mod commands;
pub mod config;
pub mod constants;
pub mod contracts;
pub mod deployments;
pub mod errors;
pub mod registry;
mod solidity;
pub mod steps;

#[cfg(test)]
#[allow(clippy::missing_docs_in_private_items)]
mod test_utils;
