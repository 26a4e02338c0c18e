//! Inbound adapters driving the domain.
//!
//! - **cli**: `clap` command surface printing JSON

pub mod cli;
