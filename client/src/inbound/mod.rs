//! Inbound adapters driving the domain.
//!
//! - **cli**: clap commands for the back-office terminal client

pub mod cli;
