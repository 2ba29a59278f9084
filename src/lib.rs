//! Track personal expenses and money that other people owe you, in two CSV files.
//!
//! The [`ledger::Ledger`] holds both collections and the undoable last owed action. The functions
//! in [`commands`] open a ledger, perform one operation and describe the outcome.

pub mod args;
mod backup;
pub mod commands;
mod config;
mod error;
pub mod ledger;
pub mod model;
pub mod report;
mod store;
pub mod undo;
mod utils;


pub use config::Config;
pub use error::{error_type, Error, ErrorType, IntoResult, Result};
