//! A client for the transactions page of a personal ledger: filter the list, add, edit and delete
//! transactions stored on a remote ledger server.
//!
//! The `controller` module holds the page logic and is independent of any particular view. The
//! `ledger` binary drives it from the command line.

pub mod analytics;
pub mod api;
pub mod args;
pub mod commands;
mod config;
pub mod controller;
mod error;
pub mod filter;
pub mod model;
pub mod session;
mod utils;


pub use api::Mode;
pub use config::Config;
pub use error::{Error, ErrorType, IntoResult, Result};
