//! Lucky Draw back-office kernel.
//!
//! The generic table query engine lives in [`table`]; [`models`] registers
//! the lucky draw entities with it and [`routes`] exposes it over HTTP.
//! The main entry point for running the server is the `luckydraw` binary.

pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod routes;
pub mod state;
pub mod table;
