//! Boston Housing: load the records into SQLite, read them back, and fit an
//! ordinary least-squares model that predicts `PRICE` from the 13 predictors.
//!
//! Each role is its own binary under `src/bin/`; this crate holds everything
//! they share.

pub mod config;
pub mod data;
pub mod error;
pub mod store;
pub mod train;

pub use error::{Error, Result};
