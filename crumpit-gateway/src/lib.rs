//! HTTP API for the crumpit sequencing-run manager.
//!
//! Serves live-run state from the document store, run metadata from the
//! relational store, and cluster/backup information, all wrapped in the
//! `{status, data}` envelope.

#![warn(clippy::pedantic)]
#![deny(clippy::unwrap_used)]

pub mod error;
pub mod logging;
pub mod response;
pub mod routes;
pub mod state;
