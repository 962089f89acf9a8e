//! Core types and trait definitions for the beachwatch condition store.
//!
//! This crate is deliberately free of HTTP and database dependencies. It
//! holds the beach dimension and condition fact types, the lenient reading of
//! scraped records, slug derivation, identity policies and the
//! [`store::BeachStore`] abstraction the other crates build on.

#![allow(async_fn_in_trait)]

pub mod beach;
pub mod condition;
pub mod error;
pub mod identity;
pub mod record;
pub mod slug;
pub mod store;

pub use error::{Error, Result};
