//! Crypto Wrap Contracts
//!
//! Casper-native wrap protocol: deposit a fungible asset into a
//! non-fungible, fractionally tradable representation whose resales pay
//! royalties to past owners and fractional shareholders.
//!
//! ## Architecture
//!
//! - **FacetRegistry**: selector to facet table with batched diamond cuts;
//!   gates the public surface of every proxy
//! - **WrapProxy**: per-asset ledger instance with wrap/unwrap, fractional
//!   transfers, the oToken ledger, the FR/OR reward engine and claims
//! - **WrapManager**: stages blank proxies and binds them per underlying
//!   asset
//! - **Cep18Token**: minimal mintable CEP-18 used as underlying asset and
//!   payment currency
//!
//! ## Royalties
//!
//! Every resale retains an Ownership Royalty for current oToken holders
//! and, when the sale is profitable, a Fractional Royalty for a sliding
//! window of past owners weighted by a geometric decay curve.

#![cfg_attr(target_arch = "wasm32", no_std)]

#[cfg(target_arch = "wasm32")]
extern crate alloc;

// Re-export odra for downstream usage
pub use odra;

// Core module declarations
pub mod types;
pub mod errors;
pub mod rewards;

// Contract modules
pub mod facet_registry;
pub mod wrap_proxy;
pub mod manager;
pub mod cep18_token;
