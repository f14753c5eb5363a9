// Wallet-level libraries for bitcoin protocol by LNP/BP Association
//
// Written in 2020-2022 by
//     Dr. Maxim Orlovsky <orlovsky@lnp-bp.org>
//
// This software is distributed without any warranty.
//
// You should have received a copy of the Apache-2.0 License
// along with this software.
// If not, see <https://opensource.org/licenses/Apache-2.0>.

//! Library reconstructing hierarchical deterministic key chains from
//! persisted wallet descriptors.
//!
//! Covers the deterministic selection policy mapping descriptor flags and
//! derivation path conventions onto the closed set of key chain variants.

// Coding conventions
#![recursion_limit = "256"]
#![deny(dead_code, missing_docs, warnings)]

#[macro_use]
extern crate amplify;

#[cfg(feature = "serde")]
#[macro_use]
extern crate serde_crate as serde;

mod chains;
mod descriptor;

pub use chains::{
    is_contact_path, ChainSource, ContactChain, CosigningChain, KeyChain, OutputFormat,
    SpendingChain, WatchingChain, CONTACT_ACCOUNT, CONTACT_FEATURE, CONTACT_PURPOSE,
};
pub use descriptor::{
    ChainSelectError, EncryptionState, KeyChainDescriptor, Seed, UnreadableDescriptor,
};
