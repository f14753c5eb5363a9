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

//! Library implementing special transaction payloads: auxiliary,
//! independently-signed data records carried alongside transactions on
//! evolution-enabled networks.
//!
//! Includes the consensus codec for payload variants and the two-hash
//! signing protocol authenticating them.

// Coding conventions
#![recursion_limit = "256"]
#![deny(dead_code, missing_docs, warnings)]

#[macro_use]
extern crate amplify;

mod errors;
mod payload;
mod registration;
mod sign;
mod signature;

pub use errors::MalformedPayload;
pub use payload::{SpecialPayload, SubTxHash};
pub use registration::{RegistrationPayload, IDENTITY_KEY_SIZE};
pub use sign::SignablePayload;
pub use signature::{PayloadSignature, PAYLOAD_SIGNATURE_SIZE};
