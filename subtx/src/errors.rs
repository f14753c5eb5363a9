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

use bitcoin::consensus::encode;

/// Errors indicating that special payload data read from the wire, or a
/// signature blob stored within a payload, are structurally invalid.
///
/// Always recoverable by rejecting the offending payload; must never be
/// conflated with a failed signature check, which is a plain `false`
/// verification result.
#[derive(Debug, Display, Error, From)]
#[display(doc_comments)]
pub enum MalformedPayload {
    /// payload bytes can not be decoded. Details: {0}
    #[from]
    Undecodable(encode::Error),

    /// signature blob length {0} does not match a compact recoverable ECDSA
    /// signature
    SignatureLength(usize),

    /// signature recovery header byte {0} is out of range
    RecoveryHeader(u8),

    /// signature r or s value lies outside of the curve group order
    SignatureData,
}
