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

//! Base scaffolding shared by all special transaction payload variants.

use std::io;

use bitcoin::consensus::encode::Encodable;
use bitcoin::hashes::{hash_newtype, sha256d, Hash};

hash_newtype!(
    SubTxHash,
    sha256d::Hash,
    32,
    doc = "Double-SHA256 identifier of a special transaction payload, \
           displayed in reversed byte order following the txid convention."
);

/// Capability interface implemented by every special transaction payload
/// variant: consensus codec scaffolding plus the two canonical hashes.
///
/// The two hashes differ both in input bytes and in exposure convention and
/// must never be conflated: [`SpecialPayload::signing_hash`] covers the
/// payload fields with a zero-byte sentinel in place of the signature and is
/// the message a signer commits to; [`SpecialPayload::payload_hash`] covers
/// the full serialization, signature included, and identifies the payload
/// on the wire and in user displays.
pub trait SpecialPayload: Encodable {
    /// Version assigned to freshly authored payloads of this variant.
    /// Payloads parsed from the wire keep the version found in their byte
    /// representation instead.
    const CURRENT_VERSION: u16;

    /// Special transaction type code of the variant.
    const TX_TYPE: u16;

    /// Wire-protocol name of the payload variant.
    const NAME: &'static str;

    /// Number of bytes taken by the base payload fields (the version word).
    const BASE_LEN: usize = 2;

    /// Protocol version of this payload instance.
    fn version(&self) -> u16;

    /// Total serialized length of the payload in bytes.
    ///
    /// Implementations must keep the returned value equal to the byte count
    /// [`Encodable::consensus_encode`] produces, recomputing any cached
    /// value on every field mutation.
    fn serialized_len(&self) -> usize;

    /// Computes the hash signed by the payload author: the payload fields
    /// with a single zero byte in place of the not-yet-known signature.
    fn signing_hash(&self) -> sha256d::Hash;

    /// Computes the canonical identity of the payload from its full
    /// serialization, signature included.
    fn payload_hash(&self) -> SubTxHash {
        let mut engine = SubTxHash::engine();
        self.consensus_encode(&mut engine)
            .expect("hash engines do not error");
        SubTxHash::from_engine(engine)
    }

    /// Serializes the base payload fields shared by all variants. Payload
    /// signing hashes must use this exact serialization as their prefix.
    fn encode_base<W: io::Write + ?Sized>(&self, writer: &mut W) -> Result<usize, io::Error> {
        self.version().consensus_encode(writer)
    }
}
