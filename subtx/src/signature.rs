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

//! Signature blob carried by signed special payloads.

use std::io;

use bitcoin::consensus::encode::{self, Decodable, Encodable, VarInt};
use bitcoin::secp256k1::ecdsa::{RecoverableSignature, RecoveryId};

use crate::MalformedPayload;

/// Serialized length of a non-empty payload signature: one recovery header
/// byte followed by a 64-byte compact ECDSA signature.
pub const PAYLOAD_SIGNATURE_SIZE: usize = 65;

const RECOVERY_HEADER_BASE: u8 = 27;
const RECOVERY_HEADER_COMPRESSED: u8 = 4;

/// Signature blob authenticating a special payload.
///
/// On the wire the blob is a var-int-prefixed byte string: an unsigned
/// payload carries the empty placeholder, a signed payload a 65-byte
/// key-recoverable ECDSA signature over the payload signing hash. No other
/// blob lengths are accepted by the codec.
#[derive(Clone, Ord, PartialOrd, Eq, PartialEq, Hash, Debug, Default)]
pub struct PayloadSignature(Vec<u8>);

impl PayloadSignature {
    /// Constructs the placeholder value carried by not-yet-signed payloads.
    pub fn empty() -> PayloadSignature { PayloadSignature::default() }

    /// Detects the placeholder signature of an unsigned payload.
    pub fn is_empty(&self) -> bool { self.0.is_empty() }

    /// Returns raw signature bytes; an empty slice for unsigned payloads.
    pub fn as_bytes(&self) -> &[u8] { &self.0 }

    /// Counts bytes the blob occupies on the wire, length prefix included.
    pub fn serialized_len(&self) -> usize { VarInt(self.0.len() as u64).len() + self.0.len() }

    /// Wraps a recoverable signature into the wire blob format. The header
    /// byte follows the compressed-key message signing convention.
    pub fn from_recoverable(signature: RecoverableSignature) -> PayloadSignature {
        let (recovery_id, data) = signature.serialize_compact();
        let mut blob = Vec::with_capacity(PAYLOAD_SIGNATURE_SIZE);
        blob.push(RECOVERY_HEADER_BASE + RECOVERY_HEADER_COMPRESSED + recovery_id.to_i32() as u8);
        blob.extend_from_slice(&data);
        PayloadSignature(blob)
    }

    /// Reconstructs the recoverable signature from the blob, failing on
    /// structural corruption.
    pub fn to_recoverable(&self) -> Result<RecoverableSignature, MalformedPayload> {
        if self.0.len() != PAYLOAD_SIGNATURE_SIZE {
            return Err(MalformedPayload::SignatureLength(self.0.len()));
        }
        let header = self.0[0];
        if !(RECOVERY_HEADER_BASE..RECOVERY_HEADER_BASE + 8).contains(&header) {
            return Err(MalformedPayload::RecoveryHeader(header));
        }
        let recovery_id = RecoveryId::from_i32(((header - RECOVERY_HEADER_BASE) & 0x03) as i32)
            .expect("two-bit recovery id is always valid");
        RecoverableSignature::from_compact(&self.0[1..], recovery_id)
            .map_err(|_| MalformedPayload::SignatureData)
    }
}

impl Encodable for PayloadSignature {
    fn consensus_encode<W: io::Write + ?Sized>(&self, writer: &mut W) -> Result<usize, io::Error> {
        self.0.consensus_encode(writer)
    }
}

impl Decodable for PayloadSignature {
    fn consensus_decode<R: io::Read + ?Sized>(reader: &mut R) -> Result<Self, encode::Error> {
        let blob = Vec::<u8>::consensus_decode(reader)?;
        if !blob.is_empty() && blob.len() != PAYLOAD_SIGNATURE_SIZE {
            return Err(encode::Error::ParseFailed(
                "signature blob length does not match a compact recoverable signature",
            ));
        }
        Ok(PayloadSignature(blob))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn placeholder_roundtrip() {
        let placeholder = PayloadSignature::empty();
        assert!(placeholder.is_empty());
        assert_eq!(placeholder.serialized_len(), 1);

        let bytes = encode::serialize(&placeholder);
        assert_eq!(bytes, vec![0x00]);
        let decoded: PayloadSignature = encode::deserialize(&bytes).unwrap();
        assert_eq!(decoded, placeholder);
    }

    #[test]
    fn rejects_foreign_blob_lengths() {
        let bytes = encode::serialize(&vec![0xAAu8; 10]);
        assert!(matches!(
            encode::deserialize::<PayloadSignature>(&bytes),
            Err(encode::Error::ParseFailed(_))
        ));
    }

    #[test]
    fn rejects_invalid_recovery_header() {
        let bytes = encode::serialize(&vec![0u8; PAYLOAD_SIGNATURE_SIZE]);
        let signature: PayloadSignature = encode::deserialize(&bytes).unwrap();
        assert!(matches!(
            signature.to_recoverable(),
            Err(MalformedPayload::RecoveryHeader(0))
        ));
    }

    #[test]
    fn placeholder_is_not_recoverable() {
        assert!(matches!(
            PayloadSignature::empty().to_recoverable(),
            Err(MalformedPayload::SignatureLength(0))
        ));
    }
}
