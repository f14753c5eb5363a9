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

//! Account registration payload binding a user name to a public key
//! identity.

use std::io;

use bitcoin::consensus::encode::{self, Decodable, Encodable, VarInt};
use bitcoin::hashes::{sha256d, Hash, HashEngine};
use bitcoin::secp256k1::{self, Secp256k1, SecretKey, Signing};
use bitcoin::PubkeyHash;

use crate::{MalformedPayload, PayloadSignature, SignablePayload, SpecialPayload};

/// Byte length of the public key hash identifying the registered account.
pub const IDENTITY_KEY_SIZE: usize = 20;

/// Special payload registering a user account on an evolution-enabled
/// network.
///
/// Binds a human-readable user name to the hash of a public key and carries
/// a signature proving control over that key. Wire layout, after the base
/// payload fields: var-int-prefixed UTF-8 user name, 20 raw bytes of the
/// key hash, signature blob.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct RegistrationPayload {
    version: u16,
    user_name: String,
    identity_key: PubkeyHash,
    signature: PayloadSignature,
    length: usize,
}

impl RegistrationPayload {
    /// Constructs an unsigned payload registering `user_name` for the
    /// account owning the key behind `identity_key`.
    pub fn new(user_name: impl Into<String>, identity_key: PubkeyHash) -> RegistrationPayload {
        let mut payload = RegistrationPayload {
            version: Self::CURRENT_VERSION,
            user_name: user_name.into(),
            identity_key,
            signature: PayloadSignature::empty(),
            length: 0,
        };
        payload.update_length();
        payload
    }

    /// Constructs a payload registering the public key matching
    /// `secret_key` and immediately signs it with that key.
    pub fn with_key<C: Signing>(
        secp: &Secp256k1<C>,
        user_name: impl Into<String>,
        secret_key: &SecretKey,
    ) -> RegistrationPayload {
        let public_key = secp256k1::PublicKey::from_secret_key(secp, secret_key);
        let mut payload =
            RegistrationPayload::new(user_name, bitcoin::PublicKey::new(public_key).pubkey_hash());
        payload.sign(secp, secret_key);
        payload
    }

    /// Parses a payload from the beginning of `bytes`, returning it
    /// together with the number of consumed bytes.
    pub fn parse(bytes: &[u8]) -> Result<(RegistrationPayload, usize), MalformedPayload> {
        Ok(encode::deserialize_partial(bytes)?)
    }

    /// Serializes the payload into its wire byte representation. Unsigned
    /// payloads serialize with the placeholder signature blob.
    pub fn serialize(&self) -> Vec<u8> { encode::serialize(self) }

    /// Registered user name.
    pub fn user_name(&self) -> &str { &self.user_name }

    /// Hash of the public key owning the registered account.
    pub fn identity_key(&self) -> PubkeyHash { self.identity_key }

    /// Replaces the registered user name.
    ///
    /// A previously stored signature stops matching the payload fields and
    /// will no longer verify; re-sign with [`SignablePayload::sign`].
    pub fn set_user_name(&mut self, user_name: impl Into<String>) {
        self.user_name = user_name.into();
        self.update_length();
    }

    // Single point recomputing the length cache; every mutating method must
    // route through it.
    fn update_length(&mut self) {
        self.length = Self::BASE_LEN
            + VarInt(self.user_name.len() as u64).len()
            + self.user_name.len()
            + IDENTITY_KEY_SIZE
            + self.signature.serialized_len();
    }
}

impl SpecialPayload for RegistrationPayload {
    const CURRENT_VERSION: u16 = 1;
    const TX_TYPE: u16 = 8;
    const NAME: &'static str = "subTxRegister";

    fn version(&self) -> u16 { self.version }

    fn serialized_len(&self) -> usize { self.length }

    fn signing_hash(&self) -> sha256d::Hash {
        let mut engine = sha256d::Hash::engine();
        self.encode_base(&mut engine)
            .expect("hash engines do not error");
        self.user_name
            .consensus_encode(&mut engine)
            .expect("hash engines do not error");
        engine.input(&self.identity_key[..]);
        engine.input(&[0u8]);
        sha256d::Hash::from_engine(engine)
    }
}

impl SignablePayload for RegistrationPayload {
    fn signature(&self) -> &PayloadSignature { &self.signature }

    fn set_signature(&mut self, signature: PayloadSignature) {
        self.signature = signature;
        self.update_length();
    }
}

impl Encodable for RegistrationPayload {
    fn consensus_encode<W: io::Write + ?Sized>(&self, writer: &mut W) -> Result<usize, io::Error> {
        let mut len = self.encode_base(writer)?;
        len += self.user_name.consensus_encode(writer)?;
        writer.write_all(&self.identity_key[..])?;
        len += IDENTITY_KEY_SIZE;
        len += self.signature.consensus_encode(writer)?;
        Ok(len)
    }
}

impl Decodable for RegistrationPayload {
    fn consensus_decode<R: io::Read + ?Sized>(reader: &mut R) -> Result<Self, encode::Error> {
        let version = u16::consensus_decode(reader)?;
        let user_name = String::consensus_decode(reader)?;
        let mut identity_key = [0u8; IDENTITY_KEY_SIZE];
        reader.read_exact(&mut identity_key)?;
        let signature = PayloadSignature::consensus_decode(reader)?;
        let mut payload = RegistrationPayload {
            version,
            user_name,
            identity_key: PubkeyHash::from_inner(identity_key),
            signature,
            length: 0,
        };
        payload.update_length();
        Ok(payload)
    }
}

#[cfg(test)]
mod test {
    use bitcoin::secp256k1::rand::thread_rng;
    use bitcoin::secp256k1::{PublicKey, Secp256k1};

    use super::*;

    fn keypair(secp: &Secp256k1<secp256k1::All>) -> (SecretKey, PublicKey) {
        secp.generate_keypair(&mut thread_rng())
    }

    fn zero_identity() -> PubkeyHash { PubkeyHash::from_inner([0u8; IDENTITY_KEY_SIZE]) }

    #[test]
    fn unsigned_roundtrip() {
        let payload = RegistrationPayload::new("alice", zero_identity());
        let bytes = payload.serialize();
        assert_eq!(bytes.len(), payload.serialized_len());

        let (parsed, consumed) = RegistrationPayload::parse(&bytes).unwrap();
        assert_eq!(consumed, bytes.len());
        assert_eq!(parsed, payload);
        assert!(parsed.signature().is_empty());
        assert_eq!(parsed.version(), RegistrationPayload::CURRENT_VERSION);
    }

    #[test]
    fn signed_roundtrip() {
        let secp = Secp256k1::new();
        let (sk, _) = keypair(&secp);
        let payload = RegistrationPayload::with_key(&secp, "alice", &sk);
        let bytes = payload.serialize();
        assert_eq!(bytes.len(), payload.serialized_len());

        let (parsed, consumed) = RegistrationPayload::parse(&bytes).unwrap();
        assert_eq!(consumed, bytes.len());
        assert_eq!(parsed, payload);
    }

    #[test]
    fn parse_ignores_trailing_data() {
        let payload = RegistrationPayload::new("alice", zero_identity());
        let mut bytes = payload.serialize();
        let len = bytes.len();
        bytes.extend_from_slice(&[0xDE, 0xAD, 0xBE, 0xEF]);

        let (parsed, consumed) = RegistrationPayload::parse(&bytes).unwrap();
        assert_eq!(consumed, len);
        assert_eq!(parsed, payload);
    }

    #[test]
    fn length_cache_tracks_mutations() {
        let secp = Secp256k1::new();
        let (sk, _) = keypair(&secp);

        let mut payload = RegistrationPayload::new("alice", zero_identity());
        assert_eq!(payload.serialized_len(), payload.serialize().len());

        payload.sign(&secp, &sk);
        assert_eq!(payload.serialized_len(), payload.serialize().len());

        payload.set_user_name("a-noticeably-longer-user-name");
        assert_eq!(payload.serialized_len(), payload.serialize().len());

        payload.set_user_name("");
        assert_eq!(payload.serialized_len(), payload.serialize().len());
    }

    #[test]
    fn signing_hash_is_stable() {
        let secp = Secp256k1::new();
        let (sk, _) = keypair(&secp);

        let mut payload = RegistrationPayload::new("alice", zero_identity());
        let unsigned_hash = payload.signing_hash();
        assert_eq!(payload.signing_hash(), unsigned_hash);

        // Signing must not move the signing hash, only the payload hash.
        payload.sign(&secp, &sk);
        assert_eq!(payload.signing_hash(), unsigned_hash);

        payload.set_user_name("bob");
        assert_ne!(payload.signing_hash(), unsigned_hash);
    }

    #[test]
    fn signing_hash_commits_to_identity_key() {
        let a = RegistrationPayload::new("alice", zero_identity());
        let b = RegistrationPayload::new(
            "alice",
            PubkeyHash::from_inner([0x11u8; IDENTITY_KEY_SIZE]),
        );
        assert_ne!(a.signing_hash(), b.signing_hash());
    }

    #[test]
    fn payload_hash_differs_from_signing_hash() {
        let secp = Secp256k1::new();
        let (sk, _) = keypair(&secp);
        let payload = RegistrationPayload::with_key(&secp, "alice", &sk);
        assert_ne!(
            payload.payload_hash().into_inner(),
            payload.signing_hash().into_inner()
        );
    }

    #[test]
    fn payload_hash_commits_to_signature() {
        let secp = Secp256k1::new();
        let (sk, _) = keypair(&secp);

        let mut payload = RegistrationPayload::new("alice", zero_identity());
        let unsigned = payload.payload_hash();
        payload.sign(&secp, &sk);
        assert_ne!(payload.payload_hash(), unsigned);
    }

    #[test]
    fn verification_soundness() {
        let secp = Secp256k1::new();
        let (sk, pk) = keypair(&secp);
        let (_, other_pk) = keypair(&secp);

        let mut payload = RegistrationPayload::with_key(&secp, "alice", &sk);
        assert!(payload.verify(&secp, &pk).unwrap());
        assert!(!payload.verify(&secp, &other_pk).unwrap());

        payload.set_user_name("alicf");
        assert!(!payload.verify(&secp, &pk).unwrap());
    }

    #[test]
    fn unsigned_payload_never_verifies() {
        let secp = Secp256k1::new();
        let (_, pk) = keypair(&secp);
        let payload = RegistrationPayload::new("alice", zero_identity());
        assert!(!payload.verify(&secp, &pk).unwrap());
    }

    #[test]
    fn end_to_end_scenario() {
        let secp = Secp256k1::new();
        let (sk, pk) = keypair(&secp);
        let (_, other_pk) = keypair(&secp);

        let mut payload = RegistrationPayload::new("alice", zero_identity());
        payload.sign(&secp, &sk);

        let bytes = payload.serialize();
        let (parsed, _) = RegistrationPayload::parse(&bytes).unwrap();
        assert!(parsed.verify(&secp, &pk).unwrap());
        assert!(!parsed.verify(&secp, &other_pk).unwrap());
    }

    #[test]
    fn truncated_payload_is_malformed() {
        let secp = Secp256k1::new();
        let (sk, _) = keypair(&secp);
        let payload = RegistrationPayload::with_key(&secp, "alice", &sk);
        let bytes = payload.serialize();

        assert!(matches!(
            RegistrationPayload::parse(&bytes[..bytes.len() - 1]),
            Err(MalformedPayload::Undecodable(_))
        ));
    }

    #[test]
    fn oversized_name_declaration_is_malformed() {
        // Name length prefix declares more bytes than the buffer holds.
        let mut bytes = vec![0x01, 0x00];
        bytes.push(0xFF);
        bytes.extend_from_slice(&[0xFF; 8]);
        assert!(matches!(
            RegistrationPayload::parse(&bytes),
            Err(MalformedPayload::Undecodable(_))
        ));
    }
}
