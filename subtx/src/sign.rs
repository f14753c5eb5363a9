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

//! Signing protocol for special payloads authenticated with a
//! key-recoverable signature over their signing hash.

use bitcoin::secp256k1::{Message, PublicKey, Secp256k1, SecretKey, Signing, Verification};

use crate::{MalformedPayload, PayloadSignature, SpecialPayload};

/// Extension of [`SpecialPayload`] for payload variants carrying a signature
/// blob within their serialized representation.
///
/// A payload is either fully unsigned (placeholder blob) or fully signed; a
/// signed payload returns to the unsigned state only by re-authoring its
/// fields.
pub trait SignablePayload: SpecialPayload {
    /// Signature blob stored within the payload.
    fn signature(&self) -> &PayloadSignature;

    /// Replaces the stored signature blob. Implementations must recompute
    /// their cached serialization length within this call.
    fn set_signature(&mut self, signature: PayloadSignature);

    /// Signs the payload with `secret_key`, replacing the stored blob with a
    /// recoverable signature over [`SpecialPayload::signing_hash`].
    ///
    /// Repeated signing of the same payload produces equally valid blobs;
    /// callers must not rely on byte equality between them.
    fn sign<C: Signing>(&mut self, secp: &Secp256k1<C>, secret_key: &SecretKey) {
        let message = Message::from_slice(&self.signing_hash()[..])
            .expect("sha256d output is a valid signing message");
        let signature = secp.sign_ecdsa_recoverable(&message, secret_key);
        self.set_signature(PayloadSignature::from_recoverable(signature));
    }

    /// Checks the stored signature against the recomputed signing hash.
    ///
    /// Returns `Ok(false)` for cryptographically invalid signatures and for
    /// unsigned payloads; a structurally corrupt signature blob surfaces as
    /// a [`MalformedPayload`] error instead.
    fn verify<C: Verification>(
        &self,
        secp: &Secp256k1<C>,
        public_key: &PublicKey,
    ) -> Result<bool, MalformedPayload> {
        if self.signature().is_empty() {
            return Ok(false);
        }
        let signature = self.signature().to_recoverable()?;
        let message = Message::from_slice(&self.signing_hash()[..])
            .expect("sha256d output is a valid signing message");
        Ok(secp
            .recover_ecdsa(&message, &signature)
            .map(|recovered| recovered == *public_key)
            .unwrap_or(false))
    }
}
