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

//! Persisted key chain descriptors and the chain variant selection policy.

use bitcoin::util::bip32::{self, DerivationPath, ExtendedPubKey};
#[cfg(feature = "serde")]
use serde_with::{hex::Hex, As};

use crate::{
    is_contact_path, ChainSource, ContactChain, CosigningChain, KeyChain, OutputFormat,
    SpendingChain, WatchingChain,
};

/// Wallet seed entropy.
///
/// Opaque for chain selection: only its presence is inspected; the bytes
/// may be encrypted.
#[derive(Clone, Ord, PartialOrd, Eq, PartialEq, Hash, Debug)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
pub struct Seed(#[cfg_attr(feature = "serde", serde(with = "As::<Hex>"))] Vec<u8>);

impl From<Vec<u8>> for Seed {
    fn from(entropy: Vec<u8>) -> Seed { Seed(entropy) }
}

impl Seed {
    /// Raw, possibly encrypted, seed bytes.
    pub fn as_bytes(&self) -> &[u8] { &self.0 }
}

/// Parameters of the key crypter protecting wallet secrets. Opaque for the
/// chain selection logic.
#[derive(Clone, Ord, PartialOrd, Eq, PartialEq, Hash, Debug)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
pub struct EncryptionState(#[cfg_attr(feature = "serde", serde(with = "As::<Hex>"))] Vec<u8>);

impl From<Vec<u8>> for EncryptionState {
    fn from(params: Vec<u8>) -> EncryptionState { EncryptionState(params) }
}

impl EncryptionState {
    /// Serialized key crypter parameters.
    pub fn as_bytes(&self) -> &[u8] { &self.0 }
}

/// Errors reconstructing key material from a persisted wallet descriptor.
///
/// Originate in layers below the selection policy and propagate through it
/// unchanged.
#[derive(Debug, Display, Error, From)]
#[display(doc_comments)]
pub enum UnreadableDescriptor {
    /// account key bytes do not deserialize into an extended public key
    /// ({0})
    #[from]
    AccountKey(bip32::Error),

    /// seed data required for a spending chain are missing
    NoSeed,

    /// account key required for a watching-only chain is missing
    NoAccountKey,
}

/// Errors selecting the key chain variant for a persisted descriptor.
#[derive(Debug, Display, Error, From)]
#[display(doc_comments)]
pub enum ChainSelectError {
    /// contact payment chains can not be cosigning (married) chains
    UnsupportedChainCombination,

    /// wallet descriptor is unreadable. Details: {0}
    #[from]
    Unreadable(UnreadableDescriptor),
}

/// Snapshot of the persisted wallet record driving key chain
/// reconstruction.
///
/// Read once during wallet deserialization; the selection methods never
/// mutate it and copy key material into the chain they construct.
#[derive(Clone, Eq, PartialEq, Debug)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
pub struct KeyChainDescriptor {
    /// Multisig-cosigning (married) wallet flag.
    pub married: bool,

    /// Chain follows the account key of another wallet.
    pub following_key: bool,

    /// Wallet has no spend capability.
    pub watching_only: bool,

    /// Account-level derivation path recorded for the chain.
    pub account_path: DerivationPath,

    /// Wallet seed, present for spending-capable wallets.
    pub seed: Option<Seed>,

    /// BIP32-serialized extended account public key, present for
    /// watching-only wallets.
    pub account_key: Option<Vec<u8>>,

    /// Key crypter parameters, present when wallet secrets are encrypted.
    pub encryption: Option<EncryptionState>,
}

impl KeyChainDescriptor {
    /// Selects and constructs the key chain variant encoded by the
    /// descriptor.
    ///
    /// Spending-capable descriptors (seed present, not watching-only) go
    /// through the spending decision table; all others through the
    /// watching-only table.
    pub fn select(&self) -> Result<KeyChain, ChainSelectError> {
        if !self.watching_only && self.seed.is_some() {
            self.spending_chain()
        } else {
            self.watching_chain()
        }
    }

    /// Reconstructs a spending-capable chain from the wallet seed.
    ///
    /// Decision order: a contact-convention path produces a contact chain
    /// (rejected outright for married descriptors); a married descriptor
    /// with any other path produces a cosigning chain; everything else an
    /// ordinary spending chain with the output style deduced from the path.
    pub fn spending_chain(&self) -> Result<KeyChain, ChainSelectError> {
        let seed = self.seed.clone().ok_or(UnreadableDescriptor::NoSeed)?;
        if is_contact_path(&self.account_path) {
            if self.married {
                return Err(ChainSelectError::UnsupportedChainCombination);
            }
            return Ok(KeyChain::Contact(ContactChain {
                seed,
                encryption: self.encryption.clone(),
                account_path: self.account_path.clone(),
            }));
        }
        let source = ChainSource::Seed {
            seed,
            encryption: self.encryption.clone(),
        };
        let output_format = OutputFormat::deduce(&self.account_path);
        if self.married {
            return Ok(KeyChain::Cosigning(CosigningChain {
                source,
                output_format,
            }));
        }
        Ok(KeyChain::Spending(SpendingChain {
            source,
            account_path: self.account_path.clone(),
            output_format,
        }))
    }

    /// Reconstructs a watching-only chain from the account key; the wallet
    /// seed is neither inspected nor required.
    pub fn watching_chain(&self) -> Result<KeyChain, ChainSelectError> {
        let account_key = self.decode_account_key()?;
        let output_format = OutputFormat::deduce(&self.account_path);
        if self.married {
            return Ok(KeyChain::Cosigning(CosigningChain {
                source: ChainSource::AccountKey(account_key),
                output_format,
            }));
        }
        let chain = WatchingChain {
            account_key,
            output_format,
        };
        if self.following_key {
            Ok(KeyChain::Following(chain))
        } else {
            Ok(KeyChain::Watching(chain))
        }
    }

    /// Reconstructs a spending-capable chain from the account key alone,
    /// used when the wallet seed is kept elsewhere.
    pub fn spending_chain_from_account_key(&self) -> Result<KeyChain, ChainSelectError> {
        let source = ChainSource::AccountKey(self.decode_account_key()?);
        let output_format = OutputFormat::deduce(&self.account_path);
        if self.married {
            return Ok(KeyChain::Cosigning(CosigningChain {
                source,
                output_format,
            }));
        }
        Ok(KeyChain::Spending(SpendingChain {
            source,
            account_path: self.account_path.clone(),
            output_format,
        }))
    }

    fn decode_account_key(&self) -> Result<ExtendedPubKey, UnreadableDescriptor> {
        let data = self
            .account_key
            .as_ref()
            .ok_or(UnreadableDescriptor::NoAccountKey)?;
        Ok(ExtendedPubKey::decode(data)?)
    }
}
