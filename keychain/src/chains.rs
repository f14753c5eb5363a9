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

//! Key chain variants and the derivation path conventions distinguishing
//! them.

use bitcoin::util::bip32::{ChildNumber, DerivationPath, ExtendedPubKey};

use crate::{EncryptionState, Seed};

/// Purpose index opening contact payment derivation paths.
pub const CONTACT_PURPOSE: ChildNumber = ChildNumber::Hardened { index: 9 };

/// Feature index of contact payment chains, directly after the coin type.
pub const CONTACT_FEATURE: ChildNumber = ChildNumber::Hardened { index: 5 };

/// Account index completing the fixed prefix of contact payment paths.
pub const CONTACT_ACCOUNT: ChildNumber = ChildNumber::Hardened { index: 1 };

/// Detects derivation paths reserved for contact payment chains:
/// `m/9'/coin'/5'/1'/contact'`, with any hardened coin type accepted at the
/// second position.
pub fn is_contact_path(path: &DerivationPath) -> bool {
    let steps = path.into_iter().copied().collect::<Vec<_>>();
    steps.len() >= 4
        && steps[0] == CONTACT_PURPOSE
        && steps[1].is_hardened()
        && steps[2] == CONTACT_FEATURE
        && steps[3] == CONTACT_ACCOUNT
}

/// Style of single-signature outputs produced by a key chain.
#[derive(Copy, Clone, Ord, PartialOrd, Eq, PartialEq, Hash, Debug, Display, Default)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
pub enum OutputFormat {
    /// Classic pay-to-public-key-hash outputs.
    #[default]
    #[display("pkh")]
    P2pkh,

    /// Native SegWit v0 pay-to-witness-public-key-hash outputs.
    #[display("wpkh")]
    P2wpkh,
}

impl OutputFormat {
    /// Deduces the output style from the purpose index of an account
    /// derivation path, falling back to [`OutputFormat::P2pkh`] when the
    /// path is empty or follows no known purpose convention.
    pub fn deduce(path: &DerivationPath) -> OutputFormat {
        match path.into_iter().next().copied() {
            Some(ChildNumber::Hardened { index: 84 }) => OutputFormat::P2wpkh,
            _ => OutputFormat::P2pkh,
        }
    }
}

/// Key material from which a chain derives its keys.
#[derive(Clone, Eq, PartialEq, Debug)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
pub enum ChainSource {
    /// Chain derives its keys from the wallet seed.
    Seed {
        /// Wallet seed entropy, possibly encrypted.
        seed: Seed,
        /// Encryption applied to the seed, if any.
        encryption: Option<EncryptionState>,
    },

    /// Chain derives its keys from an extended account-level key.
    AccountKey(ExtendedPubKey),
}

/// Ordinary spending-capable single-signature chain.
#[derive(Clone, Eq, PartialEq, Debug)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
pub struct SpendingChain {
    /// Key material the chain derives from.
    pub source: ChainSource,
    /// Account-level derivation path of the chain.
    pub account_path: DerivationPath,
    /// Output style the chain produces addresses for.
    pub output_format: OutputFormat,
}

/// Cosigning (married) chain shared between multiple co-signing wallets.
#[derive(Clone, Eq, PartialEq, Debug)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
pub struct CosigningChain {
    /// Key material the chain derives from.
    pub source: ChainSource,
    /// Output style the chain produces addresses for.
    pub output_format: OutputFormat,
}

/// Chain serving payments between two contacts, bound to the exact
/// per-contact derivation path it was created for. Always pays to public
/// key hashes.
#[derive(Clone, Eq, PartialEq, Debug)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
pub struct ContactChain {
    /// Wallet seed entropy, possibly encrypted.
    pub seed: Seed,
    /// Encryption applied to the seed, if any.
    pub encryption: Option<EncryptionState>,
    /// Full contact derivation path, including the per-contact index.
    pub account_path: DerivationPath,
}

/// Watching-only chain over an extended account public key.
#[derive(Clone, Eq, PartialEq, Debug)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
pub struct WatchingChain {
    /// Account-level extended public key.
    pub account_key: ExtendedPubKey,
    /// Output style the chain produces addresses for.
    pub output_format: OutputFormat,
}

/// Reconstructed hierarchical key chain variant.
#[derive(Clone, Eq, PartialEq, Debug)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
pub enum KeyChain {
    /// Ordinary single-signature spending chain.
    Spending(SpendingChain),

    /// Multi-party cosigning (married) chain.
    Cosigning(CosigningChain),

    /// Contact payment chain bound to a single peer relationship.
    Contact(ContactChain),

    /// Watching-only chain without spend capability.
    Watching(WatchingChain),

    /// Watching chain following the account key of another wallet.
    Following(WatchingChain),
}
