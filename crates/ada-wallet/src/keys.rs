//! Hierarchical deterministic Ed25519 key derivation.
//!
//! Cardano's CIP-1852 variant of BIP32-Ed25519: the root extended key comes
//! from HMAC-SHA512 rejection sampling over the seed, and child keys are
//! derived with the V2 scheme (little-endian indices, `kL`/`kR` scalar
//! arithmetic, soft derivation by point addition). This is deliberately not
//! SLIP-0010: soft (non-hardened) derivation must work so a watch-only
//! account public key can produce payment and staking addresses.
//!
//! References:
//! - <https://github.com/satoshilabs/slips/blob/master/slip-0010.md>
//! - <https://github.com/cardano-foundation/CIPs/tree/master/CIP-1852>
//! - <https://github.com/LedgerHQ/orakolo/blob/master/papers/Ed25519_BIP%20Final.pdf>

use std::fmt;
use std::str::FromStr;

use curve25519_dalek::edwards::{CompressedEdwardsY, EdwardsPoint};
use curve25519_dalek::scalar::Scalar;
use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256, Sha512};
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use crate::error::WalletError;

type HmacSha512 = Hmac<Sha512>;
type HmacSha256 = Hmac<Sha256>;

/// Domain separator keying every HMAC in the derivation.
const MASTER_SECRET: &[u8] = b"ed25519 seed";

/// Smallest seed length the engine accepts. BIP-39 seeds are 64 bytes.
const MIN_SEED_LEN: usize = 16;

/// Offset that marks a derivation index as hardened.
pub const HARDENED_OFFSET: u32 = 0x8000_0000;

/// Flag an index as hardened.
pub const fn harden(index: u32) -> u32 {
    index | HARDENED_OFFSET
}

/// True for indices in the hardened range.
pub const fn is_hardened(index: u32) -> bool {
    index >= HARDENED_OFFSET
}

fn hmac_sha512(key: &[u8], parts: &[&[u8]]) -> [u8; 64] {
    let mut mac = HmacSha512::new_from_slice(key).expect("HMAC accepts keys of any length");
    for part in parts {
        mac.update(part);
    }
    let mut out = [0u8; 64];
    out.copy_from_slice(&mac.finalize().into_bytes());
    out
}

fn hmac_sha256(key: &[u8], parts: &[&[u8]]) -> [u8; 32] {
    let mut mac = HmacSha256::new_from_slice(key).expect("HMAC accepts keys of any length");
    for part in parts {
        mac.update(part);
    }
    let mut out = [0u8; 32];
    out.copy_from_slice(&mac.finalize().into_bytes());
    out
}

/// `8 * z[..28]` as a 32-byte little-endian integer.
fn mul8(z: &[u8]) -> [u8; 32] {
    let mut out = [0u8; 32];
    let mut carry = 0u8;
    for i in 0..28 {
        out[i] = (z[i] << 3) | carry;
        carry = z[i] >> 5;
    }
    out[28] = carry;
    out
}

/// Little-endian addition mod 2^256.
fn add256(a: &[u8; 32], b: &[u8; 32]) -> [u8; 32] {
    let mut out = [0u8; 32];
    let mut carry = 0u16;
    for i in 0..32 {
        let sum = a[i] as u16 + b[i] as u16 + carry;
        out[i] = sum as u8;
        carry = sum >> 8;
    }
    out
}

/// A 96-byte extended private key: `kL || kR || chain code`.
///
/// Owned exclusively by the wallet session. The bytes are zeroized on drop;
/// [`Xprv::zeroize`] makes retirement explicit on lock and re-derivation
/// paths.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct Xprv {
    bytes: [u8; 96],
}

impl Xprv {
    /// Derive the root extended private key from a seed.
    ///
    /// HMAC-SHA512 keyed by `"ed25519 seed"` is applied repeatedly over its
    /// own output until the candidate left half has a zero third-highest
    /// bit. The loop is unbounded on purpose: each iteration succeeds with
    /// probability 1/2, and capping it would narrow the key space and break
    /// compatibility with the reference derivation. The scalar bits are then
    /// cleared/set per RFC 8032 §5.1.5, and the chain code is HMAC-SHA256
    /// (note: not 512) over `0x01 || seed`.
    pub fn from_seed(seed: &[u8]) -> Result<Self, WalletError> {
        if seed.len() < MIN_SEED_LEN {
            return Err(WalletError::InvalidSeed(seed.len()));
        }

        let mut i = Zeroizing::new(hmac_sha512(MASTER_SECRET, &[seed]));
        // Admit only candidates whose kL has a zero third-highest bit.
        while i[31] & 0b0010_0000 != 0 {
            let next = hmac_sha512(MASTER_SECRET, &[i.as_slice()]);
            *i = next;
        }

        let mut bytes = [0u8; 96];
        bytes[..64].copy_from_slice(&i[..]);
        // RFC 8032 §5.1.5 clamping: clear the low 3 bits, clear the top bit,
        // set the second-highest bit.
        bytes[0] &= 0b1111_1000;
        bytes[31] &= 0b0011_1111;
        bytes[31] |= 0b0100_0000;

        let chain_code = hmac_sha256(MASTER_SECRET, &[&[0x01], seed]);
        bytes[64..].copy_from_slice(&chain_code);

        Ok(Self { bytes })
    }

    /// Reconstruct an extended private key from its 96-byte serialization.
    pub fn from_bytes(bytes: [u8; 96]) -> Self {
        Self { bytes }
    }

    /// Serialize as `kL || kR || chain code`.
    pub fn to_bytes(&self) -> [u8; 96] {
        self.bytes
    }

    fn kl(&self) -> &[u8; 32] {
        self.bytes[..32].try_into().expect("fixed slice")
    }

    fn kr(&self) -> &[u8; 32] {
        self.bytes[32..64].try_into().expect("fixed slice")
    }

    fn chain_code(&self) -> &[u8; 32] {
        self.bytes[64..].try_into().expect("fixed slice")
    }

    /// The compressed Ed25519 public point for `kL`.
    pub fn public_key_bytes(&self) -> [u8; 32] {
        let scalar = Scalar::from_bytes_mod_order(*self.kl());
        EdwardsPoint::mul_base(&scalar).compress().to_bytes()
    }

    /// One step of child derivation. Hardened iff `index >= 0x80000000`.
    pub fn derive(&self, index: u32) -> Self {
        let cc = self.chain_code();
        let le = index.to_le_bytes();

        let (z, i) = if is_hardened(index) {
            let z = hmac_sha512(cc, &[&[0x00], self.kl(), self.kr(), &le]);
            let i = hmac_sha512(cc, &[&[0x01], self.kl(), self.kr(), &le]);
            (z, i)
        } else {
            let a = self.public_key_bytes();
            let z = hmac_sha512(cc, &[&[0x02], &a, &le]);
            let i = hmac_sha512(cc, &[&[0x03], &a, &le]);
            (z, i)
        };

        let left = add256(self.kl(), &mul8(&z[..28]));
        let right = add256(self.kr(), z[32..].try_into().expect("fixed slice"));

        let mut bytes = [0u8; 96];
        bytes[..32].copy_from_slice(&left);
        bytes[32..64].copy_from_slice(&right);
        bytes[64..].copy_from_slice(&i[32..]);
        Self { bytes }
    }

    /// Fold [`Xprv::derive`] over a parsed path.
    pub fn derive_path(&self, path: &DerivationPath) -> Self {
        let mut key = Self {
            bytes: self.bytes,
        };
        for &index in path.indices() {
            let child = key.derive(index);
            key.zeroize();
            key = child;
        }
        key
    }

    /// The extended public key: public point plus chain code. One-way.
    pub fn to_public(&self) -> Xpub {
        let mut bytes = [0u8; 64];
        bytes[..32].copy_from_slice(&self.public_key_bytes());
        bytes[32..].copy_from_slice(self.chain_code());
        Xpub { bytes }
    }

    /// Sign a message with the expanded scalar pair.
    ///
    /// The nonce is `SHA-512(kR || M)` per the BIP32-Ed25519 paper; the
    /// resulting signature verifies under standard Ed25519.
    pub fn sign(&self, message: &[u8]) -> [u8; 64] {
        let mut h = Sha512::new();
        h.update(self.kr());
        h.update(message);
        let r = Scalar::from_bytes_mod_order_wide(&wide(h));
        let big_r = EdwardsPoint::mul_base(&r).compress();

        let a = self.public_key_bytes();
        let mut h = Sha512::new();
        h.update(big_r.as_bytes());
        h.update(a);
        h.update(message);
        let k = Scalar::from_bytes_mod_order_wide(&wide(h));

        let s = r + k * Scalar::from_bytes_mod_order(*self.kl());

        let mut sig = [0u8; 64];
        sig[..32].copy_from_slice(big_r.as_bytes());
        sig[32..].copy_from_slice(&s.to_bytes());
        sig
    }
}

fn wide(h: Sha512) -> [u8; 64] {
    let mut out = [0u8; 64];
    out.copy_from_slice(&h.finalize());
    out
}

impl Clone for Xprv {
    fn clone(&self) -> Self {
        Self { bytes: self.bytes }
    }
}

impl fmt::Debug for Xprv {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Xprv").field("bytes", &"[REDACTED]").finish()
    }
}

/// A 64-byte extended public key: compressed point plus chain code.
///
/// Carried standalone when the wallet is opened watch-only.
#[derive(Clone, PartialEq, Eq)]
pub struct Xpub {
    bytes: [u8; 64],
}

impl Xpub {
    /// Reconstruct from a 64-byte serialization, validating the point.
    pub fn from_bytes(bytes: [u8; 64]) -> Result<Self, WalletError> {
        let point: [u8; 32] = bytes[..32].try_into().expect("fixed slice");
        CompressedEdwardsY(point)
            .decompress()
            .ok_or(WalletError::InvalidPublicKey)?;
        Ok(Self { bytes })
    }

    /// Serialize as `public point || chain code`.
    pub fn to_bytes(&self) -> [u8; 64] {
        self.bytes
    }

    /// The raw compressed public point.
    pub fn public_key_bytes(&self) -> [u8; 32] {
        self.bytes[..32].try_into().expect("fixed slice")
    }

    fn chain_code(&self) -> &[u8; 32] {
        self.bytes[32..].try_into().expect("fixed slice")
    }

    /// One step of soft child derivation by point addition.
    ///
    /// Hardened children cannot be derived without the private scalar and
    /// fail with [`WalletError::UnsupportedDerivation`].
    pub fn derive(&self, index: u32) -> Result<Self, WalletError> {
        if is_hardened(index) {
            return Err(WalletError::UnsupportedDerivation);
        }
        let cc = self.chain_code();
        let a = self.public_key_bytes();
        let le = index.to_le_bytes();

        let z = hmac_sha512(cc, &[&[0x02], &a, &le]);
        let i = hmac_sha512(cc, &[&[0x03], &a, &le]);

        let parent = CompressedEdwardsY(a)
            .decompress()
            .ok_or(WalletError::InvalidPublicKey)?;
        let tweak = Scalar::from_bytes_mod_order(mul8(&z[..28]));
        let child = parent + EdwardsPoint::mul_base(&tweak);

        let mut bytes = [0u8; 64];
        bytes[..32].copy_from_slice(&child.compress().to_bytes());
        bytes[32..].copy_from_slice(&i[32..]);
        Ok(Self { bytes })
    }

    /// Fold [`Xpub::derive`] over a parsed path; any hardened component
    /// fails the whole derivation.
    pub fn derive_path(&self, path: &DerivationPath) -> Result<Self, WalletError> {
        let mut key = self.clone();
        for &index in path.indices() {
            key = key.derive(index)?;
        }
        Ok(key)
    }

    /// Verify a signature produced by the matching [`Xprv`].
    pub fn verify(&self, message: &[u8], signature: &[u8; 64]) -> bool {
        let Ok(vk) = ed25519_dalek::VerifyingKey::from_bytes(&self.public_key_bytes()) else {
            return false;
        };
        let sig = ed25519_dalek::Signature::from_bytes(signature);
        vk.verify_strict(message, &sig).is_ok()
    }
}

impl fmt::Debug for Xpub {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Xpub({})", hex::encode(self.bytes))
    }
}

/// A parsed derivation path: ordered 32-bit indices, hardened flagged by the
/// high bit.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct DerivationPath {
    indices: Vec<u32>,
}

impl DerivationPath {
    /// The empty path (`m`), which leaves keys unchanged.
    pub fn root() -> Self {
        Self::default()
    }

    /// Build a path from raw indices (hardened bit included).
    pub fn from_indices(indices: Vec<u32>) -> Self {
        Self { indices }
    }

    /// The raw indices.
    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    /// True if any component is hardened.
    pub fn has_hardened(&self) -> bool {
        self.indices.iter().copied().any(is_hardened)
    }
}

impl FromStr for DerivationPath {
    type Err = WalletError;

    /// Parse `m/1852'/1815'/0'/0/0` style paths. A bare `m` (or the empty
    /// string) is the root. Each component is a decimal index below
    /// 0x80000000, optionally suffixed with `'` for hardening.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut indices = Vec::new();
        let trimmed = s.strip_prefix('m').unwrap_or(s);
        let trimmed = trimmed.strip_prefix('/').unwrap_or(trimmed);
        if trimmed.is_empty() {
            return Ok(Self { indices });
        }
        for component in trimmed.split('/') {
            let (digits, hardened) = match component.strip_suffix('\'') {
                Some(rest) => (rest, true),
                None => (component, false),
            };
            let index: u32 = digits
                .parse()
                .map_err(|_| WalletError::InvalidPath(s.to_string()))?;
            if is_hardened(index) {
                return Err(WalletError::InvalidPath(s.to_string()));
            }
            indices.push(if hardened { harden(index) } else { index });
        }
        Ok(Self { indices })
    }
}

impl fmt::Display for DerivationPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "m")?;
        for &index in &self.indices {
            if is_hardened(index) {
                write!(f, "/{}'", index - HARDENED_OFFSET)?;
            } else {
                write!(f, "/{index}")?;
            }
        }
        Ok(())
    }
}
