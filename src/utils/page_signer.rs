//! Signed query parameters for the internal cloak and block pages.
//!
//! The edge dispatcher and the resolution API hand out `/cloak?d=..&s=..`
//! and `/blocked?m=..&s=..` paths. The pages render only when `s` is a
//! valid MAC of the parameter, so nobody can make the short domain frame an
//! arbitrary site or display arbitrary text.

use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Internal page a signature is bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignedPage {
    Cloak,
    Blocked,
}

impl SignedPage {
    fn as_str(self) -> &'static str {
        match self {
            Self::Cloak => "cloak",
            Self::Blocked => "blocked",
        }
    }
}

#[derive(Clone)]
pub struct PageSigner {
    secret: Vec<u8>,
}

impl PageSigner {
    pub fn new(secret: impl AsRef<[u8]>) -> Self {
        Self {
            secret: secret.as_ref().to_vec(),
        }
    }

    fn mac(&self, page: SignedPage, value: &str) -> HmacSha256 {
        let mut mac =
            HmacSha256::new_from_slice(&self.secret).expect("HMAC accepts any key length");
        // Prefix keeps these MACs disjoint from IP hashes under the same key.
        mac.update(b"page:");
        mac.update(page.as_str().as_bytes());
        mac.update(b"\0");
        mac.update(value.as_bytes());
        mac
    }

    /// Returns the hex-encoded signature of `value` for `page`.
    pub fn sign(&self, page: SignedPage, value: &str) -> String {
        hex::encode(self.mac(page, value).finalize().into_bytes())
    }

    /// Constant-time check of a signature produced by [`PageSigner::sign`].
    pub fn verify(&self, page: SignedPage, value: &str, signature: &str) -> bool {
        let Ok(bytes) = hex::decode(signature.trim()) else {
            return false;
        };
        self.mac(page, value).verify_slice(&bytes).is_ok()
    }
}

impl std::fmt::Debug for PageSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PageSigner").field("secret", &"***").finish()
    }
}
