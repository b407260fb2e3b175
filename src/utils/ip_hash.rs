//! Keyed one-way hashing of client IP addresses.

use std::net::IpAddr;

use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Hashes IPs with HMAC-SHA256 under a server secret.
///
/// The raw address never leaves the request; only this digest is stored.
#[derive(Clone)]
pub struct IpHasher {
    secret: Vec<u8>,
}

impl IpHasher {
    pub fn new(secret: impl AsRef<[u8]>) -> Self {
        Self {
            secret: secret.as_ref().to_vec(),
        }
    }

    /// Returns a 64-character lowercase hex-encoded MAC of the address.
    pub fn hash(&self, ip: IpAddr) -> String {
        let mut mac =
            HmacSha256::new_from_slice(&self.secret).expect("HMAC accepts any key length");
        mac.update(ip.to_string().as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }
}

impl std::fmt::Debug for IpHasher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IpHasher").field("secret", &"***").finish()
    }
}
