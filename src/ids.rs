// src/ids.rs
use base64::Engine;
use rand::rngs::OsRng;
use rand::RngCore;

pub const DEFAULT_ID_BYTES: usize = 12;

/// Generate an opaque record id using the OS RNG.
/// Example: "lead_3q2-8hGfX0aKxZpQ"
pub fn new_id(prefix: &str) -> String {
    let mut rng = OsRng;
    generate_id(&mut rng, prefix, DEFAULT_ID_BYTES)
}

/// Generate a prefixed URL-safe id from random bytes.
/// - Uses Base64 URL-safe, no padding.
/// - 12 bytes -> 16 char suffix, plenty at this system's scale.
pub fn generate_id<R: RngCore>(rng: &mut R, prefix: &str, nbytes: usize) -> String {
    let mut buf = vec![0u8; nbytes];
    rng.fill_bytes(&mut buf);
    format!("{prefix}_{}", base64_url_nopad(&buf))
}

fn base64_url_nopad(bytes: &[u8]) -> String {
    // URL_SAFE_NO_PAD keeps ids safe in path segments without encoding.
    base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes)
}
