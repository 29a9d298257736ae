//!
//! # Symmetric Encryption Utility
//!
//! Reversible AES-128-CTR transform used to obscure stored email addresses
//! and to compose session cookies and email-change confirmation codes.
//!
//! The key and the initial counter block are fixed, which makes the
//! transform fully deterministic: the same plaintext always produces the
//! same ciphertext. That property is load-bearing — the `email` field is
//! stored encrypted and queried by its encrypted form, so two encryptions
//! of the same address must collide. It also means this is NOT sound
//! cryptography (the key ships in the binary and equal plaintexts are
//! visible as equal ciphertexts); it exists for obfuscation and for
//! compatibility with data written by earlier deployments.

use aes::cipher::{KeyIvInit, StreamCipher};
use aes::Aes128;

type Aes128Ctr = ctr::Ctr128BE<Aes128>;

const KEY: [u8; 16] = [1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15, 16];
// Initial value of the big-endian counter block.
const COUNTER: u128 = 5;

fn keystream() -> Aes128Ctr {
    Aes128Ctr::new(&KEY.into(), &COUNTER.to_be_bytes().into())
}

/// Encrypts `text` and returns the ciphertext as a lowercase hex string.
pub fn encrypt(text: &str) -> String {
    let mut buffer = text.as_bytes().to_vec();
    keystream().apply_keystream(&mut buffer);
    hex::encode(buffer)
}

/// Decrypts a hex ciphertext produced by [`encrypt`].
///
/// Returns `None` when the input is not valid hex or the decrypted bytes
/// are not UTF-8 — the two ways "garbage output" is representable here.
/// Callers are responsible for validating the structure of whatever
/// decrypts successfully.
pub fn decrypt(ciphertext: &str) -> Option<String> {
    let mut buffer = hex::decode(ciphertext).ok()?;
    keystream().apply_keystream(&mut buffer);
    String::from_utf8(buffer).ok()
}
