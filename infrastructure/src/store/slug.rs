//! Unguessable identifier generation.

use rand::Rng;

/// URL-safe alphabet, 64 symbols.
const ALPHABET: &[u8; 64] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789_-";

/// Random identifier of the given length over the URL-safe alphabet.
pub(crate) fn nanoid(len: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..len)
        .map(|_| ALPHABET[rng.gen_range(0..ALPHABET.len())] as char)
        .collect()
}

/// Client-stable question slug. 21 symbols of 64 gives ~126 bits.
pub(crate) fn question_slug() -> String {
    nanoid(21)
}

/// Session bearer token.
pub(crate) fn session_token() -> String {
    nanoid(32)
}
