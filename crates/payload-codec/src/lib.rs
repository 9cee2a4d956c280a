//! Symmetric encryption for sensitive payloads crossing the transport layer.
//!
//! Job references and produced results are shielded from the transport with
//! AES-256-CBC under a key derived from a shared secret via
//! PBKDF2-HMAC-SHA256. Salt and IV travel in-band, so a token is fully
//! self-describing: `base64(salt[16] || iv[16] || ciphertext)`.
//!
//! The wire format is shared with non-Rust peers; the field order, lengths
//! and KDF parameters below are fixed and must not change.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use cipher::block_padding::Pkcs7;
use cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use rand::Rng;
use sha2::Sha256;

type Aes256CbcEnc = cbc::Encryptor<aes::Aes256>;
type Aes256CbcDec = cbc::Decryptor<aes::Aes256>;

/// PBKDF2 iteration count, fixed by the wire format.
pub const PBKDF2_ITERATIONS: u32 = 100_000;
/// Derived key length in bytes (AES-256).
pub const KEY_LENGTH: usize = 32;
/// Length of the per-token random salt.
pub const SALT_LENGTH: usize = 16;
/// Length of the per-token random IV.
pub const IV_LENGTH: usize = 16;

const BLOCK_SIZE: usize = 16;

/// Errors produced when decoding or decrypting a payload token.
///
/// Decryption fails closed: any framing, alignment or padding problem is
/// surfaced as an error and the payload is discarded.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("payload is not valid base64: {source}")]
    Decode {
        #[from]
        source: base64::DecodeError,
    },

    #[error("payload too short: {len} bytes, need at least {min}")]
    TooShort { len: usize, min: usize },

    #[error("ciphertext length {len} is not a multiple of the cipher block size")]
    BlockAlignment { len: usize },

    #[error("padding validation failed (wrong secret or corrupted payload)")]
    Padding,
}

/// Derive the AES key for `salt` from the shared secret.
pub fn derive_key(secret: &str, salt: &[u8]) -> [u8; KEY_LENGTH] {
    let mut key = [0u8; KEY_LENGTH];
    pbkdf2::pbkdf2_hmac::<Sha256>(secret.as_bytes(), salt, PBKDF2_ITERATIONS, &mut key);
    key
}

/// Encrypt `plaintext` under `secret`, producing a transport-safe token.
///
/// Every call draws a fresh random salt and IV, so encryption is never
/// deterministic: encrypting the same plaintext twice yields different
/// tokens that both decrypt to the original bytes.
pub fn encrypt(plaintext: &[u8], secret: &str) -> String {
    let mut salt = [0u8; SALT_LENGTH];
    let mut iv = [0u8; IV_LENGTH];
    let mut rng = rand::rng();
    rng.fill(&mut salt);
    rng.fill(&mut iv);

    encrypt_with(plaintext, secret, &salt, &iv)
}

/// Deterministic core of [`encrypt`], split out so tests can pin salt/IV.
fn encrypt_with(
    plaintext: &[u8],
    secret: &str,
    salt: &[u8; SALT_LENGTH],
    iv: &[u8; IV_LENGTH],
) -> String {
    let key = derive_key(secret, salt);

    // PKCS#7 always appends at least one byte, so round up to the next block.
    let padded_len = (plaintext.len() / BLOCK_SIZE + 1) * BLOCK_SIZE;
    let mut buffer = vec![0u8; padded_len];
    buffer[..plaintext.len()].copy_from_slice(plaintext);

    let ciphertext = Aes256CbcEnc::new(&key.into(), iv.into())
        .encrypt_padded_mut::<Pkcs7>(&mut buffer, plaintext.len())
        .expect("buffer is sized for PKCS#7 padding");

    let mut wire = Vec::with_capacity(SALT_LENGTH + IV_LENGTH + ciphertext.len());
    wire.extend_from_slice(salt);
    wire.extend_from_slice(iv);
    wire.extend_from_slice(ciphertext);

    STANDARD.encode(wire)
}

/// Decrypt a token produced by [`encrypt`] (or a wire-compatible peer).
///
/// Pure function of `(token, secret)`. A wrong secret is detected through
/// PKCS#7 padding validation and reported as [`CodecError::Padding`].
pub fn decrypt(token: &str, secret: &str) -> Result<Vec<u8>, CodecError> {
    let decoded = STANDARD.decode(token.trim())?;

    let min = SALT_LENGTH + IV_LENGTH + BLOCK_SIZE;
    if decoded.len() < min {
        return Err(CodecError::TooShort {
            len: decoded.len(),
            min,
        });
    }

    let (salt, rest) = decoded.split_at(SALT_LENGTH);
    let (iv, ciphertext) = rest.split_at(IV_LENGTH);
    if ciphertext.len() % BLOCK_SIZE != 0 {
        return Err(CodecError::BlockAlignment {
            len: ciphertext.len(),
        });
    }

    let key = derive_key(secret, salt);
    let mut buffer = ciphertext.to_vec();

    let plaintext = Aes256CbcDec::new_from_slices(&key, iv)
        .expect("salt and IV lengths are fixed above")
        .decrypt_padded_mut::<Pkcs7>(&mut buffer)
        .map_err(|_| CodecError::Padding)?;

    Ok(plaintext.to_vec())
}
