//! The cipher primitives under measurement, consumed as black boxes.

use aes::cipher::{KeyIvInit, StreamCipher};
use aes_gcm::Aes128Gcm;
use aes_gcm::aead::generic_array::typenum::Unsigned;
use aes_gcm::aead::{Aead, AeadCore, KeyInit, Nonce, Payload};
use ascon_aead::{Ascon128, Ascon128a};

use crate::config::Algorithm;
use crate::error::{Error, Result};

type Aes128Ctr = ctr::Ctr128BE<aes::Aes128>;

/// Encrypt/decrypt operations for every [`Algorithm`].
///
/// Counter mode is length-preserving and ignores `associated_data`. AEAD
/// constructions append a tag on encrypt and fail on decrypt if it does not
/// verify.
pub trait CipherBackend {
    fn encrypt(
        &self,
        algorithm: Algorithm,
        key: &[u8],
        nonce: &[u8],
        associated_data: &[u8],
        plaintext: &[u8],
    ) -> Result<Vec<u8>>;

    fn decrypt(
        &self,
        algorithm: Algorithm,
        key: &[u8],
        nonce: &[u8],
        associated_data: &[u8],
        ciphertext: &[u8],
    ) -> Result<Vec<u8>>;
}

impl<B: CipherBackend + ?Sized> CipherBackend for &B {
    fn encrypt(
        &self,
        algorithm: Algorithm,
        key: &[u8],
        nonce: &[u8],
        associated_data: &[u8],
        plaintext: &[u8],
    ) -> Result<Vec<u8>> {
        (**self).encrypt(algorithm, key, nonce, associated_data, plaintext)
    }

    fn decrypt(
        &self,
        algorithm: Algorithm,
        key: &[u8],
        nonce: &[u8],
        associated_data: &[u8],
        ciphertext: &[u8],
    ) -> Result<Vec<u8>> {
        (**self).decrypt(algorithm, key, nonce, associated_data, ciphertext)
    }
}

/// Backend built on the RustCrypto `aes`, `ctr`, `aes-gcm` and `ascon-aead` crates.
#[derive(Clone, Copy, Debug, Default)]
pub struct RustCryptoBackend;

fn cipher_err(algorithm: Algorithm, what: &str, e: impl std::fmt::Display) -> Error {
    Error::Cipher {
        algorithm: algorithm.label().to_string(),
        message: format!("{what}: {e}"),
    }
}

/// Apply the AES-128 CTR keystream. Encryption and decryption are the same
/// operation.
fn aes_ctr(key: &[u8], iv: &[u8], data: &[u8]) -> Result<Vec<u8>> {
    let mut cipher = Aes128Ctr::new_from_slices(key, iv)
        .map_err(|e| cipher_err(Algorithm::Aes128Ctr, "init", e))?;
    let mut buf = data.to_vec();
    cipher.apply_keystream(&mut buf);
    Ok(buf)
}

fn aead_cipher<A: KeyInit + AeadCore>(algorithm: Algorithm, key: &[u8], nonce: &[u8]) -> Result<A> {
    if nonce.len() != A::NonceSize::USIZE {
        return Err(cipher_err(
            algorithm,
            "init",
            format!("nonce is {} bytes, expected {}", nonce.len(), A::NonceSize::USIZE),
        ));
    }
    A::new_from_slice(key).map_err(|e| cipher_err(algorithm, "init", e))
}

fn aead_seal<A: KeyInit + Aead>(
    algorithm: Algorithm,
    key: &[u8],
    nonce: &[u8],
    aad: &[u8],
    msg: &[u8],
) -> Result<Vec<u8>> {
    let cipher: A = aead_cipher(algorithm, key, nonce)?;
    cipher
        .encrypt(Nonce::<A>::from_slice(nonce), Payload { msg, aad })
        .map_err(|e| cipher_err(algorithm, "encryption", e))
}

fn aead_open<A: KeyInit + Aead>(
    algorithm: Algorithm,
    key: &[u8],
    nonce: &[u8],
    aad: &[u8],
    msg: &[u8],
) -> Result<Vec<u8>> {
    let cipher: A = aead_cipher(algorithm, key, nonce)?;
    cipher
        .decrypt(Nonce::<A>::from_slice(nonce), Payload { msg, aad })
        .map_err(|e| cipher_err(algorithm, "decryption", e))
}

impl CipherBackend for RustCryptoBackend {
    fn encrypt(
        &self,
        algorithm: Algorithm,
        key: &[u8],
        nonce: &[u8],
        associated_data: &[u8],
        plaintext: &[u8],
    ) -> Result<Vec<u8>> {
        match algorithm {
            Algorithm::Aes128Ctr => aes_ctr(key, nonce, plaintext),
            Algorithm::Ascon128 => {
                aead_seal::<Ascon128>(algorithm, key, nonce, associated_data, plaintext)
            }
            Algorithm::Ascon128a => {
                aead_seal::<Ascon128a>(algorithm, key, nonce, associated_data, plaintext)
            }
            Algorithm::Aes128Gcm => {
                aead_seal::<Aes128Gcm>(algorithm, key, nonce, associated_data, plaintext)
            }
        }
    }

    fn decrypt(
        &self,
        algorithm: Algorithm,
        key: &[u8],
        nonce: &[u8],
        associated_data: &[u8],
        ciphertext: &[u8],
    ) -> Result<Vec<u8>> {
        match algorithm {
            Algorithm::Aes128Ctr => aes_ctr(key, nonce, ciphertext),
            Algorithm::Ascon128 => {
                aead_open::<Ascon128>(algorithm, key, nonce, associated_data, ciphertext)
            }
            Algorithm::Ascon128a => {
                aead_open::<Ascon128a>(algorithm, key, nonce, associated_data, ciphertext)
            }
            Algorithm::Aes128Gcm => {
                aead_open::<Aes128Gcm>(algorithm, key, nonce, associated_data, ciphertext)
            }
        }
    }
}
