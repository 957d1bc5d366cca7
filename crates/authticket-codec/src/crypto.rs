//! Cipher and signature primitives behind the codec.
//!
//! Thin dispatch from the configured algorithm enums onto the RustCrypto
//! implementations. Keys are passed in as already-validated byte slices.

use cbc::cipher::block_padding::Pkcs7;
use cbc::cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use hmac::digest::KeyInit;
use hmac::{Hmac, Mac};
use sha1::Sha1;
use sha2::{Sha256, Sha384, Sha512};
use subtle::ConstantTimeEq;

use crate::{CipherAlgorithm, CryptoError, SignatureAlgorithm};

type Aes128CbcEnc = cbc::Encryptor<aes::Aes128>;
type Aes128CbcDec = cbc::Decryptor<aes::Aes128>;
type Aes192CbcEnc = cbc::Encryptor<aes::Aes192>;
type Aes192CbcDec = cbc::Decryptor<aes::Aes192>;
type Aes256CbcEnc = cbc::Encryptor<aes::Aes256>;
type Aes256CbcDec = cbc::Decryptor<aes::Aes256>;

// ---------------------------------------------------------------------------
// Signature
// ---------------------------------------------------------------------------

/// Computes the keyed tag over `data`.
pub(crate) fn sign(
    algorithm: SignatureAlgorithm,
    key: &[u8],
    data: &[u8],
) -> Result<Vec<u8>, CryptoError> {
    match algorithm {
        SignatureAlgorithm::HmacSha1 => compute_mac::<Hmac<Sha1>>(key, data),
        SignatureAlgorithm::HmacSha256 => compute_mac::<Hmac<Sha256>>(key, data),
        SignatureAlgorithm::HmacSha384 => compute_mac::<Hmac<Sha384>>(key, data),
        SignatureAlgorithm::HmacSha512 => compute_mac::<Hmac<Sha512>>(key, data),
    }
}

/// Recomputes the tag over `data` and compares it with `claimed`.
///
/// The comparison touches every byte regardless of where the first
/// difference is, so response timing does not leak how much of a forged
/// tag was right.
pub(crate) fn verify(
    algorithm: SignatureAlgorithm,
    key: &[u8],
    data: &[u8],
    claimed: &[u8],
) -> Result<bool, CryptoError> {
    let expected = sign(algorithm, key, data)?;
    Ok(expected.as_slice().ct_eq(claimed).into())
}

fn compute_mac<M: Mac + KeyInit>(key: &[u8], data: &[u8]) -> Result<Vec<u8>, CryptoError> {
    let mut mac = <M as KeyInit>::new_from_slice(key).map_err(|_| CryptoError::KeyLength)?;
    Mac::update(&mut mac, data);
    Ok(mac.finalize().into_bytes().to_vec())
}

// ---------------------------------------------------------------------------
// Cipher
// ---------------------------------------------------------------------------

pub(crate) fn encrypt(
    algorithm: CipherAlgorithm,
    key: &[u8],
    iv: &[u8],
    plaintext: &[u8],
) -> Result<Vec<u8>, CryptoError> {
    match algorithm {
        CipherAlgorithm::Aes128Cbc => encrypt_cbc::<Aes128CbcEnc>(key, iv, plaintext),
        CipherAlgorithm::Aes192Cbc => encrypt_cbc::<Aes192CbcEnc>(key, iv, plaintext),
        CipherAlgorithm::Aes256Cbc => encrypt_cbc::<Aes256CbcEnc>(key, iv, plaintext),
    }
}

pub(crate) fn decrypt(
    algorithm: CipherAlgorithm,
    key: &[u8],
    iv: &[u8],
    ciphertext: &[u8],
) -> Result<Vec<u8>, CryptoError> {
    if ciphertext.is_empty() || ciphertext.len() % CipherAlgorithm::BLOCK_LEN != 0 {
        return Err(CryptoError::CiphertextLength(ciphertext.len()));
    }
    match algorithm {
        CipherAlgorithm::Aes128Cbc => decrypt_cbc::<Aes128CbcDec>(key, iv, ciphertext),
        CipherAlgorithm::Aes192Cbc => decrypt_cbc::<Aes192CbcDec>(key, iv, ciphertext),
        CipherAlgorithm::Aes256Cbc => decrypt_cbc::<Aes256CbcDec>(key, iv, ciphertext),
    }
}

/// Length of the ciphertext produced for a plaintext of `len` bytes.
///
/// PKCS#7 always adds at least one byte of padding, so an exact multiple
/// of the block size grows by a full block.
pub(crate) const fn ciphertext_len(len: usize) -> usize {
    (len / CipherAlgorithm::BLOCK_LEN + 1) * CipherAlgorithm::BLOCK_LEN
}

fn encrypt_cbc<E: KeyIvInit + BlockEncryptMut>(
    key: &[u8],
    iv: &[u8],
    plaintext: &[u8],
) -> Result<Vec<u8>, CryptoError> {
    let cipher = E::new_from_slices(key, iv).map_err(|_| CryptoError::KeyLength)?;
    Ok(cipher.encrypt_padded_vec_mut::<Pkcs7>(plaintext))
}

fn decrypt_cbc<D: KeyIvInit + BlockDecryptMut>(
    key: &[u8],
    iv: &[u8],
    ciphertext: &[u8],
) -> Result<Vec<u8>, CryptoError> {
    let cipher = D::new_from_slices(key, iv).map_err(|_| CryptoError::KeyLength)?;
    cipher
        .decrypt_padded_vec_mut::<Pkcs7>(ciphertext)
        .map_err(|_| CryptoError::Padding)
}
