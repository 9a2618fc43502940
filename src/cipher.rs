//! Password-based encryption of config files.
//!
//! `PasswordCipher` derives a 256-bit key with Argon2id and seals the
//! serialized document with XChaCha20-Poly1305.
//!
//! ## File layout
//!
//! ```text
//! [version: 1][m_cost: u32 LE][t_cost: u32 LE][p_cost: u32 LE][salt: 16][nonce: 24][ciphertext + tag]
//! ```
//!
//! The KDF costs travel with the file, so a reader does not need to know the
//! parameters the writer used. Salt and nonce are fresh for every write.

use argon2::{Algorithm, Argon2, Params, Version};
use chacha20poly1305::{
    Key, XChaCha20Poly1305, XNonce,
    aead::{Aead, KeyInit},
};
use rand::RngCore;
use rand::rngs::OsRng;
use zeroize::Zeroizing;

use crate::{Error, Result};

/// Current file format version.
const FORMAT_VERSION: u8 = 1;

const SALT_SIZE: usize = 16;
const NONCE_SIZE: usize = 24;
const TAG_SIZE: usize = 16;
const KEY_SIZE: usize = 32;
const HEADER_SIZE: usize = 1 + 4 * 3 + SALT_SIZE + NONCE_SIZE;

/// Upper bounds for costs, on write and when reading a header (the KDF runs
/// before the ciphertext is authenticated).
const MAX_MEMORY_KIB: u32 = 4 * Params::DEFAULT_M_COST;
const MAX_ITERATIONS: u32 = 4 * Params::DEFAULT_T_COST;
const MAX_PARALLELISM: u32 = 4 * Params::DEFAULT_P_COST;

/// Encrypt and decrypt byte streams with a password.
pub trait Cipher: Send + Sync + std::fmt::Debug {
    /// Encrypt `plaintext`.
    fn encrypt(&self, plaintext: &[u8], password: &str) -> Result<Vec<u8>>;

    /// Decrypt data produced by `encrypt`.
    ///
    /// # Errors
    /// - `Error::WrongKeyOrCorrupted` if the password is wrong or the data was
    ///   modified
    /// - `Error::EnvironmentBroken` if the primitives themselves fail
    fn decrypt(&self, ciphertext: &[u8], password: &str) -> Result<Vec<u8>>;
}

/// Argon2id + XChaCha20-Poly1305.
#[derive(Debug, Clone)]
pub struct PasswordCipher {
    memory_kib: u32,
    iterations: u32,
    parallelism: u32,
}

impl Default for PasswordCipher {
    /// Argon2's recommended defaults (19 MiB, 2 iterations, 1 lane).
    fn default() -> Self {
        Self {
            memory_kib: Params::DEFAULT_M_COST,
            iterations: Params::DEFAULT_T_COST,
            parallelism: Params::DEFAULT_P_COST,
        }
    }
}

impl PasswordCipher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use custom Argon2id costs for newly written files.
    ///
    /// # Errors
    /// Returns `Error::InvalidArgument` if Argon2 rejects the combination or a
    /// value exceeds what readers accept.
    pub fn with_params(memory_kib: u32, iterations: u32, parallelism: u32) -> Result<Self> {
        if memory_kib > MAX_MEMORY_KIB || iterations > MAX_ITERATIONS || parallelism > MAX_PARALLELISM
        {
            return Err(Error::InvalidArgument(format!(
                "Argon2 costs out of range: m={} t={} p={}",
                memory_kib, iterations, parallelism
            )));
        }
        Params::new(memory_kib, iterations, parallelism, Some(KEY_SIZE))
            .map_err(|e| Error::InvalidArgument(format!("Invalid Argon2 costs: {}", e)))?;

        Ok(Self {
            memory_kib,
            iterations,
            parallelism,
        })
    }
}

fn derive_key(
    password: &str,
    salt: &[u8],
    params: Params,
) -> Result<Zeroizing<[u8; KEY_SIZE]>> {
    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);
    let mut key = Zeroizing::new([0u8; KEY_SIZE]);
    argon2
        .hash_password_into(password.as_bytes(), salt, &mut key[..])
        .map_err(|e| Error::EnvironmentBroken(format!("Argon2 key derivation failed: {}", e)))?;
    Ok(key)
}

fn read_u32(bytes: &[u8], offset: usize) -> u32 {
    let mut buf = [0u8; 4];
    buf.copy_from_slice(&bytes[offset..offset + 4]);
    u32::from_le_bytes(buf)
}

impl Cipher for PasswordCipher {
    fn encrypt(&self, plaintext: &[u8], password: &str) -> Result<Vec<u8>> {
        let params = Params::new(
            self.memory_kib,
            self.iterations,
            self.parallelism,
            Some(KEY_SIZE),
        )
        .map_err(|e| Error::EnvironmentBroken(format!("Argon2 params error: {}", e)))?;

        let mut salt = [0u8; SALT_SIZE];
        OsRng.fill_bytes(&mut salt);
        let mut nonce = [0u8; NONCE_SIZE];
        OsRng.fill_bytes(&mut nonce);

        let key = derive_key(password, &salt, params)?;
        let cipher = XChaCha20Poly1305::new(Key::from_slice(&key[..]));
        let sealed = cipher
            .encrypt(XNonce::from_slice(&nonce), plaintext)
            .map_err(|_| Error::EnvironmentBroken("XChaCha20-Poly1305 encryption failed".into()))?;

        let mut out = Vec::with_capacity(HEADER_SIZE + sealed.len());
        out.push(FORMAT_VERSION);
        out.extend_from_slice(&self.memory_kib.to_le_bytes());
        out.extend_from_slice(&self.iterations.to_le_bytes());
        out.extend_from_slice(&self.parallelism.to_le_bytes());
        out.extend_from_slice(&salt);
        out.extend_from_slice(&nonce);
        out.extend_from_slice(&sealed);
        Ok(out)
    }

    fn decrypt(&self, ciphertext: &[u8], password: &str) -> Result<Vec<u8>> {
        if ciphertext.len() < HEADER_SIZE + TAG_SIZE || ciphertext[0] != FORMAT_VERSION {
            return Err(Error::WrongKeyOrCorrupted);
        }

        let memory_kib = read_u32(ciphertext, 1);
        let iterations = read_u32(ciphertext, 5);
        let parallelism = read_u32(ciphertext, 9);
        if memory_kib > MAX_MEMORY_KIB || iterations > MAX_ITERATIONS || parallelism > MAX_PARALLELISM
        {
            return Err(Error::WrongKeyOrCorrupted);
        }
        let params = Params::new(memory_kib, iterations, parallelism, Some(KEY_SIZE))
            .map_err(|_| Error::WrongKeyOrCorrupted)?;

        let salt_start = 1 + 4 * 3;
        let nonce_start = salt_start + SALT_SIZE;
        let salt = &ciphertext[salt_start..nonce_start];
        let nonce = &ciphertext[nonce_start..HEADER_SIZE];

        let key = derive_key(password, salt, params)?;
        let cipher = XChaCha20Poly1305::new(Key::from_slice(&key[..]));
        cipher
            .decrypt(XNonce::from_slice(nonce), &ciphertext[HEADER_SIZE..])
            .map_err(|_| Error::WrongKeyOrCorrupted)
    }
}
