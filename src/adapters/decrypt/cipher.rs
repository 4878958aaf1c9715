//! Hash and block-cipher primitives shared by the agile and standard
//! decryption paths.

use super::DecryptError;
use aes::cipher::{BlockDecrypt, KeyInit};
use aes::{Aes128Dec, Aes192Dec, Aes256Dec, Block};
use sha1::Sha1;
use sha2::{Digest, Sha256, Sha384, Sha512};

pub(crate) const AES_BLOCK_SIZE: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum HashAlgorithm {
    Sha1,
    Sha256,
    Sha384,
    Sha512,
}

impl HashAlgorithm {
    pub(crate) fn parse(name: &str) -> Result<Self, DecryptError> {
        match name.to_ascii_uppercase().replace('-', "").as_str() {
            "SHA1" => Ok(Self::Sha1),
            "SHA256" => Ok(Self::Sha256),
            "SHA384" => Ok(Self::Sha384),
            "SHA512" => Ok(Self::Sha512),
            _ => Err(DecryptError::Unsupported(format!(
                "hash algorithm '{}'",
                name
            ))),
        }
    }

    pub(crate) fn output_size(&self) -> usize {
        match self {
            Self::Sha1 => 20,
            Self::Sha256 => 32,
            Self::Sha384 => 48,
            Self::Sha512 => 64,
        }
    }

    /// Hashes the concatenation of `parts`.
    pub(crate) fn digest(&self, parts: &[&[u8]]) -> Vec<u8> {
        match self {
            Self::Sha1 => digest_parts::<Sha1>(parts),
            Self::Sha256 => digest_parts::<Sha256>(parts),
            Self::Sha384 => digest_parts::<Sha384>(parts),
            Self::Sha512 => digest_parts::<Sha512>(parts),
        }
    }
}

fn digest_parts<D: Digest>(parts: &[&[u8]]) -> Vec<u8> {
    let mut hasher = D::new();
    for part in parts {
        hasher.update(part);
    }
    hasher.finalize().to_vec()
}

pub(crate) enum AesDecryptor {
    Aes128(Aes128Dec),
    Aes192(Aes192Dec),
    Aes256(Aes256Dec),
}

impl AesDecryptor {
    pub(crate) fn new(key: &[u8]) -> Result<Self, DecryptError> {
        let cipher = match key.len() {
            16 => Aes128Dec::new_from_slice(key).map(Self::Aes128),
            24 => Aes192Dec::new_from_slice(key).map(Self::Aes192),
            32 => Aes256Dec::new_from_slice(key).map(Self::Aes256),
            other => {
                return Err(DecryptError::Unsupported(format!(
                    "AES key of {} bytes",
                    other
                )))
            }
        };
        cipher.map_err(|_| DecryptError::Malformed("invalid AES key length".to_string()))
    }

    fn decrypt_block(&self, block: &mut Block) {
        match self {
            Self::Aes128(cipher) => cipher.decrypt_block(block),
            Self::Aes192(cipher) => cipher.decrypt_block(block),
            Self::Aes256(cipher) => cipher.decrypt_block(block),
        }
    }

    /// AES-CBC without padding removal.
    pub(crate) fn decrypt_cbc(&self, iv: &[u8], data: &[u8]) -> Result<Vec<u8>, DecryptError> {
        check_block_aligned(data)?;
        if iv.len() != AES_BLOCK_SIZE {
            return Err(DecryptError::Malformed(format!(
                "IV must be {} bytes, got {}",
                AES_BLOCK_SIZE,
                iv.len()
            )));
        }

        let mut output = Vec::with_capacity(data.len());
        let mut previous = [0u8; AES_BLOCK_SIZE];
        previous.copy_from_slice(iv);

        for chunk in data.chunks_exact(AES_BLOCK_SIZE) {
            let mut block = Block::clone_from_slice(chunk);
            self.decrypt_block(&mut block);
            for (plain, prev) in block.iter_mut().zip(previous.iter()) {
                *plain ^= prev;
            }
            output.extend_from_slice(&block);
            previous.copy_from_slice(chunk);
        }

        Ok(output)
    }

    /// AES-ECB without padding removal.
    pub(crate) fn decrypt_ecb(&self, data: &[u8]) -> Result<Vec<u8>, DecryptError> {
        check_block_aligned(data)?;

        let mut output = Vec::with_capacity(data.len());
        for chunk in data.chunks_exact(AES_BLOCK_SIZE) {
            let mut block = Block::clone_from_slice(chunk);
            self.decrypt_block(&mut block);
            output.extend_from_slice(&block);
        }
        Ok(output)
    }
}

fn check_block_aligned(data: &[u8]) -> Result<(), DecryptError> {
    if data.len() % AES_BLOCK_SIZE != 0 {
        return Err(DecryptError::Malformed(format!(
            "ciphertext length {} is not a multiple of the AES block size",
            data.len()
        )));
    }
    Ok(())
}

/// Passwords are hashed as UTF-16LE.
pub(crate) fn utf16le(password: &str) -> Vec<u8> {
    password
        .encode_utf16()
        .flat_map(|unit| unit.to_le_bytes())
        .collect()
}

/// Truncates `bytes` to `len`, or pads it with `pad`.
pub(crate) fn fit_to_length(mut bytes: Vec<u8>, len: usize, pad: u8) -> Vec<u8> {
    bytes.resize(len, pad);
    bytes
}
