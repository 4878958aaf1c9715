use super::cipher::{utf16le, AesDecryptor, HashAlgorithm};
use super::{split_package, DecryptError};

const SPIN_COUNT: u32 = 50_000;
const SALT_LENGTH: usize = 16;

const ALG_ID_AES_128: u32 = 0x660E;
const ALG_ID_AES_192: u32 = 0x660F;
const ALG_ID_AES_256: u32 = 0x6610;
const ALG_ID_HASH_SHA1: u32 = 0x8004;

#[derive(Debug, Clone)]
pub(crate) struct StandardInfo {
    key_size: usize,
    salt: Vec<u8>,
    encrypted_verifier: Vec<u8>,
    encrypted_verifier_hash: Vec<u8>,
}

struct ByteReader<'a> {
    data: &'a [u8],
    offset: usize,
}

impl<'a> ByteReader<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self { data, offset: 0 }
    }

    fn take(&mut self, len: usize) -> Result<&'a [u8], DecryptError> {
        let end = self.offset + len;
        let slice = self.data.get(self.offset..end).ok_or_else(|| {
            DecryptError::Malformed("EncryptionInfo stream is truncated".to_string())
        })?;
        self.offset = end;
        Ok(slice)
    }

    fn u32(&mut self) -> Result<u32, DecryptError> {
        let bytes = self.take(4)?;
        Ok(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }
}

impl StandardInfo {
    /// Parses the binary header and verifier that follow the 8-byte
    /// version/flags prefix.
    pub(crate) fn parse(data: &[u8]) -> Result<Self, DecryptError> {
        let mut reader = ByteReader::new(data);
        let header_size = reader.u32()? as usize;
        let mut header = ByteReader::new(reader.take(header_size)?);

        let _flags = header.u32()?;
        let _size_extra = header.u32()?;
        let alg_id = header.u32()?;
        let alg_id_hash = header.u32()?;
        let key_bits = header.u32()? as usize;

        let key_size = match alg_id {
            ALG_ID_AES_128 | ALG_ID_AES_192 | ALG_ID_AES_256 => key_bits / 8,
            other => {
                return Err(DecryptError::Unsupported(format!(
                    "standard encryption algorithm 0x{:04X}",
                    other
                )))
            }
        };
        if alg_id_hash != ALG_ID_HASH_SHA1 && alg_id_hash != 0 {
            return Err(DecryptError::Unsupported(format!(
                "standard encryption hash 0x{:04X}",
                alg_id_hash
            )));
        }

        let salt_size = reader.u32()? as usize;
        if salt_size != SALT_LENGTH {
            return Err(DecryptError::Malformed(format!(
                "unexpected verifier salt size {}",
                salt_size
            )));
        }
        let salt = reader.take(SALT_LENGTH)?.to_vec();
        let encrypted_verifier = reader.take(16)?.to_vec();
        let _verifier_hash_size = reader.u32()?;
        let encrypted_verifier_hash = reader.take(32)?.to_vec();

        Ok(Self {
            key_size,
            salt,
            encrypted_verifier,
            encrypted_verifier_hash,
        })
    }

    pub(crate) fn decrypt(
        &self,
        password: &str,
        encrypted_package: &[u8],
    ) -> Result<Vec<u8>, DecryptError> {
        let cipher = AesDecryptor::new(&self.derive_key(password))?;

        let verifier = cipher.decrypt_ecb(&self.encrypted_verifier)?;
        let verifier_hash = cipher.decrypt_ecb(&self.encrypted_verifier_hash)?;
        let expected = HashAlgorithm::Sha1.digest(&[&verifier]);
        if verifier_hash[..expected.len()] != expected[..] {
            return Err(DecryptError::WrongPassword);
        }

        let (size, ciphertext) = split_package(encrypted_package)?;
        let aligned = ciphertext.len() - ciphertext.len() % 16;
        let mut plaintext = cipher.decrypt_ecb(&ciphertext[..aligned])?;
        if size > plaintext.len() {
            return Err(DecryptError::Malformed(format!(
                "declared package size {} exceeds decrypted length {}",
                size,
                plaintext.len()
            )));
        }
        plaintext.truncate(size);
        Ok(plaintext)
    }

    fn derive_key(&self, password: &str) -> Vec<u8> {
        let sha1 = HashAlgorithm::Sha1;
        let mut digest = sha1.digest(&[&self.salt, &utf16le(password)]);
        for iteration in 0..SPIN_COUNT {
            digest = sha1.digest(&[&iteration.to_le_bytes(), &digest]);
        }
        let final_hash = sha1.digest(&[&digest, &0u32.to_le_bytes()]);

        let mut inner = [0x36u8; 64];
        let mut outer = [0x5cu8; 64];
        for (index, byte) in final_hash.iter().enumerate() {
            inner[index] ^= byte;
            outer[index] ^= byte;
        }

        let mut derived = sha1.digest(&[&inner]);
        derived.extend(sha1.digest(&[&outer]));
        derived.truncate(self.key_size);
        derived
    }
}
