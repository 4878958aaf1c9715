use super::cipher::{fit_to_length, utf16le, AesDecryptor, HashAlgorithm};
use super::{split_package, DecryptError};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::collections::HashMap;

const SEGMENT_LENGTH: usize = 4096;

const BLOCK_KEY_VERIFIER_INPUT: [u8; 8] = [0xfe, 0xa7, 0xd2, 0x76, 0x3b, 0x4b, 0x9e, 0x79];
const BLOCK_KEY_VERIFIER_VALUE: [u8; 8] = [0xd7, 0xaa, 0x0f, 0x6d, 0x30, 0x61, 0x34, 0x4e];
const BLOCK_KEY_ENCRYPTED_KEY: [u8; 8] = [0x14, 0x6e, 0x0b, 0xe7, 0xab, 0xac, 0xd0, 0xd6];

/// `<keyData>`: parameters for the package itself.
#[derive(Debug, Clone)]
struct KeyData {
    salt: Vec<u8>,
    hash: HashAlgorithm,
    block_size: usize,
    key_bits: usize,
}

/// `<p:encryptedKey>`: the password key encryptor.
#[derive(Debug, Clone)]
struct PasswordKeyEncryptor {
    salt: Vec<u8>,
    hash: HashAlgorithm,
    block_size: usize,
    key_bits: usize,
    spin_count: u32,
    encrypted_verifier_hash_input: Vec<u8>,
    encrypted_verifier_hash_value: Vec<u8>,
    encrypted_key_value: Vec<u8>,
}

#[derive(Debug, Clone)]
pub(crate) struct AgileInfo {
    key_data: KeyData,
    encryptor: PasswordKeyEncryptor,
}

impl AgileInfo {
    /// Parses the XML descriptor that follows the 8-byte version/flags prefix.
    pub(crate) fn parse(xml: &[u8]) -> Result<Self, DecryptError> {
        let mut reader = Reader::from_reader(xml);
        let mut buffer = Vec::new();
        let mut key_data = None;
        let mut encrypted_key = None;

        loop {
            buffer.clear();
            match reader.read_event_into(&mut buffer) {
                Ok(Event::Eof) => break,
                Ok(Event::Start(element)) | Ok(Event::Empty(element)) => {
                    match element.local_name().as_ref() {
                        b"keyData" if key_data.is_none() => {
                            key_data = Some(attributes(&element)?);
                        }
                        b"encryptedKey" if encrypted_key.is_none() => {
                            encrypted_key = Some(attributes(&element)?);
                        }
                        _ => (),
                    }
                }
                Ok(_) => (),
                Err(e) => return Err(DecryptError::Malformed(format!("descriptor XML: {}", e))),
            }
        }

        let key_data = key_data
            .ok_or_else(|| DecryptError::Malformed("missing keyData element".to_string()))?;
        let encrypted_key = encrypted_key.ok_or_else(|| {
            DecryptError::Unsupported("no password key encryptor".to_string())
        })?;

        check_cipher(&key_data)?;
        check_cipher(&encrypted_key)?;

        Ok(Self {
            key_data: KeyData {
                salt: base64_attr(&key_data, "saltValue")?,
                hash: HashAlgorithm::parse(required(&key_data, "hashAlgorithm")?)?,
                block_size: number_attr(&key_data, "blockSize")?,
                key_bits: number_attr(&key_data, "keyBits")?,
            },
            encryptor: PasswordKeyEncryptor {
                salt: base64_attr(&encrypted_key, "saltValue")?,
                hash: HashAlgorithm::parse(required(&encrypted_key, "hashAlgorithm")?)?,
                block_size: number_attr(&encrypted_key, "blockSize")?,
                key_bits: number_attr(&encrypted_key, "keyBits")?,
                spin_count: number_attr(&encrypted_key, "spinCount")?,
                encrypted_verifier_hash_input: base64_attr(
                    &encrypted_key,
                    "encryptedVerifierHashInput",
                )?,
                encrypted_verifier_hash_value: base64_attr(
                    &encrypted_key,
                    "encryptedVerifierHashValue",
                )?,
                encrypted_key_value: base64_attr(&encrypted_key, "encryptedKeyValue")?,
            },
        })
    }

    pub(crate) fn decrypt(
        &self,
        password: &str,
        encrypted_package: &[u8],
    ) -> Result<Vec<u8>, DecryptError> {
        let secret_key = self.unwrap_secret_key(password)?;
        let cipher = AesDecryptor::new(&secret_key)?;
        let (size, ciphertext) = split_package(encrypted_package)?;

        let mut plaintext = Vec::with_capacity(ciphertext.len());
        for (index, segment) in ciphertext.chunks(SEGMENT_LENGTH).enumerate() {
            let iv = fit_to_length(
                self.key_data
                    .hash
                    .digest(&[&self.key_data.salt, &(index as u32).to_le_bytes()]),
                self.key_data.block_size,
                0x36,
            );
            plaintext.extend(cipher.decrypt_cbc(&iv, segment)?);
        }

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

    /// Verifies the password and returns the package key.
    fn unwrap_secret_key(&self, password: &str) -> Result<Vec<u8>, DecryptError> {
        let encryptor = &self.encryptor;
        let hash = encryptor.hash;

        let mut digest = hash.digest(&[&encryptor.salt, &utf16le(password)]);
        for iteration in 0..encryptor.spin_count {
            digest = hash.digest(&[&iteration.to_le_bytes(), &digest]);
        }

        let iv = fit_to_length(encryptor.salt.clone(), encryptor.block_size, 0x36);
        let derive = |block_key: &[u8]| {
            fit_to_length(hash.digest(&[&digest, block_key]), encryptor.key_bits / 8, 0x36)
        };

        let verifier_input = AesDecryptor::new(&derive(&BLOCK_KEY_VERIFIER_INPUT))?
            .decrypt_cbc(&iv, &encryptor.encrypted_verifier_hash_input)?;
        let verifier_input = &verifier_input[..encryptor.salt.len().min(verifier_input.len())];

        let verifier_hash = AesDecryptor::new(&derive(&BLOCK_KEY_VERIFIER_VALUE))?
            .decrypt_cbc(&iv, &encryptor.encrypted_verifier_hash_value)?;
        let expected = hash.digest(&[verifier_input]);

        if verifier_hash.len() < hash.output_size()
            || verifier_hash[..hash.output_size()] != expected[..]
        {
            return Err(DecryptError::WrongPassword);
        }

        let key_value = AesDecryptor::new(&derive(&BLOCK_KEY_ENCRYPTED_KEY))?
            .decrypt_cbc(&iv, &encryptor.encrypted_key_value)?;
        let key_len = self.key_data.key_bits / 8;
        if key_value.len() < key_len {
            return Err(DecryptError::Malformed(
                "encrypted key value is shorter than the key".to_string(),
            ));
        }
        Ok(key_value[..key_len].to_vec())
    }
}

fn attributes(element: &BytesStart<'_>) -> Result<HashMap<String, String>, DecryptError> {
    let mut values = HashMap::new();
    for attribute in element.attributes() {
        let attribute =
            attribute.map_err(|e| DecryptError::Malformed(format!("descriptor attribute: {}", e)))?;
        let name = String::from_utf8_lossy(attribute.key.local_name().as_ref()).into_owned();
        let value = attribute
            .unescape_value()
            .map_err(|e| DecryptError::Malformed(format!("descriptor attribute: {}", e)))?
            .into_owned();
        values.insert(name, value);
    }
    Ok(values)
}

fn required<'a>(values: &'a HashMap<String, String>, name: &str) -> Result<&'a str, DecryptError> {
    values
        .get(name)
        .map(String::as_str)
        .ok_or_else(|| DecryptError::Malformed(format!("missing attribute '{}'", name)))
}

fn number_attr<T: std::str::FromStr>(
    values: &HashMap<String, String>,
    name: &str,
) -> Result<T, DecryptError> {
    let raw = required(values, name)?;
    raw.trim()
        .parse()
        .map_err(|_| DecryptError::Malformed(format!("attribute '{}' is not a number: {}", name, raw)))
}

fn base64_attr(values: &HashMap<String, String>, name: &str) -> Result<Vec<u8>, DecryptError> {
    BASE64
        .decode(required(values, name)?.trim())
        .map_err(|e| DecryptError::Malformed(format!("attribute '{}' is not base64: {}", name, e)))
}

fn check_cipher(values: &HashMap<String, String>) -> Result<(), DecryptError> {
    let algorithm = required(values, "cipherAlgorithm")?;
    if !algorithm.eq_ignore_ascii_case("AES") {
        return Err(DecryptError::Unsupported(format!("cipher '{}'", algorithm)));
    }
    let chaining = required(values, "cipherChaining")?;
    if chaining != "ChainingModeCBC" {
        return Err(DecryptError::Unsupported(format!("chaining '{}'", chaining)));
    }
    Ok(())
}
