//! Password decryption of Office workbooks stored in an OLE compound file
//! (MS-OFFCRYPTO). Supports agile and standard encryption.

mod agile;
mod cipher;
mod standard;

use std::io::{Cursor, Read};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DecryptError {
    #[error("not an encrypted Office container: {0}")]
    NotEncrypted(String),

    #[error("unsupported encryption: {0}")]
    Unsupported(String),

    #[error("malformed encryption data: {0}")]
    Malformed(String),

    #[error("password verification failed")]
    WrongPassword,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EncryptionScheme {
    Agile,
    Standard,
}

impl EncryptionScheme {
    fn detect(major: u16, minor: u16) -> Result<Self, DecryptError> {
        match (major, minor) {
            (4, 4) => Ok(Self::Agile),
            (2..=4, 2) => Ok(Self::Standard),
            (3 | 4, 3) => Err(DecryptError::Unsupported(
                "extensible encryption".to_string(),
            )),
            _ => Err(DecryptError::Unsupported(format!(
                "EncryptionInfo version {}.{}",
                major, minor
            ))),
        }
    }
}

/// Decrypts an encrypted workbook container and returns the inner package
/// bytes (a plain xlsx/xlsm/xlsb zip).
pub fn decrypt_package(bytes: &[u8], password: &str) -> Result<Vec<u8>, DecryptError> {
    let mut container = cfb::CompoundFile::open(Cursor::new(bytes))
        .map_err(|e| DecryptError::NotEncrypted(e.to_string()))?;

    let encryption_info = read_stream(&mut container, "/EncryptionInfo")?;
    let encrypted_package = read_stream(&mut container, "/EncryptedPackage")?;

    if encryption_info.len() < 8 {
        return Err(DecryptError::Malformed(
            "EncryptionInfo stream is truncated".to_string(),
        ));
    }
    let major = u16::from_le_bytes([encryption_info[0], encryption_info[1]]);
    let minor = u16::from_le_bytes([encryption_info[2], encryption_info[3]]);

    let scheme = EncryptionScheme::detect(major, minor)?;
    tracing::debug!(?scheme, major, minor, "Detected workbook encryption");

    match scheme {
        EncryptionScheme::Agile => {
            let info = agile::AgileInfo::parse(&encryption_info[8..])?;
            info.decrypt(password, &encrypted_package)
        }
        EncryptionScheme::Standard => {
            let info = standard::StandardInfo::parse(&encryption_info[8..])?;
            info.decrypt(password, &encrypted_package)
        }
    }
}

fn read_stream<F: Read + std::io::Seek>(
    container: &mut cfb::CompoundFile<F>,
    path: &str,
) -> Result<Vec<u8>, DecryptError> {
    if !container.is_stream(path) {
        return Err(DecryptError::NotEncrypted(format!(
            "missing {} stream",
            path.trim_start_matches('/')
        )));
    }
    let mut stream = container.open_stream(path)?;
    let mut buffer = Vec::new();
    stream.read_to_end(&mut buffer)?;
    Ok(buffer)
}

/// Splits the `EncryptedPackage` stream into its declared plaintext size and
/// the ciphertext that follows.
fn split_package(encrypted_package: &[u8]) -> Result<(usize, &[u8]), DecryptError> {
    if encrypted_package.len() < 8 {
        return Err(DecryptError::Malformed(
            "EncryptedPackage stream is truncated".to_string(),
        ));
    }
    let mut size_bytes = [0u8; 8];
    size_bytes.copy_from_slice(&encrypted_package[..8]);
    let size = u64::from_le_bytes(size_bytes) as usize;
    Ok((size, &encrypted_package[8..]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scheme_detection() {
        assert_eq!(EncryptionScheme::detect(4, 4).unwrap(), EncryptionScheme::Agile);
        assert_eq!(EncryptionScheme::detect(3, 2).unwrap(), EncryptionScheme::Standard);
        assert_eq!(EncryptionScheme::detect(4, 2).unwrap(), EncryptionScheme::Standard);
        assert!(matches!(
            EncryptionScheme::detect(4, 3),
            Err(DecryptError::Unsupported(_))
        ));
        assert!(EncryptionScheme::detect(1, 1).is_err());
    }

    #[test]
    fn test_plain_bytes_are_not_an_encrypted_container() {
        let result = decrypt_package(b"PK\x03\x04 definitely not ole", "secret");
        assert!(matches!(result, Err(DecryptError::NotEncrypted(_))));
    }

    #[test]
    fn test_split_package_reads_little_endian_size() {
        let mut stream = 300u64.to_le_bytes().to_vec();
        stream.extend_from_slice(&[0u8; 16]);
        let (size, body) = split_package(&stream).unwrap();
        assert_eq!(size, 300);
        assert_eq!(body.len(), 16);
    }
}
