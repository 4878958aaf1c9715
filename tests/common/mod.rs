#![allow(dead_code)]

use aes::cipher::{BlockEncrypt, KeyInit};
use aes::{Aes128Enc, Aes256Enc, Block};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use sha1::Sha1;
use sha2::{Digest, Sha512};
use std::io::{Cursor, Write};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Cell content for fixture worksheets.
#[derive(Debug, Clone)]
pub enum Cell {
    Text(&'static str),
    Number(f64),
    Blank,
}

pub fn text_row(values: &[&'static str]) -> Vec<Cell> {
    values.iter().map(|&value| Cell::Text(value)).collect()
}

/// Builds a minimal xlsx package with inline strings.
pub fn build_xlsx(sheets: &[(&str, Vec<Vec<Cell>>)]) -> Vec<u8> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);

    let mut content_types = String::from(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/>"#,
    );
    let mut workbook_sheets = String::new();
    let mut workbook_rels = String::new();
    for (index, (name, _)) in sheets.iter().enumerate() {
        let id = index + 1;
        content_types.push_str(&format!(
            r#"<Override PartName="/xl/worksheets/sheet{id}.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/>"#
        ));
        workbook_sheets.push_str(&format!(
            r#"<sheet name="{}" sheetId="{id}" r:id="rId{id}"/>"#,
            escape(name)
        ));
        workbook_rels.push_str(&format!(
            r#"<Relationship Id="rId{id}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet{id}.xml"/>"#
        ));
    }
    content_types.push_str("</Types>");

    let mut add = |path: &str, body: &str| {
        zip.start_file(path, options.clone()).unwrap();
        zip.write_all(body.as_bytes()).unwrap();
    };

    add("[Content_Types].xml", &content_types);
    add(
        "_rels/.rels",
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/></Relationships>"#,
    );
    add(
        "xl/workbook.xml",
        &format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><sheets>{}</sheets></workbook>"#,
            workbook_sheets
        ),
    );
    add(
        "xl/_rels/workbook.xml.rels",
        &format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">{}</Relationships>"#,
            workbook_rels
        ),
    );
    for (index, (_, rows)) in sheets.iter().enumerate() {
        add(
            &format!("xl/worksheets/sheet{}.xml", index + 1),
            &worksheet_xml(rows),
        );
    }

    zip.finish().unwrap().into_inner()
}

fn worksheet_xml(rows: &[Vec<Cell>]) -> String {
    let mut xml = String::from(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><sheetData>"#,
    );
    for (row_index, row) in rows.iter().enumerate() {
        let row_number = row_index + 1;
        xml.push_str(&format!(r#"<row r="{}">"#, row_number));
        for (column_index, cell) in row.iter().enumerate() {
            let reference = format!("{}{}", column_letter(column_index), row_number);
            match cell {
                Cell::Text(value) => xml.push_str(&format!(
                    r#"<c r="{}" t="inlineStr"><is><t>{}</t></is></c>"#,
                    reference,
                    escape(value)
                )),
                Cell::Number(value) => {
                    xml.push_str(&format!(r#"<c r="{}"><v>{}</v></c>"#, reference, value))
                }
                Cell::Blank => (),
            }
        }
        xml.push_str("</row>");
    }
    xml.push_str("</sheetData></worksheet>");
    xml
}

fn column_letter(index: usize) -> char {
    (b'A' + index as u8) as char
}

fn escape(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

const SPIN_COUNT: u32 = 1000;
const KEY_DATA_SALT: [u8; 16] = [0x11; 16];
const ENCRYPTOR_SALT: [u8; 16] = [0x22; 16];
const SECRET_KEY: [u8; 32] = [0x42; 32];
const VERIFIER_INPUT: [u8; 16] = [0x5a; 16];

/// Wraps a workbook package in an agile-encrypted OLE container
/// (AES-256-CBC, SHA-512), the layout Excel writes for password-protected
/// files.
pub fn encrypt_agile(package: &[u8], password: &str) -> Vec<u8> {
    let password_utf16: Vec<u8> = password
        .encode_utf16()
        .flat_map(|unit| unit.to_le_bytes())
        .collect();

    let mut digest = sha512(&[&ENCRYPTOR_SALT, &password_utf16]);
    for iteration in 0..SPIN_COUNT {
        digest = sha512(&[&iteration.to_le_bytes(), &digest]);
    }
    let derive = |block_key: [u8; 8]| -> Vec<u8> {
        let mut key = sha512(&[&digest, &block_key]);
        key.truncate(32);
        key
    };

    let encrypted_verifier_hash_input = encrypt_cbc(
        &derive([0xfe, 0xa7, 0xd2, 0x76, 0x3b, 0x4b, 0x9e, 0x79]),
        &ENCRYPTOR_SALT,
        &VERIFIER_INPUT,
    );
    let encrypted_verifier_hash_value = encrypt_cbc(
        &derive([0xd7, 0xaa, 0x0f, 0x6d, 0x30, 0x61, 0x34, 0x4e]),
        &ENCRYPTOR_SALT,
        &sha512(&[&VERIFIER_INPUT]),
    );
    let encrypted_key_value = encrypt_cbc(
        &derive([0x14, 0x6e, 0x0b, 0xe7, 0xab, 0xac, 0xd0, 0xd6]),
        &ENCRYPTOR_SALT,
        &SECRET_KEY,
    );

    let mut encrypted_package = (package.len() as u64).to_le_bytes().to_vec();
    for (index, segment) in package.chunks(4096).enumerate() {
        let mut iv = sha512(&[&KEY_DATA_SALT, &(index as u32).to_le_bytes()]);
        iv.truncate(16);
        let mut padded = segment.to_vec();
        padded.resize(segment.len().div_ceil(16) * 16, 0);
        encrypted_package.extend(encrypt_cbc(&SECRET_KEY, &iv, &padded));
    }

    let descriptor = format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<encryption xmlns="http://schemas.microsoft.com/office/2006/encryption" xmlns:p="http://schemas.microsoft.com/office/2006/keyEncryptor/password"><keyData saltSize="16" blockSize="16" keyBits="256" hashSize="64" cipherAlgorithm="AES" cipherChaining="ChainingModeCBC" hashAlgorithm="SHA512" saltValue="{}"/><keyEncryptors><keyEncryptor uri="http://schemas.microsoft.com/office/2006/keyEncryptor/password"><p:encryptedKey spinCount="{}" saltSize="16" blockSize="16" keyBits="256" hashSize="64" cipherAlgorithm="AES" cipherChaining="ChainingModeCBC" hashAlgorithm="SHA512" saltValue="{}" encryptedVerifierHashInput="{}" encryptedVerifierHashValue="{}" encryptedKeyValue="{}"/></keyEncryptor></keyEncryptors></encryption>"#,
        BASE64.encode(KEY_DATA_SALT),
        SPIN_COUNT,
        BASE64.encode(ENCRYPTOR_SALT),
        BASE64.encode(&encrypted_verifier_hash_input),
        BASE64.encode(&encrypted_verifier_hash_value),
        BASE64.encode(&encrypted_key_value),
    );

    let mut encryption_info = vec![4u8, 0, 4, 0];
    encryption_info.extend_from_slice(&0x40u32.to_le_bytes());
    encryption_info.extend_from_slice(descriptor.as_bytes());

    ole_container(&encryption_info, &encrypted_package)
}

const STANDARD_SALT: [u8; 16] = [0x33; 16];

/// Wraps a workbook package in a standard-encrypted OLE container
/// (AES-128-ECB, SHA-1, 50000 rounds), as written by Excel 2007.
pub fn encrypt_standard(package: &[u8], password: &str) -> Vec<u8> {
    let password_utf16: Vec<u8> = password
        .encode_utf16()
        .flat_map(|unit| unit.to_le_bytes())
        .collect();

    let mut digest = sha1_digest(&[&STANDARD_SALT, &password_utf16]);
    for iteration in 0..50_000u32 {
        digest = sha1_digest(&[&iteration.to_le_bytes(), &digest]);
    }
    let final_hash = sha1_digest(&[&digest, &0u32.to_le_bytes()]);
    let mut inner = [0x36u8; 64];
    for (index, byte) in final_hash.iter().enumerate() {
        inner[index] ^= byte;
    }
    let inner_hash = sha1_digest(&[&inner]);
    let key = &inner_hash[..16];

    let mut verifier_hash = sha1_digest(&[&VERIFIER_INPUT]);
    verifier_hash.resize(32, 0);

    let mut encryption_info = vec![4u8, 0, 2, 0];
    encryption_info.extend_from_slice(&0x24u32.to_le_bytes());
    let header: [u32; 8] = [0x24, 0, 0x660E, 0x8004, 128, 0x18, 0, 0];
    encryption_info.extend_from_slice(&((header.len() * 4) as u32).to_le_bytes());
    for value in header {
        encryption_info.extend_from_slice(&value.to_le_bytes());
    }
    encryption_info.extend_from_slice(&16u32.to_le_bytes());
    encryption_info.extend_from_slice(&STANDARD_SALT);
    encryption_info.extend(encrypt_ecb(key, &VERIFIER_INPUT));
    encryption_info.extend_from_slice(&20u32.to_le_bytes());
    encryption_info.extend(encrypt_ecb(key, &verifier_hash));

    let mut padded = package.to_vec();
    padded.resize(package.len().div_ceil(16) * 16, 0);
    let mut encrypted_package = (package.len() as u64).to_le_bytes().to_vec();
    encrypted_package.extend(encrypt_ecb(key, &padded));

    ole_container(&encryption_info, &encrypted_package)
}

fn ole_container(encryption_info: &[u8], encrypted_package: &[u8]) -> Vec<u8> {
    let mut container = cfb::CompoundFile::create(Cursor::new(Vec::new())).unwrap();
    for (path, data) in [
        ("/EncryptionInfo", encryption_info),
        ("/EncryptedPackage", encrypted_package),
    ] {
        let mut stream = container.create_stream(path).unwrap();
        stream.write_all(data).unwrap();
        stream.flush().unwrap();
    }
    container.flush().unwrap();
    container.into_inner().into_inner()
}

fn sha1_digest(parts: &[&[u8]]) -> Vec<u8> {
    let mut hasher = Sha1::new();
    for part in parts {
        hasher.update(part);
    }
    hasher.finalize().to_vec()
}

fn encrypt_ecb(key: &[u8], data: &[u8]) -> Vec<u8> {
    let cipher = Aes128Enc::new_from_slice(key).unwrap();
    let mut output = Vec::with_capacity(data.len());
    for chunk in data.chunks(16) {
        let mut block = Block::clone_from_slice(chunk);
        cipher.encrypt_block(&mut block);
        output.extend_from_slice(&block);
    }
    output
}

fn sha512(parts: &[&[u8]]) -> Vec<u8> {
    let mut hasher = Sha512::new();
    for part in parts {
        hasher.update(part);
    }
    hasher.finalize().to_vec()
}

fn encrypt_cbc(key: &[u8], iv: &[u8], data: &[u8]) -> Vec<u8> {
    let cipher = Aes256Enc::new_from_slice(key).unwrap();
    let mut previous = Block::clone_from_slice(iv);
    let mut output = Vec::with_capacity(data.len());
    for chunk in data.chunks(16) {
        let mut block = Block::clone_from_slice(chunk);
        for (byte, prev) in block.iter_mut().zip(previous.iter()) {
            *byte ^= prev;
        }
        cipher.encrypt_block(&mut block);
        output.extend_from_slice(&block);
        previous = block;
    }
    output
}

/// Ledger header row using the default column names.
pub fn ledger_header() -> Vec<Cell> {
    text_row(&["구분", "주문자", "분류", "거래처", "주문상품명", "비고"])
}

pub fn price_header() -> Vec<Cell> {
    text_row(&["코드", "상품명", "부가포함가"])
}
