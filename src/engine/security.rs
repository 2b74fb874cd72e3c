//! Standard security handler (`/Filter /Standard`).
//!
//! Checks user and owner passwords against the `/Encrypt` dictionary and
//! decrypts every string and stream of a loaded document, including strings
//! nested in dictionaries and arrays (outline titles, action URIs,
//! destination names).
//!
//! Supported: revisions 2 and 3 (RC4), revision 4 (RC4 or AES-128 crypt
//! filters) and revisions 5 and 6 (AES-256).

use cbc::cipher::block_padding::NoPadding;
use cbc::cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};
use md5::{Digest, Md5};
use rc4::consts::{U10, U11, U12, U13, U14, U15, U16, U5, U6, U7, U8, U9};
use rc4::{KeyInit, Rc4, StreamCipher};
use sha2::{Sha256, Sha384, Sha512};

use crate::error::{Error, Result};

/// Padding appended to passwords shorter than 32 bytes (revisions 2 to 4).
const PASSWORD_PADDING: [u8; 32] = [
    0x28, 0xBF, 0x4E, 0x5E, 0x4E, 0x75, 0x8A, 0x41, 0x64, 0x00, 0x4E, 0x56, 0xFF, 0xFA, 0x01,
    0x08, 0x2E, 0x2E, 0x00, 0xB6, 0xD0, 0x68, 0x3E, 0x80, 0x2F, 0x0C, 0xA9, 0xFE, 0x64, 0x53,
    0x69, 0x7A,
];

/// Revision 5 and 6 passwords are cut to this many UTF-8 bytes.
const MAX_AES256_PASSWORD: usize = 127;

/// How strings or streams are encrypted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CryptMethod {
    Identity,
    Rc4,
    Aes128,
    Aes256,
}

/// Parsed `/Encrypt` dictionary of a standard-security document.
#[derive(Debug, Clone)]
pub struct SecurityHandler {
    revision: i64,
    /// File key length in bytes.
    key_len: usize,
    /// `/O`
    owner: Vec<u8>,
    /// `/U`
    user: Vec<u8>,
    /// `/OE`, revisions 5 and 6 only.
    owner_key: Vec<u8>,
    /// `/UE`, revisions 5 and 6 only.
    user_key: Vec<u8>,
    permissions: i32,
    /// First element of the trailer `/ID`.
    id: Vec<u8>,
    encrypt_metadata: bool,
    strings: CryptMethod,
    streams: CryptMethod,
    /// The `/Encrypt` object itself, which is never encrypted.
    dict_id: Option<ObjectId>,
}

impl SecurityHandler {
    /// Read the security handler of `doc`.
    ///
    /// Returns `Ok(None)` for documents without `/Encrypt`.
    pub fn from_document(doc: &Document) -> Result<Option<Self>> {
        let Ok(encrypt) = doc.trailer.get(b"Encrypt") else {
            return Ok(None);
        };
        let (dict_id, dict) = match encrypt {
            Object::Reference(id) => (Some(*id), doc.get_dictionary(*id)?),
            Object::Dictionary(dict) => (None, dict),
            _ => return Err(unsupported("/Encrypt is not a dictionary")),
        };

        let filter = entry(doc, dict, b"Filter").and_then(|o| o.as_name().ok());
        if filter != Some(b"Standard".as_slice()) {
            return Err(unsupported(format!(
                "security handler /{}",
                String::from_utf8_lossy(filter.unwrap_or_default())
            )));
        }

        let int = |key: &[u8]| entry(doc, dict, key).and_then(|o| o.as_i64().ok());
        let version = int(b"V").unwrap_or(0);
        let revision = int(b"R").unwrap_or(0);
        if !(2..=6).contains(&revision) {
            return Err(unsupported(format!("revision {}", revision)));
        }

        let (strings, streams, key_len) = match version {
            1 => (CryptMethod::Rc4, CryptMethod::Rc4, 5),
            2 | 3 => {
                let len = key_bytes(int(b"Length").unwrap_or(40));
                (CryptMethod::Rc4, CryptMethod::Rc4, len)
            }
            4 | 5 => {
                let filters = entry(doc, dict, b"CF").and_then(|o| o.as_dict().ok());
                let method = |key: &[u8]| {
                    let name = entry(doc, dict, key).and_then(|o| o.as_name().ok());
                    crypt_filter(doc, filters, name)
                };
                let len = if version == 5 {
                    32
                } else {
                    key_bytes(int(b"Length").unwrap_or(128))
                };
                (method(b"StrF")?, method(b"StmF")?, len)
            }
            other => return Err(unsupported(format!("algorithm /V {}", other))),
        };

        let handler = Self {
            revision,
            key_len,
            owner: string_entry(doc, dict, b"O"),
            user: string_entry(doc, dict, b"U"),
            owner_key: string_entry(doc, dict, b"OE"),
            user_key: string_entry(doc, dict, b"UE"),
            permissions: int(b"P").unwrap_or(0) as i32,
            id: document_id(doc),
            encrypt_metadata: entry(doc, dict, b"EncryptMetadata")
                .and_then(|o| o.as_bool().ok())
                .unwrap_or(true),
            strings,
            streams,
            dict_id,
        };

        let (hash_len, needs_keys) = if revision >= 5 { (48, true) } else { (32, false) };
        if handler.owner.len() < hash_len
            || handler.user.len() < hash_len
            || (needs_keys && (handler.owner_key.len() < 32 || handler.user_key.len() < 32))
        {
            return Err(unsupported("truncated password entries"));
        }
        Ok(Some(handler))
    }

    /// Check `password` as the user password, then as the owner password.
    ///
    /// Returns the file key on success.
    pub fn authenticate(&self, password: &[u8]) -> Option<Vec<u8>> {
        if self.revision >= 5 {
            let password = &password[..password.len().min(MAX_AES256_PASSWORD)];
            self.user_key_aes256(password)
                .or_else(|| self.owner_key_aes256(password))
        } else {
            self.user_key_rc4(password)
                .or_else(|| self.owner_key_rc4(password))
        }
    }

    /// Decrypt every object of `doc` in place and drop `/Encrypt`.
    pub fn decrypt_document(&self, doc: &mut Document, file_key: &[u8]) {
        for (&id, object) in doc.objects.iter_mut() {
            if Some(id) == self.dict_id {
                continue;
            }
            self.decrypt_object(file_key, id, object);
        }
        doc.trailer.remove(b"Encrypt");
    }

    fn decrypt_object(&self, file_key: &[u8], id: ObjectId, object: &mut Object) {
        match object {
            Object::String(bytes, _) => {
                let key = self.object_key(file_key, id, self.strings);
                if let Some(plain) = decrypt_bytes(self.strings, &key, bytes) {
                    *bytes = plain;
                }
            }
            Object::Array(items) => {
                for item in items {
                    self.decrypt_object(file_key, id, item);
                }
            }
            Object::Dictionary(dict) => self.decrypt_dictionary(file_key, id, dict),
            Object::Stream(stream) => self.decrypt_stream(file_key, id, stream),
            _ => {}
        }
    }

    fn decrypt_dictionary(&self, file_key: &[u8], id: ObjectId, dict: &mut Dictionary) {
        for (_, value) in dict.iter_mut() {
            self.decrypt_object(file_key, id, value);
        }
    }

    fn decrypt_stream(&self, file_key: &[u8], id: ObjectId, stream: &mut Stream) {
        let kind = stream.dict.get(b"Type").and_then(Object::as_name).ok();
        let is_xref = kind == Some(b"XRef".as_slice());
        let is_metadata = kind == Some(b"Metadata".as_slice());
        // Cross-reference streams are stored in the clear.
        if is_xref {
            return;
        }
        self.decrypt_dictionary(file_key, id, &mut stream.dict);
        if is_metadata && !self.encrypt_metadata {
            return;
        }
        if has_crypt_filter(&stream.dict) {
            log::debug!("stream {:?} has its own crypt filter, left as is", id);
            return;
        }

        let key = self.object_key(file_key, id, self.streams);
        if let Some(plain) = decrypt_bytes(self.streams, &key, &stream.content) {
            stream.set_content(plain);
        }
    }

    /// Per-object key; AES-256 uses the file key directly.
    fn object_key(&self, file_key: &[u8], id: ObjectId, method: CryptMethod) -> Vec<u8> {
        if method == CryptMethod::Aes256 {
            return file_key.to_vec();
        }
        let mut md5 = Md5::new();
        md5.update(file_key);
        md5.update(&id.0.to_le_bytes()[..3]);
        md5.update(id.1.to_le_bytes());
        if method == CryptMethod::Aes128 {
            md5.update(b"sAlT");
        }
        let mut key = md5.finalize().to_vec();
        key.truncate((file_key.len() + 5).min(16));
        key
    }

    /// File key derived from a user password (revisions 2 to 4).
    fn file_key(&self, password: &[u8]) -> Vec<u8> {
        let len = self.key_len.min(16);
        let mut md5 = Md5::new();
        md5.update(pad_password(password));
        md5.update(&self.owner[..32]);
        md5.update(self.permissions.to_le_bytes());
        md5.update(&self.id);
        if self.revision >= 4 && !self.encrypt_metadata {
            md5.update([0xFFu8; 4]);
        }
        let mut key = md5.finalize().to_vec();
        if self.revision >= 3 {
            for _ in 0..50 {
                key = Md5::digest(&key[..len]).to_vec();
            }
        }
        key.truncate(len);
        key
    }

    fn user_key_rc4(&self, password: &[u8]) -> Option<Vec<u8>> {
        let key = self.file_key(password);
        let matches = if self.revision == 2 {
            rc4(&key, &PASSWORD_PADDING)? == self.user[..32]
        } else {
            let mut md5 = Md5::new();
            md5.update(PASSWORD_PADDING);
            md5.update(&self.id);
            let mut check = rc4(&key, &md5.finalize())?;
            for i in 1..=19 {
                check = rc4(&xor_key(&key, i), &check)?;
            }
            check[..16] == self.user[..16]
        };
        matches.then_some(key)
    }

    /// Recover the user password from `/O` and check it.
    fn owner_key_rc4(&self, password: &[u8]) -> Option<Vec<u8>> {
        let mut digest = Md5::digest(pad_password(password)).to_vec();
        if self.revision >= 3 {
            for _ in 0..50 {
                digest = Md5::digest(&digest).to_vec();
            }
        }
        let key = &digest[..self.key_len.min(16)];

        let mut user_password = self.owner[..32].to_vec();
        if self.revision == 2 {
            user_password = rc4(key, &user_password)?;
        } else {
            for i in (0..=19).rev() {
                user_password = rc4(&xor_key(key, i), &user_password)?;
            }
        }
        self.user_key_rc4(&user_password)
    }

    fn user_key_aes256(&self, password: &[u8]) -> Option<Vec<u8>> {
        let (hash, rest) = self.user.split_at(32);
        if self.hash_password(password, &rest[..8], &[])? != hash {
            return None;
        }
        let intermediate = self.hash_password(password, &rest[8..16], &[])?;
        unwrap_key(&intermediate, &self.user_key[..32])
    }

    fn owner_key_aes256(&self, password: &[u8]) -> Option<Vec<u8>> {
        let user = &self.user[..48];
        let (hash, rest) = self.owner.split_at(32);
        if self.hash_password(password, &rest[..8], user)? != hash {
            return None;
        }
        let intermediate = self.hash_password(password, &rest[8..16], user)?;
        unwrap_key(&intermediate, &self.owner_key[..32])
    }

    /// SHA-256 for revision 5; the iterated SHA-2/AES hash for revision 6.
    fn hash_password(&self, password: &[u8], salt: &[u8], user: &[u8]) -> Option<Vec<u8>> {
        let mut sha = Sha256::new();
        sha.update(password);
        sha.update(salt);
        sha.update(user);
        let mut k = sha.finalize().to_vec();
        if self.revision == 5 {
            return Some(k);
        }

        let mut round = 0u32;
        loop {
            let mut block = Vec::with_capacity(64 * (password.len() + k.len() + user.len()));
            for _ in 0..64 {
                block.extend_from_slice(password);
                block.extend_from_slice(&k);
                block.extend_from_slice(user);
            }
            let len = block.len();
            let e = cbc::Encryptor::<aes::Aes128>::new_from_slices(&k[..16], &k[16..32])
                .ok()?
                .encrypt_padded_mut::<NoPadding>(&mut block, len)
                .ok()?;

            let last = u32::from(*e.last()?);
            k = match e[..16].iter().map(|b| u32::from(*b)).sum::<u32>() % 3 {
                0 => Sha256::digest(e).to_vec(),
                1 => Sha384::digest(e).to_vec(),
                _ => Sha512::digest(e).to_vec(),
            };
            round += 1;
            if round >= 64 && last <= round - 32 {
                break;
            }
        }
        k.truncate(32);
        Some(k)
    }
}

fn unsupported(reason: impl Into<String>) -> Error {
    Error::UnsupportedEncryption(reason.into())
}

fn entry<'a>(doc: &'a Document, dict: &'a Dictionary, key: &[u8]) -> Option<&'a Object> {
    match dict.get(key).ok()? {
        Object::Reference(id) => doc.get_object(*id).ok(),
        other => Some(other),
    }
}

fn string_entry(doc: &Document, dict: &Dictionary, key: &[u8]) -> Vec<u8> {
    match entry(doc, dict, key) {
        Some(Object::String(bytes, _)) => bytes.clone(),
        _ => Vec::new(),
    }
}

fn document_id(doc: &Document) -> Vec<u8> {
    match doc.trailer.get(b"ID").ok().and_then(|o| o.as_array().ok()) {
        Some(ids) => match ids.first() {
            Some(Object::String(bytes, _)) => bytes.clone(),
            _ => Vec::new(),
        },
        None => Vec::new(),
    }
}

/// `/Length` is in bits; some writers store bytes instead.
fn key_bytes(length: i64) -> usize {
    let bytes = if length <= 16 { length } else { length / 8 };
    bytes.clamp(5, 16) as usize
}

/// Resolve a `/StrF` or `/StmF` name through `/CF`.
fn crypt_filter(
    doc: &Document,
    filters: Option<&Dictionary>,
    name: Option<&[u8]>,
) -> Result<CryptMethod> {
    let name = match name {
        None | Some(b"Identity") => return Ok(CryptMethod::Identity),
        Some(name) => name,
    };
    let filter = filters
        .and_then(|cf| entry(doc, cf, name))
        .and_then(|o| o.as_dict().ok())
        .ok_or_else(|| {
            unsupported(format!("undefined crypt filter /{}", String::from_utf8_lossy(name)))
        })?;

    match entry(doc, filter, b"CFM").and_then(|o| o.as_name().ok()) {
        None | Some(b"None") => Ok(CryptMethod::Identity),
        Some(b"V2") => Ok(CryptMethod::Rc4),
        Some(b"AESV2") => Ok(CryptMethod::Aes128),
        Some(b"AESV3") => Ok(CryptMethod::Aes256),
        Some(other) => Err(unsupported(format!(
            "crypt filter method /{}",
            String::from_utf8_lossy(other)
        ))),
    }
}

fn has_crypt_filter(dict: &Dictionary) -> bool {
    match dict.get(b"Filter") {
        Ok(Object::Name(name)) => name == b"Crypt",
        Ok(Object::Array(filters)) => filters
            .iter()
            .any(|f| matches!(f, Object::Name(name) if name == b"Crypt")),
        _ => false,
    }
}

fn pad_password(password: &[u8]) -> [u8; 32] {
    let mut padded = PASSWORD_PADDING;
    let len = password.len().min(32);
    padded[..len].copy_from_slice(&password[..len]);
    padded[len..].copy_from_slice(&PASSWORD_PADDING[..32 - len]);
    padded
}

fn xor_key(key: &[u8], value: u8) -> Vec<u8> {
    key.iter().map(|b| b ^ value).collect()
}

macro_rules! rc4_apply {
    ($key:expr, $buf:expr, $($len:literal => $size:ty),+ $(,)?) => {
        match $key.len() {
            $($len => Rc4::<$size>::new_from_slice($key).ok()?.apply_keystream($buf),)+
            _ => return None,
        }
    };
}

/// RC4 with a 40 to 128-bit key.
fn rc4(key: &[u8], data: &[u8]) -> Option<Vec<u8>> {
    let mut buf = data.to_vec();
    rc4_apply!(key, &mut buf,
        5 => U5, 6 => U6, 7 => U7, 8 => U8, 9 => U9, 10 => U10,
        11 => U11, 12 => U12, 13 => U13, 14 => U14, 15 => U15, 16 => U16,
    );
    Some(buf)
}

/// Decrypt one string or stream body. `None` leaves the data untouched.
fn decrypt_bytes(method: CryptMethod, key: &[u8], data: &[u8]) -> Option<Vec<u8>> {
    match method {
        CryptMethod::Identity => None,
        CryptMethod::Rc4 => rc4(key, data),
        CryptMethod::Aes128 | CryptMethod::Aes256 => aes_cbc_decrypt(key, data),
    }
}

/// AES-CBC with the IV in the first block and PKCS#7 padding.
///
/// Bad padding is tolerated: the decrypted bytes are kept whole.
fn aes_cbc_decrypt(key: &[u8], data: &[u8]) -> Option<Vec<u8>> {
    if data.len() < 16 || data.len() % 16 != 0 {
        log::debug!("AES data of {} bytes is not block aligned", data.len());
        return None;
    }
    let (iv, body) = data.split_at(16);
    let mut buf = body.to_vec();
    let len = match key.len() {
        16 => cbc::Decryptor::<aes::Aes128>::new_from_slices(key, iv)
            .ok()?
            .decrypt_padded_mut::<NoPadding>(&mut buf)
            .ok()?
            .len(),
        32 => cbc::Decryptor::<aes::Aes256>::new_from_slices(key, iv)
            .ok()?
            .decrypt_padded_mut::<NoPadding>(&mut buf)
            .ok()?
            .len(),
        _ => return None,
    };
    buf.truncate(len);

    if let Some(&pad) = buf.last() {
        let pad = usize::from(pad);
        let valid = (1..=16).contains(&pad)
            && pad <= buf.len()
            && buf[buf.len() - pad..].iter().all(|b| usize::from(*b) == pad);
        if valid {
            buf.truncate(buf.len() - pad);
        }
    }
    Some(buf)
}

/// Decrypt `/UE` or `/OE` (AES-256, zero IV, no padding).
fn unwrap_key(key: &[u8], wrapped: &[u8]) -> Option<Vec<u8>> {
    let mut buf = wrapped.to_vec();
    let len = cbc::Decryptor::<aes::Aes256>::new_from_slices(key, &[0u8; 16])
        .ok()?
        .decrypt_padded_mut::<NoPadding>(&mut buf)
        .ok()?
        .len();
    buf.truncate(len);
    Some(buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{EngineDocument, LopdfDocument};
    use cbc::cipher::block_padding::Pkcs7;
    use lopdf::{dictionary, StringFormat};

    fn text(s: &str) -> Object {
        Object::String(s.as_bytes().to_vec(), StringFormat::Literal)
    }

    fn hex(bytes: Vec<u8>) -> Object {
        Object::String(bytes, StringFormat::Hexadecimal)
    }

    /// One page, an outline item with a URI action and an Info title.
    fn plain_document() -> Document {
        let mut doc = Document::with_version("1.6");
        let pages_id = doc.new_object_id();
        let page_id = doc.add_object(dictionary! { "Type" => "Page", "Parent" => pages_id });
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => vec![page_id.into()],
                "Count" => 1,
                "MediaBox" => vec![0.into(), 0.into(), 600.into(), 800.into()],
            }),
        );
        let outlines_id = doc.new_object_id();
        let item_id = doc.add_object(dictionary! {
            "Title" => text("Chapter One"),
            "Parent" => outlines_id,
            "A" => dictionary! { "S" => "URI", "URI" => text("https://example.org/one") },
        });
        doc.objects.insert(
            outlines_id,
            Object::Dictionary(dictionary! { "First" => item_id, "Last" => item_id }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
            "Outlines" => outlines_id,
        });
        let info_id = doc.add_object(dictionary! { "Title" => text("Secret Title") });
        doc.trailer.set("Root", catalog_id);
        doc.trailer.set("Info", info_id);
        doc
    }

    /// Lock `doc` with 128-bit RC4, revision 3.
    fn lock_rc4(doc: &mut Document, user: &str, owner: &str) {
        let id = b"docview-pdf-rc4!".to_vec();
        let mut digest = Md5::digest(pad_password(owner.as_bytes())).to_vec();
        for _ in 0..50 {
            digest = Md5::digest(&digest).to_vec();
        }
        let mut o = pad_password(user.as_bytes()).to_vec();
        for i in 0..=19 {
            o = rc4(&xor_key(&digest, i), &o).unwrap();
        }

        let handler = SecurityHandler {
            revision: 3,
            key_len: 16,
            owner: o.clone(),
            user: Vec::new(),
            owner_key: Vec::new(),
            user_key: Vec::new(),
            permissions: -4,
            id: id.clone(),
            encrypt_metadata: true,
            strings: CryptMethod::Rc4,
            streams: CryptMethod::Rc4,
            dict_id: None,
        };
        let key = handler.file_key(user.as_bytes());
        let mut md5 = Md5::new();
        md5.update(PASSWORD_PADDING);
        md5.update(&id);
        let mut u = md5.finalize().to_vec();
        for i in 0..=19 {
            u = rc4(&xor_key(&key, i), &u).unwrap();
        }
        u.resize(32, 0);

        // RC4 is symmetric: one pass over the plain objects encrypts them.
        handler.decrypt_document(doc, &key);
        let encrypt_id = doc.add_object(dictionary! {
            "Filter" => "Standard",
            "V" => 2,
            "R" => 3,
            "Length" => 128,
            "P" => -4,
            "O" => hex(o),
            "U" => hex(u),
        });
        doc.trailer.set("Encrypt", encrypt_id);
        doc.trailer.set("ID", vec![hex(id.clone()), hex(id)]);
    }

    fn aes256_wrap(key: &[u8], data: &[u8]) -> Vec<u8> {
        let mut buf = data.to_vec();
        let len = buf.len();
        cbc::Encryptor::<aes::Aes256>::new_from_slices(key, &[0u8; 16])
            .unwrap()
            .encrypt_padded_mut::<NoPadding>(&mut buf, len)
            .unwrap();
        buf
    }

    /// Revision 6 handler whose passwords unlock `file_key`.
    fn aes256_handler(user: &[u8], owner: &[u8], file_key: &[u8]) -> SecurityHandler {
        let mut handler = SecurityHandler {
            revision: 6,
            key_len: 32,
            owner: Vec::new(),
            user: Vec::new(),
            owner_key: Vec::new(),
            user_key: Vec::new(),
            permissions: -4,
            id: Vec::new(),
            encrypt_metadata: true,
            strings: CryptMethod::Aes256,
            streams: CryptMethod::Aes256,
            dict_id: None,
        };

        let (validation, key_salt) = (b"uvalsalt", b"ukeysalt");
        handler.user = handler.hash_password(user, validation, &[]).unwrap();
        handler.user.extend_from_slice(validation);
        handler.user.extend_from_slice(key_salt);
        let wrapping = handler.hash_password(user, key_salt, &[]).unwrap();
        handler.user_key = aes256_wrap(&wrapping, file_key);

        let u = handler.user.clone();
        let (validation, key_salt) = (b"ovalsalt", b"okeysalt");
        handler.owner = handler.hash_password(owner, validation, &u).unwrap();
        handler.owner.extend_from_slice(validation);
        handler.owner.extend_from_slice(key_salt);
        let wrapping = handler.hash_password(owner, key_salt, &u).unwrap();
        handler.owner_key = aes256_wrap(&wrapping, file_key);
        handler
    }

    #[test]
    fn test_pad_password() {
        assert_eq!(pad_password(b""), PASSWORD_PADDING);
        let padded = pad_password(b"ab");
        assert_eq!(&padded[..2], b"ab");
        assert_eq!(&padded[2..], &PASSWORD_PADDING[..30]);
        assert_eq!(pad_password(&[b'x'; 40]), [b'x'; 32]);
    }

    #[test]
    fn test_key_length_in_bits_or_bytes() {
        assert_eq!(key_bytes(40), 5);
        assert_eq!(key_bytes(128), 16);
        assert_eq!(key_bytes(16), 16);
        assert_eq!(key_bytes(4096), 16);
    }

    #[test]
    fn test_empty_user_password_unlocks_nested_strings() {
        let mut doc = plain_document();
        lock_rc4(&mut doc, "", "boss");

        let engine = LopdfDocument::from_document(doc);
        assert!(!engine.needs_password());
        assert_eq!(engine.lookup_metadata("Title").unwrap().as_deref(), Some("Secret Title"));
        let outline = engine.load_outline().unwrap();
        assert_eq!(outline[0].title, "Chapter One");
        assert_eq!(outline[0].uri.as_deref(), Some("https://example.org/one"));
    }

    #[test]
    fn test_user_and_owner_passwords() {
        let mut doc = plain_document();
        lock_rc4(&mut doc, "secret", "boss");
        let handler = SecurityHandler::from_document(&doc).unwrap().unwrap();
        assert_eq!(handler.key_len, 16);
        assert!(handler.authenticate(b"").is_none());
        assert!(handler.authenticate(b"wrong").is_none());
        let user_key = handler.authenticate(b"secret").unwrap();
        assert_eq!(handler.authenticate(b"boss"), Some(user_key));

        let mut engine = LopdfDocument::from_document(doc);
        assert!(engine.needs_password());
        assert!(!engine.authenticate_password("wrong"));
        assert!(engine.needs_password());
        assert!(engine.authenticate_password("boss"));
        assert_eq!(engine.load_outline().unwrap()[0].title, "Chapter One");
    }

    #[test]
    fn test_aes256_passwords() {
        let file_key = [0x5Au8; 32];
        let handler = aes256_handler(b"user pw", b"owner pw", &file_key);
        assert_eq!(handler.authenticate(b"user pw").as_deref(), Some(&file_key[..]));
        assert_eq!(handler.authenticate(b"owner pw").as_deref(), Some(&file_key[..]));
        assert_eq!(handler.authenticate(b"guess"), None);
    }

    #[test]
    fn test_aes_string_decryption() {
        let key = [0x11u8; 32];
        let iv = [0x22u8; 16];
        let plain = b"Chapter One";
        let mut buf = plain.to_vec();
        buf.resize(16, 0);
        let cipher = cbc::Encryptor::<aes::Aes256>::new_from_slices(&key, &iv)
            .unwrap()
            .encrypt_padded_mut::<Pkcs7>(&mut buf, plain.len())
            .unwrap()
            .to_vec();
        let mut data = iv.to_vec();
        data.extend(cipher);

        let decrypted = decrypt_bytes(CryptMethod::Aes256, &key, &data).unwrap();
        assert_eq!(decrypted, plain);
        assert_eq!(decrypt_bytes(CryptMethod::Aes256, &key, &iv).unwrap(), b"");
        assert_eq!(decrypt_bytes(CryptMethod::Aes256, &key, b"short"), None);
        assert_eq!(decrypt_bytes(CryptMethod::Identity, &key, &data), None);
    }

    #[test]
    fn test_aes128_object_key_is_salted() {
        let mut doc = plain_document();
        lock_rc4(&mut doc, "", "");
        let handler = SecurityHandler::from_document(&doc).unwrap().unwrap();
        let key = vec![7u8; 16];
        let rc4_key = handler.object_key(&key, (4, 0), CryptMethod::Rc4);
        let aes_key = handler.object_key(&key, (4, 0), CryptMethod::Aes128);
        assert_eq!(rc4_key.len(), 16);
        assert_eq!(aes_key.len(), 16);
        assert_ne!(rc4_key, aes_key);
        assert_eq!(handler.object_key(&key, (4, 0), CryptMethod::Aes256), key);
    }

    #[test]
    fn test_unsupported_security_handler() {
        let mut doc = plain_document();
        let encrypt_id =
            doc.add_object(dictionary! { "Filter" => "Adobe.PubSec", "V" => 4, "R" => 4 });
        doc.trailer.set("Encrypt", encrypt_id);
        assert!(matches!(
            SecurityHandler::from_document(&doc),
            Err(Error::UnsupportedEncryption(_))
        ));

        let plain = plain_document();
        assert!(SecurityHandler::from_document(&plain).unwrap().is_none());
    }
}
