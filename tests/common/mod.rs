//! Builders for small PDF files used by the integration tests.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::Arc;

use cbc::cipher::block_padding::Pkcs7;
use cbc::cipher::{BlockEncryptMut, KeyIvInit};
use docview_pdf::engine::{DocumentHandler, EngineDocument, OutlineEntry, Rect, ResolvedLink};
use docview_pdf::{Error, Result};
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, StringFormat};
use md5::{Digest, Md5};
use rc4::consts::U16;
use rc4::{KeyInit, Rc4, StreamCipher};

/// A PDF under construction: `page_count` pages of 600x800 under one Pages
/// node, plus a catalog.
pub struct TestPdf {
    pub doc: Document,
    pub pages: Vec<ObjectId>,
    pub catalog: ObjectId,
}

impl TestPdf {
    pub fn new(page_count: usize) -> Self {
        let mut doc = Document::with_version("1.7");
        let pages_id = doc.new_object_id();
        let pages: Vec<ObjectId> = (0..page_count)
            .map(|_| doc.add_object(dictionary! { "Type" => "Page", "Parent" => pages_id }))
            .collect();
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => pages.iter().map(|id| Object::Reference(*id)).collect::<Vec<_>>(),
                "Count" => page_count as i64,
                "MediaBox" => vec![0.into(), 0.into(), 600.into(), 800.into()],
            }),
        );
        let catalog = doc.add_object(dictionary! { "Type" => "Catalog", "Pages" => pages_id });
        doc.trailer.set("Root", catalog);
        Self { doc, pages, catalog }
    }

    pub fn catalog(&mut self) -> &mut Dictionary {
        self.dict(self.catalog)
    }

    pub fn page(&mut self, index: usize) -> &mut Dictionary {
        self.dict(self.pages[index])
    }

    fn dict(&mut self, id: ObjectId) -> &mut Dictionary {
        self.doc
            .get_object_mut(id)
            .and_then(Object::as_dict_mut)
            .expect("dictionary object")
    }

    /// Page reference for explicit destinations.
    pub fn page_ref(&self, index: usize) -> Object {
        Object::Reference(self.pages[index])
    }

    pub fn set_info(&mut self, info: Dictionary) {
        let id = self.doc.add_object(info);
        self.doc.trailer.set("Info", id);
    }

    pub fn set_outline(&mut self, items: &[OutlineItem]) {
        let outlines = self.doc.new_object_id();
        let mut root = dictionary! { "Type" => "Outlines" };
        if let Some((first, last)) = add_items(&mut self.doc, outlines, items) {
            root.set("First", first);
            root.set("Last", last);
            root.set("Count", items.len() as i64);
        }
        self.doc.objects.insert(outlines, Object::Dictionary(root));
        self.catalog().set("Outlines", outlines);
    }

    /// Register named destinations in a `/Names /Dests` name tree.
    pub fn set_name_tree(&mut self, names: Vec<(&str, Object)>) {
        let mut flat = Vec::new();
        for (name, dest) in names {
            flat.push(text(name));
            flat.push(dest);
        }
        let leaf = self.doc.add_object(dictionary! { "Names" => flat });
        self.catalog().set(
            "Names",
            dictionary! { "Dests" => dictionary! { "Kids" => vec![Object::Reference(leaf)] } },
        );
    }

    /// Encrypt every string and stream with the standard security handler,
    /// 128-bit keys: revision 3 for RC4, revision 4 for AES.
    pub fn encrypt(&mut self, cipher: TestCipher, user: &str, owner: &str) {
        let id = b"\x8a\x01docview\x00test\xff\x10".to_vec();
        let permissions: i32 = -3904;

        let mut owner_key = Md5::digest(padded(owner)).to_vec();
        for _ in 0..50 {
            owner_key = Md5::digest(&owner_key).to_vec();
        }
        let mut o = padded(user);
        for i in 0..=19 {
            o = rc4(&xor(&owner_key, i), &o);
        }

        let mut md5 = Md5::new();
        md5.update(padded(user));
        md5.update(&o);
        md5.update(permissions.to_le_bytes());
        md5.update(&id);
        let mut key = md5.finalize().to_vec();
        for _ in 0..50 {
            key = Md5::digest(&key).to_vec();
        }

        let mut md5 = Md5::new();
        md5.update(PADDING);
        md5.update(&id);
        let mut u = md5.finalize().to_vec();
        for i in 0..=19 {
            u = rc4(&xor(&key, i), &u);
        }
        u.extend_from_slice(&[0xAB; 16]);

        for (&object_id, object) in self.doc.objects.iter_mut() {
            encrypt_object(cipher, &key, object_id, object);
        }

        let mut encrypt = dictionary! {
            "Filter" => "Standard",
            "Length" => 128,
            "P" => permissions as i64,
            "O" => Object::String(o, StringFormat::Hexadecimal),
            "U" => Object::String(u, StringFormat::Hexadecimal),
        };
        match cipher {
            TestCipher::Rc4 => {
                encrypt.set("V", 2);
                encrypt.set("R", 3);
            }
            TestCipher::Aes128 => {
                encrypt.set("V", 4);
                encrypt.set("R", 4);
                encrypt.set(
                    "CF",
                    dictionary! {
                        "StdCF" => dictionary! {
                            "CFM" => "AESV2",
                            "AuthEvent" => "DocOpen",
                            "Length" => 16,
                        },
                    },
                );
                encrypt.set("StmF", "StdCF");
                encrypt.set("StrF", "StdCF");
            }
        }
        let encrypt_id = self.doc.add_object(encrypt);
        self.doc.trailer.set("Encrypt", encrypt_id);
        self.doc.trailer.set(
            "ID",
            vec![
                Object::String(id.clone(), StringFormat::Hexadecimal),
                Object::String(id, StringFormat::Hexadecimal),
            ],
        );
    }

    pub fn save(mut self, dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        self.doc.save(&path).expect("save test pdf");
        path
    }
}

/// Cipher used by [`TestPdf::encrypt`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TestCipher {
    Rc4,
    Aes128,
}

const PADDING: [u8; 32] = [
    0x28, 0xBF, 0x4E, 0x5E, 0x4E, 0x75, 0x8A, 0x41, 0x64, 0x00, 0x4E, 0x56, 0xFF, 0xFA, 0x01,
    0x08, 0x2E, 0x2E, 0x00, 0xB6, 0xD0, 0x68, 0x3E, 0x80, 0x2F, 0x0C, 0xA9, 0xFE, 0x64, 0x53,
    0x69, 0x7A,
];

fn padded(password: &str) -> Vec<u8> {
    let mut bytes = password.as_bytes().to_vec();
    bytes.extend_from_slice(&PADDING);
    bytes.truncate(32);
    bytes
}

fn xor(key: &[u8], value: u8) -> Vec<u8> {
    key.iter().map(|b| b ^ value).collect()
}

fn rc4(key: &[u8], data: &[u8]) -> Vec<u8> {
    let mut buf = data.to_vec();
    Rc4::<U16>::new_from_slice(key)
        .expect("128-bit key")
        .apply_keystream(&mut buf);
    buf
}

fn aes128(key: &[u8], data: &[u8]) -> Vec<u8> {
    let iv = [0x5Cu8; 16];
    let mut buf = data.to_vec();
    buf.resize(data.len() + 16, 0);
    let len = cbc::Encryptor::<aes::Aes128>::new_from_slices(key, &iv)
        .expect("AES-128 key")
        .encrypt_padded_mut::<Pkcs7>(&mut buf, data.len())
        .expect("room for padding")
        .len();
    buf.truncate(len);
    let mut out = iv.to_vec();
    out.extend(buf);
    out
}

fn encrypt_bytes(cipher: TestCipher, file_key: &[u8], id: ObjectId, data: &[u8]) -> Vec<u8> {
    let mut md5 = Md5::new();
    md5.update(file_key);
    md5.update(&id.0.to_le_bytes()[..3]);
    md5.update(id.1.to_le_bytes());
    if cipher == TestCipher::Aes128 {
        md5.update(b"sAlT");
    }
    let key = md5.finalize();
    match cipher {
        TestCipher::Rc4 => rc4(&key, data),
        TestCipher::Aes128 => aes128(&key, data),
    }
}

fn encrypt_object(cipher: TestCipher, file_key: &[u8], id: ObjectId, object: &mut Object) {
    match object {
        Object::String(bytes, format) => {
            *bytes = encrypt_bytes(cipher, file_key, id, bytes);
            *format = StringFormat::Hexadecimal;
        }
        Object::Array(items) => {
            for item in items {
                encrypt_object(cipher, file_key, id, item);
            }
        }
        Object::Dictionary(dict) => {
            for (_, value) in dict.iter_mut() {
                encrypt_object(cipher, file_key, id, value);
            }
        }
        Object::Stream(stream) => {
            for (_, value) in stream.dict.iter_mut() {
                encrypt_object(cipher, file_key, id, value);
            }
            let content = encrypt_bytes(cipher, file_key, id, &stream.content);
            stream.set_content(content);
        }
        _ => {}
    }
}

/// A literal PDF string.
pub fn text(s: &str) -> Object {
    Object::String(s.as_bytes().to_vec(), StringFormat::Literal)
}

/// An outline item with an optional `/Dest` or `/A` entry.
#[derive(Clone)]
pub struct OutlineItem {
    pub title: String,
    pub target: Option<(&'static str, Object)>,
    pub children: Vec<OutlineItem>,
}

impl OutlineItem {
    pub fn heading(title: &str) -> Self {
        Self {
            title: title.to_string(),
            target: None,
            children: Vec::new(),
        }
    }

    pub fn dest(title: &str, dest: Object) -> Self {
        Self {
            target: Some(("Dest", dest)),
            ..Self::heading(title)
        }
    }

    pub fn action(title: &str, action: Dictionary) -> Self {
        Self {
            target: Some(("A", Object::Dictionary(action))),
            ..Self::heading(title)
        }
    }

    pub fn with_children(mut self, children: Vec<OutlineItem>) -> Self {
        self.children = children;
        self
    }
}

fn add_items(
    doc: &mut Document,
    parent: ObjectId,
    items: &[OutlineItem],
) -> Option<(ObjectId, ObjectId)> {
    if items.is_empty() {
        return None;
    }
    let ids: Vec<ObjectId> = items.iter().map(|_| doc.new_object_id()).collect();
    for (i, item) in items.iter().enumerate() {
        let mut dict = dictionary! { "Title" => text(&item.title), "Parent" => parent };
        if let Some((key, value)) = &item.target {
            dict.set(*key, value.clone());
        }
        if i > 0 {
            dict.set("Prev", ids[i - 1]);
        }
        if i + 1 < ids.len() {
            dict.set("Next", ids[i + 1]);
        }
        if let Some((first, last)) = add_items(doc, ids[i], &item.children) {
            dict.set("First", first);
            dict.set("Last", last);
            dict.set("Count", item.children.len() as i64);
        }
        doc.objects.insert(ids[i], Object::Dictionary(dict));
    }
    Some((ids[0], ids[ids.len() - 1]))
}

/// Handler for fake encrypted documents: files starting with `LOCKED:`
/// followed by the password and a newline.
pub struct LockedHandler;

pub struct LockedDocument {
    password: String,
    unlocked: bool,
}

impl DocumentHandler for LockedHandler {
    fn name(&self) -> &str {
        "locked"
    }

    fn extensions(&self) -> &[&str] {
        &["locked"]
    }

    fn mime_types(&self) -> &[&str] {
        &["application/x-locked"]
    }

    fn recognize(&self, header: &[u8]) -> bool {
        header.starts_with(b"LOCKED:")
    }

    fn open(&self, path: &Path) -> Result<Box<dyn EngineDocument>> {
        let content = std::fs::read_to_string(path)?;
        let password = content
            .strip_prefix("LOCKED:")
            .and_then(|rest| rest.lines().next())
            .ok_or_else(|| Error::Engine("malformed locked file".to_string()))?;
        Ok(Box::new(LockedDocument {
            password: password.to_string(),
            unlocked: false,
        }))
    }
}

impl EngineDocument for LockedDocument {
    fn needs_password(&self) -> bool {
        !self.unlocked
    }

    fn authenticate_password(&mut self, password: &str) -> bool {
        self.unlocked = password == self.password;
        self.unlocked
    }

    fn count_pages(&self) -> Result<u32> {
        if self.unlocked {
            Ok(4)
        } else {
            Err(Error::Encrypted)
        }
    }

    fn load_outline(&self) -> Result<Vec<OutlineEntry>> {
        Ok(Vec::new())
    }

    fn resolve_link(&self, _uri: &str) -> Result<Option<ResolvedLink>> {
        Ok(None)
    }

    fn page_bounds(&self, _index: u32) -> Result<Rect> {
        Ok(Rect::new(0.0, 0.0, 100.0, 100.0))
    }
}

pub fn locked_handler() -> Arc<dyn DocumentHandler> {
    Arc::new(LockedHandler)
}

pub fn write_locked(dir: &Path, password: &str) -> PathBuf {
    let path = dir.join("secret.locked");
    std::fs::write(&path, format!("LOCKED:{}\n", password)).expect("write locked file");
    path
}
