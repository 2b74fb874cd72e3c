//! `EngineDocument` backed by lopdf.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use lopdf::{Dictionary, Document as PdfDocument, Object, ObjectId};

use super::backend::{
    decode_text_string, EngineDocument, EngineLink, OutlineEntry, Rect, ResolvedLink,
};
use super::labels::{label_for, LabelRange, LabelStyle};
use super::security::SecurityHandler;
use super::uri::{
    named_dest_fragment, named_dest_uri, parse_fragment, DestView, LinkDest, LinkFragment,
    UNRESOLVED_URI,
};
use crate::error::{Error, Result};

/// Longest chain of indirect references followed before giving up.
const MAX_REF_DEPTH: usize = 32;

/// Deepest page tree, outline, name tree or number tree walked.
const MAX_TREE_DEPTH: usize = 64;

/// US Letter, used when a page has no usable MediaBox.
const DEFAULT_MEDIA_BOX: [f32; 4] = [0.0, 0.0, 612.0, 792.0];

const FILE_SPEC_KEYS: [&[u8]; 4] = [b"UF", b"F", b"Unix", b"DOS"];

/// Concrete [`EngineDocument`] backed by `lopdf::Document`.
pub struct LopdfDocument {
    /// `None` when lopdf refused to load the encrypted file at all.
    doc: Option<PdfDocument>,
    pages: Vec<ObjectId>,
    page_index: HashMap<ObjectId, u32>,
    locked: bool,
}

impl LopdfDocument {
    /// Load from a file path.
    pub fn load_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        match PdfDocument::load(path) {
            Ok(doc) => Ok(Self::from_document(doc)),
            Err(lopdf::Error::Decryption(_)) => {
                log::debug!("{}: encrypted document could not be loaded", path.display());
                Ok(Self::unreadable())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Load from an in-memory byte slice.
    pub fn load_bytes(data: &[u8]) -> Result<Self> {
        match PdfDocument::load_mem(data) {
            Ok(doc) => Ok(Self::from_document(doc)),
            Err(lopdf::Error::Decryption(_)) => Ok(Self::unreadable()),
            Err(e) => Err(e.into()),
        }
    }

    /// Wrap an already loaded document.
    ///
    /// Encrypted documents stay locked until a password is accepted; the
    /// empty user password is tried right away.
    pub fn from_document(doc: PdfDocument) -> Self {
        let encrypted = doc.is_encrypted();
        let mut this = Self {
            doc: Some(doc),
            pages: Vec::new(),
            page_index: HashMap::new(),
            locked: encrypted,
        };

        if !encrypted {
            this.index_pages();
        } else if this.authenticate_password("") {
            log::debug!("encrypted document opened with the empty user password");
        }
        this
    }

    fn unreadable() -> Self {
        Self {
            doc: None,
            pages: Vec::new(),
            page_index: HashMap::new(),
            locked: true,
        }
    }

    fn index_pages(&mut self) {
        let Some(doc) = self.doc.as_ref() else {
            return;
        };
        self.pages = doc.get_pages().into_values().collect();
        self.page_index = self
            .pages
            .iter()
            .enumerate()
            .map(|(i, id)| (*id, i as u32))
            .collect();
    }

    fn document(&self) -> Result<&PdfDocument> {
        if self.locked {
            return Err(Error::Encrypted);
        }
        self.doc.as_ref().ok_or(Error::Encrypted)
    }

    fn page_id(&self, index: u32) -> Result<ObjectId> {
        self.pages
            .get(index as usize)
            .copied()
            .ok_or(Error::PageOutOfRange(index, self.pages.len() as u32))
    }

    fn geometry(&self, doc: &PdfDocument, page: ObjectId) -> PageGeometry {
        let media = inherited(doc, page, b"MediaBox")
            .and_then(|o| rect_array(doc, o))
            .unwrap_or(DEFAULT_MEDIA_BOX);
        let bbox = inherited(doc, page, b"CropBox")
            .and_then(|o| rect_array(doc, o))
            .and_then(|crop| intersect(crop, media))
            .unwrap_or(media);
        let rotate = inherited(doc, page, b"Rotate")
            .and_then(|o| o.as_i64().ok())
            .map(|r| (r.rem_euclid(360) / 90 * 90) as u32)
            .unwrap_or(0);
        PageGeometry { bbox, rotate }
    }

    fn outline_level(
        &self,
        doc: &PdfDocument,
        first: Option<&Object>,
        visited: &mut HashSet<ObjectId>,
        depth: usize,
    ) -> Vec<OutlineEntry> {
        let mut items = Vec::new();
        if depth > MAX_TREE_DEPTH {
            log::warn!("outline nested deeper than {} levels, truncated", MAX_TREE_DEPTH);
            return items;
        }

        let mut next = first.and_then(|o| o.as_reference().ok());
        while let Some(id) = next {
            if !visited.insert(id) {
                log::warn!("outline item {:?} visited twice, stopping", id);
                break;
            }
            let Ok(item) = doc.get_dictionary(id) else {
                break;
            };

            let title = match dict_get(doc, item, b"Title") {
                Some(Object::String(bytes, _)) => decode_text_string(bytes),
                _ => String::new(),
            };
            let mut entry = OutlineEntry::new(title, self.link_target(doc, item, None));
            entry.children = self.outline_level(doc, item.get(b"First").ok(), visited, depth + 1);
            items.push(entry);

            next = item.get(b"Next").ok().and_then(|o| o.as_reference().ok());
        }
        items
    }

    /// Target URI of an outline item or link annotation (`/Dest` or `/A`).
    fn link_target(
        &self,
        doc: &PdfDocument,
        dict: &Dictionary,
        page: Option<u32>,
    ) -> Option<String> {
        if let Some(dest) = dict_get(doc, dict, b"Dest") {
            return Some(self.dest_uri(doc, dest));
        }
        let action = dict_get(doc, dict, b"A")?.as_dict().ok()?;
        self.action_uri(doc, action, page)
    }

    /// Internal destination as a link URI.
    ///
    /// A destination that does not name a page of this document still yields
    /// an internal link, one that never resolves.
    fn dest_uri(&self, doc: &PdfDocument, dest: &Object) -> String {
        match dest {
            Object::Name(name) => named_dest_uri(&String::from_utf8_lossy(name)),
            Object::String(bytes, _) => named_dest_uri(&decode_text_string(bytes)),
            Object::Array(array) => match self.local_dest(doc, array) {
                Some(dest) => dest.to_uri(),
                None => {
                    log::debug!("destination {:?} names no page", array.first());
                    UNRESOLVED_URI.to_string()
                }
            },
            Object::Dictionary(dict) => match dict_get(doc, dict, b"D") {
                Some(inner @ (Object::Array(_) | Object::Name(_) | Object::String(..))) => {
                    self.dest_uri(doc, inner)
                }
                _ => UNRESOLVED_URI.to_string(),
            },
            _ => UNRESOLVED_URI.to_string(),
        }
    }

    fn action_uri(
        &self,
        doc: &PdfDocument,
        action: &Dictionary,
        page: Option<u32>,
    ) -> Option<String> {
        let kind = dict_get(doc, action, b"S")?.as_name().ok()?;
        match kind {
            b"GoTo" => Some(match dict_get(doc, action, b"D") {
                Some(dest) => self.dest_uri(doc, dest),
                None => UNRESOLVED_URI.to_string(),
            }),
            b"URI" => match dict_get(doc, action, b"URI")? {
                Object::String(bytes, _) => {
                    Some(decode_text_string(bytes)).filter(|s| !s.is_empty())
                }
                _ => None,
            },
            b"GoToR" => {
                let file = file_spec(doc, dict_get(doc, action, b"F")?)?;
                match dict_get(doc, action, b"D").and_then(|d| self.remote_fragment(doc, d)) {
                    Some(fragment) => Some(format!("file://{}#{}", file, fragment)),
                    None => Some(format!("file://{}", file)),
                }
            }
            b"Launch" => {
                let spec = dict_get(doc, action, b"F").or_else(|| {
                    dict_get(doc, action, b"Win")
                        .and_then(|w| w.as_dict().ok())
                        .and_then(|w| dict_get(doc, w, b"F"))
                })?;
                file_spec(doc, spec).map(|file| format!("file://{}", file))
            }
            b"Named" => self.named_action(dict_get(doc, action, b"N")?.as_name().ok()?, page),
            other => {
                log::debug!("unsupported action {}", String::from_utf8_lossy(other));
                None
            }
        }
    }

    fn named_action(&self, name: &[u8], page: Option<u32>) -> Option<String> {
        let count = self.pages.len() as u32;
        let target = match name {
            b"FirstPage" => Some(0),
            b"LastPage" => count.checked_sub(1),
            b"NextPage" => page.map(|p| p + 1),
            b"PrevPage" => page.and_then(|p| p.checked_sub(1)),
            _ => None,
        }?;
        (target < count).then(|| LinkDest::new(target, DestView::Fit).to_uri())
    }

    /// Destination inside another file; only integer page numbers make sense there.
    fn remote_fragment(&self, doc: &PdfDocument, dest: &Object) -> Option<String> {
        match dest {
            Object::Array(array) if matches!(array.first(), Some(Object::Integer(_))) => {
                self.explicit_dest(doc, array).map(|d| d.to_fragment())
            }
            Object::Name(name) => Some(named_dest_fragment(&String::from_utf8_lossy(name))),
            Object::String(bytes, _) => Some(named_dest_fragment(&decode_text_string(bytes))),
            _ => None,
        }
    }

    /// Parse `[page /View args...]` without any coordinate transform.
    fn explicit_dest(&self, doc: &PdfDocument, array: &[Object]) -> Option<LinkDest> {
        let page = match array.first()? {
            Object::Reference(id) => *self.page_index.get(id)?,
            Object::Integer(n) => u32::try_from(*n).ok()?,
            _ => return None,
        };
        let kind = array
            .get(1)
            .and_then(|o| o.as_name().ok())
            .unwrap_or(&b"Fit"[..]);
        let num = |i: usize| {
            array
                .get(i)
                .and_then(|o| deref(doc, o))
                .and_then(number)
                .unwrap_or(f32::NAN)
        };

        let view = match kind {
            b"XYZ" => DestView::Xyz {
                left: num(2),
                top: num(3),
                zoom: num(4),
            },
            b"FitH" | b"FitBH" => DestView::FitH { top: num(2) },
            b"FitV" | b"FitBV" => DestView::FitV { left: num(2) },
            b"FitR" => DestView::FitR {
                left: num(2),
                bottom: num(3),
                right: num(4),
                top: num(5),
            },
            _ => DestView::Fit,
        };
        Some(LinkDest::new(page, view))
    }

    /// Explicit destination in this document, in top-left page space.
    fn local_dest(&self, doc: &PdfDocument, array: &[Object]) -> Option<LinkDest> {
        let dest = self.explicit_dest(doc, array)?;
        let page_id = *self.pages.get(dest.page as usize)?;
        let geometry = self.geometry(doc, page_id);
        Some(LinkDest::new(dest.page, geometry.transform_view(dest.view)))
    }

    fn lookup_named_dest<'a>(&self, doc: &'a PdfDocument, name: &str) -> Option<&'a Object> {
        let catalog = doc.catalog().ok()?;

        // PDF 1.1 style: catalog /Dests dictionary keyed by name
        if let Some(dests) = dict_get(doc, catalog, b"Dests").and_then(|o| o.as_dict().ok()) {
            if let Some(dest) = dict_get(doc, dests, name.as_bytes()) {
                return Some(dest);
            }
        }

        let names = dict_get(doc, catalog, b"Names")?.as_dict().ok()?;
        let tree = dict_get(doc, names, b"Dests")?.as_dict().ok()?;
        name_tree_lookup(doc, tree, name.as_bytes(), 0)
    }

    fn label_ranges(&self, doc: &PdfDocument) -> Vec<LabelRange> {
        let mut ranges = Vec::new();
        let tree = doc
            .catalog()
            .ok()
            .and_then(|c| dict_get(doc, c, b"PageLabels"))
            .and_then(|o| o.as_dict().ok());
        if let Some(tree) = tree {
            collect_label_ranges(doc, tree, &mut ranges, 0);
        }
        ranges.sort_by_key(|r| r.start);
        ranges
    }
}

impl EngineDocument for LopdfDocument {
    fn needs_password(&self) -> bool {
        self.locked
    }

    fn authenticate_password(&mut self, password: &str) -> bool {
        if !self.locked {
            return true;
        }
        let Some(doc) = self.doc.as_ref() else {
            return false;
        };

        let handler = match SecurityHandler::from_document(doc) {
            Ok(Some(handler)) => handler,
            Ok(None) => {
                self.locked = false;
                self.index_pages();
                return true;
            }
            Err(e) => {
                log::warn!("cannot decrypt document: {}", e);
                return false;
            }
        };
        let Some(key) = handler.authenticate(password.as_bytes()) else {
            log::debug!("password rejected");
            return false;
        };

        if let Some(doc) = self.doc.as_mut() {
            handler.decrypt_document(doc, &key);
        }
        self.locked = false;
        self.index_pages();
        true
    }

    fn count_pages(&self) -> Result<u32> {
        self.document()?;
        Ok(self.pages.len() as u32)
    }

    fn lookup_metadata(&self, key: &str) -> Result<Option<String>> {
        let doc = self.document()?;
        let info = doc
            .trailer
            .get(b"Info")
            .ok()
            .and_then(|o| deref(doc, o))
            .and_then(|o| o.as_dict().ok());
        let Some(info) = info else {
            return Ok(None);
        };

        Ok(match dict_get(doc, info, key.as_bytes()) {
            Some(Object::String(bytes, _)) => Some(decode_text_string(bytes)),
            _ => None,
        })
    }

    fn load_outline(&self) -> Result<Vec<OutlineEntry>> {
        let doc = self.document()?;
        let catalog = doc.catalog()?;
        let outlines = dict_get(doc, catalog, b"Outlines").and_then(|o| o.as_dict().ok());
        let Some(outlines) = outlines else {
            return Ok(Vec::new());
        };

        let mut visited = HashSet::new();
        Ok(self.outline_level(doc, outlines.get(b"First").ok(), &mut visited, 0))
    }

    fn resolve_link(&self, uri: &str) -> Result<Option<ResolvedLink>> {
        let doc = self.document()?;
        let dest = match parse_fragment(uri) {
            Some(LinkFragment::Dest(dest)) => Some(dest),
            Some(LinkFragment::Named(name)) => {
                self.lookup_named_dest(doc, &name).and_then(|found| match found {
                    Object::Array(array) => self.local_dest(doc, array),
                    Object::Dictionary(dict) => dict_get(doc, dict, b"D")
                        .and_then(|o| o.as_array().ok())
                        .and_then(|array| self.local_dest(doc, array)),
                    _ => None,
                })
            }
            None => None,
        };

        Ok(dest
            .filter(|d| (d.page as usize) < self.pages.len())
            .map(|d| {
                let (x, y) = d.position();
                ResolvedLink { page: d.page, x, y }
            }))
    }

    fn page_bounds(&self, index: u32) -> Result<Rect> {
        let doc = self.document()?;
        let page = self.page_id(index)?;
        Ok(self.geometry(doc, page).bounds())
    }

    fn page_label(&self, index: u32) -> Result<Option<String>> {
        let doc = self.document()?;
        self.page_id(index)?;
        Ok(label_for(&self.label_ranges(doc), index))
    }

    fn load_links(&self, index: u32) -> Result<Vec<EngineLink>> {
        let doc = self.document()?;
        let page_id = self.page_id(index)?;
        let page = doc.get_dictionary(page_id)?;
        let Some(annots) = dict_get(doc, page, b"Annots").and_then(|o| o.as_array().ok()) else {
            return Ok(Vec::new());
        };

        let geometry = self.geometry(doc, page_id);
        let mut links = Vec::new();
        for annot in annots {
            let Some(annot) = deref(doc, annot).and_then(|o| o.as_dict().ok()) else {
                continue;
            };
            let subtype = dict_get(doc, annot, b"Subtype").and_then(|o| o.as_name().ok());
            if subtype != Some(b"Link".as_slice()) {
                continue;
            }
            let Some(rect) = dict_get(doc, annot, b"Rect").and_then(|o| rect_array(doc, o)) else {
                continue;
            };
            let Some(uri) = self.link_target(doc, annot, Some(index)) else {
                continue;
            };
            links.push(EngineLink {
                rect: geometry.transform_rect(rect),
                uri,
            });
        }
        Ok(links)
    }

    fn save(&mut self, path: &Path) -> Result<()> {
        if self.locked {
            return Err(Error::Encrypted);
        }
        let doc = self.doc.as_mut().ok_or(Error::Encrypted)?;
        doc.save(path)?;
        Ok(())
    }
}

/// Page box and rotation, mapping PDF user space to top-left page space.
#[derive(Debug, Clone, Copy)]
struct PageGeometry {
    /// Normalized `[x0, y0, x1, y1]`.
    bbox: [f32; 4],
    /// 0, 90, 180 or 270.
    rotate: u32,
}

impl PageGeometry {
    fn to_page_space(&self, x: f32, y: f32) -> (f32, f32) {
        let [x0, y0, x1, y1] = self.bbox;
        match self.rotate {
            90 => (y - y0, x - x0),
            180 => (x1 - x, y - y0),
            270 => (y1 - y, x1 - x),
            _ => (x - x0, y1 - y),
        }
    }

    fn bounds(&self) -> Rect {
        let [x0, y0, x1, y1] = self.bbox;
        let (w, h) = (x1 - x0, y1 - y0);
        if self.rotate == 90 || self.rotate == 270 {
            Rect::new(0.0, 0.0, h, w)
        } else {
            Rect::new(0.0, 0.0, w, h)
        }
    }

    fn transform_rect(&self, rect: [f32; 4]) -> Rect {
        let (ax, ay) = self.to_page_space(rect[0], rect[1]);
        let (bx, by) = self.to_page_space(rect[2], rect[3]);
        Rect::new(ax.min(bx), ay.min(by), ax.max(bx), ay.max(by))
    }

    fn transform_view(&self, view: DestView) -> DestView {
        match view {
            DestView::Fit => DestView::Fit,
            DestView::Xyz { left, top, zoom } => {
                let (left, top) = self.to_page_space(left, top);
                DestView::Xyz { left, top, zoom }
            }
            DestView::FitH { top } => DestView::FitH {
                top: self.to_page_space(f32::NAN, top).1,
            },
            DestView::FitV { left } => DestView::FitV {
                left: self.to_page_space(left, f32::NAN).0,
            },
            DestView::FitR {
                left,
                top,
                right,
                bottom,
            } => {
                let r = self.transform_rect([left, bottom, right, top]);
                DestView::FitR {
                    left: r.x0,
                    top: r.y0,
                    right: r.x1,
                    bottom: r.y1,
                }
            }
        }
    }
}

/// Follow indirect references to the object they point at.
fn deref<'a>(doc: &'a PdfDocument, mut obj: &'a Object) -> Option<&'a Object> {
    for _ in 0..MAX_REF_DEPTH {
        match obj {
            Object::Reference(id) => obj = doc.get_object(*id).ok()?,
            _ => return Some(obj),
        }
    }
    None
}

/// Dictionary lookup with reference resolution.
fn dict_get<'a>(doc: &'a PdfDocument, dict: &'a Dictionary, key: &[u8]) -> Option<&'a Object> {
    dict.get(key).ok().and_then(|o| deref(doc, o))
}

/// Look up a page attribute, walking up the page tree for inherited ones.
fn inherited<'a>(doc: &'a PdfDocument, page: ObjectId, key: &[u8]) -> Option<&'a Object> {
    let mut node = doc.get_dictionary(page).ok()?;
    for _ in 0..MAX_TREE_DEPTH {
        if let Some(value) = dict_get(doc, node, key) {
            return Some(value);
        }
        let parent = node.get(b"Parent").ok()?.as_reference().ok()?;
        node = doc.get_dictionary(parent).ok()?;
    }
    None
}

fn number(obj: &Object) -> Option<f32> {
    match obj {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(r) => Some(*r as f32),
        _ => None,
    }
}

/// Read a rectangle array, normalized so that x0 <= x1 and y0 <= y1.
fn rect_array(doc: &PdfDocument, obj: &Object) -> Option<[f32; 4]> {
    let array = obj.as_array().ok()?;
    if array.len() < 4 {
        return None;
    }
    let mut v = [0.0f32; 4];
    for (slot, item) in v.iter_mut().zip(array) {
        *slot = deref(doc, item).and_then(number)?;
    }
    Some([v[0].min(v[2]), v[1].min(v[3]), v[0].max(v[2]), v[1].max(v[3])])
}

fn intersect(a: [f32; 4], b: [f32; 4]) -> Option<[f32; 4]> {
    let r = [a[0].max(b[0]), a[1].max(b[1]), a[2].min(b[2]), a[3].min(b[3])];
    (r[0] < r[2] && r[1] < r[3]).then_some(r)
}

fn file_spec(doc: &PdfDocument, spec: &Object) -> Option<String> {
    let file = match spec {
        Object::String(bytes, _) => Some(decode_text_string(bytes)),
        Object::Dictionary(dict) => {
            FILE_SPEC_KEYS
                .iter()
                .find_map(|key| match dict_get(doc, dict, key) {
                    Some(Object::String(bytes, _)) => Some(decode_text_string(bytes)),
                    _ => None,
                })
        }
        _ => None,
    };
    file.filter(|f| !f.is_empty())
}

fn name_tree_lookup<'a>(
    doc: &'a PdfDocument,
    node: &'a Dictionary,
    key: &[u8],
    depth: usize,
) -> Option<&'a Object> {
    if depth > MAX_TREE_DEPTH {
        return None;
    }

    if let Some(names) = dict_get(doc, node, b"Names").and_then(|o| o.as_array().ok()) {
        for pair in names.chunks_exact(2) {
            if let Object::String(name, _) = &pair[0] {
                if name.as_slice() == key {
                    return deref(doc, &pair[1]);
                }
            }
        }
    }

    let kids = dict_get(doc, node, b"Kids")?.as_array().ok()?;
    for kid in kids {
        let Some(kid) = deref(doc, kid).and_then(|o| o.as_dict().ok()) else {
            continue;
        };
        if let Some(limits) = dict_get(doc, kid, b"Limits").and_then(|o| o.as_array().ok()) {
            if let (Some(Object::String(lo, _)), Some(Object::String(hi, _))) =
                (limits.first(), limits.get(1))
            {
                if key < lo.as_slice() || key > hi.as_slice() {
                    continue;
                }
            }
        }
        if let Some(found) = name_tree_lookup(doc, kid, key, depth + 1) {
            return Some(found);
        }
    }
    None
}

fn collect_label_ranges(
    doc: &PdfDocument,
    node: &Dictionary,
    out: &mut Vec<LabelRange>,
    depth: usize,
) {
    if depth > MAX_TREE_DEPTH {
        return;
    }

    if let Some(nums) = dict_get(doc, node, b"Nums").and_then(|o| o.as_array().ok()) {
        for pair in nums.chunks_exact(2) {
            let Some(start) = pair[0].as_i64().ok().and_then(|n| u32::try_from(n).ok()) else {
                continue;
            };
            let Some(dict) = deref(doc, &pair[1]).and_then(|o| o.as_dict().ok()) else {
                continue;
            };

            let mut range = LabelRange::new(start);
            range.style = dict_get(doc, dict, b"S")
                .and_then(|o| o.as_name().ok())
                .and_then(LabelStyle::from_name);
            if let Some(Object::String(bytes, _)) = dict_get(doc, dict, b"P") {
                range.prefix = decode_text_string(bytes);
            }
            range.first = dict_get(doc, dict, b"St")
                .and_then(|o| o.as_i64().ok())
                .and_then(|n| u32::try_from(n).ok())
                .filter(|n| *n > 0)
                .unwrap_or(1);
            out.push(range);
        }
    }

    if let Some(kids) = dict_get(doc, node, b"Kids").and_then(|o| o.as_array().ok()) {
        for kid in kids {
            if let Some(kid) = deref(doc, kid).and_then(|o| o.as_dict().ok()) {
                collect_label_ranges(doc, kid, out, depth + 1);
            }
        }
    }
}
