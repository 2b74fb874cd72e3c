//! Link classification and page links.

use crate::engine::uri::{is_external_link, is_file_uri};
use crate::engine::{EngineDocument, Rect};
use crate::error::{Error, Result};
use crate::model::{DestinationType, Document, Link, LinkTarget, LinkType, Page, Rectangle};

/// Turn an engine link URI into a host link.
///
/// - no URI: a link of type none
/// - external URI: goto-remote for `file://` URIs, uri otherwise
/// - anything else: resolved by the engine into a goto-dest with an XYZ
///   destination; `left`/`top` are only set for coordinates the engine
///   returned
///
/// Returns `Ok(None)` when no link can be built, e.g. when the engine cannot
/// resolve the destination to a page.
pub fn link_from_uri(
    engine: &dyn EngineDocument,
    uri: Option<&str>,
    position: Rectangle,
) -> Result<Option<Link>> {
    let Some(uri) = uri else {
        return Ok(Link::new(LinkType::None, position, LinkTarget::default()));
    };

    if is_external_link(uri) {
        let link_type = if is_file_uri(uri) {
            LinkType::GotoRemote
        } else {
            LinkType::Uri
        };
        let target = LinkTarget {
            value: Some(uri.to_string()),
            ..LinkTarget::default()
        };
        return Ok(Link::new(link_type, position, target));
    }

    let Some(resolved) = engine.resolve_link(uri)? else {
        log::debug!("cannot resolve link '{}'", uri);
        return Ok(Link::new(LinkType::Invalid, position, LinkTarget::default()));
    };

    let mut target = LinkTarget {
        destination_type: DestinationType::Xyz,
        page_number: resolved.page,
        zoom: 0.0,
        ..LinkTarget::default()
    };
    if !resolved.x.is_nan() {
        target.left = f64::from(resolved.x);
    }
    if !resolved.y.is_nan() {
        target.top = f64::from(resolved.y);
    }
    Ok(Link::new(LinkType::GotoDest, position, target))
}

fn rectangle(rect: Rect) -> Rectangle {
    Rectangle::new(
        f64::from(rect.x0),
        f64::from(rect.y0),
        f64::from(rect.x1),
        f64::from(rect.y1),
    )
}

/// All links on a page, classified like index entries.
pub(crate) fn page_links_get(document: &Document, page: &Page) -> Result<Vec<Link>> {
    let session = document.data().ok_or(Error::NotOpen)?;
    session.with_document(|engine, _| {
        let mut links = Vec::new();
        for link in engine.load_links(page.index())? {
            let position = rectangle(link.rect);
            if let Some(link) = link_from_uri(&*engine, Some(link.uri.as_str()), position)? {
                links.push(link);
            }
        }
        Ok(links)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{OutlineEntry, ResolvedLink};

    /// Resolves `#page=N` to page N-1 at (10, 20) and `#fit` to page 0
    /// without coordinates.
    struct StaticEngine;

    impl EngineDocument for StaticEngine {
        fn needs_password(&self) -> bool {
            false
        }

        fn authenticate_password(&mut self, _password: &str) -> bool {
            true
        }

        fn count_pages(&self) -> Result<u32> {
            Ok(5)
        }

        fn load_outline(&self) -> Result<Vec<OutlineEntry>> {
            Ok(Vec::new())
        }

        fn resolve_link(&self, uri: &str) -> Result<Option<ResolvedLink>> {
            if uri == "#fit" {
                return Ok(Some(ResolvedLink {
                    page: 0,
                    x: f32::NAN,
                    y: f32::NAN,
                }));
            }
            Ok(uri
                .strip_prefix("#page=")
                .and_then(|p| p.parse::<u32>().ok())
                .map(|p| ResolvedLink {
                    page: p - 1,
                    x: 10.0,
                    y: 20.0,
                }))
        }

        fn page_bounds(&self, _index: u32) -> Result<Rect> {
            Ok(Rect::default())
        }
    }

    fn classify(uri: Option<&str>) -> Option<Link> {
        link_from_uri(&StaticEngine, uri, Rectangle::default()).unwrap()
    }

    #[test]
    fn test_no_target_is_none_link() {
        let link = classify(None).unwrap();
        assert_eq!(link.link_type, LinkType::None);
        assert_eq!(link.target, LinkTarget::default());
    }

    #[test]
    fn test_external_links() {
        let link = classify(Some("https://example.org/a")).unwrap();
        assert_eq!(link.link_type, LinkType::Uri);
        assert_eq!(link.target.value.as_deref(), Some("https://example.org/a"));

        let link = classify(Some("file:///docs/other.pdf#page=2")).unwrap();
        assert_eq!(link.link_type, LinkType::GotoRemote);
        assert_eq!(link.target.value.as_deref(), Some("file:///docs/other.pdf#page=2"));

        let link = classify(Some("mailto:a@example.org")).unwrap();
        assert_eq!(link.link_type, LinkType::Uri);
    }

    #[test]
    fn test_internal_destination() {
        let link = classify(Some("#page=3")).unwrap();
        assert_eq!(link.link_type, LinkType::GotoDest);
        assert_eq!(link.target.destination_type, DestinationType::Xyz);
        assert_eq!(link.target.page_number, 2);
        assert_eq!(link.target.left, 10.0);
        assert_eq!(link.target.top, 20.0);
        assert_eq!(link.target.zoom, 0.0);
        assert_eq!(link.target.right, -1.0);
    }

    #[test]
    fn test_missing_coordinates_stay_unset() {
        let link = classify(Some("#fit")).unwrap();
        assert_eq!(link.target.page_number, 0);
        assert_eq!(link.target.left, -1.0);
        assert_eq!(link.target.top, -1.0);
    }

    #[test]
    fn test_unresolvable_is_dropped() {
        assert!(classify(Some("#nameddest=nowhere")).is_none());
        assert!(classify(Some("")).is_none());
    }

    #[test]
    fn test_page_links_requires_session() {
        let document = Document::new("closed.pdf");
        let result = page_links_get(&document, &Page::new(0));
        assert!(matches!(result, Err(Error::NotOpen)));
    }
}
