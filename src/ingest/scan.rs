//! Page images of scanned PDFs.
//!
//! Scanned PDFs embed one image XObject per page. [`EmbeddedImageSource`]
//! walks each page's resources with lopdf and keeps its largest image,
//! which is the page scan.

use lopdf::{Dictionary, Document, Object, ObjectId};
use tracing::debug;

use super::ExtractionError;

/// The raw bytes of one page image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageImage {
    /// 1-based page number.
    pub page: usize,
    /// Image stream content. For `DCTDecode` this is a JPEG file.
    pub bytes: Vec<u8>,
    /// Name of the last PDF filter applied to the stream, if any.
    pub filter: Option<String>,
}

/// Produces page images for recognition.
pub trait PageImageSource: Send + Sync {
    /// Returns one image per page that has one, in page order.
    fn page_images(&self, pdf_bytes: &[u8]) -> Result<Vec<PageImage>, ExtractionError>;
}

/// [`PageImageSource`] that pulls embedded images out of the PDF with lopdf.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmbeddedImageSource;

impl PageImageSource for EmbeddedImageSource {
    fn page_images(&self, pdf_bytes: &[u8]) -> Result<Vec<PageImage>, ExtractionError> {
        let doc = Document::load_mem(pdf_bytes)
            .map_err(|e| ExtractionError::PdfParsing(format!("Failed to parse PDF: {e}")))?;

        let mut images = Vec::new();
        for (index, page_id) in doc.page_iter().enumerate() {
            match largest_page_image(&doc, page_id) {
                Some((bytes, filter)) => {
                    debug!(page = index + 1, size = bytes.len(), "Extracted page image");
                    images.push(PageImage {
                        page: index + 1,
                        bytes,
                        filter,
                    });
                }
                None => debug!(page = index + 1, "Page has no embedded image"),
            }
        }

        Ok(images)
    }
}

/// Walks page → /Resources → /XObject and returns the largest image stream.
fn largest_page_image(doc: &Document, page_id: ObjectId) -> Option<(Vec<u8>, Option<String>)> {
    let page = doc.get_object(page_id).ok()?.as_dict().ok()?;
    let resources = resolve_dict_entry(doc, page, b"Resources")?;
    let xobjects = resolve_dict_entry(doc, resources, b"XObject")?;

    let mut largest: Option<(Vec<u8>, Option<String>)> = None;
    for (_name, entry) in xobjects.iter() {
        let Object::Stream(stream) = resolve_object(doc, entry) else {
            continue;
        };
        let is_image = stream
            .dict
            .get(b"Subtype")
            .is_ok_and(|s| matches!(s, Object::Name(n) if n == b"Image"));
        if !is_image {
            continue;
        }

        let filter = last_filter_name(&stream.dict);
        // DCT streams are kept encoded: the content is already a JPEG file.
        let bytes = if filter.as_deref() == Some("DCTDecode") {
            stream.content.clone()
        } else {
            stream
                .decompressed_content()
                .unwrap_or_else(|_| stream.content.clone())
        };

        if largest.as_ref().is_none_or(|(prev, _)| bytes.len() > prev.len()) {
            largest = Some((bytes, filter));
        }
    }

    largest
}

fn last_filter_name(dict: &Dictionary) -> Option<String> {
    match dict.get(b"Filter").ok()? {
        Object::Name(n) => Some(String::from_utf8_lossy(n).into_owned()),
        Object::Array(items) => items.iter().rev().find_map(|o| match o {
            Object::Name(n) => Some(String::from_utf8_lossy(n).into_owned()),
            _ => None,
        }),
        _ => None,
    }
}

fn resolve_object<'a>(doc: &'a Document, obj: &'a Object) -> &'a Object {
    match obj {
        Object::Reference(id) => doc.get_object(*id).unwrap_or(obj),
        other => other,
    }
}

fn resolve_dict_entry<'a>(doc: &'a Document, dict: &'a Dictionary, key: &[u8]) -> Option<&'a Dictionary> {
    resolve_object(doc, dict.get(key).ok()?).as_dict().ok()
}
