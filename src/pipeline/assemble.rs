//! Output PDF assembly.
//!
//! Each encoded page becomes a single full-bleed image: a DCTDecode image
//! XObject scaled by the content stream to cover a MediaBox matching the
//! source page's physical size. Pages are appended in render order, so the
//! output preserves the source's page order and per-page dimensions.

use crate::error::InvertError;
use crate::pipeline::encode::EncodedPage;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, ObjectId, Stream};
use tracing::debug;

/// Incrementally builds the output document, one page at a time.
///
/// The page tree root id is reserved up front so page dictionaries can
/// reference their parent before the tree itself is written in
/// [`finish`](DocumentAssembler::finish).
pub struct DocumentAssembler {
    doc: Document,
    pages_id: ObjectId,
    kids: Vec<Object>,
}

impl DocumentAssembler {
    pub fn new() -> Self {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        Self {
            doc,
            pages_id,
            kids: Vec::new(),
        }
    }

    /// Number of pages appended so far.
    pub fn page_count(&self) -> usize {
        self.kids.len()
    }

    /// Append one page whose sole content is the encoded image, drawn at
    /// the page's physical size.
    pub fn append_page(&mut self, page: &EncodedPage) -> Result<(), InvertError> {
        let image_id = self.doc.add_object(Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => page.pixel_width as i64,
                "Height" => page.pixel_height as i64,
                "ColorSpace" => "DeviceRGB",
                "BitsPerComponent" => 8,
                "Filter" => "DCTDecode",
            },
            page.jpeg.clone(),
        ));

        // q / cm scales the unit image square up to the full page; Do paints it.
        let content = Content {
            operations: vec![
                Operation::new("q", vec![]),
                Operation::new(
                    "cm",
                    vec![
                        page.width_pt.into(),
                        0.into(),
                        0.into(),
                        page.height_pt.into(),
                        0.into(),
                        0.into(),
                    ],
                ),
                Operation::new("Do", vec![Object::Name(b"Im0".to_vec())]),
                Operation::new("Q", vec![]),
            ],
        };
        let content_bytes = content.encode().map_err(|e| InvertError::Internal(format!(
            "content stream encoding failed: {e}"
        )))?;
        let content_id = self
            .doc
            .add_object(Stream::new(dictionary! {}, content_bytes));

        let resources = dictionary! {
            "XObject" => dictionary! { "Im0" => image_id },
        };
        let page_id = self.doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => self.pages_id,
            "MediaBox" => vec![
                0.into(),
                0.into(),
                page.width_pt.into(),
                page.height_pt.into(),
            ],
            "Contents" => content_id,
            "Resources" => resources,
        });
        self.kids.push(page_id.into());

        debug!(
            "Assembled page {} ({:.1} x {:.1} pt, {} byte image)",
            self.kids.len(),
            page.width_pt,
            page.height_pt,
            page.jpeg.len()
        );
        Ok(())
    }

    /// Write the page tree and catalog, then serialize the document.
    ///
    /// Fails with [`InvertError::EmptyDocument`] if no page was appended;
    /// a zero-page PDF is not useful output.
    pub fn finish(mut self, source_name: &str) -> Result<Vec<u8>, InvertError> {
        if self.kids.is_empty() {
            return Err(InvertError::EmptyDocument {
                name: source_name.to_string(),
            });
        }

        let count = self.kids.len() as i64;
        self.doc.objects.insert(
            self.pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => self.kids,
                "Count" => count,
            }),
        );

        let catalog_id = self.doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => self.pages_id,
        });
        self.doc.trailer.set("Root", catalog_id);
        // Deflates text streams; DCTDecode image streams are left alone.
        self.doc.compress();

        let mut out = Vec::new();
        self.doc
            .save_to(&mut out)
            .map_err(|e| InvertError::Internal(format!("PDF serialization failed: {e}")))?;
        Ok(out)
    }
}

impl Default for DocumentAssembler {
    fn default() -> Self {
        Self::new()
    }
}
