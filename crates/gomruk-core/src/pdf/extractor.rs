//! PDF page text and raster extraction using lopdf and pdf-extract.

use std::cell::OnceCell;

use image::{DynamicImage, GenericImageView, ImageBuffer, Rgba};
use lopdf::{Document, Object, ObjectId};
use tracing::{debug, trace, warn};

use super::{PageSource, Result};
use crate::error::PdfError;

/// A loaded PDF document.
///
/// The document is immutable once loaded. Per-page native text is produced
/// lazily on first access and cached for the lifetime of the document.
pub struct PdfDocument {
    document: Document,
    raw_data: Vec<u8>,
    page_ids: Vec<ObjectId>,
    page_texts: OnceCell<Vec<String>>,
}

impl PdfDocument {
    /// Load a PDF from raw bytes.
    pub fn load(data: &[u8]) -> Result<Self> {
        let mut document = Document::load_mem(data).map_err(|e| PdfError::Parse(e.to_string()))?;

        // PDFs encrypted with an empty user password are still readable
        let raw_data = if document.is_encrypted() {
            if document.decrypt("").is_err() {
                return Err(PdfError::Encrypted);
            }
            debug!("Decrypted PDF with empty password");

            let mut decrypted = Vec::new();
            document
                .save_to(&mut decrypted)
                .map_err(|e| PdfError::Parse(format!("failed to save decrypted PDF: {}", e)))?;
            decrypted
        } else {
            data.to_vec()
        };

        let page_ids: Vec<ObjectId> = document.get_pages().into_values().collect();
        if page_ids.is_empty() {
            return Err(PdfError::NoPages);
        }

        debug!("Loaded PDF with {} pages", page_ids.len());

        Ok(Self {
            document,
            raw_data,
            page_ids,
            page_texts: OnceCell::new(),
        })
    }

    fn page_id(&self, page: u32) -> Result<ObjectId> {
        page.checked_sub(1)
            .and_then(|idx| self.page_ids.get(idx as usize))
            .copied()
            .ok_or(PdfError::InvalidPage(page))
    }

    /// Split the text layer per page with pdf-extract, which handles font
    /// encodings better than lopdf. Falls back to lopdf page by page.
    fn all_page_texts(&self) -> &[String] {
        self.page_texts.get_or_init(|| {
            match pdf_extract::extract_text_from_mem_by_pages(&self.raw_data) {
                Ok(pages) if pages.len() == self.page_ids.len() => pages,
                Ok(pages) => {
                    warn!(
                        "pdf-extract returned {} pages for a {}-page document, using lopdf",
                        pages.len(),
                        self.page_ids.len()
                    );
                    self.lopdf_page_texts()
                }
                Err(e) => {
                    warn!("pdf-extract failed: {}, using lopdf", e);
                    self.lopdf_page_texts()
                }
            }
        })
    }

    fn lopdf_page_texts(&self) -> Vec<String> {
        (1..=self.page_ids.len() as u32)
            .map(|page| {
                self.document.extract_text(&[page]).unwrap_or_else(|e| {
                    debug!("lopdf could not extract text from page {}: {}", page, e);
                    String::new()
                })
            })
            .collect()
    }

    /// Largest embedded image on a page.
    fn page_image(&self, page_id: ObjectId) -> Option<DynamicImage> {
        let resources = inherited_dictionary(&self.document, page_id, b"Resources")?;
        let xobjects = resources.get(b"XObject").ok()?;
        let (_, Object::Dictionary(xobj_dict)) = self.document.dereference(xobjects).ok()? else {
            return None;
        };

        xobj_dict
            .iter()
            .filter_map(|(_name, obj_ref)| {
                let (_, obj) = self.document.dereference(obj_ref).ok()?;
                self.try_extract_image_from_object(obj)
            })
            .max_by_key(|img| {
                let (w, h) = img.dimensions();
                u64::from(w) * u64::from(h)
            })
    }

    /// Page width in points, from the (possibly inherited) MediaBox.
    fn page_width(&self, page_id: ObjectId) -> Option<f32> {
        let media_box = inherited_attribute(&self.document, page_id, b"MediaBox")?;
        let values: Vec<f32> = media_box
            .as_array()
            .ok()?
            .iter()
            .filter_map(object_to_f32)
            .collect();

        match values.as_slice() {
            [x0, _, x1, _] => Some((x1 - x0).abs()),
            _ => None,
        }
    }

    fn try_extract_image_from_object(&self, obj: &Object) -> Option<DynamicImage> {
        let Object::Stream(stream) = obj else {
            return None;
        };
        let dict = &stream.dict;

        if dict.get(b"Subtype").ok()?.as_name().ok()? != b"Image" {
            return None;
        }

        let width = dict.get(b"Width").ok()?.as_i64().ok()? as u32;
        let height = dict.get(b"Height").ok()?.as_i64().ok()? as u32;

        trace!("Found image object: {}x{}", width, height);

        if let Ok(filter) = dict.get(b"Filter") {
            let filter_name = match filter {
                Object::Name(name) => Some(name.as_slice()),
                Object::Array(arr) => arr.first().and_then(|o| o.as_name().ok()),
                _ => None,
            };

            match filter_name {
                Some(b"DCTDecode") => {
                    // JPEG data, decode from the raw (still compressed) stream
                    return image::load_from_memory_with_format(
                        &stream.content,
                        image::ImageFormat::Jpeg,
                    )
                    .ok();
                }
                Some(b"JPXDecode") | Some(b"CCITTFaxDecode") | Some(b"JBIG2Decode") => {
                    trace!("Unsupported image filter {:?}", filter_name.map(String::from_utf8_lossy));
                    return None;
                }
                _ => {}
            }
        }

        let data = stream
            .decompressed_content()
            .unwrap_or_else(|_| stream.content.clone());

        let color_space = dict
            .get(b"ColorSpace")
            .ok()
            .and_then(|o| match o {
                Object::Name(name) => Some(name.as_slice()),
                Object::Array(arr) => arr.first().and_then(|o| o.as_name().ok()),
                Object::Reference(r) => self.document.get_object(*r).ok().and_then(|o| o.as_name().ok()),
                _ => None,
            })
            .unwrap_or(b"DeviceRGB");

        let bits = dict
            .get(b"BitsPerComponent")
            .ok()
            .and_then(|o| o.as_i64().ok())
            .unwrap_or(8);

        if bits != 8 {
            trace!("Unsupported bits per component: {}", bits);
            return None;
        }

        image_from_raw(&data, width, height, color_space)
    }
}

impl PageSource for PdfDocument {
    fn page_count(&self) -> u32 {
        self.page_ids.len() as u32
    }

    fn page_text(&self, page: u32) -> Result<String> {
        self.page_id(page)?;
        Ok(self
            .all_page_texts()
            .get((page - 1) as usize)
            .cloned()
            .unwrap_or_default())
    }

    fn render_page(&self, page: u32, scale: f32) -> Result<DynamicImage> {
        let page_id = self.page_id(page)?;

        // Scanned pages carry one full-page image in their own resources
        let image = self
            .page_image(page_id)
            .ok_or_else(|| PdfError::Render(format!("no image found for page {}", page)))?;

        let (width, height) = image.dimensions();
        let target_width = match self.page_width(page_id) {
            Some(points) => (points * scale).round() as u32,
            None => (width as f32 * scale).round() as u32,
        };

        if target_width == 0 || target_width == width {
            return Ok(image);
        }

        let target_height = ((height as f64 * target_width as f64) / width as f64).round() as u32;
        debug!(
            "Rendering page {} at {}x: {}x{} -> {}x{}",
            page, scale, width, height, target_width, target_height
        );

        Ok(image.resize_exact(
            target_width,
            target_height.max(1),
            image::imageops::FilterType::Lanczos3,
        ))
    }
}

/// Look up a page attribute, walking up the page tree for inherited values.
fn inherited_attribute<'a>(doc: &'a Document, node_id: ObjectId, key: &[u8]) -> Option<&'a Object> {
    let Object::Dictionary(dict) = doc.get_object(node_id).ok()? else {
        return None;
    };

    if let Ok(value) = dict.get(key) {
        return doc.dereference(value).ok().map(|(_, obj)| obj);
    }

    match dict.get(b"Parent") {
        Ok(Object::Reference(parent_id)) => inherited_attribute(doc, *parent_id, key),
        _ => None,
    }
}

fn inherited_dictionary<'a>(doc: &'a Document, node_id: ObjectId, key: &[u8]) -> Option<&'a lopdf::Dictionary> {
    match inherited_attribute(doc, node_id, key)? {
        Object::Dictionary(dict) => Some(dict),
        _ => None,
    }
}

fn object_to_f32(obj: &Object) -> Option<f32> {
    match obj {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(r) => Some(*r as f32),
        _ => None,
    }
}

fn image_from_raw(data: &[u8], width: u32, height: u32, color_space: &[u8]) -> Option<DynamicImage> {
    let pixels = (width as usize) * (height as usize);

    let rgba: Vec<u8> = match color_space {
        b"DeviceRGB" | b"RGB" if data.len() >= pixels * 3 => data[..pixels * 3]
            .chunks_exact(3)
            .flat_map(|c| [c[0], c[1], c[2], 255])
            .collect(),
        b"DeviceGray" | b"G" if data.len() >= pixels => data[..pixels]
            .iter()
            .flat_map(|&g| [g, g, g, 255])
            .collect(),
        _ => {
            trace!(
                "Could not decode image: colorspace={:?}, data_len={}, pixels={}",
                String::from_utf8_lossy(color_space),
                data.len(),
                pixels
            );
            return None;
        }
    };

    ImageBuffer::<Rgba<u8>, _>::from_raw(width, height, rgba).map(DynamicImage::ImageRgba8)
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::content::{Content, Operation};
    use lopdf::{Dictionary, Stream, dictionary};

    /// One page of a generated test PDF.
    struct TestPage {
        text: Option<&'static str>,
        images: Vec<(u32, u32)>,
    }

    /// Build a PDF whose pages are 100x50 points, each with optional
    /// Courier text and uncompressed gray images in its own resources.
    fn build_pdf(pages: &[TestPage]) -> Vec<u8> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Courier",
        });

        let mut kids: Vec<Object> = Vec::new();
        for page in pages {
            let mut xobjects = Dictionary::new();
            for (i, &(width, height)) in page.images.iter().enumerate() {
                let image = Stream::new(
                    dictionary! {
                        "Type" => "XObject",
                        "Subtype" => "Image",
                        "Width" => width as i64,
                        "Height" => height as i64,
                        "ColorSpace" => "DeviceGray",
                        "BitsPerComponent" => 8,
                    },
                    vec![200u8; (width * height) as usize],
                );
                xobjects.set(format!("Im{}", i), doc.add_object(image));
            }

            let operations = match page.text {
                Some(text) => vec![
                    Operation::new("BT", vec![]),
                    Operation::new("Tf", vec!["F1".into(), 12.into()]),
                    Operation::new("Td", vec![10.into(), 20.into()]),
                    Operation::new("Tj", vec![Object::string_literal(text)]),
                    Operation::new("ET", vec![]),
                ],
                None => Vec::new(),
            };
            let content = Content { operations };
            let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));

            let media_box: Vec<Object> = vec![0.into(), 0.into(), 100.into(), 50.into()];
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
                "MediaBox" => media_box,
                "Resources" => dictionary! {
                    "Font" => dictionary! { "F1" => font_id },
                    "XObject" => xobjects,
                },
            });
            kids.push(page_id.into());
        }

        let count = kids.len() as i64;
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut bytes = Vec::new();
        doc.save_to(&mut bytes).unwrap();
        bytes
    }

    #[test]
    fn test_page_text_is_split_per_page() {
        let data = build_pdf(&[
            TestPage { text: Some("FIRSTPAGE"), images: vec![] },
            TestPage { text: Some("SECONDPAGE"), images: vec![] },
        ]);
        let pdf = PdfDocument::load(&data).unwrap();

        assert_eq!(pdf.page_count(), 2);
        let first = pdf.page_text(1).unwrap();
        let second = pdf.page_text(2).unwrap();
        assert!(first.contains("FIRSTPAGE"));
        assert!(!first.contains("SECONDPAGE"));
        assert!(second.contains("SECONDPAGE"));
        assert!(matches!(pdf.page_text(3), Err(PdfError::InvalidPage(3))));
        assert!(matches!(pdf.page_text(0), Err(PdfError::InvalidPage(0))));
    }

    #[test]
    fn test_render_uses_largest_page_image_at_scale() {
        let data = build_pdf(&[TestPage {
            text: None,
            images: vec![(10, 5), (40, 20)],
        }]);
        let pdf = PdfDocument::load(&data).unwrap();

        // 100pt page at 2x
        let raster = pdf.render_page(1, 2.0).unwrap();
        assert_eq!(raster.dimensions(), (200, 100));

        // 100pt * 0.4 matches the image width, so it is returned unscaled
        let raster = pdf.render_page(1, 0.4).unwrap();
        assert_eq!(raster.dimensions(), (40, 20));
        assert_eq!(raster.to_rgba8().get_pixel(0, 0).0, [200, 200, 200, 255]);
    }

    #[test]
    fn test_render_never_borrows_another_pages_image() {
        let data = build_pdf(&[
            TestPage { text: None, images: vec![(40, 20), (20, 10)] },
            TestPage { text: Some("SECONDPAGE"), images: vec![] },
        ]);
        let pdf = PdfDocument::load(&data).unwrap();

        assert!(pdf.render_page(1, 1.0).is_ok());
        assert!(matches!(pdf.render_page(2, 1.0), Err(PdfError::Render(_))));
    }

    #[test]
    fn test_load_rejects_document_without_pages() {
        let data = build_pdf(&[]);
        assert!(matches!(PdfDocument::load(&data), Err(PdfError::NoPages)));
    }

    #[test]
    fn test_load_rejects_password_protected_pdf() {
        let data = build_pdf(&[TestPage { text: Some("SECRET"), images: vec![] }]);
        let mut doc = Document::load_mem(&data).unwrap();
        let encrypt_id = doc.add_object(dictionary! {
            "Filter" => "Standard",
            "V" => 1,
            "R" => 2,
            "O" => Object::string_literal(vec![7u8; 32]),
            "U" => Object::string_literal(vec![9u8; 32]),
            "P" => -4,
        });
        doc.trailer.set("Encrypt", encrypt_id);
        doc.trailer.set(
            "ID",
            vec![
                Object::string_literal(vec![1u8; 16]),
                Object::string_literal(vec![1u8; 16]),
            ],
        );
        let mut bytes = Vec::new();
        doc.save_to(&mut bytes).unwrap();

        assert!(matches!(PdfDocument::load(&bytes), Err(PdfError::Encrypted)));
    }

    #[test]
    fn test_load_rejects_garbage() {
        let result = PdfDocument::load(b"definitely not a pdf");
        assert!(matches!(result, Err(PdfError::Parse(_))));
    }

    #[test]
    fn test_gray_raw_image() {
        let data = vec![0u8, 128, 255, 64];
        let img = image_from_raw(&data, 2, 2, b"DeviceGray").unwrap();
        assert_eq!(img.dimensions(), (2, 2));
        assert_eq!(img.to_rgba8().get_pixel(1, 0).0, [128, 128, 128, 255]);
    }

    #[test]
    fn test_short_raw_data_is_rejected() {
        assert!(image_from_raw(&[1, 2, 3], 2, 2, b"DeviceRGB").is_none());
    }
}
