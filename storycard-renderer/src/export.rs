//! Card export to flat images.
//!
//! Renders a [`CardSnapshot`] to an SVG intermediate representation and
//! rasterizes it with the resvg/tiny-skia pipeline into PNG or JPEG.

use std::fmt::Write;
use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use image::ImageEncoder;
use serde::{Deserialize, Serialize};
use storycard_core::{
    Background, CaptureError, CardSnapshot, ImageFormat, RasterImage, Rasterizer,
    SnapshotElement, Vec2,
};

use crate::error::{RenderError, RenderResult};

/// Line height as a multiple of the font size.
const LINE_HEIGHT: f32 = 1.2;

/// Configuration for card export.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Output width in pixels (default: canvas width × pixel ratio).
    pub width: Option<u32>,
    /// Output height in pixels (default: canvas height × pixel ratio).
    pub height: Option<u32>,
    /// Device pixel ratio applied to the canvas size.
    pub pixel_ratio: f32,
    /// Output encoding.
    pub format: ImageFormat,
    /// JPEG quality 1-100.
    pub jpeg_quality: u8,
    /// Fill behind the background, and the JPEG matte, as RGBA bytes.
    pub matte: [u8; 4],
    /// Load system fonts for text rendering.
    pub load_system_fonts: bool,
    /// Base directory for relative background image paths.
    pub resources_dir: Option<PathBuf>,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            width: None,
            height: None,
            pixel_ratio: 3.0,
            format: ImageFormat::Png,
            jpeg_quality: 90,
            matte: [0, 0, 0, 255],
            load_system_fonts: true,
            resources_dir: None,
        }
    }
}

/// Exports card snapshots to images. Cheap to clone.
#[derive(Clone)]
pub struct CardExporter {
    config: ExportConfig,
    fontdb: Arc<usvg::fontdb::Database>,
}

impl std::fmt::Debug for CardExporter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CardExporter")
            .field("config", &self.config)
            .field("fonts", &self.fontdb.len())
            .finish()
    }
}

impl CardExporter {
    /// Create a new exporter with the given configuration.
    #[must_use]
    pub fn new(config: ExportConfig) -> Self {
        let mut fontdb = usvg::fontdb::Database::new();
        if config.load_system_fonts {
            fontdb.load_system_fonts();
            tracing::debug!("Loaded {} font faces", fontdb.len());
        }
        Self {
            config,
            fontdb: Arc::new(fontdb),
        }
    }

    /// The exporter configuration.
    #[must_use]
    pub fn config(&self) -> &ExportConfig {
        &self.config
    }

    /// Export a snapshot in the configured format.
    ///
    /// # Errors
    ///
    /// Returns an error if the card cannot be rendered or encoded.
    pub fn export(&self, snapshot: &CardSnapshot) -> RenderResult<RasterImage> {
        let (width, height) = self.output_dimensions(snapshot);
        let bytes = match self.config.format {
            ImageFormat::Png => self.render_to_png(snapshot)?,
            ImageFormat::Jpeg => self.render_to_jpeg(snapshot)?,
        };
        Ok(RasterImage {
            width,
            height,
            format: self.config.format,
            bytes,
        })
    }

    /// Export the card to PNG bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if rendering or encoding fails.
    pub fn render_to_png(&self, snapshot: &CardSnapshot) -> RenderResult<Vec<u8>> {
        let pixmap = self.rasterize_svg(&self.render_to_svg(snapshot))?;
        pixmap
            .encode_png()
            .map_err(|e| RenderError::Export(format!("PNG encoding failed: {e}")))
    }

    /// Export the card to JPEG bytes, flattened onto the matte color.
    ///
    /// # Errors
    ///
    /// Returns an error if rendering or encoding fails.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn render_to_jpeg(&self, snapshot: &CardSnapshot) -> RenderResult<Vec<u8>> {
        let pixmap = self.rasterize_svg(&self.render_to_svg(snapshot))?;

        let (width, height) = (pixmap.width(), pixmap.height());
        let matte = &self.config.matte;
        let mut rgb_data = Vec::with_capacity((width * height * 3) as usize);
        // tiny-skia pixels are premultiplied.
        for pixel in pixmap.data().chunks_exact(4) {
            let inv = 1.0 - f32::from(pixel[3]) / 255.0;
            for (&color, &fill) in pixel[..3].iter().zip(matte.iter()) {
                let value = f32::from(fill).mul_add(inv, f32::from(color));
                rgb_data.push(value.round().min(255.0) as u8);
            }
        }

        let mut buf = std::io::Cursor::new(Vec::new());
        let encoder =
            image::codecs::jpeg::JpegEncoder::new_with_quality(&mut buf, self.config.jpeg_quality);
        encoder
            .write_image(&rgb_data, width, height, image::ColorType::Rgb8.into())
            .map_err(|e| RenderError::Export(format!("JPEG encoding failed: {e}")))?;

        Ok(buf.into_inner())
    }

    /// Render the card to an SVG string.
    #[must_use]
    pub fn render_to_svg(&self, snapshot: &CardSnapshot) -> String {
        let (out_w, out_h) = self.output_dimensions(snapshot);
        let (view_w, view_h) = (snapshot.width, snapshot.height);

        let mut svg = String::with_capacity(4096);
        let _ = write!(
            svg,
            "<svg xmlns=\"http://www.w3.org/2000/svg\" xmlns:xlink=\"http://www.w3.org/1999/xlink\" width=\"{out_w}\" height=\"{out_h}\" viewBox=\"0 0 {view_w} {view_h}\">",
        );

        let m = &self.config.matte;
        let _ = write!(
            svg,
            "<rect width=\"100%\" height=\"100%\" fill=\"rgb({},{},{})\"/>",
            m[0], m[1], m[2],
        );
        render_background_svg(&mut svg, &snapshot.background, view_w, view_h);

        let center = snapshot.center();
        for element in &snapshot.elements {
            render_text_svg(&mut svg, element, center);
        }

        svg.push_str("</svg>");
        svg
    }

    /// Get output dimensions (width, height) in pixels.
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    fn output_dimensions(&self, snapshot: &CardSnapshot) -> (u32, u32) {
        let ratio = if self.config.pixel_ratio > 0.0 {
            self.config.pixel_ratio
        } else {
            1.0
        };
        let out_w = self
            .config
            .width
            .unwrap_or_else(|| (snapshot.width.max(1.0) * ratio).round() as u32);
        let out_h = self
            .config
            .height
            .unwrap_or_else(|| (snapshot.height.max(1.0) * ratio).round() as u32);
        (out_w, out_h)
    }

    /// Rasterize an SVG string to a tiny-skia Pixmap.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn rasterize_svg(&self, svg_string: &str) -> RenderResult<tiny_skia::Pixmap> {
        let mut opt = usvg::Options::default();
        opt.fontdb = Arc::clone(&self.fontdb);
        opt.resources_dir.clone_from(&self.config.resources_dir);

        let tree = usvg::Tree::from_str(svg_string, &opt)
            .map_err(|e| RenderError::Svg(e.to_string()))?;

        let width = tree.size().width().round() as u32;
        let height = tree.size().height().round() as u32;
        let mut pixmap = tiny_skia::Pixmap::new(width, height)
            .ok_or(RenderError::InvalidSize { width, height })?;

        resvg::render(&tree, tiny_skia::Transform::default(), &mut pixmap.as_mut());

        Ok(pixmap)
    }
}

#[async_trait]
impl Rasterizer for CardExporter {
    async fn rasterize(&self, snapshot: &CardSnapshot) -> Result<RasterImage, CaptureError> {
        let exporter = self.clone();
        let snapshot = snapshot.clone();
        tokio::task::spawn_blocking(move || exporter.export(&snapshot))
            .await
            .map_err(|e| CaptureError::Rasterize(format!("render task failed: {e}")))?
            .map_err(CaptureError::from)
    }
}

/// Encode a captured image as a `data:` URI for share sheets.
#[must_use]
pub fn data_uri(image: &RasterImage) -> String {
    format!(
        "data:{};base64,{}",
        image.format.mime_type(),
        BASE64.encode(&image.bytes)
    )
}

/// Render the card background.
fn render_background_svg(svg: &mut String, background: &Background, width: f32, height: f32) {
    match background {
        Background::Gradient { from, to } => {
            let _ = write!(
                svg,
                "<defs><linearGradient id=\"bg\" x1=\"0\" y1=\"0\" x2=\"0\" y2=\"1\"><stop offset=\"0\" stop-color=\"{}\"/><stop offset=\"1\" stop-color=\"{}\"/></linearGradient></defs><rect width=\"{width}\" height=\"{height}\" fill=\"url(#bg)\"/>",
                escape_xml(from),
                escape_xml(to),
            );
        }
        Background::Image { src } => {
            let _ = write!(
                svg,
                "<image x=\"0\" y=\"0\" width=\"{width}\" height=\"{height}\" preserveAspectRatio=\"xMidYMid slice\" xlink:href=\"{}\"/>",
                escape_xml(src),
            );
        }
    }
}

/// Render one element as centered text, one `tspan` per line.
#[allow(clippy::cast_precision_loss)]
fn render_text_svg(svg: &mut String, element: &SnapshotElement, center: Vec2) {
    let lines: Vec<&str> = element.text.lines().collect();
    if lines.is_empty() {
        return;
    }

    let x = center.x + element.position.x;
    let y = center.y + element.position.y;
    let size = element.scaled_font_size();
    let line_height = size * LINE_HEIGHT;
    let weight = if element.is_headline() { 700 } else { 400 };

    let _ = write!(
        svg,
        "<text x=\"{x}\" y=\"{y}\" font-size=\"{size}\" font-weight=\"{weight}\" fill=\"{}\" text-anchor=\"middle\" dominant-baseline=\"central\" font-family=\"sans-serif\">",
        escape_xml(&element.color),
    );
    let first_dy = -((lines.len() - 1) as f32) / 2.0 * line_height;
    for (idx, line) in lines.iter().enumerate() {
        let dy = if idx == 0 { first_dy } else { line_height };
        let _ = write!(
            svg,
            "<tspan x=\"{x}\" dy=\"{dy}\">{}</tspan>",
            escape_xml(line)
        );
    }
    svg.push_str("</text>");
}

/// Escape special XML characters.
fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
