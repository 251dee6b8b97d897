//! Rasterization boundary
//!
//! The host renders pixels; this module asks it for a surface, crops the
//! surface to the selection and encodes the result as PNG.

use async_trait::async_trait;
use bytes::Bytes;
use image::imageops::{self, FilterType};
use image::{DynamicImage, ImageFormat, RgbaImage};
use std::io::Cursor;
use tracing::{debug, trace};

use super::geometry::CropRectangle;
use crate::error::{CaptureError, Result};
use crate::types::ImageArtifact;

/// Pixels rendered by the host
pub type PixelSurface = RgbaImage;

/// What the host should render
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RenderTarget {
    /// The whole document body
    Document,
    /// A single element, looked up by id
    Element(String),
}

/// Visibility of the selector's own overlay elements
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OverlayVisibility {
    /// Crosshair following the pointer
    pub crosshair: bool,
    /// Dimmed backdrop around the selection
    pub backdrop: bool,
}

impl OverlayVisibility {
    /// Both overlays shown
    pub fn shown() -> Self {
        Self {
            crosshair: true,
            backdrop: true,
        }
    }

    /// Both overlays hidden
    pub fn hidden() -> Self {
        Self {
            crosshair: false,
            backdrop: false,
        }
    }

    pub fn any_visible(&self) -> bool {
        self.crosshair || self.backdrop
    }
}

/// A single render call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderRequest {
    pub target: RenderTarget,
    /// Overlays the host must leave out of the rendered pixels
    pub overlays: OverlayVisibility,
}

/// Host-side renderer that turns a target into pixels
#[async_trait]
pub trait CaptureRasterizer: Send + Sync {
    /// Render `request.target` to a full-size surface
    async fn render(&self, request: &RenderRequest) -> Result<PixelSurface>;
}

/// Crop `surface` to the selection and encode as PNG
///
/// The source region is `crop` grown by `padding` pixels on its right and
/// bottom edges, clamped to the surface. It is scaled into an image of
/// exactly `crop.width` x `crop.height`, so the artifact always matches
/// the selection. An empty selection, or one entirely outside the
/// surface, produces an empty artifact instead of an error.
pub fn crop_surface(
    surface: &PixelSurface,
    crop: &CropRectangle,
    padding: u32,
) -> Result<ImageArtifact> {
    if crop.is_empty() {
        return Ok(ImageArtifact::empty());
    }

    let (surface_width, surface_height) = surface.dimensions();

    let x0 = (crop.left as i64).max(0);
    let y0 = (crop.top as i64).max(0);
    let x1 = (crop.right() + padding as i64).min(surface_width as i64);
    let y1 = (crop.bottom() + padding as i64).min(surface_height as i64);

    if x1 <= x0 || y1 <= y0 {
        debug!(
            "Selection {} lies outside the {}x{} surface",
            crop, surface_width, surface_height
        );
        return Ok(ImageArtifact::empty());
    }

    let (x, y) = (x0 as u32, y0 as u32);
    let (width, height) = ((x1 - x0) as u32, (y1 - y0) as u32);

    let source = imageops::crop_imm(surface, x, y, width, height);
    let cropped = if (width, height) == (crop.width, crop.height) {
        source.to_image()
    } else {
        trace!(
            "Scaling {}x{} source into {}x{} selection",
            width, height, crop.width, crop.height
        );
        imageops::resize(&*source, crop.width, crop.height, FilterType::Triangle)
    };
    encode_png(cropped)
}

/// Encode a whole surface as PNG
pub fn encode_png(surface: PixelSurface) -> Result<ImageArtifact> {
    let (width, height) = surface.dimensions();
    if width == 0 || height == 0 {
        return Ok(ImageArtifact::empty());
    }

    let mut png: Vec<u8> = Vec::new();
    DynamicImage::ImageRgba8(surface)
        .write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
        .map_err(|e| CaptureError::rasterize(format!("PNG encoding failed: {}", e)))?;

    Ok(ImageArtifact {
        width,
        height,
        png: Bytes::from(png),
    })
}

/// Render a whole target without cropping
pub async fn capture_target<R>(rasterizer: &R, target: RenderTarget) -> Result<ImageArtifact>
where
    R: CaptureRasterizer + ?Sized,
{
    let request = RenderRequest {
        target,
        overlays: OverlayVisibility::hidden(),
    };
    let surface = rasterizer.render(&request).await?;
    encode_png(surface)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn surface(width: u32, height: u32) -> PixelSurface {
        RgbaImage::from_pixel(width, height, Rgba([10, 20, 30, 255]))
    }

    fn rect(left: i32, top: i32, width: u32, height: u32) -> CropRectangle {
        CropRectangle {
            top,
            left,
            width,
            height,
        }
    }

    #[test]
    fn test_crop_inside_surface_without_padding() {
        let artifact = crop_surface(&surface(100, 100), &rect(10, 10, 50, 40), 0).unwrap();
        assert_eq!((artifact.width, artifact.height), (50, 40));
        assert_eq!(&artifact.png[..4], &[0x89, 0x50, 0x4E, 0x47]);
    }

    #[test]
    fn test_padded_source_keeps_selection_size() {
        let artifact = crop_surface(&surface(200, 200), &rect(10, 10, 50, 40), 30).unwrap();
        assert_eq!((artifact.width, artifact.height), (50, 40));
    }

    #[test]
    fn test_padding_clamped_to_surface() {
        let artifact = crop_surface(&surface(100, 100), &rect(60, 70, 30, 20), 30).unwrap();
        assert_eq!((artifact.width, artifact.height), (30, 20));
    }

    #[test]
    fn test_padded_source_is_scaled_into_selection() {
        // Left half black, right half white; the padding pulls in white
        let mut surface = surface(100, 10);
        for (x, _, pixel) in surface.enumerate_pixels_mut() {
            *pixel = if x < 50 {
                Rgba([0, 0, 0, 255])
            } else {
                Rgba([255, 255, 255, 255])
            };
        }

        let artifact = crop_surface(&surface, &rect(0, 0, 50, 10), 50).unwrap();
        assert_eq!((artifact.width, artifact.height), (50, 10));

        let pixels = image::load_from_memory(&artifact.png).unwrap().to_rgba8();
        assert_eq!(pixels.get_pixel(0, 5).0, [0, 0, 0, 255]);
        assert_eq!(pixels.get_pixel(49, 5).0, [255, 255, 255, 255]);
    }

    #[test]
    fn test_zero_area_selection_is_empty() {
        let artifact = crop_surface(&surface(100, 100), &rect(10, 10, 0, 0), 30).unwrap();
        assert!(artifact.is_empty());
        assert!(artifact.png.is_empty());
    }

    #[test]
    fn test_selection_outside_surface_is_empty() {
        let artifact = crop_surface(&surface(100, 100), &rect(150, 150, 10, 10), 0).unwrap();
        assert!(artifact.is_empty());
    }

    #[test]
    fn test_negative_origin_keeps_selection_size() {
        let artifact = crop_surface(&surface(100, 100), &rect(-10, -10, 30, 30), 0).unwrap();
        assert_eq!((artifact.width, artifact.height), (30, 30));
    }
}
