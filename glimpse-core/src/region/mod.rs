//! Pointer-driven region selection
//!
//! This module handles:
//! - Drag tracking from pointer down to pointer up
//! - The live crop rectangle and dimming mask while dragging
//! - Rasterizing the finalized selection through the host renderer

pub mod geometry;
pub mod raster;

pub use geometry::{CropRectangle, DimMask, Quadrant};
pub use raster::{
    CaptureRasterizer, OverlayVisibility, PixelSurface, RenderRequest, RenderTarget,
    capture_target, crop_surface,
};

use tracing::{debug, info, trace, warn};

use crate::config::SelectionConfig;
use crate::error::{CaptureError, Result};
use crate::types::{Handle, ImageArtifact, PointerPoint, Viewport};

/// Anchor and current pointer of an in-progress drag
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DragSession {
    pub start: PointerPoint,
    pub current: PointerPoint,
}

/// Rectangular region selector over a live viewport
///
/// Call [`begin`](Self::begin) to arm the selector, then feed it pointer
/// events in delivery order. Events arriving while the selector is not
/// armed are ignored.
pub struct RegionSelector {
    /// Selector handle, for log correlation
    handle: Handle,
    /// Current viewport size
    viewport: Viewport,
    /// Extra pixels rasterized past the right/bottom edge of the selection
    padding: u32,
    /// Whether pointer events are being accepted
    armed: bool,
    /// Drag in progress (Some only between pointer down and pointer up)
    drag: Option<DragSession>,
    /// Last pointer position, for the crosshair
    cursor: Option<PointerPoint>,
    /// Live crop rectangle
    crop: CropRectangle,
    /// Dimming mask (None when cleared)
    mask: Option<DimMask>,
    /// Visibility of the crosshair and backdrop
    overlays: OverlayVisibility,
    /// Last successfully captured rectangle
    committed: Option<CropRectangle>,
}

impl RegionSelector {
    /// Create a selector with default settings
    pub fn new(viewport: Viewport) -> Self {
        Self::with_config(viewport, &SelectionConfig::default())
    }

    /// Create a selector from configuration
    pub fn with_config(viewport: Viewport, config: &SelectionConfig) -> Self {
        Self {
            handle: Handle::new(),
            viewport,
            padding: config.padding,
            armed: false,
            drag: None,
            cursor: None,
            crop: CropRectangle::default(),
            mask: None,
            overlays: OverlayVisibility::hidden(),
            committed: None,
        }
    }

    /// Get the selector handle
    pub fn handle(&self) -> Handle {
        self.handle
    }

    /// Arm the selector and show its overlays
    pub fn begin(&mut self) {
        if self.armed {
            debug!("Selector {} already armed", self.handle);
            return;
        }
        self.armed = true;
        self.drag = None;
        self.mask = None;
        self.cursor = None;
        self.overlays = OverlayVisibility::shown();
        info!(
            "Selector {} armed on {}x{} viewport",
            self.handle, self.viewport.width, self.viewport.height
        );
    }

    /// Disarm without capturing
    pub fn cancel(&mut self) {
        self.armed = false;
        self.drag = None;
        self.mask = None;
        self.overlays = OverlayVisibility::hidden();
        debug!("Selector {} cancelled", self.handle);
    }

    /// Track a viewport resize
    pub fn resize(&mut self, viewport: Viewport) {
        self.viewport = viewport;
        if self.drag.is_some() {
            self.mask = Some(DimMask::around(&self.crop, viewport));
        }
        debug!("Viewport resized to {}x{}", viewport.width, viewport.height);
    }

    /// Pointer pressed: start a drag anchored at `point`
    pub fn on_pointer_down(&mut self, point: PointerPoint) {
        if !self.armed {
            debug!("Ignoring pointer down at {}: selector not armed", point);
            return;
        }

        self.drag = Some(DragSession {
            start: point,
            current: point,
        });
        self.cursor = Some(point);
        self.crop = CropRectangle::at(point);
        self.mask = Some(DimMask::covering(self.viewport));
        debug!("Drag started at {}", point);
    }

    /// Pointer moved: update the crosshair and, while dragging, the selection
    pub fn on_pointer_move(&mut self, point: PointerPoint) {
        if !self.armed {
            return;
        }

        self.cursor = Some(point);

        let Some(drag) = self.drag.as_mut() else {
            return;
        };
        drag.current = point;

        self.crop = CropRectangle::from_drag(drag.start, drag.current);
        self.mask = Some(DimMask::around(&self.crop, self.viewport));
        trace!("Selection now {}", self.crop);
    }

    /// Pointer released: end the drag and return the final rectangle
    ///
    /// The release position is applied as a last move before the drag
    /// ends. Hides the overlays and disarms the selector, ready for
    /// rasterization.
    pub fn release(&mut self, point: PointerPoint) -> Result<CropRectangle> {
        if !self.armed || self.drag.is_none() {
            return Err(CaptureError::NoActiveSelection);
        }

        self.on_pointer_move(point);

        let crop = self.crop;
        self.drag = None;
        self.mask = None;
        self.armed = false;
        self.committed = None;
        self.overlays = OverlayVisibility::hidden();

        debug!("Drag released at {} with selection {}", point, crop);
        Ok(crop)
    }

    /// Pointer released: end the drag and rasterize the selection
    ///
    /// On a rasterization failure the dimming is still cleared but no
    /// crop is committed.
    pub async fn on_pointer_up<R>(
        &mut self,
        point: PointerPoint,
        rasterizer: &R,
    ) -> Result<ImageArtifact>
    where
        R: CaptureRasterizer + ?Sized,
    {
        let crop = self.release(point)?;

        let request = RenderRequest {
            target: RenderTarget::Document,
            overlays: self.overlays,
        };

        let artifact = match rasterizer.render(&request).await {
            Ok(surface) => crop_surface(&surface, &crop, self.padding)?,
            Err(e) => {
                warn!("Selector {} failed to rasterize {}: {}", self.handle, crop, e);
                return Err(e);
            }
        };

        self.committed = Some(crop);
        info!(
            "Selector {} captured {} as {}x{} image",
            self.handle, crop, artifact.width, artifact.height
        );
        Ok(artifact)
    }

    /// Whether pointer events are being accepted
    pub fn is_armed(&self) -> bool {
        self.armed
    }

    /// Whether a drag is in progress
    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    /// The drag in progress, if any
    pub fn drag(&self) -> Option<&DragSession> {
        self.drag.as_ref()
    }

    /// In-progress crop rectangle, for host-side preview
    pub fn live_crop(&self) -> Option<CropRectangle> {
        self.drag.map(|_| self.crop)
    }

    /// Current drag direction
    pub fn quadrant(&self) -> Option<Quadrant> {
        self.drag
            .map(|drag| Quadrant::classify(drag.start, drag.current))
    }

    /// Current dimming mask (None once cleared)
    pub fn dim_mask(&self) -> Option<DimMask> {
        self.mask
    }

    /// Crosshair position
    pub fn cursor(&self) -> Option<PointerPoint> {
        self.cursor
    }

    /// Overlay visibility the host should render
    pub fn overlays(&self) -> OverlayVisibility {
        self.overlays
    }

    /// Rectangle of the last successful capture
    pub fn committed(&self) -> Option<CropRectangle> {
        self.committed
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn padding(&self) -> u32 {
        self.padding
    }
}
