//! Canvas projection: where markers go on screen and what a click means.
//!
//! All positions here are in container space, the coordinate system of the
//! element the image is positioned inside. The image's own box within that
//! container is a [`RenderedBox`]; stored fractions are always relative to
//! the image, never the container.

use hotspot_core::coords::{Fraction, PixelPoint, RenderedBox};

use crate::model::{HotspotKey, LocalHotspot};

/// Side length of a marker's clickable square, in pixels.
pub const MARKER_SIZE: f64 = 16.0;

/// Tooltips flip below their marker when less room than this is above it.
pub const TOOLTIP_FLIP_THRESHOLD: f64 = 60.0;

/// Whether the canvas belongs to the public view or the editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CanvasMode {
    View,
    Edit,
}

/// What caused a layout recomputation. Logged; the computation is the same.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecomputeTrigger {
    ImageLoaded,
    Resized,
    /// Some other state change moved the image (e.g. a title editor opened).
    LayoutChanged,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TooltipPlacement {
    Above,
    Below,
}

/// One hotspot, laid out.
#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    pub key: HotspotKey,
    /// Centre of the marker in container space.
    pub position: PixelPoint,
    pub z_index: i32,
    pub tooltip: TooltipPlacement,
}

impl Marker {
    /// Whether `point` falls inside this marker's square.
    pub fn contains(&self, point: PixelPoint) -> bool {
        let half = MARKER_SIZE / 2.0;
        (point.x - self.position.x).abs() <= half && (point.y - self.position.y).abs() <= half
    }
}

/// What a click landed on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ClickTarget {
    Marker(HotspotKey),
    /// The image surface, at this fraction.
    Image(Fraction),
    /// Outside the image, or the image has no size yet.
    Outside,
}

/// What the UI should do in response to a click.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CanvasAction {
    /// Open the new-hotspot form anchored at this fraction.
    OpenCreate(Fraction),
    /// Open the edit/delete affordance for an existing hotspot.
    SelectHotspot(HotspotKey),
    ShowTooltip(HotspotKey),
    Ignore,
}

/// Tooltip side for a marker centred at `marker_y` (container space).
pub fn tooltip_placement(marker_y: f64) -> TooltipPlacement {
    if marker_y < TOOLTIP_FLIP_THRESHOLD {
        TooltipPlacement::Below
    } else {
        TooltipPlacement::Above
    }
}

/// Layout state for one canvas.
#[derive(Debug, Clone)]
pub struct Canvas {
    mode: CanvasMode,
    image_box: RenderedBox,
    /// Sorted by stacking order, lowest first; ties keep list order.
    markers: Vec<Marker>,
}

impl Canvas {
    pub fn new(mode: CanvasMode) -> Self {
        Self {
            mode,
            image_box: RenderedBox::default(),
            markers: Vec::new(),
        }
    }

    pub fn mode(&self) -> CanvasMode {
        self.mode
    }

    pub fn image_box(&self) -> RenderedBox {
        self.image_box
    }

    pub fn markers(&self) -> &[Marker] {
        &self.markers
    }

    /// Re-measure and re-project every hotspot.
    ///
    /// An image with no area yet yields no markers.
    pub fn recompute(
        &mut self,
        trigger: RecomputeTrigger,
        image_box: RenderedBox,
        hotspots: &[LocalHotspot],
    ) -> &[Marker] {
        self.image_box = image_box;
        self.markers = hotspots
            .iter()
            .filter_map(|h| {
                let position = image_box.project(h.fraction())?;
                Some(Marker {
                    key: h.key,
                    position,
                    z_index: h.z_index,
                    tooltip: tooltip_placement(position.y),
                })
            })
            .collect();
        // Stable, so equal z_index keeps the order hotspots arrived in.
        self.markers.sort_by_key(|m| m.z_index);

        tracing::trace!(
            ?trigger,
            width = image_box.width,
            height = image_box.height,
            markers = self.markers.len(),
            "Canvas recomputed"
        );
        &self.markers
    }

    /// The topmost marker under `point`, if any.
    pub fn hit_test(&self, point: PixelPoint) -> Option<HotspotKey> {
        self.markers
            .iter()
            .rev()
            .find(|m| m.contains(point))
            .map(|m| m.key)
    }

    /// Classify a click. Markers take precedence over the image under them.
    pub fn classify_click(&self, point: PixelPoint) -> ClickTarget {
        if let Some(key) = self.hit_test(point) {
            return ClickTarget::Marker(key);
        }
        match self.image_box.locate(point) {
            Some(fraction) => ClickTarget::Image(fraction),
            None => ClickTarget::Outside,
        }
    }

    /// Decide what a click does in the current mode.
    ///
    /// The public view never offers creation; clicks there only reveal
    /// tooltips.
    pub fn handle_click(&self, point: PixelPoint) -> CanvasAction {
        match (self.mode, self.classify_click(point)) {
            (CanvasMode::View, ClickTarget::Marker(key)) => CanvasAction::ShowTooltip(key),
            (CanvasMode::Edit, ClickTarget::Marker(key)) => CanvasAction::SelectHotspot(key),
            (CanvasMode::Edit, ClickTarget::Image(fraction)) => CanvasAction::OpenCreate(fraction),
            (_, ClickTarget::Outside) | (CanvasMode::View, ClickTarget::Image(_)) => {
                CanvasAction::Ignore
            }
        }
    }
}
