//! Deterministic placement of packed copies for visualization.
//!
//! The generator replays the grid found by the fit search cell by cell
//! (height outermost, then width, then length) and emits one centered box
//! per cell. Coordinates are derived from integer cell indices, never from
//! accumulated steps.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::fit::FitResult;
use crate::model::Item;
use crate::types::{BoundingBox, CM_PER_M, Dimensions, EPSILON_GENERAL, Vec3};

/// The standard 50-color visualization palette.
pub const STANDARD_PALETTE: [&str; 50] = [
    "#FF6B6B", "#4ECDC4", "#45B7D1", "#96CEB4", "#FFEEAD", "#D4A5A5", "#9B59B6", "#3498DB",
    "#E74C3C", "#2ECC71", "#F1C40F", "#E67E22", "#1ABC9C", "#9B59B6", "#34495E", "#F39C12",
    "#D35400", "#7F8C8D", "#8E44AD", "#C0392B", "#2980B9", "#27AE60", "#F1C40F", "#16A085",
    "#8E44AD", "#2C3E50", "#E91E63", "#3F51B5", "#009688", "#FF9800", "#795548", "#9E9E9E",
    "#607D8B", "#FF5722", "#673AB7", "#2196F3", "#00BCD4", "#4CAF50", "#FFC107", "#9C27B0",
    "#03A9F4", "#8BC34A", "#CDDC39", "#FFEB3B", "#FFCDD2", "#EF5350", "#EC407A", "#AB47BC",
    "#7E57C2", "#5C6BC0",
];

/// Immutable list of display colors, cheap to clone and share.
#[derive(Clone, Debug, PartialEq)]
pub struct Palette {
    colors: Arc<[String]>,
}

impl Palette {
    pub fn new(colors: Vec<String>) -> Self {
        Self {
            colors: colors.into(),
        }
    }

    pub fn standard() -> Self {
        Self::new(STANDARD_PALETTE.iter().map(|c| c.to_string()).collect())
    }

    /// Color at `index`, cycling through the palette. `None` when empty.
    pub fn get(&self, index: usize) -> Option<&str> {
        if self.is_empty() {
            return None;
        }
        Some(self.colors[index % self.len()].as_str())
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self::standard()
    }
}

/// Decides the display color of the n-th placed copy.
pub trait ColorPolicy {
    fn color_for(&self, index: usize, item: &Item) -> String;
}

/// Cycles through an injected palette; falls back to the item color when
/// the palette is empty.
#[derive(Clone, Debug)]
pub struct PaletteCycle {
    palette: Palette,
}

impl PaletteCycle {
    pub fn new(palette: Palette) -> Self {
        Self { palette }
    }
}

impl ColorPolicy for PaletteCycle {
    fn color_for(&self, index: usize, item: &Item) -> String {
        self.palette
            .get(index)
            .map_or_else(|| item.color.clone(), str::to_string)
    }
}

/// Every copy uses the color declared on the item.
#[derive(Clone, Copy, Debug, Default)]
pub struct ItemDeclaredColor;

impl ColorPolicy for ItemDeclaredColor {
    fn color_for(&self, _index: usize, item: &Item) -> String {
        item.color.clone()
    }
}

/// Selectable color policies.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ColorMode {
    /// Cycle the palette per copy.
    #[default]
    Palette,
    /// Use the item's declared color.
    Item,
}

impl ColorMode {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "palette" => Some(ColorMode::Palette),
            "item" => Some(ColorMode::Item),
            _ => None,
        }
    }

    /// Builds the policy for this mode.
    pub fn policy(self, palette: &Palette) -> Box<dyn ColorPolicy + Send + Sync> {
        match self {
            ColorMode::Palette => Box::new(PaletteCycle::new(palette.clone())),
            ColorMode::Item => Box::new(ItemDeclaredColor),
        }
    }
}

/// Extent of a placed copy in meters, named by container axis.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, ToSchema)]
pub struct PlacementSize {
    pub width: f64,
    pub height: f64,
    pub length: f64,
}

/// One placed copy: center position (meters, origin at the container
/// center), extent and color.
#[derive(Clone, Debug, PartialEq, Serialize, ToSchema)]
pub struct PackedItemPlacement {
    pub position: Vec3,
    pub dimensions: PlacementSize,
    pub color: String,
}

impl PackedItemPlacement {
    pub fn bounding_box(&self) -> BoundingBox {
        let size = Vec3::new(
            self.dimensions.width,
            self.dimensions.height,
            self.dimensions.length,
        );
        BoundingBox::from_center_and_size(self.position, size)
    }
}

/// Lays out at most `fit.max_fit` copies on the grid of `fit`.
///
/// Axis mapping: container width → x, height → y, length → z.
pub fn generate_placements(
    container: &Dimensions,
    fit: &FitResult,
    item: &Item,
    colors: &dyn ColorPolicy,
) -> Vec<PackedItemPlacement> {
    let orientation = fit.best_orientation;
    let grid = fit.grid;
    let limit = fit.max_fit;

    let size = PlacementSize {
        width: orientation.w / CM_PER_M,
        height: orientation.h / CM_PER_M,
        length: orientation.l / CM_PER_M,
    };

    let mut placements = Vec::new();
    let mut emitted: u64 = 0;

    'grid: for iz in 0..grid.along_height {
        let center_h = iz as f64 * orientation.h + orientation.h / 2.0;
        for iy in 0..grid.along_width {
            let center_w = iy as f64 * orientation.w + orientation.w / 2.0;
            for ix in 0..grid.along_length {
                if emitted >= limit {
                    break 'grid;
                }
                let center_l = ix as f64 * orientation.l + orientation.l / 2.0;
                let index = placements.len();
                placements.push(PackedItemPlacement {
                    position: Vec3::new(
                        (center_w - container.width / 2.0) / CM_PER_M,
                        (center_h - container.height / 2.0) / CM_PER_M,
                        (center_l - container.length / 2.0) / CM_PER_M,
                    ),
                    dimensions: size,
                    color: colors.color_for(index, item),
                });
                emitted += 1;
            }
        }
    }

    if emitted != limit {
        tracing::warn!(
            emitted,
            max_fit = limit,
            "placement grid and fit count disagree"
        );
    }

    let half = container.half_extents_m();
    if let Some(outside) = placements
        .iter()
        .position(|p| !p.bounding_box().within_half_extents(half, EPSILON_GENERAL))
    {
        tracing::warn!(index = outside, "placement leaves the container");
    }

    placements
}
