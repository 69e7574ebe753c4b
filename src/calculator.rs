//! The load calculation pipeline.
//!
//! One call runs the whole chain on a fresh snapshot of the inputs:
//! aggregate totals → per-container fit and ranking → container selection →
//! placements for visualization. It is synchronous, pure CPU work and keeps
//! no state between calls.

use serde::Serialize;
use utoipa::ToSchema;

use crate::aggregate::{ItemDetail, LoadTotals, aggregate_items};
use crate::catalog::Catalog;
use crate::fit::{FitResult, calculate_items_fit_with};
use crate::model::Item;
use crate::placement::{ColorMode, PackedItemPlacement, Palette, generate_placements};
use crate::selector::{ContainerLoadDetail, ContainerSuggestion, rank_containers, select_container};
use crate::types::{Dimensional, Dimensions};

/// Configuration for the load calculation.
#[derive(Clone, Debug, PartialEq)]
pub struct CalculatorConfig {
    /// Search all six orientations instead of only the declared one
    pub allow_item_rotation: bool,
    /// How placed copies are colored
    pub color_mode: ColorMode,
    /// Palette used by [`ColorMode::Palette`]
    pub palette: Palette,
    /// Largest `max_fit` for which placements are generated
    pub max_placements: u64,
}

impl CalculatorConfig {
    pub const DEFAULT_ALLOW_ITEM_ROTATION: bool = true;
    pub const DEFAULT_MAX_PLACEMENTS: u64 = 100_000;

    pub fn builder() -> CalculatorConfigBuilder {
        CalculatorConfigBuilder::default()
    }
}

impl Default for CalculatorConfig {
    fn default() -> Self {
        Self {
            allow_item_rotation: Self::DEFAULT_ALLOW_ITEM_ROTATION,
            color_mode: ColorMode::default(),
            palette: Palette::standard(),
            max_placements: Self::DEFAULT_MAX_PLACEMENTS,
        }
    }
}

/// Builder for [`CalculatorConfig`].
#[derive(Clone, Debug, Default)]
pub struct CalculatorConfigBuilder {
    config: CalculatorConfig,
}

impl CalculatorConfigBuilder {
    pub fn allow_item_rotation(mut self, allow: bool) -> Self {
        self.config.allow_item_rotation = allow;
        self
    }

    pub fn color_mode(mut self, mode: ColorMode) -> Self {
        self.config.color_mode = mode;
        self
    }

    pub fn palette(mut self, palette: Palette) -> Self {
        self.config.palette = palette;
        self
    }

    pub fn max_placements(mut self, limit: u64) -> Self {
        self.config.max_placements = limit;
        self
    }

    pub fn build(self) -> CalculatorConfig {
        self.config
    }
}

/// Why a plan does or does not carry placements.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum PlacementStatus {
    /// Copies were laid out in the suggested container.
    Placed,
    /// More than one item shape; only capacity-based counts are available.
    MultipleShapes,
    /// No container was suggested.
    NoContainer,
    /// The single shape does not fit the suggested container in any orientation.
    NoFit,
    /// More copies fit than the configured placement limit allows.
    TooManyPlacements,
}

/// Complete result of one calculation.
#[derive(Clone, Debug, PartialEq)]
pub struct LoadPlan {
    pub item_details: Vec<ItemDetail>,
    pub totals: LoadTotals,
    pub suggestion: ContainerSuggestion,
    pub container_load_details: Vec<ContainerLoadDetail>,
    /// Internal dimensions of the suggested container, present only for
    /// single-shape loads.
    pub container_dimensions: Option<Dimensions>,
    pub packed_items: Vec<PackedItemPlacement>,
    pub placement_status: PlacementStatus,
}

impl LoadPlan {
    pub fn placed_count(&self) -> usize {
        self.packed_items.len()
    }
}

/// Events emitted while a calculation runs, for live visualization.
#[derive(Clone, Debug, Serialize)]
#[serde(tag = "type")]
pub enum CalcEvent {
    /// Totals of the cargo list are known.
    TotalsComputed {
        item_count: usize,
        total_cbm: f64,
        total_weight: f64,
    },
    /// One catalog container was evaluated.
    ContainerEvaluated {
        container_name: String,
        max_fit: u64,
        required_containers: u32,
    },
    /// The suggestion was made (possibly the "no container fits" sentinel).
    ContainerSelected { name: String, required_count: u32 },
    /// One copy was placed.
    ItemPlaced {
        index: usize,
        placement: PackedItemPlacement,
    },
    /// Calculation finished.
    Finished {
        placed: usize,
        status: PlacementStatus,
    },
}

/// Returns the representative item when every line shares one shape.
pub fn single_shape(items: &[Item]) -> Option<&Item> {
    let (first, rest) = items.split_first()?;
    let shape = first.dimensions();
    rest.iter()
        .all(|item| item.dimensions() == shape)
        .then_some(first)
}

/// Runs the calculation with default configuration.
pub fn calculate(items: &[Item], catalog: &Catalog) -> LoadPlan {
    calculate_load(items, catalog, &CalculatorConfig::default())
}

/// Runs the calculation.
///
/// # Examples
/// ```
/// use load_planner::calculator::{CalculatorConfig, calculate_load};
/// use load_planner::catalog::Catalog;
/// use load_planner::model::Item;
///
/// let items = vec![Item::new(200.0, 150.0, 150.0, 100.0, 1, "#FF5733").unwrap()];
/// let plan = calculate_load(&items, &Catalog::standard(), &CalculatorConfig::default());
/// assert_eq!(plan.suggestion.name(), "20ft Standard");
/// ```
pub fn calculate_load(items: &[Item], catalog: &Catalog, config: &CalculatorConfig) -> LoadPlan {
    calculate_load_with_progress(items, catalog, config, |_| {})
}

/// Runs the calculation and reports each step to `on_event`.
pub fn calculate_load_with_progress(
    items: &[Item],
    catalog: &Catalog,
    config: &CalculatorConfig,
    mut on_event: impl FnMut(&CalcEvent),
) -> LoadPlan {
    let (item_details, totals) = aggregate_items(items);
    on_event(&CalcEvent::TotalsComputed {
        item_count: items.len(),
        total_cbm: totals.total_cbm,
        total_weight: totals.total_weight,
    });

    let shape_item = single_shape(items);
    let container_load_details = rank_containers(&totals, catalog, |container| match shape_item {
        Some(item) => calculate_items_fit_with(
            item.dimensions(),
            container.dimensions,
            config.allow_item_rotation,
        ),
        None => FitResult::none(),
    });
    for detail in &container_load_details {
        on_event(&CalcEvent::ContainerEvaluated {
            container_name: detail.container_name.clone(),
            max_fit: detail.max_items_fit_in_one_container,
            required_containers: detail.required_containers,
        });
    }

    let suggestion = select_container(&totals, catalog, &container_load_details);
    on_event(&CalcEvent::ContainerSelected {
        name: suggestion.name().to_string(),
        required_count: suggestion.required_count(),
    });

    let mut container_dimensions = None;
    let mut packed_items = Vec::new();
    let placement_status = match (shape_item, suggestion.suggested()) {
        (_, None) => PlacementStatus::NoContainer,
        (None, Some(_)) => PlacementStatus::MultipleShapes,
        (Some(item), Some(chosen)) => {
            let dims = chosen.container.dimensions;
            container_dimensions = Some(dims);
            if chosen.fit.max_fit > config.max_placements {
                tracing::warn!(
                    max_fit = chosen.fit.max_fit,
                    limit = config.max_placements,
                    "placement limit exceeded, skipping placements"
                );
                PlacementStatus::TooManyPlacements
            } else {
                let policy = config.color_mode.policy(&config.palette);
                packed_items = generate_placements(&dims, &chosen.fit, item, policy.as_ref());
                if packed_items.is_empty() {
                    PlacementStatus::NoFit
                } else {
                    PlacementStatus::Placed
                }
            }
        }
    };

    for (index, placement) in packed_items.iter().enumerate() {
        on_event(&CalcEvent::ItemPlaced {
            index,
            placement: placement.clone(),
        });
    }

    tracing::debug!(
        items = items.len(),
        total_cbm = totals.total_cbm,
        total_weight = totals.total_weight,
        suggestion = suggestion.name(),
        placed = packed_items.len(),
        status = ?placement_status,
        "load calculated"
    );

    on_event(&CalcEvent::Finished {
        placed: packed_items.len(),
        status: placement_status,
    });

    LoadPlan {
        item_details,
        totals,
        suggestion,
        container_load_details,
        container_dimensions,
        packed_items,
        placement_status,
    }
}
