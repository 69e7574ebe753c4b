//! Orientation search and grid fit counting.
//!
//! Every "how many of this box fit into that container" question goes through
//! [`calculate_items_fit`]: it tries the axis permutations of the item and
//! counts a plain axis-aligned grid for each one. Residual space is never
//! refilled with a second orientation.

use serde::Serialize;
use utoipa::ToSchema;

use crate::types::Dimensions;

/// Item extents assigned to the container axes (l → length, w → width, h → height).
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, ToSchema)]
pub struct Orientation {
    pub l: f64,
    pub w: f64,
    pub h: f64,
}

impl Orientation {
    #[inline]
    pub const fn new(l: f64, w: f64, h: f64) -> Self {
        Self { l, w, h }
    }

    /// The all-zero orientation used when no fit was computed.
    #[inline]
    pub const fn zeroed() -> Self {
        Self::new(0.0, 0.0, 0.0)
    }

    #[inline]
    pub fn as_dimensions(&self) -> Dimensions {
        Dimensions::new(self.l, self.w, self.h)
    }
}

impl From<Dimensions> for Orientation {
    fn from(dims: Dimensions) -> Self {
        Self::new(dims.length, dims.width, dims.height)
    }
}

/// Number of grid cells along each container axis.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct GridCounts {
    pub along_length: u64,
    pub along_width: u64,
    pub along_height: u64,
}

impl GridCounts {
    /// Total number of cells.
    pub fn total(&self) -> u64 {
        self.along_height
            .saturating_mul(self.along_width)
            .saturating_mul(self.along_length)
    }
}

/// Best fit of one item shape in one container shape.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, ToSchema)]
pub struct FitResult {
    pub max_fit: u64,
    pub best_orientation: Orientation,
    /// Grid of the best orientation, replayed by the placement generator.
    pub grid: GridCounts,
}

impl FitResult {
    /// Placeholder for loads where no per-unit fit is computed.
    pub const fn none() -> Self {
        Self {
            max_fit: 0,
            best_orientation: Orientation::zeroed(),
            grid: GridCounts {
                along_length: 0,
                along_width: 0,
                along_height: 0,
            },
        }
    }
}

/// The six axis permutations of an item, in search order.
///
/// Ties during the search keep the earliest entry of this list.
pub fn enumerate_orientations(item: Dimensions) -> [Orientation; 6] {
    let Dimensions {
        length: l,
        width: w,
        height: h,
    } = item;
    [
        Orientation::new(l, w, h),
        Orientation::new(l, h, w),
        Orientation::new(w, l, h),
        Orientation::new(w, h, l),
        Orientation::new(h, l, w),
        Orientation::new(h, w, l),
    ]
}

fn axis_count(container_len: f64, item_len: f64) -> u64 {
    // `as` saturates for values beyond u64::MAX
    (container_len / item_len).floor() as u64
}

/// Per-axis grid counts of one orientation inside a container.
///
/// All zero if any extent on either side is not a positive finite number.
pub fn grid_counts(item: Orientation, container: Dimensions) -> GridCounts {
    if !item.as_dimensions().is_valid() || !container.is_valid() {
        return GridCounts::default();
    }

    GridCounts {
        along_height: axis_count(container.height, item.h),
        along_width: axis_count(container.width, item.w),
        along_length: axis_count(container.length, item.l),
    }
}

/// Counts how many copies of one orientation fit on a regular grid.
///
/// # Examples
/// ```
/// use load_planner::fit::{Orientation, items_fit_in_one_orientation};
/// use load_planner::types::Dimensions;
///
/// let container = Dimensions::new(100.0, 100.0, 100.0);
/// assert_eq!(items_fit_in_one_orientation(Orientation::new(30.0, 50.0, 100.0), container), 6);
/// assert_eq!(items_fit_in_one_orientation(Orientation::new(0.0, 50.0, 100.0), container), 0);
/// ```
pub fn items_fit_in_one_orientation(item: Orientation, container: Dimensions) -> u64 {
    grid_counts(item, container).total()
}

/// Searches all six orientations for the largest grid fit.
pub fn calculate_items_fit(item: Dimensions, container: Dimensions) -> FitResult {
    calculate_items_fit_with(item, container, true)
}

/// Like [`calculate_items_fit`]; with `allow_rotation == false` only the
/// item's original orientation is tried.
///
/// The result starts from the original orientation with zero fit and is only
/// replaced on a strict improvement.
pub fn calculate_items_fit_with(
    item: Dimensions,
    container: Dimensions,
    allow_rotation: bool,
) -> FitResult {
    let orientations = enumerate_orientations(item);
    let candidates = if allow_rotation {
        &orientations[..]
    } else {
        &orientations[..1]
    };

    let mut best = FitResult {
        max_fit: 0,
        best_orientation: Orientation::from(item),
        grid: GridCounts::default(),
    };

    for &orientation in candidates {
        let grid = grid_counts(orientation, container);
        let current_fit = grid.total();
        if current_fit > best.max_fit {
            best = FitResult {
                max_fit: current_fit,
                best_orientation: orientation,
                grid,
            };
        }
    }

    best
}

#[cfg(test)]
mod tests {
    use super::*;

    fn twenty_ft() -> Dimensions {
        Dimensions::new(589.8, 235.2, 239.0)
    }

    fn forty_ft() -> Dimensions {
        Dimensions::new(1203.2, 235.2, 239.0)
    }

    fn forty_ft_hc() -> Dimensions {
        Dimensions::new(1203.2, 235.2, 269.8)
    }

    #[test]
    fn orientations_follow_search_order() {
        let o = enumerate_orientations(Dimensions::new(1.0, 2.0, 3.0));
        let triples: Vec<_> = o.iter().map(|o| (o.l, o.w, o.h)).collect();
        assert_eq!(
            triples,
            [
                (1.0, 2.0, 3.0),
                (1.0, 3.0, 2.0),
                (2.0, 1.0, 3.0),
                (2.0, 3.0, 1.0),
                (3.0, 1.0, 2.0),
                (3.0, 2.0, 1.0),
            ]
        );
    }

    #[test]
    fn grid_count_uses_floor_per_axis() {
        let grid = grid_counts(
            Orientation::new(150.0, 200.0, 150.0),
            Dimensions::new(589.8, 235.2, 239.0),
        );
        assert_eq!(
            grid,
            GridCounts {
                along_length: 3,
                along_width: 1,
                along_height: 1
            }
        );
        assert_eq!(grid.total(), 3);
    }

    #[test]
    fn non_positive_inputs_fit_nothing() {
        let container = Dimensions::new(100.0, 100.0, 100.0);
        let item = Orientation::new(10.0, 10.0, 10.0);
        assert_eq!(items_fit_in_one_orientation(item, container), 1000);

        for bad in [0.0, -5.0, f64::NAN] {
            assert_eq!(
                items_fit_in_one_orientation(Orientation::new(bad, 10.0, 10.0), container),
                0
            );
            assert_eq!(
                items_fit_in_one_orientation(Orientation::new(10.0, bad, 10.0), container),
                0
            );
            assert_eq!(
                items_fit_in_one_orientation(Orientation::new(10.0, 10.0, bad), container),
                0
            );
            assert_eq!(
                items_fit_in_one_orientation(item, Dimensions::new(bad, 100.0, 100.0)),
                0
            );
            assert_eq!(
                items_fit_in_one_orientation(item, Dimensions::new(100.0, bad, 100.0)),
                0
            );
            assert_eq!(
                items_fit_in_one_orientation(item, Dimensions::new(100.0, 100.0, bad)),
                0
            );
        }
    }

    #[test]
    fn fit_never_increases_with_larger_item() {
        let container = twenty_ft();
        let mut previous = u64::MAX;
        let mut length = 5.0;
        while length < 700.0 {
            let fit = items_fit_in_one_orientation(Orientation::new(length, 40.0, 55.0), container);
            assert!(fit <= previous, "fit grew from {previous} to {fit} at {length}");
            previous = fit;
            length += 7.3;
        }
        assert_eq!(previous, 0);
    }

    #[test]
    fn best_fit_is_at_least_original_orientation() {
        let shapes = [
            Dimensions::new(200.0, 150.0, 150.0),
            Dimensions::new(120.0, 80.0, 100.0),
            Dimensions::new(57.0, 33.0, 240.0),
            Dimensions::new(10.0, 300.0, 20.0),
        ];
        for shape in shapes {
            for container in [twenty_ft(), forty_ft(), forty_ft_hc()] {
                let result = calculate_items_fit(shape, container);
                let original = items_fit_in_one_orientation(Orientation::from(shape), container);
                assert!(result.max_fit >= original);
                assert_eq!(result.max_fit, result.grid.total());
            }
        }
    }

    #[test]
    fn picks_first_strictly_best_orientation() {
        let result = calculate_items_fit(Dimensions::new(200.0, 150.0, 150.0), twenty_ft());
        assert_eq!(result.max_fit, 3);
        // (150, 200, 150) is the first orientation reaching 3; later ties are ignored.
        assert_eq!(result.best_orientation, Orientation::new(150.0, 200.0, 150.0));
    }

    #[test]
    fn ties_keep_enumeration_order() {
        let result = calculate_items_fit(
            Dimensions::new(10.0, 10.0, 10.0),
            Dimensions::new(100.0, 100.0, 100.0),
        );
        assert_eq!(result.max_fit, 1000);
        assert_eq!(result.best_orientation, Orientation::new(10.0, 10.0, 10.0));
    }

    #[test]
    fn no_fit_keeps_original_orientation() {
        let item = Dimensions::new(1204.0, 235.0, 239.0);
        for container in [forty_ft(), forty_ft_hc()] {
            for orientation in enumerate_orientations(item) {
                assert_eq!(items_fit_in_one_orientation(orientation, container), 0);
            }
            let result = calculate_items_fit(item, container);
            assert_eq!(result.max_fit, 0);
            assert_eq!(result.best_orientation, Orientation::from(item));
            assert_eq!(result.grid, GridCounts::default());
        }
    }

    #[test]
    fn exact_fit_against_forty_foot() {
        let result = calculate_items_fit(Dimensions::new(1203.0, 235.0, 239.0), forty_ft());
        assert_eq!(result.max_fit, 1);
    }

    #[test]
    fn rotation_disabled_only_tries_original() {
        let item = Dimensions::new(200.0, 150.0, 150.0);
        let fixed = calculate_items_fit_with(item, twenty_ft(), false);
        assert_eq!(fixed.max_fit, 2);
        assert_eq!(fixed.best_orientation, Orientation::from(item));
    }

    #[test]
    fn placeholder_is_zeroed() {
        let none = FitResult::none();
        assert_eq!(none.max_fit, 0);
        assert_eq!(none.best_orientation, Orientation::zeroed());
        assert_eq!(none.grid.total(), 0);
    }
}
