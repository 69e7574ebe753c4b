//! Container ranking and selection.
//!
//! Every catalog entry is evaluated against the load totals. The suggestion
//! is the smallest container carrying the whole load in one unit, otherwise
//! the smallest container type repeated as often as needed.

use std::cmp::Ordering;

use serde::Serialize;
use utoipa::ToSchema;

use crate::aggregate::LoadTotals;
use crate::catalog::Catalog;
use crate::fit::{FitResult, GridCounts, Orientation};
use crate::model::ContainerType;

/// Name reported when no container can be suggested.
pub const NO_CONTAINER_FITS: &str = "No container fits";

/// Evaluation of one catalog container against the current load.
#[derive(Clone, Debug, PartialEq, Serialize, ToSchema)]
pub struct ContainerLoadDetail {
    pub container_name: String,
    pub container_cbm: f64,
    pub container_weight: f64,
    pub max_items_fit_in_one_container: u64,
    pub best_fit_orientation: Orientation,
    pub required_containers: u32,
    #[serde(skip)]
    pub grid: GridCounts,
}

impl ContainerLoadDetail {
    /// The fit result this detail was built from.
    pub fn fit(&self) -> FitResult {
        FitResult {
            max_fit: self.max_items_fit_in_one_container,
            best_orientation: self.best_fit_orientation,
            grid: self.grid,
        }
    }
}

/// The chosen container type and how many units of it are needed.
#[derive(Clone, Debug, PartialEq)]
pub struct SuggestedContainer {
    /// Display name; `"N x <name>"` when several units are needed.
    pub name: String,
    pub container: ContainerType,
    pub required_count: u32,
    pub fit: FitResult,
    /// Share of the booked capacity (`cbm × required_count`) used by the load.
    pub utilization_percent: f64,
}

/// Outcome of the selection.
#[derive(Clone, Debug, PartialEq)]
pub enum ContainerSuggestion {
    Suggested(SuggestedContainer),
    NoContainerFits,
}

impl ContainerSuggestion {
    pub fn name(&self) -> &str {
        match self {
            ContainerSuggestion::Suggested(s) => &s.name,
            ContainerSuggestion::NoContainerFits => NO_CONTAINER_FITS,
        }
    }

    /// Single-unit capacity, `None` for the sentinel.
    pub fn cbm(&self) -> Option<f64> {
        self.suggested().map(|s| s.container.cbm)
    }

    pub fn required_count(&self) -> u32 {
        self.suggested().map_or(0, |s| s.required_count)
    }

    pub fn suggested(&self) -> Option<&SuggestedContainer> {
        match self {
            ContainerSuggestion::Suggested(s) => Some(s),
            ContainerSuggestion::NoContainerFits => None,
        }
    }
}

fn units_needed(total: f64, capacity: f64) -> u32 {
    if total > 0.0 {
        // `as` saturates; capacity is validated positive
        (total / capacity).ceil() as u32
    } else {
        0
    }
}

/// Units of `container` needed for the totals, by volume and by weight.
///
/// Zero only when both totals are zero.
pub fn required_containers(totals: &LoadTotals, container: &ContainerType) -> u32 {
    let by_volume = units_needed(totals.total_cbm, container.cbm);
    let by_weight = units_needed(totals.total_weight, container.max_weight);
    by_volume.max(by_weight)
}

/// Evaluates every catalog container in catalog order.
///
/// `fit_for` supplies the per-unit fit; callers without a single item shape
/// pass `|_| FitResult::none()`.
pub fn rank_containers(
    totals: &LoadTotals,
    catalog: &Catalog,
    mut fit_for: impl FnMut(&ContainerType) -> FitResult,
) -> Vec<ContainerLoadDetail> {
    catalog
        .containers()
        .iter()
        .map(|container| {
            let fit = fit_for(container);
            let required = required_containers(totals, container);
            tracing::debug!(
                container = %container.name,
                max_fit = fit.max_fit,
                required,
                "evaluated container"
            );
            ContainerLoadDetail {
                container_name: container.name.clone(),
                container_cbm: container.cbm,
                container_weight: container.max_weight,
                max_items_fit_in_one_container: fit.max_fit,
                best_fit_orientation: fit.best_orientation,
                required_containers: required,
                grid: fit.grid,
            }
        })
        .collect()
}

fn utilization(totals: &LoadTotals, container: &ContainerType, count: u32) -> f64 {
    let booked = container.cbm * f64::from(count);
    if booked <= 0.0 {
        return 0.0;
    }
    totals.total_cbm / booked * 100.0
}

/// Picks the container for the load.
///
/// `details` must be the output of [`rank_containers`] for the same catalog.
pub fn select_container(
    totals: &LoadTotals,
    catalog: &Catalog,
    details: &[ContainerLoadDetail],
) -> ContainerSuggestion {
    let containers = catalog.containers();
    debug_assert_eq!(containers.len(), details.len());

    let mut chosen: Option<usize> = None;
    for (idx, (container, detail)) in containers.iter().zip(details).enumerate() {
        if detail.required_containers != 1 {
            continue;
        }
        match chosen {
            None => chosen = Some(idx),
            Some(current) => {
                if container.cbm >= totals.total_cbm
                    && container.max_weight >= totals.total_weight
                    && container.cbm < containers[current].cbm
                {
                    chosen = Some(idx);
                }
            }
        }
    }

    if let Some(idx) = chosen {
        let container = &containers[idx];
        return ContainerSuggestion::Suggested(SuggestedContainer {
            name: container.name.clone(),
            container: container.clone(),
            required_count: 1,
            fit: details[idx].fit(),
            utilization_percent: utilization(totals, container, 1),
        });
    }

    if totals.total_cbm <= 0.0 {
        return ContainerSuggestion::NoContainerFits;
    }

    let mut by_capacity: Vec<usize> = (0..containers.len()).collect();
    by_capacity.sort_by(|&a, &b| {
        containers[a]
            .cbm
            .partial_cmp(&containers[b].cbm)
            .unwrap_or(Ordering::Equal)
    });

    by_capacity
        .into_iter()
        .find(|&idx| details[idx].required_containers >= 1)
        .map(|idx| {
            let container = &containers[idx];
            let count = details[idx].required_containers;
            ContainerSuggestion::Suggested(SuggestedContainer {
                name: format!("{} x {}", count, container.name),
                container: container.clone(),
                required_count: count,
                fit: details[idx].fit(),
                utilization_percent: utilization(totals, container, count),
            })
        })
        .unwrap_or(ContainerSuggestion::NoContainerFits)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fit::calculate_items_fit;
    use crate::types::Dimensions;

    fn totals(total_cbm: f64, total_weight: f64) -> LoadTotals {
        LoadTotals {
            total_cbm,
            total_weight,
        }
    }

    fn no_fit(_: &ContainerType) -> FitResult {
        FitResult::none()
    }

    #[test]
    fn required_containers_takes_worse_constraint() {
        let catalog = Catalog::standard();
        let twenty = &catalog.containers()[0];
        assert_eq!(required_containers(&totals(4.5, 100.0), twenty), 1);
        assert_eq!(required_containers(&totals(40.0, 100.0), twenty), 2);
        assert_eq!(required_containers(&totals(1.0, 60000.0), twenty), 3);
        assert_eq!(required_containers(&totals(0.0, 0.0), twenty), 0);
    }

    #[test]
    fn required_containers_positive_when_any_total_positive() {
        let catalog = Catalog::standard();
        for container in catalog.containers() {
            assert!(required_containers(&totals(0.001, 0.0), container) >= 1);
            assert!(required_containers(&totals(0.0, 0.001), container) >= 1);
            assert!(required_containers(&totals(500.0, 1e6), container) >= 1);
        }
    }

    #[test]
    fn picks_smallest_single_container() {
        let catalog = Catalog::standard();
        let load = totals(4.5, 100.0);
        let details = rank_containers(&load, &catalog, |c| {
            calculate_items_fit(Dimensions::new(200.0, 150.0, 150.0), c.dimensions)
        });
        assert_eq!(details.len(), 3);
        assert!(details.iter().all(|d| d.required_containers == 1));

        let suggestion = select_container(&load, &catalog, &details);
        let chosen = suggestion.suggested().expect("a container should be chosen");
        assert_eq!(chosen.name, "20ft Standard");
        assert_eq!(chosen.required_count, 1);
        assert_eq!(chosen.fit.max_fit, 3);
        assert!((chosen.utilization_percent - 4.5 / 33.2 * 100.0).abs() < 1e-9);
    }

    #[test]
    fn skips_containers_needing_more_than_one_unit() {
        let catalog = Catalog::standard();
        let load = totals(50.0, 1000.0);
        let details = rank_containers(&load, &catalog, no_fit);
        assert_eq!(details[0].required_containers, 2);

        let suggestion = select_container(&load, &catalog, &details);
        assert_eq!(suggestion.name(), "40ft Standard");
        assert_eq!(suggestion.cbm(), Some(67.7));
    }

    #[test]
    fn smaller_later_container_replaces_seed() {
        let big = ContainerType::new("Big", 50.0, 10000.0, Dimensions::new(500.0, 300.0, 300.0))
            .unwrap();
        let small =
            ContainerType::new("Small", 10.0, 10000.0, Dimensions::new(250.0, 200.0, 200.0))
                .unwrap();
        let catalog = Catalog::new(vec![big, small]).unwrap();
        let load = totals(5.0, 100.0);
        let details = rank_containers(&load, &catalog, no_fit);
        assert_eq!(select_container(&load, &catalog, &details).name(), "Small");
    }

    #[test]
    fn falls_back_to_repeated_smallest_container() {
        let catalog = Catalog::standard();
        let load = totals(150.0, 40000.0);
        let details = rank_containers(&load, &catalog, no_fit);
        assert!(details.iter().all(|d| d.required_containers > 1));

        let suggestion = select_container(&load, &catalog, &details);
        let chosen = suggestion.suggested().expect("fallback should pick a container");
        assert_eq!(chosen.container.name, "20ft Standard");
        assert_eq!(chosen.required_count, 5);
        assert_eq!(chosen.name, "5 x 20ft Standard");
        assert!((chosen.utilization_percent - 150.0 / (33.2 * 5.0) * 100.0).abs() < 1e-9);
    }

    #[test]
    fn fallback_sorts_by_capacity_not_catalog_order() {
        let mut containers = Catalog::standard().containers().to_vec();
        containers.reverse();
        let catalog = Catalog::new(containers).unwrap();
        let load = totals(100.0, 1000.0);
        let details = rank_containers(&load, &catalog, no_fit);
        let suggestion = select_container(&load, &catalog, &details);
        assert_eq!(suggestion.name(), "4 x 20ft Standard");
    }

    #[test]
    fn empty_load_yields_sentinel() {
        let catalog = Catalog::standard();
        let load = LoadTotals::default();
        let details = rank_containers(&load, &catalog, no_fit);
        assert!(details.iter().all(|d| d.required_containers == 0));

        let suggestion = select_container(&load, &catalog, &details);
        assert!(suggestion.suggested().is_none());
        assert_eq!(suggestion.name(), NO_CONTAINER_FITS);
        assert_eq!(suggestion.cbm(), None);
        assert_eq!(suggestion.required_count(), 0);
    }

    #[test]
    fn details_keep_catalog_order_and_fit() {
        let catalog = Catalog::standard();
        let load = totals(4.5, 100.0);
        let details = rank_containers(&load, &catalog, |c| {
            calculate_items_fit(Dimensions::new(200.0, 150.0, 150.0), c.dimensions)
        });
        let names: Vec<_> = details.iter().map(|d| d.container_name.as_str()).collect();
        assert_eq!(names, ["20ft Standard", "40ft Standard", "40ft High Cube"]);
        assert_eq!(details[1].max_items_fit_in_one_container, 8);
        assert_eq!(details[1].fit().grid.total(), 8);
    }
}
