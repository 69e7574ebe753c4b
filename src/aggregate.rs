//! Volume and weight accounting for a cargo list.

use serde::Serialize;
use utoipa::ToSchema;

use crate::model::Item;
use crate::types::Dimensional;

/// One input item echoed back with its computed volume and weight.
#[derive(Clone, Debug, PartialEq, Serialize, ToSchema)]
pub struct ItemDetail {
    pub length: f64,
    pub width: f64,
    pub height: f64,
    pub weight: f64,
    pub quantity: u32,
    pub color: String,
    /// Volume of all copies in m³, rounded to two decimals.
    pub cbm: f64,
    /// Weight of all copies in kg.
    pub total_weight: f64,
}

impl ItemDetail {
    pub fn from_item(item: &Item) -> Self {
        let quantity = f64::from(item.quantity);
        Self {
            length: item.length,
            width: item.width,
            height: item.height,
            weight: item.weight,
            quantity: item.quantity,
            color: item.color.clone(),
            cbm: round_cbm(item.volume_m3() * quantity),
            total_weight: item.weight * quantity,
        }
    }
}

/// Grand totals over a cargo list.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, ToSchema)]
pub struct LoadTotals {
    /// Total volume in m³.
    pub total_cbm: f64,
    /// Total weight in kg.
    pub total_weight: f64,
}

/// Rounds a volume in m³ to two decimals.
pub fn round_cbm(cbm: f64) -> f64 {
    (cbm * 100.0).round() / 100.0
}

/// Computes per-item details and the grand totals.
///
/// The total volume is the sum of the rounded per-item volumes. An empty
/// list yields zero totals.
pub fn aggregate_items(items: &[Item]) -> (Vec<ItemDetail>, LoadTotals) {
    let details: Vec<ItemDetail> = items.iter().map(ItemDetail::from_item).collect();
    let totals = details.iter().fold(LoadTotals::default(), |acc, d| LoadTotals {
        total_cbm: acc.total_cbm + d.cbm,
        total_weight: acc.total_weight + d.total_weight,
    });
    (details, totals)
}

/// Formats a volume in m³ with two decimals, e.g. `4.50`.
pub fn format_cbm(cbm: f64) -> String {
    format!("{:.2}", cbm)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::DEFAULT_ITEM_COLOR;

    fn item(l: f64, w: f64, h: f64, weight: f64, quantity: u32) -> Item {
        Item::new(l, w, h, weight, quantity, DEFAULT_ITEM_COLOR).unwrap()
    }

    #[test]
    fn single_item_cbm_matches_volume() {
        let (details, totals) = aggregate_items(&[item(200.0, 150.0, 150.0, 100.0, 1)]);
        assert_eq!(details.len(), 1);
        assert_eq!(format_cbm(details[0].cbm), "4.50");
        assert_eq!(format_cbm(totals.total_cbm), "4.50");
        assert_eq!(totals.total_weight, 100.0);
    }

    #[test]
    fn quantity_scales_volume_and_weight() {
        let (details, totals) = aggregate_items(&[
            item(100.0, 50.0, 50.0, 20.0, 4),
            item(10.0, 10.0, 10.0, 1.5, 10),
        ]);
        assert!((details[0].cbm - 1.0).abs() < 1e-9);
        assert_eq!(details[0].total_weight, 80.0);
        assert!((details[1].cbm - 0.01).abs() < 1e-9);
        assert_eq!(details[1].total_weight, 15.0);
        assert!((totals.total_cbm - 1.01).abs() < 1e-9);
        assert_eq!(totals.total_weight, 95.0);
    }

    #[test]
    fn details_echo_input() {
        let input = Item::new(120.0, 80.0, 60.0, 35.0, 3, "#3357FF").unwrap();
        let (details, _) = aggregate_items(std::slice::from_ref(&input));
        let detail = &details[0];
        assert_eq!(
            (detail.length, detail.width, detail.height),
            (120.0, 80.0, 60.0)
        );
        assert_eq!(detail.weight, 35.0);
        assert_eq!(detail.quantity, 3);
        assert_eq!(detail.color, "#3357FF");
    }

    #[test]
    fn per_item_cbm_is_rounded_before_summing() {
        // 0.004 m³ each, three distinct shapes
        let (details, totals) = aggregate_items(&[
            item(20.0, 20.0, 10.0, 30000.0, 1),
            item(40.0, 10.0, 10.0, 30000.0, 1),
            item(25.0, 16.0, 10.0, 30000.0, 1),
        ]);
        assert!(details.iter().all(|d| d.cbm == 0.0));
        assert_eq!(totals.total_cbm, 0.0);
        assert_eq!(format_cbm(totals.total_cbm), "0.00");
        assert_eq!(totals.total_weight, 90000.0);

        let (details, totals) = aggregate_items(&[
            item(120.0, 80.0, 60.0, 35.0, 3),
            item(120.0, 80.0, 60.0, 35.0, 3),
        ]);
        assert_eq!(details[0].cbm, 1.73);
        assert!((totals.total_cbm - 3.46).abs() < 1e-9);
    }

    #[test]
    fn empty_list_yields_zero_totals() {
        let (details, totals) = aggregate_items(&[]);
        assert!(details.is_empty());
        assert_eq!(totals, LoadTotals::default());
        assert_eq!(format_cbm(totals.total_cbm), "0.00");
    }
}
