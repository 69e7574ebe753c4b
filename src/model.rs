//! Data models for the cargo load calculation.
//!
//! - `Item`: one cargo line (a shape, its weight, how many copies, display color)
//! - `ContainerType`: an immutable catalog entry describing a shipping container
//!
//! Both implement the traits from the `types` module.

use serde::{Deserialize, Serialize};
#[allow(unused_imports)]
use serde_json::json;
use utoipa::ToSchema;

use crate::types::{Dimensional, Dimensions, validation};

/// Color assigned to items that do not declare one.
pub const DEFAULT_ITEM_COLOR: &str = "#FF5733";

/// Validation error for item or container data.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    InvalidDimension(String),
    InvalidWeight(String),
    InvalidQuantity(String),
    InvalidColor(String),
    InvalidCapacity(String),
    InvalidName(String),
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::InvalidDimension(msg) => write!(f, "Invalid dimension: {}", msg),
            ValidationError::InvalidWeight(msg) => write!(f, "Invalid weight: {}", msg),
            ValidationError::InvalidQuantity(msg) => write!(f, "Invalid quantity: {}", msg),
            ValidationError::InvalidColor(msg) => write!(f, "Invalid color: {}", msg),
            ValidationError::InvalidCapacity(msg) => write!(f, "Invalid capacity: {}", msg),
            ValidationError::InvalidName(msg) => write!(f, "Invalid name: {}", msg),
        }
    }
}

impl std::error::Error for ValidationError {}

fn validate_dims(dims: &Dimensions, prefix: &str) -> Result<(), ValidationError> {
    let check = |value: f64, axis: &str| {
        validation::validate_dimension(value, &format!("{prefix}{axis}"))
            .map_err(ValidationError::InvalidDimension)
    };
    check(dims.length, "length")?;
    check(dims.width, "width")?;
    check(dims.height, "height")?;
    Ok(())
}

fn default_item_color() -> String {
    DEFAULT_ITEM_COLOR.to_string()
}

fn default_quantity() -> u32 {
    1
}

/// One cargo line: `quantity` identical boxes of the given shape.
///
/// # Fields
/// * `length`, `width`, `height` - Box extents in cm
/// * `weight` - Weight of one box in kg
/// * `quantity` - Number of identical boxes
/// * `color` - Display color handed through to visualization
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
#[schema(example = json!({
    "length": 200.0, "width": 150.0, "height": 150.0,
    "weight": 100.0, "quantity": 1, "color": "#FF5733"
}))]
pub struct Item {
    pub length: f64,
    pub width: f64,
    pub height: f64,
    pub weight: f64,
    #[serde(default = "default_quantity")]
    pub quantity: u32,
    #[serde(default = "default_item_color")]
    pub color: String,
}

impl Item {
    /// Creates a new item with validation.
    ///
    /// # Examples
    /// ```
    /// use load_planner::model::Item;
    ///
    /// assert!(Item::new(200.0, 150.0, 150.0, 100.0, 1, "#FF5733").is_ok());
    /// assert!(Item::new(200.0, 0.0, 150.0, 100.0, 1, "#FF5733").is_err());
    /// ```
    pub fn new(
        length: f64,
        width: f64,
        height: f64,
        weight: f64,
        quantity: u32,
        color: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        let item = Self {
            length,
            width,
            height,
            weight,
            quantity,
            color: color.into(),
        };
        item.validate()?;
        Ok(item)
    }

    /// Checks the item invariants: positive finite extents and weight,
    /// at least one copy, a `#RRGGBB` color.
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_dims(&self.dimensions(), "Item ")?;
        validation::validate_weight(self.weight, "Item weight")
            .map_err(ValidationError::InvalidWeight)?;
        if self.quantity == 0 {
            return Err(ValidationError::InvalidQuantity(
                "Item quantity must be at least 1".to_string(),
            ));
        }
        if !validation::is_hex_color(&self.color) {
            return Err(ValidationError::InvalidColor(format!(
                "Item color must look like #RRGGBB, got: {}",
                self.color
            )));
        }
        Ok(())
    }
}

impl Dimensional for Item {
    fn dimensions(&self) -> Dimensions {
        Dimensions::new(self.length, self.width, self.height)
    }
}

/// A shipping container type from the catalog.
///
/// # Fields
/// * `name` - Unique catalog name
/// * `cbm` - Maximum cubic capacity in m³
/// * `max_weight` - Maximum payload in kg
/// * `dimensions` - Internal extents in cm
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
#[schema(example = json!({
    "name": "20ft Standard", "cbm": 33.2, "max_weight": 28200.0,
    "dimensions": { "length": 589.8, "width": 235.2, "height": 239.0 }
}))]
pub struct ContainerType {
    pub name: String,
    pub cbm: f64,
    #[serde(alias = "weight")]
    pub max_weight: f64,
    pub dimensions: Dimensions,
}

impl ContainerType {
    /// Creates a new container type after validating the parameters.
    pub fn new(
        name: impl Into<String>,
        cbm: f64,
        max_weight: f64,
        dimensions: Dimensions,
    ) -> Result<Self, ValidationError> {
        let container = Self {
            name: name.into(),
            cbm,
            max_weight,
            dimensions,
        };
        container.validate()?;
        Ok(container)
    }

    /// Checks the container invariants.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::InvalidName(
                "Container name must not be empty".to_string(),
            ));
        }
        validation::validate_dimension(self.cbm, "Container cbm")
            .map_err(ValidationError::InvalidCapacity)?;
        validation::validate_weight(self.max_weight, "Container weight capacity")
            .map_err(ValidationError::InvalidWeight)?;
        validate_dims(&self.dimensions, "Container ")
    }
}

impl Dimensional for ContainerType {
    fn dimensions(&self) -> Dimensions {
        self.dimensions
    }
}
