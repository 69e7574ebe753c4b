//! Common types and traits for cargo geometry.
//!
//! Input geometry (items, containers) is expressed in centimeters as
//! [`Dimensions`]; output geometry for visualization is expressed in meters
//! as [`Vec3`] points centered on the container.

use std::ops::{Add, Mul, Sub};

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Centimeters per meter.
pub const CM_PER_M: f64 = 100.0;

/// Cubic centimeters per cubic meter.
pub const CM3_PER_M3: f64 = 1_000_000.0;

/// Global numerical tolerance for floating-point comparisons.
pub const EPSILON_GENERAL: f64 = 1e-6;

/// Represents a 3D vector or point in output space (meters).
///
/// # Examples
/// ```
/// use load_planner::types::Vec3;
///
/// let position = Vec3::new(1.0, 2.0, 3.0);
/// let offset = Vec3::new(0.5, 0.5, 0.5);
/// assert_eq!(position + offset, Vec3::new(1.5, 2.5, 3.5));
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3 {
    /// Creates a new 3D vector.
    ///
    /// # Parameters
    /// * `x` - X component (container width axis)
    /// * `y` - Y component (container height axis)
    /// * `z` - Z component (container length axis)
    #[inline]
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }


}

impl Add for Vec3 {
    type Output = Self;

    #[inline]
    fn add(self, rhs: Self) -> Self::Output {
        Self::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Sub for Vec3 {
    type Output = Self;

    #[inline]
    fn sub(self, rhs: Self) -> Self::Output {
        Self::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl Mul<f64> for Vec3 {
    type Output = Self;

    #[inline]
    fn mul(self, scalar: f64) -> Self::Output {
        Self::new(self.x * scalar, self.y * scalar, self.z * scalar)
    }
}

/// Box extents in centimeters, in the logical roles length, width, height.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Dimensions {
    pub length: f64,
    pub width: f64,
    pub height: f64,
}

impl Dimensions {
    #[inline]
    pub const fn new(length: f64, width: f64, height: f64) -> Self {
        Self {
            length,
            width,
            height,
        }
    }

    /// Volume in cubic centimeters.
    #[inline]
    pub fn volume_cm3(&self) -> f64 {
        self.length * self.width * self.height
    }

    /// Volume in cubic meters.
    #[inline]
    pub fn volume_m3(&self) -> f64 {
        self.volume_cm3() / CM3_PER_M3
    }

    /// Checks if all components are positive and finite.
    #[inline]
    pub fn is_valid(&self) -> bool {
        [self.length, self.width, self.height]
            .iter()
            .all(|v| *v > 0.0 && v.is_finite())
    }

    /// Half extents in meters, mapped onto the output axes
    /// (width → x, height → y, length → z).
    #[inline]
    pub fn half_extents_m(&self) -> Vec3 {
        Vec3::new(self.width, self.height, self.length) * (0.5 / CM_PER_M)
    }
}

/// Trait for objects with box-shaped extent.
pub trait Dimensional {
    /// Returns the dimensions of the object in centimeters.
    fn dimensions(&self) -> Dimensions;

    /// Volume of one unit in cubic meters.
    fn volume_m3(&self) -> f64 {
        self.dimensions().volume_m3()
    }
}

/// Axis-aligned bounding box in output space (meters).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoundingBox {
    /// Minimum corner
    pub min: Vec3,
    /// Maximum corner
    pub max: Vec3,
}

impl BoundingBox {
    /// Creates a bounding box from its center point and full size.
    #[inline]
    pub fn from_center_and_size(center: Vec3, size: Vec3) -> Self {
        let half = size * 0.5;
        Self {
            min: center - half,
            max: center + half,
        }
    }

    /// Checks if two bounding boxes overlap with positive volume.
    ///
    /// Touching faces do not count as an intersection.
    #[cfg(test)]
    pub fn intersects(&self, other: &Self, tolerance: f64) -> bool {
        !(self.max.x <= other.min.x + tolerance
            || other.max.x <= self.min.x + tolerance
            || self.max.y <= other.min.y + tolerance
            || other.max.y <= self.min.y + tolerance
            || self.max.z <= other.min.z + tolerance
            || other.max.z <= self.min.z + tolerance)
    }

    /// Checks if this box lies inside the symmetric box `[-half, +half]`.
    #[inline]
    pub fn within_half_extents(&self, half: Vec3, tolerance: f64) -> bool {
        self.min.x >= -half.x - tolerance
            && self.min.y >= -half.y - tolerance
            && self.min.z >= -half.z - tolerance
            && self.max.x <= half.x + tolerance
            && self.max.y <= half.y + tolerance
            && self.max.z <= half.z + tolerance
    }
}

/// Validation helpers shared by items and container types.
pub mod validation {

    /// Validates a single dimension.
    ///
    /// # Returns
    /// `Ok(())` for positive finite values, otherwise error text
    pub fn validate_dimension(value: f64, name: &str) -> Result<(), String> {
        if value.is_nan() {
            return Err(format!("{} must not be NaN", name));
        }
        if value.is_infinite() {
            return Err(format!("{} must not be infinite", name));
        }
        if value <= 0.0 {
            return Err(format!("{} must be positive, got: {}", name, value));
        }
        Ok(())
    }

    /// Validates a weight or weight capacity.
    pub fn validate_weight(value: f64, name: &str) -> Result<(), String> {
        validate_dimension(value, name)
    }

    /// Checks for a `#RRGGBB` color string.
    pub fn is_hex_color(value: &str) -> bool {
        let Some(digits) = value.strip_prefix('#') else {
            return false;
        };
        digits.len() == 6 && digits.chars().all(|c| c.is_ascii_hexdigit())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vec3_operations() {
        let a = Vec3::new(1.0, 2.0, 3.0);
        let b = Vec3::new(4.0, 5.0, 6.0);

        assert_eq!(a + b, Vec3::new(5.0, 7.0, 9.0));
        assert_eq!(b - a, Vec3::new(3.0, 3.0, 3.0));
        assert_eq!(a * 2.0, Vec3::new(2.0, 4.0, 6.0));
    }

    #[test]
    fn test_dimensions_volume() {
        let dims = Dimensions::new(200.0, 150.0, 150.0);
        assert!((dims.volume_cm3() - 4_500_000.0).abs() < EPSILON_GENERAL);
        assert!((dims.volume_m3() - 4.5).abs() < EPSILON_GENERAL);
    }

    #[test]
    fn test_dimensions_validity() {
        assert!(Dimensions::new(1.0, 1.0, 1.0).is_valid());
        assert!(!Dimensions::new(0.0, 1.0, 1.0).is_valid());
        assert!(!Dimensions::new(1.0, -1.0, 1.0).is_valid());
        assert!(!Dimensions::new(1.0, 1.0, f64::NAN).is_valid());
        assert!(!Dimensions::new(f64::INFINITY, 1.0, 1.0).is_valid());
    }

    #[test]
    fn test_half_extents_axis_mapping() {
        let half = Dimensions::new(589.8, 235.2, 239.0).half_extents_m();
        assert!((half.x - 1.176).abs() < EPSILON_GENERAL);
        assert!((half.y - 1.195).abs() < EPSILON_GENERAL);
        assert!((half.z - 2.949).abs() < EPSILON_GENERAL);
    }

    #[test]
    fn test_bounding_box_intersects() {
        let a = BoundingBox::from_center_and_size(Vec3::new(0.0, 0.0, 0.0), Vec3::new(1.0, 1.0, 1.0));
        let touching =
            BoundingBox::from_center_and_size(Vec3::new(1.0, 0.0, 0.0), Vec3::new(1.0, 1.0, 1.0));
        let overlapping =
            BoundingBox::from_center_and_size(Vec3::new(0.5, 0.5, 0.0), Vec3::new(1.0, 1.0, 1.0));

        assert!(!a.intersects(&touching, EPSILON_GENERAL));
        assert!(a.intersects(&overlapping, EPSILON_GENERAL));
    }

    #[test]
    fn test_bounding_box_within_half_extents() {
        let inner = BoundingBox::from_center_and_size(Vec3::new(0.0, 0.0, 0.0), Vec3::new(2.0, 2.0, 2.0));
        assert!(inner.within_half_extents(Vec3::new(1.0, 1.0, 1.0), EPSILON_GENERAL));
        assert!(!inner.within_half_extents(Vec3::new(0.9, 1.0, 1.0), EPSILON_GENERAL));
    }

    #[test]
    fn test_validation_dimension() {
        assert!(validation::validate_dimension(10.0, "Length").is_ok());
        assert!(validation::validate_dimension(0.0, "Length").is_err());
        assert!(validation::validate_dimension(-1.0, "Length").is_err());
        assert!(validation::validate_dimension(f64::NAN, "Length").is_err());
        assert!(validation::validate_dimension(f64::INFINITY, "Length").is_err());
    }

    #[test]
    fn test_hex_color() {
        assert!(validation::is_hex_color("#FF5733"));
        assert!(validation::is_hex_color("#a1b2c3"));
        assert!(!validation::is_hex_color("FF5733"));
        assert!(!validation::is_hex_color("#FF573"));
        assert!(!validation::is_hex_color("#GG5733"));
    }
}
