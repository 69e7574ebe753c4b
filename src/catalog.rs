//! The fixed container catalog.
//!
//! Loaded once at process start (built-in or from a JSON file) and shared
//! read-only afterwards. Catalog order is significant: it drives the
//! tie-breaks of the container selection.

use std::collections::HashSet;
use std::path::Path;

use crate::model::{ContainerType, ValidationError};
use crate::types::Dimensions;

/// Errors raised while building or loading a catalog.
#[derive(Debug)]
pub enum CatalogError {
    Io(std::io::Error),
    Parse(serde_json::Error),
    InvalidEntry { index: usize, source: ValidationError },
    DuplicateName(String),
    Empty,
}

impl std::fmt::Display for CatalogError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CatalogError::Io(err) => write!(f, "Could not read catalog file: {}", err),
            CatalogError::Parse(err) => write!(f, "Could not parse catalog file: {}", err),
            CatalogError::InvalidEntry { index, source } => {
                write!(f, "Catalog entry {} is invalid: {}", index, source)
            }
            CatalogError::DuplicateName(name) => {
                write!(f, "Catalog contains '{}' more than once", name)
            }
            CatalogError::Empty => write!(f, "Catalog must contain at least one container"),
        }
    }
}

impl std::error::Error for CatalogError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CatalogError::Io(err) => Some(err),
            CatalogError::Parse(err) => Some(err),
            CatalogError::InvalidEntry { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<std::io::Error> for CatalogError {
    fn from(err: std::io::Error) -> Self {
        CatalogError::Io(err)
    }
}

impl From<serde_json::Error> for CatalogError {
    fn from(err: serde_json::Error) -> Self {
        CatalogError::Parse(err)
    }
}

/// Ordered, validated set of container types with unique names.
#[derive(Clone, Debug, PartialEq)]
pub struct Catalog {
    containers: Vec<ContainerType>,
}

impl Catalog {
    /// Builds a catalog, validating every entry and name uniqueness.
    pub fn new(containers: Vec<ContainerType>) -> Result<Self, CatalogError> {
        if containers.is_empty() {
            return Err(CatalogError::Empty);
        }
        let mut seen = HashSet::new();
        for (index, container) in containers.iter().enumerate() {
            container
                .validate()
                .map_err(|source| CatalogError::InvalidEntry { index, source })?;
            if !seen.insert(container.name.as_str()) {
                return Err(CatalogError::DuplicateName(container.name.clone()));
            }
        }
        Ok(Self { containers })
    }

    /// The standard ISO dry containers: 20ft, 40ft and 40ft High Cube.
    pub fn standard() -> Self {
        let containers = vec![
            ContainerType {
                name: "20ft Standard".to_string(),
                cbm: 33.2,
                max_weight: 28200.0,
                dimensions: Dimensions::new(589.8, 235.2, 239.0),
            },
            ContainerType {
                name: "40ft Standard".to_string(),
                cbm: 67.7,
                max_weight: 28700.0,
                dimensions: Dimensions::new(1203.2, 235.2, 239.0),
            },
            ContainerType {
                name: "40ft High Cube".to_string(),
                cbm: 76.4,
                max_weight: 29700.0,
                dimensions: Dimensions::new(1203.2, 235.2, 269.8),
            },
        ];
        Self { containers }
    }

    /// Parses a JSON array of container types.
    pub fn from_json_str(raw: &str) -> Result<Self, CatalogError> {
        let containers: Vec<ContainerType> = serde_json::from_str(raw)?;
        Self::new(containers)
    }

    /// Reads a JSON catalog file.
    pub fn from_json_file(path: &Path) -> Result<Self, CatalogError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    /// Containers in catalog order.
    pub fn containers(&self) -> &[ContainerType] {
        &self.containers
    }

    pub fn len(&self) -> usize {
        self.containers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.containers.is_empty()
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn standard_catalog_is_valid_and_ordered() {
        let catalog = Catalog::standard();
        let rebuilt = Catalog::new(catalog.containers().to_vec()).expect("standard must validate");
        assert_eq!(rebuilt, catalog);
        let names: Vec<_> = catalog.containers().iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["20ft Standard", "40ft Standard", "40ft High Cube"]);
    }

    #[test]
    fn rejects_empty_and_duplicate_catalogs() {
        assert!(matches!(Catalog::new(Vec::new()), Err(CatalogError::Empty)));

        let mut containers = Catalog::standard().containers().to_vec();
        containers.push(containers[0].clone());
        assert!(matches!(
            Catalog::new(containers),
            Err(CatalogError::DuplicateName(name)) if name == "20ft Standard"
        ));
    }

    #[test]
    fn rejects_invalid_entry_with_index() {
        let raw = r#"[
            {"name": "ok", "cbm": 1.0, "weight": 10.0,
             "dimensions": {"length": 100.0, "width": 100.0, "height": 100.0}},
            {"name": "broken", "cbm": -1.0, "weight": 10.0,
             "dimensions": {"length": 100.0, "width": 100.0, "height": 100.0}}
        ]"#;
        assert!(matches!(
            Catalog::from_json_str(raw),
            Err(CatalogError::InvalidEntry { index: 1, .. })
        ));
    }

    #[test]
    fn loads_catalog_from_file() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        write!(
            file,
            r#"[{{"name": "Pallet box", "cbm": 1.2, "max_weight": 800,
                 "dimensions": {{"length": 120, "width": 100, "height": 100}}}}]"#
        )
        .expect("write catalog");

        let catalog = Catalog::from_json_file(file.path()).expect("catalog should load");
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.containers()[0].name, "Pallet box");
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().expect("temp dir");
        let result = Catalog::from_json_file(&dir.path().join("missing.json"));
        assert!(matches!(result, Err(CatalogError::Io(_))));
    }
}
