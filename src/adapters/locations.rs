use crate::domain::model::{Coordinates, Location, LocationCategory};
use crate::domain::ports::LocationStore;
use crate::utils::error::{FareError, Result};
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

#[derive(Debug, Clone, Default)]
pub struct InMemoryLocationStore {
    locations: HashMap<String, Location>,
}

impl InMemoryLocationStore {
    pub fn from_locations(locations: impl IntoIterator<Item = Location>) -> Self {
        Self {
            locations: locations
                .into_iter()
                .map(|location| (location.id.clone(), location))
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.locations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }
}

#[async_trait]
impl LocationStore for InMemoryLocationStore {
    async fn get_location(&self, id: &str) -> Result<Location> {
        self.locations
            .get(id)
            .cloned()
            .ok_or_else(|| FareError::LocationNotFound { id: id.to_string() })
    }
}

#[derive(Debug, Deserialize)]
struct CatalogRow {
    id: String,
    name: String,
    category: LocationCategory,
    latitude: Option<f64>,
    longitude: Option<f64>,
    barangay: Option<String>,
    is_active: Option<bool>,
}

/// Loads a location catalog exported as CSV with the header
/// `id,name,category,latitude,longitude,barangay,is_active`.
pub struct CsvLocationCatalog;

impl CsvLocationCatalog {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<InMemoryLocationStore> {
        let file = std::fs::File::open(&path).map_err(|e| FareError::LocationStoreError {
            message: format!("cannot open catalog {}: {}", path.as_ref().display(), e),
        })?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<InMemoryLocationStore> {
        let mut csv_reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
        let mut locations = Vec::new();

        for row in csv_reader.deserialize() {
            let row: CatalogRow = row?;

            if !row.is_active.unwrap_or(true) {
                tracing::debug!("Skipping inactive location {} ({})", row.id, row.name);
                continue;
            }

            let (Some(latitude), Some(longitude)) = (row.latitude, row.longitude) else {
                tracing::warn!(
                    "⚠️ Location {} ({}) has no coordinates and cannot be priced",
                    row.id,
                    row.name
                );
                continue;
            };

            locations.push(Location {
                id: row.id,
                name: row.name,
                category: row.category,
                coordinates: Coordinates::new(latitude, longitude),
                barangay: row.barangay.filter(|b| !b.is_empty()),
            });
        }

        tracing::info!("📍 Loaded {} locations from catalog", locations.len());
        Ok(InMemoryLocationStore::from_locations(locations))
    }
}
