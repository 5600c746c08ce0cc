use crate::domain::model::{Coordinates, Location};
use crate::domain::ports::LocationStore;
use crate::utils::error::Result;
use std::sync::Arc;

#[derive(Clone)]
pub struct CoordinateResolver {
    store: Arc<dyn LocationStore>,
}

impl CoordinateResolver {
    pub fn new(store: Arc<dyn LocationStore>) -> Self {
        Self { store }
    }

    pub async fn get_coordinates(&self, id: &str) -> Result<Coordinates> {
        Ok(self.store.get_location(id).await?.coordinates)
    }

    /// Looks up origin and destination concurrently. The first failure wins
    /// and the other lookup is dropped.
    pub async fn resolve_pair(&self, origin_id: &str, destination_id: &str) -> Result<(Location, Location)> {
        tokio::try_join!(
            self.store.get_location(origin_id),
            self.store.get_location(destination_id)
        )
    }
}
