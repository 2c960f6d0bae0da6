use super::Engine;

use async_trait::async_trait;

use crate::{
    api::EmergencyAPI,
    entities::Coordinates,
    error::{invalid_location_error, Error},
    ranking::Ranking,
};

#[async_trait]
impl EmergencyAPI for Engine {
    #[tracing::instrument(skip(self))]
    async fn rank_nearby(&self, origin: Coordinates, caller: String) -> Result<Ranking, Error> {
        if !origin.is_valid() {
            return Err(invalid_location_error());
        }

        let pool = self.store.list_shops().await?;

        self.ranker.rank_nearby(origin, pool, &caller).await
    }
}
