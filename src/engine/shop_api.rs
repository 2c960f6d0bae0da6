use super::Engine;

use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    api::ShopAPI,
    entities::{Candidate, Coordinates, ShopDetail},
    error::{invalid_input_error, invalid_location_error, not_found_error, Error},
    geo::sort_by_distance,
};

pub const MIN_QUERY_LEN: usize = 2;

#[async_trait]
impl ShopAPI for Engine {
    #[tracing::instrument(skip(self))]
    async fn nearby_shops(&self, origin: Coordinates) -> Result<Vec<Candidate>, Error> {
        if !origin.is_valid() {
            return Err(invalid_location_error());
        }

        let shops = self.store.list_shops().await?;

        Ok(sort_by_distance(origin, shops))
    }

    #[tracing::instrument(skip(self))]
    async fn search_shops(
        &self,
        query: String,
        origin: Option<Coordinates>,
    ) -> Result<Vec<Candidate>, Error> {
        let query = query.trim();
        if query.chars().count() < MIN_QUERY_LEN {
            return Err(invalid_input_error(
                "query must be at least 2 characters long",
            ));
        }

        let shops = self.store.search_shops(query).await?;

        // an unusable location only disables sorting
        match origin.filter(Coordinates::is_valid) {
            Some(origin) => Ok(sort_by_distance(origin, shops)),
            None => Ok(shops.into_iter().map(Candidate::from).collect()),
        }
    }

    #[tracing::instrument(skip(self))]
    async fn find_shop(&self, id: Uuid) -> Result<ShopDetail, Error> {
        let shop = self
            .store
            .find_shop(id)
            .await?
            .ok_or_else(not_found_error)?;

        let reviews = match self.store.list_reviews(id).await {
            Ok(reviews) => reviews,
            Err(err) => {
                tracing::error!(shop_id = %id, error = %err, "failed to load reviews");
                vec![]
            }
        };

        Ok(ShopDetail::new(shop, reviews))
    }
}
