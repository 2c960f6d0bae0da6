use async_trait::async_trait;
use uuid::Uuid;

use crate::entities::{Candidate, Coordinates, ShopDetail};
use crate::error::Error;
use crate::ranking::Ranking;

#[async_trait]
pub trait ShopAPI {
    async fn nearby_shops(&self, origin: Coordinates) -> Result<Vec<Candidate>, Error>;

    async fn search_shops(
        &self,
        query: String,
        origin: Option<Coordinates>,
    ) -> Result<Vec<Candidate>, Error>;

    async fn find_shop(&self, id: Uuid) -> Result<ShopDetail, Error>;
}

#[async_trait]
pub trait EmergencyAPI {
    async fn rank_nearby(&self, origin: Coordinates, caller: String) -> Result<Ranking, Error>;
}

pub trait API: ShopAPI + EmergencyAPI {}
