mod emergency_api;
mod shop_api;

use std::sync::Arc;

use crate::{api::API, db::ShopStore, ranking::Ranker};

pub struct Engine {
    store: Arc<dyn ShopStore>,
    ranker: Ranker,
}

impl Engine {
    pub fn new(store: Arc<dyn ShopStore>, ranker: Ranker) -> Self {
        Self { store, ranker }
    }
}

impl API for Engine {}
