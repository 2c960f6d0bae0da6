//! Two-stage nearest shop ranking.
//!
//! Every shop is ranked by straight-line distance first. Only the nearest
//! [`ENRICHMENT_POOL_SIZE`] go on to the routing provider, and the best
//! [`RESULT_LIMIT`] by road distance are returned.

use std::sync::Arc;

use serde::Serialize;

use crate::{
    config::CredentialProvider,
    entities::{Coordinates, RankedCandidate, Shop},
    error::{invalid_location_error, rate_limited_error, Error},
    external::google_maps::RoutesClient,
    geo::sort_by_distance,
    rate_limit::{RateLimitStatus, RateLimiter},
};

pub const ENRICHMENT_POOL_SIZE: usize = 20;
pub const RESULT_LIMIT: usize = 10;

/// How a ranking is refined after the straight-line pass.
#[derive(Clone, PartialEq, Eq)]
pub enum RankingStrategy {
    Enriched { credential: String },
    StraightLine,
}

impl RankingStrategy {
    pub fn select(credentials: &dyn CredentialProvider) -> Self {
        match credentials.routing_credential() {
            Some(credential) => Self::Enriched { credential },
            None => Self::StraightLine,
        }
    }
}

impl std::fmt::Debug for RankingStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Enriched { .. } => f.write_str("Enriched"),
            Self::StraightLine => f.write_str("StraightLine"),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RankingMode {
    Road,
    StraightLine,
}

#[derive(Clone, Debug)]
pub struct Ranking {
    pub candidates: Vec<RankedCandidate>,
    pub mode: RankingMode,
    pub quota: RateLimitStatus,
}

pub struct Ranker {
    limiter: Arc<RateLimiter>,
    routes: RoutesClient,
    credentials: Arc<dyn CredentialProvider>,
}

impl Ranker {
    pub fn new(
        limiter: Arc<RateLimiter>,
        routes: RoutesClient,
        credentials: Arc<dyn CredentialProvider>,
    ) -> Self {
        Self {
            limiter,
            routes,
            credentials,
        }
    }

    pub fn limiter(&self) -> &Arc<RateLimiter> {
        &self.limiter
    }

    #[tracing::instrument(skip(self, pool), fields(pool = pool.len()))]
    pub async fn rank_nearby(
        &self,
        origin: Coordinates,
        pool: Vec<Shop>,
        caller: &str,
    ) -> Result<Ranking, Error> {
        if !origin.is_valid() {
            return Err(invalid_location_error());
        }

        let mut nearest = sort_by_distance(origin, pool);
        nearest.truncate(ENRICHMENT_POOL_SIZE);

        let quota = self.limiter.check(caller);
        if !quota.allowed {
            tracing::info!(caller, "routing quota exhausted");
            return Err(rate_limited_error(quota.remaining, quota.reset_after));
        }

        match RankingStrategy::select(self.credentials.as_ref()) {
            RankingStrategy::StraightLine => {
                tracing::warn!("routing credential not configured, using straight-line distance");

                let candidates = nearest
                    .into_iter()
                    .take(RESULT_LIMIT)
                    .map(RankedCandidate::straight_line)
                    .collect();

                Ok(Ranking {
                    candidates,
                    mode: RankingMode::StraightLine,
                    quota,
                })
            }
            RankingStrategy::Enriched { credential } => {
                let candidates = self
                    .routes
                    .enrich_routes(origin, nearest, &credential, RESULT_LIMIT)
                    .await?;

                Ok(Ranking {
                    candidates,
                    mode: RankingMode::Road,
                    quota,
                })
            }
        }
    }
}
