use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{postgres::PgPoolOptions, postgres::PgRow, Executor, Pool, Postgres, Row};
use uuid::Uuid;

use crate::{
    entities::{Coordinates, Mechanic, Review, ReviewAuthor, Shop, ShopPhoto},
    error::{unexpected_error, Error},
};

/// Read access to the shop catalog.
#[async_trait]
pub trait ShopStore: Send + Sync {
    async fn list_shops(&self) -> Result<Vec<Shop>, Error>;

    /// Shops whose name contains `query`, ignoring case.
    async fn search_shops(&self, query: &str) -> Result<Vec<Shop>, Error>;

    /// A single shop with its photos and mechanics.
    async fn find_shop(&self, id: Uuid) -> Result<Option<Shop>, Error>;

    async fn list_reviews(&self, shop_id: Uuid) -> Result<Vec<Review>, Error>;
}

pub struct PgStore {
    pool: Pool<Postgres>,
}

impl PgStore {
    #[tracing::instrument(name = "PgStore::new", skip(db_uri))]
    pub async fn new(db_uri: &str, max_connections: u32) -> Result<Self, Error> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(db_uri)
            .await?;

        pool.execute("CREATE TABLE IF NOT EXISTS shops (id UUID PRIMARY KEY, name VARCHAR NOT NULL, description TEXT NOT NULL DEFAULT '', address TEXT, latitude DOUBLE PRECISION NOT NULL, longitude DOUBLE PRECISION NOT NULL, whatsapp_number VARCHAR NOT NULL, created_at TIMESTAMPTZ NOT NULL DEFAULT now(), updated_at TIMESTAMPTZ NOT NULL DEFAULT now())")
            .await?;
        pool.execute("CREATE TABLE IF NOT EXISTS shop_photos (id UUID PRIMARY KEY, shop_id UUID NOT NULL REFERENCES shops(id) ON DELETE CASCADE, photo_url TEXT NOT NULL, display_order INT4 NOT NULL DEFAULT 0)")
            .await?;
        pool.execute("CREATE TABLE IF NOT EXISTS mechanics (id UUID PRIMARY KEY, shop_id UUID NOT NULL REFERENCES shops(id) ON DELETE CASCADE, name VARCHAR NOT NULL, specialty VARCHAR)")
            .await?;
        pool.execute("CREATE TABLE IF NOT EXISTS profiles (id UUID PRIMARY KEY, full_name VARCHAR NOT NULL DEFAULT '', email VARCHAR NOT NULL DEFAULT '')")
            .await?;
        pool.execute("CREATE TABLE IF NOT EXISTS reviews (id UUID PRIMARY KEY, shop_id UUID NOT NULL REFERENCES shops(id) ON DELETE CASCADE, user_id UUID NOT NULL, rating INT4 NOT NULL, comment TEXT NOT NULL DEFAULT '', created_at TIMESTAMPTZ NOT NULL DEFAULT now())")
            .await?;

        Ok(Self { pool })
    }
}

const SHOP_COLUMNS: &str =
    "id, name, description, address, latitude, longitude, whatsapp_number, created_at, updated_at";

fn shop_from_row(row: &PgRow) -> Result<Shop, Error> {
    Ok(Shop {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        description: row.try_get("description")?,
        address: row.try_get("address")?,
        coordinates: Coordinates::new(row.try_get("latitude")?, row.try_get("longitude")?),
        whatsapp_number: row.try_get("whatsapp_number")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
        photos: vec![],
        mechanics: vec![],
    })
}

/// Escapes LIKE wildcards so the query matches literally.
fn like_pattern(query: &str) -> String {
    let escaped = query
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

#[async_trait]
impl ShopStore for PgStore {
    #[tracing::instrument(skip(self))]
    async fn list_shops(&self) -> Result<Vec<Shop>, Error> {
        let mut conn = self.pool.acquire().await?;

        let rows = conn
            .fetch_all(sqlx::query(&format!(
                "SELECT {} FROM shops ORDER BY created_at ASC",
                SHOP_COLUMNS
            )))
            .await?;

        rows.iter().map(shop_from_row).collect()
    }

    #[tracing::instrument(skip(self))]
    async fn search_shops(&self, query: &str) -> Result<Vec<Shop>, Error> {
        let mut conn = self.pool.acquire().await?;

        let rows = conn
            .fetch_all(
                sqlx::query(&format!(
                    "SELECT {} FROM shops WHERE name ILIKE $1 ORDER BY name ASC",
                    SHOP_COLUMNS
                ))
                .bind(like_pattern(query)),
            )
            .await?;

        rows.iter().map(shop_from_row).collect()
    }

    #[tracing::instrument(skip(self))]
    async fn find_shop(&self, id: Uuid) -> Result<Option<Shop>, Error> {
        let mut conn = self.pool.acquire().await?;

        let maybe_row = conn
            .fetch_optional(
                sqlx::query(&format!("SELECT {} FROM shops WHERE id = $1", SHOP_COLUMNS))
                    .bind(&id),
            )
            .await?;

        let mut shop = match maybe_row {
            Some(row) => shop_from_row(&row)?,
            None => return Ok(None),
        };

        let photo_rows = conn
            .fetch_all(
                sqlx::query("SELECT id, shop_id, photo_url, display_order FROM shop_photos WHERE shop_id = $1 ORDER BY display_order ASC")
                    .bind(&id),
            )
            .await?;

        for row in photo_rows.iter() {
            shop.photos.push(ShopPhoto {
                id: row.try_get("id")?,
                shop_id: row.try_get("shop_id")?,
                photo_url: row.try_get("photo_url")?,
                display_order: row.try_get("display_order")?,
            });
        }

        let mechanic_rows = conn
            .fetch_all(
                sqlx::query("SELECT id, shop_id, name, specialty FROM mechanics WHERE shop_id = $1 ORDER BY name ASC")
                    .bind(&id),
            )
            .await?;

        for row in mechanic_rows.iter() {
            shop.mechanics.push(Mechanic {
                id: row.try_get("id")?,
                shop_id: row.try_get("shop_id")?,
                name: row.try_get("name")?,
                specialty: row.try_get("specialty")?,
            });
        }

        Ok(Some(shop))
    }

    #[tracing::instrument(skip(self))]
    async fn list_reviews(&self, shop_id: Uuid) -> Result<Vec<Review>, Error> {
        let query = "
            SELECT
                r.id, r.shop_id, r.user_id, r.rating, r.comment, r.created_at,
                p.full_name, p.email
            FROM
                reviews r
                LEFT JOIN profiles p ON p.id = r.user_id
            WHERE
                r.shop_id = $1
            ORDER BY
                r.created_at DESC
        ";

        let mut conn = self.pool.acquire().await?;
        let rows = conn.fetch_all(sqlx::query(query).bind(&shop_id)).await?;

        let mut reviews = vec![];

        for row in rows.iter() {
            let full_name: Option<String> = row.try_get("full_name")?;
            let email: Option<String> = row.try_get("email")?;
            let created_at: DateTime<Utc> = row.try_get("created_at")?;

            reviews.push(Review {
                id: row.try_get("id")?,
                shop_id: row.try_get("shop_id")?,
                user_id: row.try_get("user_id")?,
                rating: row.try_get("rating")?,
                comment: row.try_get("comment")?,
                created_at,
                user: match (full_name, email) {
                    (Some(full_name), Some(email)) => Some(ReviewAuthor { full_name, email }),
                    _ => None,
                },
            });
        }

        Ok(reviews)
    }
}

/// Catalog kept in process memory, used when no database is configured.
#[derive(Default)]
pub struct MemoryStore {
    shops: RwLock<Vec<Shop>>,
    reviews: RwLock<HashMap<Uuid, Vec<Review>>>,
}

impl MemoryStore {
    pub fn new(shops: Vec<Shop>) -> Self {
        Self {
            shops: RwLock::new(shops),
            reviews: RwLock::new(HashMap::new()),
        }
    }

    /// Three demo shops around central Jakarta.
    pub fn seeded() -> Self {
        let mut jaya = Shop::new(
            "Bengkel Motor Jaya",
            "Bengkel motor terpercaya sejak 2010. Spesialis Honda dan Yamaha.",
            Coordinates::new(-6.2088, 106.8456),
            "6281234567890",
        );
        jaya.mechanics.push(Mechanic {
            id: Uuid::new_v4(),
            shop_id: jaya.id,
            name: "Pak Budi".into(),
            specialty: Some("Mesin".into()),
        });

        let sentosa = Shop::new(
            "Bengkel Sentosa Motor",
            "Servis cepat dan berkualitas. Buka 24 jam.",
            Coordinates::new(-6.2145, 106.8567),
            "6281234567891",
        );

        let mitra = Shop::new(
            "Bengkel Mitra Motor",
            "Spesialis ban dan oli. Harga terjangkau.",
            Coordinates::new(-6.2000, 106.8300),
            "6281234567892",
        );

        Self::new(vec![jaya, sentosa, mitra])
    }

    pub fn add_shop(&self, shop: Shop) -> Result<(), Error> {
        self.shops
            .write()
            .map_err(|_| unexpected_error())?
            .push(shop);
        Ok(())
    }

    pub fn add_review(&self, review: Review) -> Result<(), Error> {
        self.reviews
            .write()
            .map_err(|_| unexpected_error())?
            .entry(review.shop_id)
            .or_default()
            .push(review);
        Ok(())
    }
}

#[async_trait]
impl ShopStore for MemoryStore {
    async fn list_shops(&self) -> Result<Vec<Shop>, Error> {
        let shops = self.shops.read().map_err(|_| unexpected_error())?;

        Ok(shops
            .iter()
            .cloned()
            .map(|mut shop| {
                shop.photos.clear();
                shop.mechanics.clear();
                shop
            })
            .collect())
    }

    async fn search_shops(&self, query: &str) -> Result<Vec<Shop>, Error> {
        let needle = query.to_lowercase();

        Ok(self
            .list_shops()
            .await?
            .into_iter()
            .filter(|shop| shop.name.to_lowercase().contains(&needle))
            .collect())
    }

    async fn find_shop(&self, id: Uuid) -> Result<Option<Shop>, Error> {
        let shops = self.shops.read().map_err(|_| unexpected_error())?;

        Ok(shops.iter().find(|shop| shop.id == id).cloned())
    }

    async fn list_reviews(&self, shop_id: Uuid) -> Result<Vec<Review>, Error> {
        let reviews = self.reviews.read().map_err(|_| unexpected_error())?;

        Ok(reviews.get(&shop_id).cloned().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn memory_search_ignores_case() {
        let store = MemoryStore::seeded();

        let shops = store.search_shops("SENTOSA").await.unwrap();
        assert_eq!(shops.len(), 1);
        assert_eq!(shops[0].name, "Bengkel Sentosa Motor");

        assert_eq!(store.search_shops("bengkel").await.unwrap().len(), 3);
        assert!(store.search_shops("mobil").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn memory_find_includes_mechanics_but_listing_does_not() {
        let store = MemoryStore::seeded();
        let listed = store.list_shops().await.unwrap();
        let jaya = listed.iter().find(|s| s.name == "Bengkel Motor Jaya").unwrap();
        assert!(jaya.mechanics.is_empty());

        let found = store.find_shop(jaya.id).await.unwrap().unwrap();
        assert_eq!(found.mechanics.len(), 1);
        assert!(store.find_shop(Uuid::new_v4()).await.unwrap().is_none());
    }

    #[test]
    fn like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("jaya"), "%jaya%");
        assert_eq!(like_pattern("50%_off"), "%50\\%\\_off%");
    }
}
