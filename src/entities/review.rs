use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entities::Shop;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Review {
    pub id: Uuid,
    pub shop_id: Uuid,
    pub user_id: Uuid,
    pub rating: i32,
    pub comment: String,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<ReviewAuthor>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ReviewAuthor {
    pub full_name: String,
    pub email: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ShopDetail {
    #[serde(flatten)]
    pub shop: Shop,
    pub reviews: Vec<Review>,
    pub average_rating: f64,
    pub total_reviews: usize,
}

impl ShopDetail {
    /// Orders reviews newest first and derives the rating summary.
    pub fn new(shop: Shop, mut reviews: Vec<Review>) -> Self {
        reviews.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let total_reviews = reviews.len();
        let average_rating = match total_reviews {
            0 => 0.0,
            n => reviews.iter().map(|r| f64::from(r.rating)).sum::<f64>() / n as f64,
        };

        Self {
            shop,
            reviews,
            average_rating,
            total_reviews,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::Coordinates;
    use chrono::Duration;

    fn review(shop_id: Uuid, rating: i32, age_days: i64) -> Review {
        Review {
            id: Uuid::new_v4(),
            shop_id,
            user_id: Uuid::new_v4(),
            rating,
            comment: "".into(),
            created_at: Utc::now() - Duration::days(age_days),
            user: None,
        }
    }

    #[test]
    fn detail_without_reviews_has_zero_rating() {
        let shop = Shop::new("A", "", Coordinates::new(0.0, 0.0), "62");
        let detail = ShopDetail::new(shop, vec![]);

        assert_eq!(detail.total_reviews, 0);
        assert_eq!(detail.average_rating, 0.0);
    }

    #[test]
    fn detail_averages_and_orders_newest_first() {
        let shop = Shop::new("A", "", Coordinates::new(0.0, 0.0), "62");
        let reviews = vec![review(shop.id, 3, 5), review(shop.id, 4, 1), review(shop.id, 5, 3)];
        let detail = ShopDetail::new(shop, reviews);

        assert_eq!(detail.total_reviews, 3);
        assert!((detail.average_rating - 4.0).abs() < f64::EPSILON);
        let ratings: Vec<i32> = detail.reviews.iter().map(|r| r.rating).collect();
        assert_eq!(ratings, vec![4, 5, 3]);
    }
}
