mod candidate;
mod coordinates;
mod review;
mod shop;

pub use candidate::{Candidate, RankedCandidate};
pub use coordinates::Coordinates;
pub use review::{Review, ReviewAuthor, ShopDetail};
pub use shop::{Mechanic, Shop, ShopPhoto};
