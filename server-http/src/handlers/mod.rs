pub mod cache_ops;
pub mod health;

pub use cache_ops::{get_resource, invalidate_resource};
pub use health::health_check;
