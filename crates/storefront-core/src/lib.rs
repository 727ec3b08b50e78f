pub mod app_config;
pub mod config;
pub mod error;
pub mod normalize;
pub mod products;
pub mod revalidation;

pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use error::{ConfigError, FieldIssue, ValidationError};
pub use normalize::{normalize_product, parse_product, read_product, PLACEHOLDER_IMAGE};
pub use products::{CanonicalProduct, StoredProductRecord};
pub use revalidation::{
    product_path, EventType, RevalidationEvent, RevalidationPlan, HOME_PATH,
    PRODUCTS_PATH, PRODUCTS_TAG,
};
