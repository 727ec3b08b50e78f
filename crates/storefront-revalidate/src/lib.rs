pub mod client;
pub mod error;

pub use client::{RevalidateClient, RevalidationReceipt, WEBHOOK_PATH};
pub use error::RevalidateError;
