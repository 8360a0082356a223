pub mod catalog;
pub mod error;
pub mod jwt;
pub mod metrics;
pub mod pointer;
pub mod storage;

pub use catalog::{CatalogService, PublishMetadata};
pub use error::CatalogError;
pub use jwt::{AuthError, Claims, JwtService, TokenVerifier};
pub use pointer::PointerStore;
pub use storage::{LocalStorage, Storage};
