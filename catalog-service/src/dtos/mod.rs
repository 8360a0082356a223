pub mod catalog;

pub use catalog::{MessageResponse, PublishForm, PublishResponse, VerifyResponse};
