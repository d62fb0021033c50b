pub mod comments;
pub mod error;
pub mod posts;
pub mod social;
pub mod tags;
pub mod users;

pub use error::{ApiError, ApiResult};
