//! Gateway to the site API and the client-side resource stores
//!
//! [`gateway::ApiGateway`] is the single seam to the network;
//! [`endpoints`] holds one typed call per endpoint; and
//! [`repositories::ResourceStore`] keeps a resource list reconciled with
//! server responses.

pub mod endpoints;
pub mod error;
#[cfg(any(test, feature = "test-util"))]
pub mod fake;
pub mod gateway;
pub mod models;
pub mod repositories;

pub use error::{ApiError, ApiResult, ErrorKind};
pub use gateway::{ApiGateway, ApiRequest, HttpGateway, RequestBody, UploadFile};
pub use repositories::{Confirm, Confirmed, Creatable, Resource, ResourceKind, ResourceStore};
