pub mod schema;
pub mod http;

pub use schema::{ExtractRequest, ExtractResponse, ModelCatalog, ModelInfo, OrderedMap};
pub use http::HttpBackend;

use anyhow::Result;
use std::future::Future;

/// The two backend endpoints the extraction page talks to.
pub trait Backend: Send + Sync {
    /// Read the model catalog (`GET /api/models`)
    fn list_models(&self) -> impl Future<Output = Result<ModelCatalog>> + Send;

    /// Run extraction over `request.text` (`POST /api/extract`)
    fn extract(&self, request: &ExtractRequest) -> impl Future<Output = Result<ExtractResponse>> + Send;
}
