pub mod http_response_cache;
pub mod types;

pub use http_response_cache::HttpResponseCache;
pub use types::CachedHttpResponse;
