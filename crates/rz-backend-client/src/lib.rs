pub mod catalog;
pub mod client;
pub mod error;
pub mod session;
pub mod transport;

pub use catalog::HttpCatalogSource;
pub use client::{BackendClient, idempotency_key};
pub use error::BackendError;
pub use session::Session;
pub use transport::{ApiRequest, HttpTransport, Method, Transport};

#[cfg(test)]
pub(crate) mod test_support;
