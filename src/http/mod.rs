pub mod client;
pub mod method;
pub mod mock;
pub mod request;
pub mod response;
pub mod transport;

pub use client::GraphApiClient;
pub use method::HttpMethod;
pub use transport::{ReqwestTransport, Transport};
