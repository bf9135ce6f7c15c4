//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between the
//! client and the outside world. Adapters implement these ports.
//!
//! - `HttpTransport` - executes requests against the remote API

mod http_transport;

pub use http_transport::{
    ApiRequest, ApiResponse, HttpMethod, HttpTransport, TransportError, AUTHORIZATION,
    CONTENT_TYPE,
};
