/*
[INPUT]:  Client configuration, method paths and request parameters
[OUTPUT]: Decoded response envelopes and typed errors
[POS]:    HTTP layer - REST API communication
[UPDATE]: When changing request construction, encoding, or response handling
*/

pub mod backoff;
pub mod client;
pub mod endpoint;
pub mod error;
pub mod headers;
pub mod payload;
pub mod pipeline;
pub mod transport;

pub use backoff::{Sleeper, TokioSleeper};
pub use error::{PipedriveError, Result};
pub use headers::{HeaderMap, HeaderValue};
pub use payload::{FieldValue, FormField, Payload};
pub use transport::{HttpTransport, PreparedRequest, RawResponse, Transport};

pub use client::PipedriveClient;
