/*
[INPUT]:  Crate modules and public type definitions
[OUTPUT]: Public Pipedrive client crate surface
[POS]:    Crate root - module wiring
[UPDATE]: When public modules or exports change
*/

pub mod config;
pub mod http;
pub mod resources;
pub mod types;

pub use config::{ClientConfig, DEFAULT_BASE_URL};

// Re-export commonly used types from http
pub use http::{
    HeaderMap,
    HeaderValue,
    HttpTransport,
    Payload,
    PipedriveClient,
    PipedriveError,
    PreparedRequest,
    RawResponse,
    Result,
    Sleeper,
    TokioSleeper,
    Transport,
};

pub use resources::Persons;
pub use types::Envelope;
