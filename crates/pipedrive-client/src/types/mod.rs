/*
[INPUT]:  Decoded API responses
[OUTPUT]: Envelope type shared by all endpoints
[POS]:    Data layer - type definitions for API communication
[UPDATE]: When new shared response types are added
*/

pub mod envelope;

pub use envelope::Envelope;
