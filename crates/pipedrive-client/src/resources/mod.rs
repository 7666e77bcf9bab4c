/*
[INPUT]:  PipedriveClient session and resource-specific parameters
[OUTPUT]: Resource handles mapping verbs and paths onto the core client
[POS]:    Resource layer - thin per-resource wrappers
[UPDATE]: When adding wrappers for new API resources
*/

pub mod persons;

pub use persons::Persons;
