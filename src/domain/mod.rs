//! Domain types for the stages service.

pub mod stage;

pub use stage::{decode_stages, encode_stages, Stage, StageMap, StagePayload};
