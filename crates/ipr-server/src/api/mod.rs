//! API layer: shared response envelopes

pub mod response;
