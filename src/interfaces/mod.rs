//! Wire-format codecs for the external interfaces the agent consumes.

pub mod sse;
