pub mod sse;

pub use sse::{DONE_SENTINEL, RelayEvent, relay_events};
