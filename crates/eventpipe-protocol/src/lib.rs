//! Wire codec for event-stream messages: the body and header encodings,
//! decode contract, and the small set of types they share with the
//! producer and the forwarders. See SPEC_FULL.md §4.1.

mod cache_key;
mod decode;
mod encode;
mod error;
mod headers;
mod types;
mod version;

pub use cache_key::cache_key_for_event;
pub use decode::{decode, RawMessage};
pub use encode::{encode_body, encode_headers, InsertPayload};
pub use error::DecodeError;
pub use headers::{names as header_names, MessageHeaders};
pub use types::{DecodeOutcome, EventData, GroupState, SkipReason, TaskInput, TaskState};
pub use version::Version;
