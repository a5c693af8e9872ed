//! Identifier resolution on top of the request builder.
//!
//! Both patterns answer with one slot per input, in input order. A unit that fails is logged
//! and becomes `None` in its slot instead of failing the whole call.

pub mod bulk;
pub mod channel;

pub use bulk::{BulkLookup, batches, reproject, unique_ids};
pub use channel::{ChannelResolver, channel_id_in_page, channel_id_in_url};
