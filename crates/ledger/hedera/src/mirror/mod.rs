//! Mirror node REST access.

mod client;
mod types;

pub use client::MirrorIndexReader;
pub use types::{Links, MessagesResponse, MirrorMessage};
