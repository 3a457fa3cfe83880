pub mod client;
pub mod messages;

pub use client::{ConnectionState, StreamClient, TransportError};
pub use messages::{endpoint_url, ServerMessage};
