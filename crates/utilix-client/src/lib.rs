pub mod client;
pub mod error;

pub use client::{LookupClient, LookupPayload, ParcelLookup};
pub use error::LookupError;
