pub mod coin_input;
pub mod dto;
pub mod hex_bytes;
pub mod models;
pub mod stage;
pub mod units;

pub use hex_bytes::Bytes;
