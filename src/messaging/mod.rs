pub mod batch;
pub mod client;
pub mod error;
pub mod message;
pub mod result;
