pub mod client;

pub use client::{JsonClient, SECRET_HEADER};
