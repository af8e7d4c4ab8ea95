pub mod client;
pub mod worker;

pub use client::OrchestratorClient;
pub use worker::{DeadLetter, DeadLetters, DeliveryQueue, DeliveryWorker, delivery_channel};
