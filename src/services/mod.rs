pub mod inspect;
pub mod queues;
pub mod server;
