pub mod connection;
pub mod games;
pub mod history;
pub mod kill_events;
pub mod models;
pub mod setup;
pub mod users;

#[cfg(test)]
pub(crate) mod testing;

pub use connection::{DbConn, DbPool, create_pool, get_connection, ping};
pub use history::SqliteHistoryOracle;
pub use models::*;
