pub mod engine;
pub mod oracle;
pub mod pool;
pub mod scoring;

#[cfg(test)]
pub(crate) mod testing;

pub use engine::{MatchingEngine, PlayerQueueStatus, QueueSizes, QueueSnapshot};
pub use oracle::{HistoryOracle, QueueCandidates, RecentPairs};
pub use pool::Pool;
pub use scoring::rate_player_pair;
