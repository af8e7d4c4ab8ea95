pub mod models;

pub use models::{
    DEFAULT_RATING, EducationType, GameId, GroupName, MatchedPair, PlayerId, PlayerProfile,
    ProfileError, QueueEntry, Role,
};
