use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub type PlayerId = u64;
pub type GameId = i64;

pub const MIN_RATING: i32 = 0;
pub const MAX_RATING: i32 = 3000;
pub const DEFAULT_RATING: i32 = 1200;
pub const MIN_COURSE: i32 = 1;
pub const MAX_COURSE: i32 = 6;

/// Type of education program the player is enrolled in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", from = "String")]
pub enum EducationType {
    #[default]
    Undefined,
    Bachelor,
    Master,
    Specialist,
    Other,
}

impl EducationType {
    /// Lenient parser: accepts English names and the labels stored by the bot
    pub fn parse(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "bachelor" | "бакалавр" => EducationType::Bachelor,
            "master" | "магистр" => EducationType::Master,
            "specialist" | "специалитет" => EducationType::Specialist,
            "other" | "иное" => EducationType::Other,
            _ => EducationType::Undefined,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EducationType::Undefined => "undefined",
            EducationType::Bachelor => "bachelor",
            EducationType::Master => "master",
            EducationType::Specialist => "specialist",
            EducationType::Other => "other",
        }
    }
}

impl From<String> for EducationType {
    fn from(value: String) -> Self {
        Self::parse(&value)
    }
}

impl fmt::Display for EducationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Academic group specialization
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", from = "String")]
pub enum GroupName {
    #[default]
    Undefined,
    Development,
    Ai,
    BusinessAnalytics,
}

impl GroupName {
    pub fn parse(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "development" | "разработка" => GroupName::Development,
            "ai" | "ии" | "искусственный интеллект" => GroupName::Ai,
            "business_analytics"
            | "business-analytics"
            | "business analytics"
            | "бизнес-аналитика" => GroupName::BusinessAnalytics,
            _ => GroupName::Undefined,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            GroupName::Undefined => "undefined",
            GroupName::Development => "development",
            GroupName::Ai => "ai",
            GroupName::BusinessAnalytics => "business_analytics",
        }
    }
}

impl From<String> for GroupName {
    fn from(value: String) -> Self {
        Self::parse(&value)
    }
}

impl fmt::Display for GroupName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProfileError {
    #[error("invalid player id: {0}")]
    InvalidId(PlayerId),
    #[error("rating {0} out of range [{}, {}]", MIN_RATING, MAX_RATING)]
    RatingOutOfRange(i32),
    #[error("education type is undefined")]
    UndefinedEducationType,
    #[error("course number {0} out of range [{}, {}]", MIN_COURSE, MAX_COURSE)]
    CourseOutOfRange(i32),
}

fn default_rating() -> i32 {
    DEFAULT_RATING
}

/// A player as seen by the matching engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerProfile {
    #[serde(alias = "tg_id")]
    pub id: PlayerId,
    #[serde(default = "default_rating")]
    pub rating: i32,
    #[serde(alias = "type", default)]
    pub education_type: EducationType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub course_number: Option<i32>,
    #[serde(default)]
    pub group_name: GroupName,
}

impl PlayerProfile {
    /// Builds a profile, replacing an out-of-range rating with the default and
    /// rejecting everything else that is invalid.
    pub fn new(
        id: PlayerId,
        rating: i32,
        education_type: EducationType,
        course_number: Option<i32>,
        group_name: GroupName,
    ) -> Result<Self, ProfileError> {
        Self {
            id,
            rating,
            education_type,
            course_number,
            group_name,
        }
        .normalized()
    }

    pub fn normalized(self) -> Result<Self, ProfileError> {
        let profile = self.with_default_rating();
        profile.validate()?;
        Ok(profile)
    }

    pub fn with_default_rating(mut self) -> Self {
        if !(MIN_RATING..=MAX_RATING).contains(&self.rating) {
            self.rating = DEFAULT_RATING;
        }
        self
    }

    pub fn validate(&self) -> Result<(), ProfileError> {
        if self.id == 0 {
            return Err(ProfileError::InvalidId(self.id));
        }
        if !(MIN_RATING..=MAX_RATING).contains(&self.rating) {
            return Err(ProfileError::RatingOutOfRange(self.rating));
        }
        if self.education_type == EducationType::Undefined {
            return Err(ProfileError::UndefinedEducationType);
        }
        if let Some(course) = self.course_number {
            if !(MIN_COURSE..=MAX_COURSE).contains(&course) {
                return Err(ProfileError::CourseOutOfRange(course));
            }
        }
        Ok(())
    }

    /// True only when both players have a course and it is the same one
    pub fn shares_course_with(&self, other: &PlayerProfile) -> bool {
        matches!((self.course_number, other.course_number), (Some(a), Some(b)) if a == b)
    }
}

impl fmt::Display for PlayerProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let course = self
            .course_number
            .map(|c| c.to_string())
            .unwrap_or_else(|| "not set".to_string());
        write!(
            f,
            "Player{{id: {}, rating: {}, type: {}, course: {}, group: {}}}",
            self.id, self.rating, self.education_type, course, self.group_name
        )
    }
}

/// A profile waiting in one of the pools
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueueEntry {
    #[serde(flatten)]
    pub profile: PlayerProfile,
    pub joined_at: DateTime<Utc>,
}

impl QueueEntry {
    pub fn new(profile: PlayerProfile, joined_at: DateTime<Utc>) -> Self {
        Self { profile, joined_at }
    }

    pub fn id(&self) -> PlayerId {
        self.profile.id
    }

    /// Fractional seconds spent in the pool as of `now`
    pub fn seconds_waited(&self, now: DateTime<Utc>) -> f64 {
        now.signed_duration_since(self.joined_at).num_milliseconds() as f64 / 1000.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Killer,
    Victim,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Killer => f.write_str("killer"),
            Role::Victim => f.write_str("victim"),
        }
    }
}

/// A decided killer/victim pairing, reported to the orchestrator
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MatchedPair {
    pub killer: PlayerId,
    pub victim: PlayerId,
    pub quality: f64,
}
