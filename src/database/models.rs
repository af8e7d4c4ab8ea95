/// A user eligible for a queue, as stored by the bot
#[derive(Debug, Clone)]
pub struct CandidateRow {
    pub tg_id: i64,
    pub rating: Option<i32>,
    pub education_type: String,
    pub course_number: Option<i32>,
    pub group_name: Option<String>,
}

/// Which side of a kill event a candidate query looks at
#[derive(Debug, Clone, Copy)]
pub enum CandidateSide {
    Killer,
    Victim,
}

impl CandidateSide {
    pub fn event_column(&self) -> &'static str {
        match self {
            CandidateSide::Killer => "killer_user_id",
            CandidateSide::Victim => "victim_user_id",
        }
    }
}
