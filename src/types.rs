use std::fmt::Display;

use serde::{Deserialize, Serialize};

/// One row of the output CSV. Field order is the column order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Episode {
    pub episode_number: String,
    pub title: String,
    pub url: String,
    pub date: String,
    pub topic: String,
    pub description: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    AskPastorJohn,
    TherapyTheology,
}

impl Source {
    pub fn output_filename(&self) -> &'static str {
        match self {
            Source::AskPastorJohn => "ask_pastor_john.csv",
            Source::TherapyTheology => "therapy_and_theology.csv",
        }
    }
}

impl Display for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Source::AskPastorJohn => write!(f, "Ask Pastor John"),
            Source::TherapyTheology => write!(f, "Therapy & Theology"),
        }
    }
}
