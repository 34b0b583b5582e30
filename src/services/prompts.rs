//! Study prompt templates
//!
//! Each study action turns source text into a prompt for the generation
//! service. Every action except `solve-math` can be tailored to a learning
//! style.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Preset learning styles offered to students
pub const LEARNING_STYLES: [&str; 7] = [
    "Visual Learner (diagrams, charts)",
    "Auditory Learner (lectures, discussions)",
    "Kinesthetic Learner (hands-on activities)",
    "Reading/Writing Learner (text-based)",
    "For a 10-year-old",
    "For a University Student",
    "Socratic Method",
];

/// What to produce from the source text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StudyAction {
    Summarize,
    Questions,
    Explain,
    Flashcards,
    Problems,
    SolveMath,
}

impl StudyAction {
    pub const ALL: [StudyAction; 6] = [
        Self::Summarize,
        Self::Questions,
        Self::Explain,
        Self::Flashcards,
        Self::Problems,
        Self::SolveMath,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Summarize => "summarize",
            Self::Questions => "questions",
            Self::Explain => "explain",
            Self::Flashcards => "flashcards",
            Self::Problems => "problems",
            Self::SolveMath => "solve-math",
        }
    }

    fn instruction(&self) -> &'static str {
        match self {
            Self::Summarize => "Summarize the following text",
            Self::Questions => "Generate a list of practice questions based on the following text",
            Self::Explain => "Explain the following concept in simple terms",
            Self::Flashcards => "Create a set of flashcards (term: definition) from the following text",
            Self::Problems => "Generate a set of practice problems based on the following text",
            Self::SolveMath => {
                "Solve the following mathematical expression or problem. \
                 If it's not a mathematical problem, state \"This is not a mathematical problem.\" \
                 and explain why. If it is a mathematical problem, provide the solution and the \
                 steps to solve it"
            }
        }
    }

    /// Whether a learning style changes the prompt
    pub fn accepts_style(&self) -> bool {
        !matches!(self, Self::SolveMath)
    }
}

impl fmt::Display for StudyAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StudyAction {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|a| a.as_str() == s)
            .ok_or_else(|| anyhow::anyhow!("Unknown study action: {}", s))
    }
}

/// Build the generation prompt for `action` over `text`
///
/// A blank or missing style adds nothing.
pub fn build_prompt(action: StudyAction, style: Option<&str>, text: &str) -> String {
    let style = match style.map(str::trim) {
        Some(s) if !s.is_empty() && action.accepts_style() => {
            format!(" in a style tailored for a {}", s)
        }
        _ => String::new(),
    };

    format!("{}{}:\n\n{}", action.instruction(), style, text)
}
