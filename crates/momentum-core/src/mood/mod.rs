//! Mood classification and task suggestions.
//!
//! [`MoodAdvisor::classify`] buckets a sentiment score into three moods;
//! the suggestion tables are fixed per bucket.

mod lexicon;

pub use lexicon::{LexiconScorer, SentimentScorer};

use serde::{Deserialize, Serialize};

use crate::task::{TaskSummary, TaskType};

/// Scores strictly above this are positive.
pub const POSITIVE_THRESHOLD: i32 = 2;
/// Scores strictly below this are negative.
pub const NEGATIVE_THRESHOLD: i32 = -2;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mood {
    Positive,
    #[default]
    Neutral,
    Negative,
}

impl Mood {
    pub fn from_score(score: i32) -> Self {
        if score > POSITIVE_THRESHOLD {
            Mood::Positive
        } else if score < NEGATIVE_THRESHOLD {
            Mood::Negative
        } else {
            Mood::Neutral
        }
    }
}

impl std::str::FromStr for Mood {
    type Err = crate::error::ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "positive" => Ok(Mood::Positive),
            "neutral" => Ok(Mood::Neutral),
            "negative" => Ok(Mood::Negative),
            other => Err(crate::error::ValidationError::InvalidValue {
                field: "mood".into(),
                message: format!("expected positive, neutral or negative, got '{other}'"),
            }),
        }
    }
}

/// Canned advice for a mood bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Suggestion {
    pub mood: Mood,
    pub message: &'static str,
    pub suggested_task_types: Vec<TaskType>,
    pub suggested_task_titles: Vec<&'static str>,
}

/// What the UI should nudge the user towards next.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NextAction {
    CreateDifficultTask,
    CreateAnyTask,
    CreateEasyTask,
    MarkTaskComplete,
    CreateTask,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct NextStep {
    pub message: &'static str,
    pub action: NextAction,
}

/// A classification together with the score that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    pub mood: Mood,
    pub score: i32,
}

pub struct MoodAdvisor {
    scorer: Box<dyn SentimentScorer>,
    last: Option<Classification>,
}

impl Default for MoodAdvisor {
    fn default() -> Self {
        Self::new(LexiconScorer::new())
    }
}

impl std::fmt::Debug for MoodAdvisor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MoodAdvisor")
            .field("last", &self.last)
            .finish_non_exhaustive()
    }
}

impl MoodAdvisor {
    pub fn new(scorer: impl SentimentScorer + 'static) -> Self {
        Self {
            scorer: Box::new(scorer),
            last: None,
        }
    }

    pub fn classify(&mut self, text: &str) -> Classification {
        let score = self.scorer.score(text);
        let classification = Classification {
            mood: Mood::from_score(score),
            score,
        };
        self.last = Some(classification);
        classification
    }

    pub fn last(&self) -> Option<Classification> {
        self.last
    }

    pub fn suggest(mood: Mood) -> Suggestion {
        match mood {
            Mood::Positive => Suggestion {
                mood,
                message: "You're in a great mood! Perfect time to tackle challenging tasks.",
                suggested_task_types: vec![TaskType::Difficult, TaskType::TimeTaking],
                suggested_task_titles: vec![
                    "Start that difficult project you've been putting off",
                    "Learn something new and challenging",
                    "Help someone else with their tasks",
                ],
            },
            Mood::Negative => Suggestion {
                mood,
                message: "It's okay to feel down. Let's start with something small.",
                suggested_task_types: vec![TaskType::Easy, TaskType::Moderate],
                suggested_task_titles: vec![
                    "Take a short walk outside",
                    "Complete a quick, easy task for a win",
                    "Practice 5 minutes of mindfulness",
                ],
            },
            Mood::Neutral => Suggestion {
                mood,
                message: "Ready to be productive today?",
                suggested_task_types: vec![TaskType::Moderate, TaskType::TimeTaking],
                suggested_task_titles: vec![
                    "Organize your workspace",
                    "Plan out your day",
                    "Set a goal for today",
                ],
            },
        }
    }

    /// Pick a nudge from the mood and the state of the task list.
    pub fn next_step(mood: Mood, tasks: TaskSummary) -> NextStep {
        match mood {
            Mood::Positive if tasks.open > 3 => NextStep {
                message: "Tackle challenging tasks!",
                action: NextAction::CreateDifficultTask,
            },
            Mood::Positive => NextStep {
                message: "Start something new!",
                action: NextAction::CreateAnyTask,
            },
            Mood::Negative if tasks.completed == 0 => NextStep {
                message: "Start with something small",
                action: NextAction::CreateEasyTask,
            },
            Mood::Negative => NextStep {
                message: "Complete one more task",
                action: NextAction::MarkTaskComplete,
            },
            Mood::Neutral => NextStep {
                message: "Ready to be productive?",
                action: NextAction::CreateTask,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thresholds_are_exclusive() {
        assert_eq!(Mood::from_score(3), Mood::Positive);
        assert_eq!(Mood::from_score(2), Mood::Neutral);
        assert_eq!(Mood::from_score(-2), Mood::Neutral);
        assert_eq!(Mood::from_score(-3), Mood::Negative);
    }

    #[test]
    fn classify_uses_injected_scorer_and_remembers_last() {
        let mut advisor = MoodAdvisor::new(|text: &str| text.len() as i32 - 5);
        assert!(advisor.last().is_none());

        assert_eq!(advisor.classify("ab").mood, Mood::Negative);
        assert_eq!(advisor.classify("abcdefghij").mood, Mood::Positive);
        assert_eq!(
            advisor.last(),
            Some(Classification {
                mood: Mood::Positive,
                score: 5
            })
        );
    }

    #[test]
    fn classify_is_deterministic() {
        let mut advisor = MoodAdvisor::default();
        let text = "I feel tired and overwhelmed today";
        let first = advisor.classify(text);
        for _ in 0..5 {
            assert_eq!(advisor.classify(text), first);
        }
        assert_eq!(first.mood, Mood::Negative);
    }

    #[test]
    fn suggestions_are_fixed_per_bucket() {
        let positive = MoodAdvisor::suggest(Mood::Positive);
        assert_eq!(positive.suggested_task_titles.len(), 3);
        assert_eq!(
            positive.suggested_task_types,
            vec![TaskType::Difficult, TaskType::TimeTaking]
        );
        assert_eq!(MoodAdvisor::suggest(Mood::Neutral).message, "Ready to be productive today?");
        assert_eq!(
            MoodAdvisor::suggest(Mood::Negative).suggested_task_titles[0],
            "Take a short walk outside"
        );
    }

    #[test]
    fn next_step_depends_on_task_counts() {
        let busy = TaskSummary { total: 5, completed: 1, open: 4 };
        let fresh = TaskSummary::default();

        assert_eq!(
            MoodAdvisor::next_step(Mood::Positive, busy).action,
            NextAction::CreateDifficultTask
        );
        assert_eq!(
            MoodAdvisor::next_step(Mood::Positive, fresh).action,
            NextAction::CreateAnyTask
        );
        assert_eq!(
            MoodAdvisor::next_step(Mood::Negative, fresh).action,
            NextAction::CreateEasyTask
        );
        assert_eq!(
            MoodAdvisor::next_step(Mood::Negative, busy).action,
            NextAction::MarkTaskComplete
        );
        assert_eq!(
            MoodAdvisor::next_step(Mood::Neutral, busy).action,
            NextAction::CreateTask
        );
    }
}
