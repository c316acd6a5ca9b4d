//! Productivity records consumed by the advisory engine
//!
//! These mirror the documents the app keeps in its hosted store. They are
//! read-only inputs here: nothing in this crate persists or mutates them.
//! Field names serialize as camelCase so stored documents deserialize as-is.

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Low => write!(f, "low"),
            Self::Medium => write!(f, "medium"),
            Self::High => write!(f, "high"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Easy => write!(f, "easy"),
            Self::Medium => write!(f, "medium"),
            Self::Hard => write!(f, "hard"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnergyLevel {
    Low,
    Medium,
    High,
}

/// The subset of a task needed to break it down
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskInput {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub priority: Priority,
    /// Minutes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_duration: Option<u32>,
}

impl TaskInput {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: None,
            priority: Priority::default(),
            estimated_duration: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_estimated_duration(mut self, minutes: u32) -> Self {
        self.estimated_duration = Some(minutes);
        self
    }
}

/// A stored task, as handed to schedule optimization
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_duration: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<Difficulty>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub energy_level: Option<EnergyLevel>,
}

impl Task {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            priority: Priority::default(),
            estimated_duration: None,
            difficulty: None,
            energy_level: None,
        }
    }

    pub fn with_estimated_duration(mut self, minutes: u32) -> Self {
        self.estimated_duration = Some(minutes);
        self
    }
}

/// Optional situational context for a task breakdown
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserContext {
    /// 1-5
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub energy_level: Option<u8>,
    /// Minutes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub available_time: Option<u32>,
    /// 1-5
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recent_focus: Option<u8>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DistractionSource {
    Internal,
    External,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    #[default]
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Distraction {
    #[serde(default)]
    pub id: String,
    #[serde(rename = "type")]
    pub source: DistractionSource,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub severity: Severity,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FocusSession {
    #[serde(default)]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<DateTime<Utc>>,
    /// Minutes
    #[serde(default)]
    pub planned_duration: u32,
    /// Minutes; absent while a session is still running
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actual_duration: Option<u32>,
    #[serde(default)]
    pub completed_successfully: bool,
    #[serde(default)]
    pub distractions: Vec<Distraction>,
    /// 1-5
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub productivity: Option<u8>,
}

impl FocusSession {
    pub fn completed(actual_minutes: u32) -> Self {
        Self {
            id: String::new(),
            task_id: None,
            start_time: None,
            planned_duration: 25,
            actual_duration: Some(actual_minutes),
            completed_successfully: true,
            distractions: Vec::new(),
            productivity: None,
        }
    }
}

/// One day of aggregated productivity numbers
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProductivityMetrics {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
    /// Minutes
    pub focus_time: u32,
    pub tasks_completed: u32,
    pub tasks_created: u32,
    /// Minutes
    pub average_focus_session: f64,
    pub distractions: u32,
    /// 1-5 average
    pub productivity: f64,
    /// 1-5 average
    pub mood: f64,
    /// 1-5 average
    pub energy: f64,
    pub habits_completed: u32,
    pub habits_total: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HabitPreferences {
    pub morning_person: bool,
    /// Minutes
    pub preferred_session_length: u32,
    pub struggles_with_transitions: bool,
}

/// Average self-reported energy for an hour of the day
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnergyPattern {
    pub hour: u8,
    pub average_energy: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SchedulePreferences {
    /// Minutes
    pub preferred_break_length: u32,
    pub max_consecutive_focus_hours: u32,
    pub avoid_afternoon_crash: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InsightKind {
    Productivity,
    Habit,
    Focus,
    Energy,
    Mood,
}

/// A piece of pattern analysis shown on the dashboard
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Insight {
    #[serde(rename = "type")]
    pub kind: InsightKind,
    pub title: String,
    pub content: String,
    pub actionable: bool,
    pub action_items: Vec<String>,
    /// 0-1
    pub confidence: f64,
    pub category: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecommendationKind {
    Task,
    Schedule,
    Habit,
    Break,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    #[serde(rename = "type")]
    pub kind: RecommendationKind,
    pub title: String,
    pub description: String,
    pub reasoning: String,
    /// 1-5
    pub priority: u8,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_focus_session_from_store_document() {
        let json = r#"{
            "id": "fs-1",
            "startTime": "2025-03-02T09:00:00Z",
            "plannedDuration": 25,
            "type": "pomodoro",
            "completedSuccessfully": true,
            "distractions": [
                {"id": "d1", "timestamp": "2025-03-02T09:10:00Z", "type": "internal", "severity": "medium"}
            ],
            "mood": "good",
            "energyBefore": 3,
            "energyAfter": 4,
            "productivity": 4
        }"#;

        let session: FocusSession = serde_json::from_str(json).unwrap();
        assert_eq!(session.actual_duration, None);
        assert_eq!(session.distractions.len(), 1);
        assert_eq!(session.distractions[0].source, DistractionSource::Internal);
        assert_eq!(session.productivity, Some(4));
    }

    #[test]
    fn test_metrics_default_missing_numbers() {
        let metrics: ProductivityMetrics =
            serde_json::from_str(r#"{"focusTime": 90, "tasksCompleted": 3}"#).unwrap();
        assert_eq!(metrics.focus_time, 90);
        assert_eq!(metrics.tasks_completed, 3);
        assert_eq!(metrics.distractions, 0);
        assert_eq!(metrics.date, None);
    }

    #[test]
    fn test_insight_serializes_type_field() {
        let insight = Insight {
            kind: InsightKind::Energy,
            title: "t".to_string(),
            content: "c".to_string(),
            actionable: false,
            action_items: vec![],
            confidence: 0.5,
            category: "ai-generated".to_string(),
        };
        let value = serde_json::to_value(&insight).unwrap();
        assert_eq!(value["type"], "energy");
        assert_eq!(value["actionItems"], serde_json::json!([]));
    }
}
