use serde::{Deserialize, Serialize};

use super::UseCase;
use crate::types::{Insight, Recommendation};

/// Subtasks with a parallel list of minute estimates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskBreakdown {
    pub subtasks: Vec<String>,
    pub estimated_times: Vec<u32>,
    pub recommendations: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FocusInsights {
    pub insights: Vec<Insight>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HabitRecommendations {
    pub recommendations: Vec<Recommendation>,
}

/// A task placed on the day's timeline; times are `HH:MM`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduledBlock {
    pub start_time: String,
    pub end_time: String,
    pub task_id: String,
    pub task_title: String,
    pub reasoning: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptimizedSchedule {
    pub optimized_schedule: Vec<ScheduledBlock>,
    pub recommendations: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailySummary {
    pub summary: String,
    pub highlights: Vec<String>,
    pub improvements: Vec<String>,
    pub tomorrow_focus: String,
}

/// The outcome of an advisory call, one variant per use case
///
/// The shape of each variant does not depend on whether the model or the
/// local heuristics produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "useCase", content = "result", rename_all = "kebab-case")]
pub enum AdvisoryResult {
    TaskBreakdown(TaskBreakdown),
    FocusInsight(FocusInsights),
    HabitRecommendation(HabitRecommendations),
    ScheduleOptimization(OptimizedSchedule),
    DailySummary(DailySummary),
}

impl AdvisoryResult {
    pub fn use_case(&self) -> UseCase {
        match self {
            Self::TaskBreakdown(_) => UseCase::TaskBreakdown,
            Self::FocusInsight(_) => UseCase::FocusInsight,
            Self::HabitRecommendation(_) => UseCase::HabitRecommendation,
            Self::ScheduleOptimization(_) => UseCase::ScheduleOptimization,
            Self::DailySummary(_) => UseCase::DailySummary,
        }
    }
}
