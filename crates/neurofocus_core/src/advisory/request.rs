use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{
    AdvisoryError, Result,
    types::{
        EnergyPattern, FocusSession, HabitPreferences, ProductivityMetrics, SchedulePreferences,
        Task, TaskInput, UserContext,
    },
};

/// The fixed advisory scenarios
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum UseCase {
    TaskBreakdown,
    FocusInsight,
    HabitRecommendation,
    ScheduleOptimization,
    DailySummary,
}

impl UseCase {
    pub const ALL: [UseCase; 5] = [
        UseCase::TaskBreakdown,
        UseCase::FocusInsight,
        UseCase::HabitRecommendation,
        UseCase::ScheduleOptimization,
        UseCase::DailySummary,
    ];

    pub fn tag(&self) -> &'static str {
        match self {
            Self::TaskBreakdown => "task-breakdown",
            Self::FocusInsight => "focus-insight",
            Self::HabitRecommendation => "habit-recommendation",
            Self::ScheduleOptimization => "schedule-optimization",
            Self::DailySummary => "daily-summary",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|u| u.tag() == tag.trim())
    }
}

impl fmt::Display for UseCase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for UseCase {
    type Err = AdvisoryError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_tag(s).ok_or_else(|| {
            AdvisoryError::invalid_request(Some(s), format!("Unknown use case '{}'", s))
        })
    }
}

/// Every input any use case can draw on
///
/// Only the fields relevant to the request's use case are read; the rest
/// are ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AdvisoryInputs {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task: Option<TaskInput>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_context: Option<UserContext>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub focus_sessions: Vec<FocusSession>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub productivity_metrics: Vec<ProductivityMetrics>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub current_habits: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub productivity_goals: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub habit_preferences: Option<HabitPreferences>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tasks: Vec<Task>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub energy_patterns: Vec<EnergyPattern>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schedule_preferences: Option<SchedulePreferences>,

    /// The single day a daily summary is written for
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metrics: Option<ProductivityMetrics>,
}

/// One advisory call's worth of input
///
/// The use case travels as its raw tag so requests read from JSON keep
/// whatever the caller sent; it is only resolved by [`AdvisoryRequest::prepare`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdvisoryRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    use_case: Option<String>,
    #[serde(flatten)]
    inputs: AdvisoryInputs,
}

impl AdvisoryRequest {
    pub fn new(use_case: Option<String>, inputs: AdvisoryInputs) -> Self {
        Self { use_case, inputs }
    }

    pub fn task_breakdown(task: TaskInput, user_context: Option<UserContext>) -> Self {
        Self::for_use_case(
            UseCase::TaskBreakdown,
            AdvisoryInputs {
                task: Some(task),
                user_context,
                ..Default::default()
            },
        )
    }

    pub fn focus_insight(
        focus_sessions: Vec<FocusSession>,
        productivity_metrics: Vec<ProductivityMetrics>,
    ) -> Self {
        Self::for_use_case(
            UseCase::FocusInsight,
            AdvisoryInputs {
                focus_sessions,
                productivity_metrics,
                ..Default::default()
            },
        )
    }

    pub fn habit_recommendation(
        current_habits: Vec<String>,
        productivity_goals: Vec<String>,
        preferences: HabitPreferences,
    ) -> Self {
        Self::for_use_case(
            UseCase::HabitRecommendation,
            AdvisoryInputs {
                current_habits,
                productivity_goals,
                habit_preferences: Some(preferences),
                ..Default::default()
            },
        )
    }

    pub fn schedule_optimization(
        tasks: Vec<Task>,
        energy_patterns: Vec<EnergyPattern>,
        preferences: SchedulePreferences,
    ) -> Self {
        Self::for_use_case(
            UseCase::ScheduleOptimization,
            AdvisoryInputs {
                tasks,
                energy_patterns,
                schedule_preferences: Some(preferences),
                ..Default::default()
            },
        )
    }

    pub fn daily_summary(metrics: ProductivityMetrics) -> Self {
        Self::for_use_case(
            UseCase::DailySummary,
            AdvisoryInputs {
                metrics: Some(metrics),
                ..Default::default()
            },
        )
    }

    fn for_use_case(use_case: UseCase, inputs: AdvisoryInputs) -> Self {
        Self {
            use_case: Some(use_case.tag().to_string()),
            inputs,
        }
    }

    pub fn use_case_tag(&self) -> Option<&str> {
        self.use_case.as_deref()
    }

    pub fn inputs(&self) -> &AdvisoryInputs {
        &self.inputs
    }

    /// Resolve the tag and pick out the inputs the use case needs
    ///
    /// This is the only place a request can be rejected.
    pub fn prepare(&self) -> Result<PreparedRequest<'_>> {
        let tag = self
            .use_case
            .as_deref()
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| AdvisoryError::invalid_request(None, "Missing use case"))?;
        let use_case: UseCase = tag.parse()?;
        let inputs = &self.inputs;

        let prepared = match use_case {
            UseCase::TaskBreakdown => {
                let task = inputs.task.as_ref().ok_or_else(|| {
                    AdvisoryError::invalid_request(Some(tag), "A task breakdown needs a task")
                })?;
                PreparedRequest::TaskBreakdown {
                    task,
                    user_context: inputs.user_context.as_ref(),
                }
            }
            UseCase::FocusInsight => PreparedRequest::FocusInsight {
                sessions: &inputs.focus_sessions,
                metrics: &inputs.productivity_metrics,
            },
            UseCase::HabitRecommendation => PreparedRequest::HabitRecommendation {
                current_habits: &inputs.current_habits,
                goals: &inputs.productivity_goals,
                preferences: inputs.habit_preferences.as_ref(),
            },
            UseCase::ScheduleOptimization => PreparedRequest::ScheduleOptimization {
                tasks: &inputs.tasks,
                energy_patterns: &inputs.energy_patterns,
                preferences: inputs.schedule_preferences.as_ref(),
            },
            UseCase::DailySummary => PreparedRequest::DailySummary {
                metrics: inputs.metrics.as_ref().ok_or_else(|| {
                    AdvisoryError::invalid_request(
                        Some(tag),
                        "A daily summary needs the day's metrics",
                    )
                })?,
            },
        };

        Ok(prepared)
    }
}

/// A request whose use case is known, borrowing exactly the inputs it uses
#[derive(Debug, Clone, Copy)]
pub enum PreparedRequest<'a> {
    TaskBreakdown {
        task: &'a TaskInput,
        user_context: Option<&'a UserContext>,
    },
    FocusInsight {
        sessions: &'a [FocusSession],
        metrics: &'a [ProductivityMetrics],
    },
    HabitRecommendation {
        current_habits: &'a [String],
        goals: &'a [String],
        preferences: Option<&'a HabitPreferences>,
    },
    ScheduleOptimization {
        tasks: &'a [Task],
        energy_patterns: &'a [EnergyPattern],
        preferences: Option<&'a SchedulePreferences>,
    },
    DailySummary {
        metrics: &'a ProductivityMetrics,
    },
}

impl PreparedRequest<'_> {
    pub fn use_case(&self) -> UseCase {
        match self {
            Self::TaskBreakdown { .. } => UseCase::TaskBreakdown,
            Self::FocusInsight { .. } => UseCase::FocusInsight,
            Self::HabitRecommendation { .. } => UseCase::HabitRecommendation,
            Self::ScheduleOptimization { .. } => UseCase::ScheduleOptimization,
            Self::DailySummary { .. } => UseCase::DailySummary,
        }
    }
}
