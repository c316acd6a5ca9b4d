//! Prompt rendering for each use case
//!
//! Every template has a fixed layout. Absent optional inputs render as a
//! placeholder (usually `Unknown`) instead of being dropped, so two prompts
//! for the same use case always have the same lines in the same order.
//! Numbers are formatted before they reach the template.

use minijinja::{Environment, UndefinedBehavior, context};

use super::{AdvisoryRequest, PreparedRequest};
use crate::{
    AdvisoryError, Result,
    types::{EnergyPattern, FocusSession, HabitPreferences, ProductivityMetrics, SchedulePreferences},
};

pub const UNKNOWN: &str = "Unknown";

/// Sessions summarized in a focus-insight prompt
pub const PROMPT_SESSION_WINDOW: usize = 20;

/// Days of metrics listed in a focus-insight prompt
pub const PROMPT_METRIC_DAYS: usize = 7;

/// Duration assumed for a task without an estimate when listing it
const PROMPT_DEFAULT_TASK_MINUTES: u32 = 25;

const TASK_BREAKDOWN_SYSTEM: &str = "You are an ADHD productivity expert. Your role is to help break down complex tasks into smaller, manageable chunks that work well with ADHD brains.

Key principles:
- Break tasks into 5-25 minute chunks
- Make each subtask specific and actionable
- Consider energy levels and executive function challenges
- Suggest appropriate break intervals
- Include dopamine-boosting elements when possible

Respond with structured, practical advice that reduces overwhelm.";

const FOCUS_INSIGHT_SYSTEM: &str = "You are an ADHD specialist analyzing focus patterns. Provide insights about:
- Optimal focus times based on patterns
- Energy management strategies
- Distraction mitigation techniques
- Personalized productivity recommendations
- Break timing and types

Be empathetic, practical, and avoid toxic productivity culture. Focus on sustainable strategies.";

const HABIT_RECOMMENDATION_SYSTEM: &str = "You are an expert in ADHD-friendly habit formation. Suggest habits that:
- Are small and achievable (2-5 minute habits)
- Stack onto existing routines
- Account for rejection sensitive dysphoria
- Include built-in flexibility
- Have clear, immediate benefits

Avoid overwhelming suggestions. Focus on one habit at a time with clear implementation strategies.";

const SCHEDULE_OPTIMIZATION_SYSTEM: &str = "You are a time management expert specializing in ADHD. Help optimize schedules by:
- Identifying peak energy windows
- Suggesting buffer time between tasks
- Recommending task batching strategies
- Balancing stimulation levels throughout the day
- Including transition time and breaks

Provide realistic, sustainable scheduling advice that works with ADHD patterns.";

const TASK_BREAKDOWN_TEMPLATE: &str = r#"{{ system }}

Task to break down:
- Title: {{ title }}
- Description: {{ description }}
- Priority: {{ priority }}
- Estimated Duration: {{ estimated_duration }} minutes

User Context:
- Current Energy Level: {{ energy_level }}/5
- Available Time: {{ available_time }} minutes
- Recent Focus Score: {{ recent_focus }}/5

Please provide:
1. 3-5 specific, actionable subtasks
2. Estimated time for each subtask (5-25 minutes)
3. 2-3 recommendations for completing this task effectively with ADHD

Format your response as JSON with the structure:
{
  "subtasks": ["specific action 1", "specific action 2", ...],
  "estimatedTimes": [15, 10, 20, ...],
  "recommendations": ["tip 1", "tip 2", "tip 3"]
}"#;

const FOCUS_INSIGHT_TEMPLATE: &str = r#"{{ system }}

Focus Session Data (last {{ window }} sessions):
- Average focus time: {{ average_focus }} minutes
- Total distractions: {{ total_distractions }}
- Completion rate: {{ completion_rate }}%
- Sessions analyzed: {{ session_count }}

Recent productivity patterns:
{{ metric_lines }}

Generate 2-3 personalized insights about focus patterns, productivity trends, and actionable recommendations.

Format as JSON array:
[
  {
    "type": "productivity|focus|energy|habit",
    "title": "Insight title",
    "content": "Detailed insight explanation",
    "actionItems": ["specific action 1", "specific action 2"],
    "confidence": 0.8
  }
]"#;

const HABIT_RECOMMENDATION_TEMPLATE: &str = r#"{{ system }}

Current habits: {{ current_habits }}
Productivity goals: {{ goals }}

User preferences:
- Morning person: {{ morning_person }}
- Preferred session length: {{ session_length }} minutes
- Struggles with transitions: {{ transitions }}

Suggest 2-3 small, ADHD-friendly habits that complement their current routine and support their goals.

Format as JSON array:
[
  {
    "type": "habit",
    "title": "Habit name",
    "description": "Why this habit helps",
    "reasoning": "ADHD-specific explanation",
    "priority": 1-5
  }
]"#;

const SCHEDULE_OPTIMIZATION_TEMPLATE: &str = r#"{{ system }}

Tasks to schedule:
{{ task_lines }}

Energy patterns:
- High energy hours: {{ high_energy_hours }}
- Low energy hours: {{ low_energy_hours }}

Preferences:
- Preferred break length: {{ break_length }} minutes
- Max consecutive focus time: {{ max_focus_hours }} hours
- Avoid afternoon crash: {{ avoid_crash }}

Create an optimized schedule that matches high-priority/difficult tasks with high-energy times.

Format as JSON:
{
  "optimizedSchedule": [
    {
      "startTime": "09:00",
      "endTime": "09:30",
      "taskId": "task-id",
      "taskTitle": "Task name",
      "reasoning": "Why scheduled at this time"
    }
  ],
  "recommendations": ["scheduling tip 1", "scheduling tip 2"]
}"#;

const DAILY_SUMMARY_TEMPLATE: &str = r#"Analyze this ADHD individual's daily productivity:

Metrics:
- Focus time: {{ focus_time }} minutes
- Tasks completed: {{ tasks_completed }}
- Average productivity feeling: {{ productivity }}/5
- Distractions: {{ distractions }}
- Mood: {{ mood }}/5
- Energy: {{ energy }}/5

Provide an encouraging, ADHD-friendly summary that:
1. Celebrates wins (no matter how small)
2. Gently addresses challenges
3. Suggests one specific improvement for tomorrow
4. Uses positive, non-judgmental language

Format as JSON:
{
  "summary": "Overall day assessment",
  "highlights": ["positive thing 1", "positive thing 2"],
  "improvements": ["gentle suggestion 1"],
  "tomorrowFocus": "One specific thing to focus on tomorrow"
}"#;

/// Render the complete prompt for a request
///
/// Fails only with `InvalidRequest`, when the use case tag is missing or
/// unknown or the use case's essential input is absent.
pub fn build_prompt(request: &AdvisoryRequest) -> Result<String> {
    request.prepare()?.render_prompt()
}

impl PreparedRequest<'_> {
    pub fn render_prompt(&self) -> Result<String> {
        let (template, ctx) = match *self {
            Self::TaskBreakdown { task, user_context } => (
                TASK_BREAKDOWN_TEMPLATE,
                context! {
                    system => TASK_BREAKDOWN_SYSTEM,
                    title => &task.title,
                    description => task
                        .description
                        .as_deref()
                        .filter(|d| !d.trim().is_empty())
                        .unwrap_or("No description provided"),
                    priority => task.priority.to_string(),
                    estimated_duration => or_unknown(task.estimated_duration),
                    energy_level => or_unknown(user_context.and_then(|c| c.energy_level)),
                    available_time => or_unknown(user_context.and_then(|c| c.available_time)),
                    recent_focus => or_unknown(user_context.and_then(|c| c.recent_focus)),
                },
            ),
            Self::FocusInsight { sessions, metrics } => {
                let stats = SessionStats::from_recent(sessions, PROMPT_SESSION_WINDOW);
                (
                    FOCUS_INSIGHT_TEMPLATE,
                    context! {
                        system => FOCUS_INSIGHT_SYSTEM,
                        window => PROMPT_SESSION_WINDOW,
                        average_focus => or_unknown(stats.average_minutes.map(|m| format!("{:.1}", m))),
                        total_distractions => stats.total_distractions,
                        completion_rate => or_unknown(stats.completion_rate.map(|r| format!("{:.1}", r))),
                        session_count => stats.count,
                        metric_lines => metric_lines(metrics),
                    },
                )
            }
            Self::HabitRecommendation {
                current_habits,
                goals,
                preferences,
            } => (
                HABIT_RECOMMENDATION_TEMPLATE,
                context! {
                    system => HABIT_RECOMMENDATION_SYSTEM,
                    current_habits => join_or(current_habits, "None specified"),
                    goals => join_or(goals, "General productivity improvement"),
                    morning_person => or_unknown(preferences.map(|p| yes_no(p.morning_person))),
                    session_length => or_unknown(preferences.map(|p: &HabitPreferences| p.preferred_session_length)),
                    transitions => or_unknown(preferences.map(|p| yes_no(p.struggles_with_transitions))),
                },
            ),
            Self::ScheduleOptimization {
                tasks,
                energy_patterns,
                preferences,
            } => (
                SCHEDULE_OPTIMIZATION_TEMPLATE,
                context! {
                    system => SCHEDULE_OPTIMIZATION_SYSTEM,
                    task_lines => task_lines(tasks),
                    high_energy_hours => hours_matching(energy_patterns, |e| e >= 4.0),
                    low_energy_hours => hours_matching(energy_patterns, |e| e <= 2.0),
                    break_length => or_unknown(preferences.map(|p: &SchedulePreferences| p.preferred_break_length)),
                    max_focus_hours => or_unknown(preferences.map(|p| p.max_consecutive_focus_hours)),
                    avoid_crash => or_unknown(preferences.map(|p| p.avoid_afternoon_crash)),
                },
            ),
            Self::DailySummary { metrics } => (
                DAILY_SUMMARY_TEMPLATE,
                context! {
                    focus_time => metrics.focus_time,
                    tasks_completed => metrics.tasks_completed,
                    productivity => metrics.productivity.to_string(),
                    distractions => metrics.distractions,
                    mood => metrics.mood.to_string(),
                    energy => metrics.energy.to_string(),
                },
            ),
        };

        let use_case = self.use_case();
        let mut env = Environment::new();
        env.set_undefined_behavior(UndefinedBehavior::Strict);
        env.add_template(use_case.tag(), template)
            .and_then(|_| env.get_template(use_case.tag()))
            .and_then(|tmpl| tmpl.render(ctx))
            .map_err(|e| {
                AdvisoryError::invalid_request(
                    Some(use_case.tag()),
                    format!("Prompt could not be rendered: {}", e),
                )
            })
    }
}

/// Aggregates over the most recent focus sessions
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct SessionStats {
    pub count: usize,
    /// Mean actual duration, counting sessions without one as zero
    pub average_minutes: Option<f64>,
    pub total_distractions: usize,
    /// Percentage of sessions completed successfully
    pub completion_rate: Option<f64>,
}

impl SessionStats {
    pub fn from_recent(sessions: &[FocusSession], window: usize) -> Self {
        let recent = &sessions[sessions.len().saturating_sub(window)..];
        let count = recent.len();
        if count == 0 {
            return Self {
                count,
                average_minutes: None,
                total_distractions: 0,
                completion_rate: None,
            };
        }

        let total_minutes: u64 = recent
            .iter()
            .map(|s| u64::from(s.actual_duration.unwrap_or(0)))
            .sum();
        let completed = recent.iter().filter(|s| s.completed_successfully).count();

        Self {
            count,
            average_minutes: Some(total_minutes as f64 / count as f64),
            total_distractions: recent.iter().map(|s| s.distractions.len()).sum(),
            completion_rate: Some(completed as f64 / count as f64 * 100.0),
        }
    }
}

fn or_unknown<T: ToString>(value: Option<T>) -> String {
    value.map_or_else(|| UNKNOWN.to_string(), |v| v.to_string())
}

fn yes_no(flag: bool) -> &'static str {
    if flag { "Yes" } else { "No" }
}

fn join_or(items: &[String], placeholder: &str) -> String {
    if items.is_empty() {
        placeholder.to_string()
    } else {
        items.join(", ")
    }
}

fn metric_lines(metrics: &[ProductivityMetrics]) -> String {
    let recent = &metrics[metrics.len().saturating_sub(PROMPT_METRIC_DAYS)..];
    if recent.is_empty() {
        return UNKNOWN.to_string();
    }

    recent
        .iter()
        .enumerate()
        .map(|(i, m)| {
            format!(
                "Day {}: {}m focus, {} tasks, {}/5 rating",
                i + 1,
                m.focus_time,
                m.tasks_completed,
                m.productivity
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn task_lines(tasks: &[crate::types::Task]) -> String {
    if tasks.is_empty() {
        return UNKNOWN.to_string();
    }

    tasks
        .iter()
        .map(|task| {
            format!(
                "- {} ({} priority, ~{}min, {} difficulty)",
                task.title,
                task.priority,
                task.estimated_duration.unwrap_or(PROMPT_DEFAULT_TASK_MINUTES),
                task.difficulty.unwrap_or_default()
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn hours_matching(patterns: &[EnergyPattern], keep: impl Fn(f64) -> bool) -> String {
    let mut hours: Vec<u8> = patterns
        .iter()
        .filter(|p| keep(p.average_energy))
        .map(|p| p.hour)
        .collect();
    hours.sort_unstable();

    if hours.is_empty() {
        UNKNOWN.to_string()
    } else {
        hours
            .iter()
            .map(u8::to_string)
            .collect::<Vec<_>>()
            .join(", ")
    }
}
