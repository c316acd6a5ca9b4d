//! Local heuristics used whenever the model cannot be used
//!
//! Everything here is a pure function of its inputs. The same request always
//! yields the same result, down to the byte.

use chrono::{NaiveTime, TimeDelta};

use super::{
    AdvisoryResult, DailySummary, FocusInsights, HabitRecommendations, OptimizedSchedule,
    PreparedRequest, ScheduledBlock, TaskBreakdown, prompt::SessionStats,
};
use crate::types::{
    FocusSession, Insight, InsightKind, ProductivityMetrics, Recommendation, RecommendationKind,
    Task, TaskInput,
};

/// Length of a standard Pomodoro, the yardstick for focus sessions
pub const REFERENCE_SESSION_MINUTES: f64 = 25.0;

/// Sessions considered by the focus heuristic
pub const FALLBACK_SESSION_WINDOW: usize = 10;

/// Middle subtask length when the task has no estimate
pub const DEFAULT_MAIN_WORK_MINUTES: u32 = 20;

/// Minutes reserved for the preparation and review subtasks
const BOOKEND_MINUTES: u32 = 5;

/// At most this many tasks are placed on a fallback schedule
pub const MAX_SCHEDULED_TASKS: usize = 3;

/// Block length when a task has no estimate
pub const DEFAULT_BLOCK_MINUTES: u32 = 30;

const FIRST_BLOCK_HOUR: u32 = 9;
const BLOCK_SPACING_HOURS: u32 = 2;

/// Above this many distractions the summary suggests silencing notifications
pub const DISTRACTION_THRESHOLD: u32 = 10;

impl PreparedRequest<'_> {
    /// The heuristic result for this request
    pub fn fallback(&self) -> AdvisoryResult {
        match *self {
            Self::TaskBreakdown { task, .. } => AdvisoryResult::TaskBreakdown(task_breakdown(task)),
            Self::FocusInsight { sessions, .. } => {
                AdvisoryResult::FocusInsight(focus_insights(sessions))
            }
            Self::HabitRecommendation { .. } => {
                AdvisoryResult::HabitRecommendation(habit_recommendations())
            }
            Self::ScheduleOptimization { tasks, .. } => {
                AdvisoryResult::ScheduleOptimization(schedule(tasks))
            }
            Self::DailySummary { metrics } => AdvisoryResult::DailySummary(daily_summary(metrics)),
        }
    }
}

/// Split a task into prepare / main work / review
///
/// The middle slot is the estimate minus ten minutes, floored at zero.
pub fn task_breakdown(task: &TaskInput) -> TaskBreakdown {
    let main_work = task
        .estimated_duration
        .map(|minutes| minutes.saturating_sub(2 * BOOKEND_MINUTES))
        .unwrap_or(DEFAULT_MAIN_WORK_MINUTES);

    TaskBreakdown {
        subtasks: vec![
            format!("Prepare materials for: {}", task.title),
            format!("Work on main part: {}", task.title),
            format!("Review and complete: {}", task.title),
        ],
        estimated_times: vec![BOOKEND_MINUTES, main_work, BOOKEND_MINUTES],
        recommendations: vec![
            "Use a timer to stay focused".to_string(),
            "Take breaks between subtasks".to_string(),
            "Remove distractions from workspace".to_string(),
        ],
    }
}

/// Compare recent session length against a Pomodoro
///
/// Produces no insight at all when there is no history to look at.
pub fn focus_insights(sessions: &[FocusSession]) -> FocusInsights {
    let stats = SessionStats::from_recent(sessions, FALLBACK_SESSION_WINDOW);
    let Some(average) = stats.average_minutes else {
        return FocusInsights { insights: vec![] };
    };

    let above = average > REFERENCE_SESSION_MINUTES;
    let ratio = average / REFERENCE_SESSION_MINUTES;
    let action_items = if above {
        vec![
            "Try shorter 20-25 minute sessions".to_string(),
            "Increase break frequency".to_string(),
        ]
    } else {
        vec![
            "Gradually extend sessions by 5 minutes".to_string(),
            "Reduce distractions".to_string(),
        ]
    };

    FocusInsights {
        insights: vec![Insight {
            kind: InsightKind::Focus,
            title: "Focus Duration Pattern".to_string(),
            content: format!(
                "Your average focus session is {:.0} minutes. This is {} the typical Pomodoro length ({:.1}x a {:.0}-minute session).",
                average,
                if above { "above" } else { "below" },
                ratio,
                REFERENCE_SESSION_MINUTES
            ),
            actionable: true,
            action_items,
            confidence: 0.6,
            category: "pattern-analysis".to_string(),
        }],
    }
}

/// The one habit that is always safe to suggest
pub fn habit_recommendations() -> HabitRecommendations {
    HabitRecommendations {
        recommendations: vec![Recommendation {
            kind: RecommendationKind::Habit,
            title: "Start Small".to_string(),
            description: "Begin with a 2-minute morning routine".to_string(),
            reasoning: "ADHD brains respond well to tiny, achievable habits that build momentum."
                .to_string(),
            priority: 3,
        }],
    }
}

/// Place the first few tasks two hours apart from 09:00
pub fn schedule(tasks: &[Task]) -> OptimizedSchedule {
    let optimized_schedule = tasks
        .iter()
        .take(MAX_SCHEDULED_TASKS)
        .enumerate()
        .map(|(index, task)| {
            let start_hour = FIRST_BLOCK_HOUR + index as u32 * BLOCK_SPACING_HOURS;
            let start = NaiveTime::from_hms_opt(start_hour, 0, 0).unwrap_or_default();
            let minutes = task.estimated_duration.unwrap_or(DEFAULT_BLOCK_MINUTES);
            let end = start + TimeDelta::minutes(i64::from(minutes));

            ScheduledBlock {
                start_time: start.format("%H:%M").to_string(),
                end_time: end.format("%H:%M").to_string(),
                task_id: task.id.clone(),
                task_title: task.title.clone(),
                reasoning: format!(
                    "Scheduled during {} productivity window",
                    if start_hour < 12 { "morning" } else { "afternoon" }
                ),
            }
        })
        .collect();

    OptimizedSchedule {
        optimized_schedule,
        recommendations: vec![
            "Schedule high-priority tasks during your peak energy hours".to_string(),
            "Include buffer time between tasks for transitions".to_string(),
            "Plan breaks every 90 minutes maximum".to_string(),
        ],
    }
}

/// Encouraging summary built from the day's numbers
pub fn daily_summary(metrics: &ProductivityMetrics) -> DailySummary {
    DailySummary {
        summary: format!(
            "You maintained focus for {} minutes and completed {} tasks today. That's progress worth celebrating!",
            metrics.focus_time, metrics.tasks_completed
        ),
        highlights: vec![
            if metrics.tasks_completed > 0 {
                format!("Completed {} tasks", metrics.tasks_completed)
            } else {
                "Showed up and tried".to_string()
            },
            if metrics.focus_time > 0 {
                format!("Focused for {} minutes", metrics.focus_time)
            } else {
                "Made an effort to focus".to_string()
            },
        ],
        improvements: vec![if metrics.distractions > DISTRACTION_THRESHOLD {
            "Try turning off notifications during focus sessions tomorrow".to_string()
        } else {
            "Keep up the great focus habits".to_string()
        }],
        tomorrow_focus: "Pick your most important task first thing in the morning".to_string(),
    }
}

/// Canned insights for running without an API key
pub fn demo_insights() -> Vec<Insight> {
    vec![
        Insight {
            kind: InsightKind::Productivity,
            title: "Peak Performance Window Detected".to_string(),
            content: "Your productivity peaks between 9-11 AM. Consider scheduling your most challenging tasks during this time.".to_string(),
            actionable: true,
            action_items: vec![
                "Block 9-11 AM for high-priority work".to_string(),
                "Save routine tasks for afternoon".to_string(),
                "Protect your morning energy".to_string(),
            ],
            confidence: 0.85,
            category: "demo".to_string(),
        },
        Insight {
            kind: InsightKind::Focus,
            title: "Optimal Session Length".to_string(),
            content: "You maintain focus best in 20-25 minute sessions. Consider adjusting your Pomodoro timer.".to_string(),
            actionable: true,
            action_items: vec![
                "Set timer to 22 minutes".to_string(),
                "Take 5-minute breaks".to_string(),
                "Track your natural rhythm".to_string(),
            ],
            confidence: 0.78,
            category: "demo".to_string(),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_short_task_clamps_main_work() {
        let breakdown = task_breakdown(&TaskInput::new("Reply to Sam").with_estimated_duration(6));
        assert_eq!(breakdown.estimated_times, vec![5, 0, 5]);
    }

    #[test]
    fn test_focus_uses_last_ten_sessions() {
        let mut sessions: Vec<FocusSession> = (0..10).map(|_| FocusSession::completed(60)).collect();
        sessions.extend((0..10).map(|_| FocusSession::completed(15)));

        let insights = focus_insights(&sessions).insights;
        assert_eq!(insights.len(), 1);
        assert!(insights[0].content.starts_with("Your average focus session is 15 minutes."));
        assert!(insights[0].content.contains("below"));
        assert!(insights[0].content.contains("0.6x a 25-minute session"));
    }

    #[test]
    fn test_focus_exactly_reference_is_below() {
        let sessions: Vec<FocusSession> = (0..4).map(|_| FocusSession::completed(25)).collect();
        let insights = focus_insights(&sessions).insights;
        assert!(insights[0].content.contains("This is below"));
        assert_eq!(
            insights[0].action_items,
            vec!["Gradually extend sessions by 5 minutes", "Reduce distractions"]
        );
    }

    #[test]
    fn test_focus_without_sessions_is_empty() {
        assert!(focus_insights(&[]).insights.is_empty());
    }

    #[test]
    fn test_schedule_end_times() {
        let tasks = vec![
            Task::new("a", "Plan week").with_estimated_duration(45),
            Task::new("b", "Write draft"),
            Task::new("c", "Long review").with_estimated_duration(150),
        ];

        let blocks = schedule(&tasks).optimized_schedule;
        let times: Vec<(&str, &str)> = blocks
            .iter()
            .map(|b| (b.start_time.as_str(), b.end_time.as_str()))
            .collect();
        assert_eq!(
            times,
            vec![("09:00", "09:45"), ("11:00", "11:30"), ("13:00", "15:30")]
        );
        assert_eq!(blocks[0].reasoning, "Scheduled during morning productivity window");
        assert_eq!(blocks[2].reasoning, "Scheduled during afternoon productivity window");
    }

    #[test]
    fn test_daily_summary_distraction_threshold() {
        let calm = ProductivityMetrics {
            focus_time: 60,
            tasks_completed: 2,
            distractions: 10,
            ..Default::default()
        };
        let noisy = ProductivityMetrics {
            distractions: 11,
            ..calm.clone()
        };

        assert_eq!(
            daily_summary(&calm).improvements,
            vec!["Keep up the great focus habits"]
        );
        assert_eq!(
            daily_summary(&noisy).improvements,
            vec!["Try turning off notifications during focus sessions tomorrow"]
        );
    }

    #[test]
    fn test_daily_summary_zero_day() {
        let summary = daily_summary(&ProductivityMetrics::default());
        assert_eq!(
            summary.highlights,
            vec!["Showed up and tried", "Made an effort to focus"]
        );
        assert_eq!(
            summary.summary,
            "You maintained focus for 0 minutes and completed 0 tasks today. That's progress worth celebrating!"
        );
    }

    #[test]
    fn test_habit_fallback_is_constant() {
        assert_eq!(habit_recommendations(), habit_recommendations());
        assert_eq!(habit_recommendations().recommendations[0].title, "Start Small");
    }

    #[test]
    fn test_demo_insights() {
        let insights = demo_insights();
        assert_eq!(insights.len(), 2);
        assert!(insights.iter().all(|i| i.category == "demo"));
    }
}
