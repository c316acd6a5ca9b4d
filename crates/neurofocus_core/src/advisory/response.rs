//! Parsing and shape validation of model output
//!
//! The model is asked for JSON, but what comes back is untrusted text.
//! Each use case has a wire struct describing exactly what is accepted;
//! anything that does not deserialize into it, or that fails the checks in
//! [`Validate`], becomes a single `MalformedResponse` error.

use chrono::NaiveTime;
use serde::Deserialize;
use serde::de::DeserializeOwned;

use super::{
    AdvisoryResult, DailySummary, FocusInsights, HabitRecommendations, OptimizedSchedule,
    PreparedRequest, ScheduledBlock, TaskBreakdown, UseCase,
};
use crate::{
    AdvisoryError, Result,
    types::{Insight, InsightKind, Recommendation, RecommendationKind},
};

/// Confidence given to model insights that omit one
pub const DEFAULT_INSIGHT_CONFIDENCE: f64 = 0.7;

/// Priority given to model recommendations that omit one
pub const DEFAULT_RECOMMENDATION_PRIORITY: u8 = 3;

pub const EXTERNAL_INSIGHT_CATEGORY: &str = "ai-generated";

impl PreparedRequest<'_> {
    /// Parse raw model text into this use case's result shape
    pub fn interpret(&self, raw: &str) -> Result<AdvisoryResult> {
        parse_response(self.use_case(), raw)
    }
}

/// Parse and validate raw model text for a use case
pub fn parse_response(use_case: UseCase, raw: &str) -> Result<AdvisoryResult> {
    let body = strip_code_fence(raw);

    let result = match use_case {
        UseCase::TaskBreakdown => {
            AdvisoryResult::TaskBreakdown(decode::<TaskBreakdownWire>(use_case, body)?.into())
        }
        UseCase::FocusInsight => AdvisoryResult::FocusInsight(FocusInsights {
            insights: decode::<Vec<InsightWire>>(use_case, body)?
                .into_iter()
                .map(Into::into)
                .collect(),
        }),
        UseCase::HabitRecommendation => {
            AdvisoryResult::HabitRecommendation(HabitRecommendations {
                recommendations: decode::<Vec<RecommendationWire>>(use_case, body)?
                    .into_iter()
                    .map(Into::into)
                    .collect(),
            })
        }
        UseCase::ScheduleOptimization => {
            AdvisoryResult::ScheduleOptimization(decode::<ScheduleWire>(use_case, body)?.into())
        }
        UseCase::DailySummary => {
            AdvisoryResult::DailySummary(decode::<DailySummaryWire>(use_case, body)?.into())
        }
    };

    Ok(result)
}

/// Remove one enclosing Markdown code fence, if present
fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let Some(inner) = rest.strip_suffix("```") else {
        return trimmed;
    };
    // an info string ("json") is a single bare word on the opening line
    match inner.split_once('\n') {
        Some((info, body)) if is_info_string(info) => body.trim(),
        _ => inner.trim(),
    }
}

fn is_info_string(line: &str) -> bool {
    let line = line.trim();
    line.is_empty()
        || line
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '+' | '.'))
}

fn decode<T>(use_case: UseCase, body: &str) -> Result<T>
where
    T: DeserializeOwned + Validate,
{
    let value: T = serde_json::from_str(body)
        .map_err(|e| AdvisoryError::malformed(use_case.tag(), e.to_string()))?;
    value
        .validate()
        .map_err(|detail| AdvisoryError::malformed(use_case.tag(), detail))?;
    Ok(value)
}

/// Checks beyond what deserialization enforces
trait Validate {
    fn validate(&self) -> std::result::Result<(), String>;
}

impl<T: Validate> Validate for Vec<T> {
    fn validate(&self) -> std::result::Result<(), String> {
        self.iter()
            .enumerate()
            .try_for_each(|(i, item)| item.validate().map_err(|e| format!("item {}: {}", i, e)))
    }
}

fn require_text(field: &str, value: &str) -> std::result::Result<(), String> {
    if value.trim().is_empty() {
        Err(format!("`{}` is empty", field))
    } else {
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TaskBreakdownWire {
    subtasks: Vec<String>,
    estimated_times: Vec<u32>,
    recommendations: Vec<String>,
}

impl Validate for TaskBreakdownWire {
    fn validate(&self) -> std::result::Result<(), String> {
        if self.subtasks.is_empty() {
            return Err("`subtasks` is empty".to_string());
        }
        if self.subtasks.len() != self.estimated_times.len() {
            return Err(format!(
                "{} subtasks but {} estimated times",
                self.subtasks.len(),
                self.estimated_times.len()
            ));
        }
        Ok(())
    }
}

impl From<TaskBreakdownWire> for TaskBreakdown {
    fn from(wire: TaskBreakdownWire) -> Self {
        Self {
            subtasks: wire.subtasks,
            estimated_times: wire.estimated_times,
            recommendations: wire.recommendations,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InsightWire {
    #[serde(rename = "type")]
    kind: InsightKind,
    title: String,
    content: String,
    #[serde(default)]
    action_items: Option<Vec<String>>,
    #[serde(default)]
    confidence: Option<f64>,
}

impl Validate for InsightWire {
    fn validate(&self) -> std::result::Result<(), String> {
        require_text("title", &self.title)?;
        require_text("content", &self.content)?;
        match self.confidence {
            Some(c) if !(0.0..=1.0).contains(&c) => {
                Err(format!("confidence {} is outside 0-1", c))
            }
            _ => Ok(()),
        }
    }
}

impl From<InsightWire> for Insight {
    fn from(wire: InsightWire) -> Self {
        let action_items = wire.action_items.unwrap_or_default();
        Self {
            kind: wire.kind,
            title: wire.title,
            content: wire.content,
            actionable: !action_items.is_empty(),
            action_items,
            confidence: wire.confidence.unwrap_or(DEFAULT_INSIGHT_CONFIDENCE),
            category: EXTERNAL_INSIGHT_CATEGORY.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct RecommendationWire {
    title: String,
    description: String,
    reasoning: String,
    #[serde(default)]
    priority: Option<u8>,
}

impl Validate for RecommendationWire {
    fn validate(&self) -> std::result::Result<(), String> {
        require_text("title", &self.title)?;
        match self.priority {
            Some(p) if !(1..=5).contains(&p) => Err(format!("priority {} is outside 1-5", p)),
            _ => Ok(()),
        }
    }
}

impl From<RecommendationWire> for Recommendation {
    fn from(wire: RecommendationWire) -> Self {
        Self {
            kind: RecommendationKind::Habit,
            title: wire.title,
            description: wire.description,
            reasoning: wire.reasoning,
            priority: wire.priority.unwrap_or(DEFAULT_RECOMMENDATION_PRIORITY),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ScheduledBlockWire {
    start_time: String,
    end_time: String,
    task_id: String,
    task_title: String,
    reasoning: String,
}

impl Validate for ScheduledBlockWire {
    fn validate(&self) -> std::result::Result<(), String> {
        for (field, value) in [("startTime", &self.start_time), ("endTime", &self.end_time)] {
            NaiveTime::parse_from_str(value, "%H:%M")
                .map_err(|_| format!("`{}` '{}' is not HH:MM", field, value))?;
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ScheduleWire {
    optimized_schedule: Vec<ScheduledBlockWire>,
    recommendations: Vec<String>,
}

impl Validate for ScheduleWire {
    fn validate(&self) -> std::result::Result<(), String> {
        self.optimized_schedule.validate()
    }
}

impl From<ScheduleWire> for OptimizedSchedule {
    fn from(wire: ScheduleWire) -> Self {
        Self {
            optimized_schedule: wire
                .optimized_schedule
                .into_iter()
                .map(|block| ScheduledBlock {
                    start_time: block.start_time,
                    end_time: block.end_time,
                    task_id: block.task_id,
                    task_title: block.task_title,
                    reasoning: block.reasoning,
                })
                .collect(),
            recommendations: wire.recommendations,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DailySummaryWire {
    summary: String,
    highlights: Vec<String>,
    improvements: Vec<String>,
    tomorrow_focus: String,
}

impl Validate for DailySummaryWire {
    fn validate(&self) -> std::result::Result<(), String> {
        require_text("summary", &self.summary)?;
        require_text("tomorrowFocus", &self.tomorrow_focus)
    }
}

impl From<DailySummaryWire> for DailySummary {
    fn from(wire: DailySummaryWire) -> Self {
        Self {
            summary: wire.summary,
            highlights: wire.highlights,
            improvements: wire.improvements,
            tomorrow_focus: wire.tomorrow_focus,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn malformed_detail(result: Result<AdvisoryResult>) -> String {
        match result {
            Err(AdvisoryError::MalformedResponse { detail, .. }) => detail,
            other => panic!("expected malformed response, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_task_breakdown() {
        let raw = r#"{
            "subtasks": ["Outline sections", "Draft body", "Proofread"],
            "estimatedTimes": [10, 20, 5],
            "recommendations": ["Use a timer"]
        }"#;

        let result = parse_response(UseCase::TaskBreakdown, raw).unwrap();
        let AdvisoryResult::TaskBreakdown(breakdown) = result else {
            panic!("wrong variant");
        };
        assert_eq!(breakdown.subtasks.len(), 3);
        assert_eq!(breakdown.estimated_times, vec![10, 20, 5]);
    }

    #[test]
    fn test_fenced_json_is_accepted() {
        let raw = "```json\n{\"summary\": \"Good day\", \"highlights\": [], \"improvements\": [], \"tomorrowFocus\": \"Start early\"}\n```";
        let result = parse_response(UseCase::DailySummary, raw).unwrap();
        assert_eq!(result.use_case(), UseCase::DailySummary);
    }

    #[test]
    fn test_prose_is_malformed() {
        let detail = malformed_detail(parse_response(
            UseCase::DailySummary,
            "Here is your summary: great job today!",
        ));
        assert!(!detail.is_empty());
    }

    #[test]
    fn test_mismatched_parallel_arrays_rejected() {
        let raw = r#"{"subtasks": ["a", "b"], "estimatedTimes": [5], "recommendations": []}"#;
        let detail = malformed_detail(parse_response(UseCase::TaskBreakdown, raw));
        assert_eq!(detail, "2 subtasks but 1 estimated times");
    }

    #[test]
    fn test_missing_field_rejected() {
        let raw = r#"{"subtasks": ["a"], "recommendations": []}"#;
        let detail = malformed_detail(parse_response(UseCase::TaskBreakdown, raw));
        assert!(detail.contains("estimatedTimes"));
    }

    #[test]
    fn test_insight_defaults_applied() {
        let raw = r#"[{"type": "energy", "title": "Afternoon dip", "content": "Energy drops after lunch"}]"#;
        let AdvisoryResult::FocusInsight(focus) =
            parse_response(UseCase::FocusInsight, raw).unwrap()
        else {
            panic!("wrong variant");
        };

        let insight = &focus.insights[0];
        assert_eq!(insight.kind, InsightKind::Energy);
        assert!(!insight.actionable);
        assert_eq!(insight.confidence, DEFAULT_INSIGHT_CONFIDENCE);
        assert_eq!(insight.category, "ai-generated");
    }

    #[test]
    fn test_unknown_insight_type_rejected() {
        let raw = r#"[{"type": "astrology", "title": "t", "content": "c"}]"#;
        malformed_detail(parse_response(UseCase::FocusInsight, raw));
    }

    #[test]
    fn test_confidence_out_of_range_rejected() {
        let raw = r#"[{"type": "focus", "title": "t", "content": "c", "confidence": 8}]"#;
        let detail = malformed_detail(parse_response(UseCase::FocusInsight, raw));
        assert!(detail.starts_with("item 0:"));
    }

    #[test]
    fn test_habit_priority_defaults_and_range() {
        let raw = r#"[{"type": "habit", "title": "Desk reset", "description": "d", "reasoning": "r"}]"#;
        let AdvisoryResult::HabitRecommendation(habits) =
            parse_response(UseCase::HabitRecommendation, raw).unwrap()
        else {
            panic!("wrong variant");
        };
        assert_eq!(habits.recommendations[0].priority, 3);
        assert_eq!(habits.recommendations[0].kind, RecommendationKind::Habit);

        let raw = r#"[{"title": "x", "description": "d", "reasoning": "r", "priority": 9}]"#;
        malformed_detail(parse_response(UseCase::HabitRecommendation, raw));
    }

    #[test]
    fn test_schedule_times_must_be_clock_times() {
        let raw = r#"{
            "optimizedSchedule": [
                {"startTime": "9am", "endTime": "09:30", "taskId": "t1", "taskTitle": "A", "reasoning": "r"}
            ],
            "recommendations": []
        }"#;
        let detail = malformed_detail(parse_response(UseCase::ScheduleOptimization, raw));
        assert!(detail.contains("startTime"));
    }

    #[test]
    fn test_fence_without_info_string_keeps_first_line() {
        let raw = "```{\"summary\": \"s\",\n\"highlights\": [], \"improvements\": [],\n\"tomorrowFocus\": \"t\"}```";
        let result = parse_response(UseCase::DailySummary, raw).unwrap();
        let AdvisoryResult::DailySummary(summary) = result else {
            panic!("wrong variant");
        };
        assert_eq!(summary.summary, "s");
        assert_eq!(summary.tomorrow_focus, "t");
    }

    #[test]
    fn test_strip_code_fence_variants() {
        assert_eq!(strip_code_fence("  {}  "), "{}");
        assert_eq!(strip_code_fence("```\n[]\n```"), "[]");
        assert_eq!(strip_code_fence("```json\n{\"a\": 1}\n```"), "{\"a\": 1}");
        assert_eq!(strip_code_fence("```json {}"), "```json {}");
        assert_eq!(
            strip_code_fence("```{\"a\": 1,\n\"b\": 2}```"),
            "{\"a\": 1,\n\"b\": 2}"
        );
    }
}
