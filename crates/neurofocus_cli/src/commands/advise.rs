use miette::{IntoDiagnostic, Result, WrapErr};
use neurofocus_core::{
    Advisor, Advisory, AdvisoryRequest, AdvisoryResult, Provenance,
    advisory::fallback::demo_insights, config::AdvisorConfig, types::Insight,
};
use owo_colors::OwoColorize;
use std::path::Path;

use crate::output::Output;

/// Read an advisory request from a JSON file
pub async fn read_request(path: &Path) -> Result<AdvisoryRequest> {
    let content = tokio::fs::read_to_string(path)
        .await
        .into_diagnostic()
        .wrap_err_with(|| format!("Failed to read request file {}", path.display()))?;

    serde_json::from_str(&content)
        .into_diagnostic()
        .wrap_err_with(|| format!("{} is not a valid advisory request", path.display()))
}

/// Print the prompt that would be sent for a request
pub async fn prompt(path: &Path) -> Result<()> {
    let request = read_request(path).await?;
    let prompt = neurofocus_core::advisory::build_prompt(&request)?;
    println!("{}", prompt);
    Ok(())
}

/// Run a full advisory call against the configured model
pub async fn advise(path: &Path, json: bool, config: &AdvisorConfig) -> Result<()> {
    let request = read_request(path).await?;
    let advisor = Advisor::from_config(config);

    tracing::info!(
        "Requesting {} from {}",
        request.use_case_tag().unwrap_or("?"),
        advisor.model_id()
    );

    let advisory = advisor.advise(&request).await?;

    if json {
        print_json(&advisory)?;
    } else {
        print_advisory(&advisory);
    }
    Ok(())
}

/// Compute the heuristic result without contacting any model
pub async fn fallback(path: &Path, json: bool) -> Result<()> {
    let request = read_request(path).await?;
    let result = request.prepare()?.fallback();

    if json {
        print_json(&result)?;
    } else {
        print_result(&result);
    }
    Ok(())
}

/// Print the canned demo insights
pub async fn demo() -> Result<()> {
    let output = Output::new();
    output.section("Demo Insights");
    for insight in demo_insights() {
        print_insight(&output, &insight);
    }
    Ok(())
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).into_diagnostic()?;
    println!("{}", json);
    Ok(())
}

fn print_advisory(advisory: &Advisory) {
    let output = Output::new();
    match &advisory.provenance {
        Provenance::External => output.success("Answered by the model"),
        Provenance::Fallback { reason } => output.warning(reason.user_message()),
    }
    print_result(&advisory.result);
}

fn print_result(result: &AdvisoryResult) {
    let output = Output::new();

    match result {
        AdvisoryResult::TaskBreakdown(breakdown) => {
            output.section("Task Breakdown");
            for (subtask, minutes) in breakdown.subtasks.iter().zip(&breakdown.estimated_times) {
                output.list_item(&format!("{} {}", subtask, format!("({} min)", minutes).dimmed()));
            }
            print_tips(&output, &breakdown.recommendations);
        }
        AdvisoryResult::FocusInsight(focus) => {
            output.section("Focus Insights");
            if focus.insights.is_empty() {
                output.status("No focus sessions to analyze yet");
            }
            for insight in &focus.insights {
                print_insight(&output, insight);
            }
        }
        AdvisoryResult::HabitRecommendation(habits) => {
            output.section("Habit Recommendations");
            for recommendation in &habits.recommendations {
                println!();
                output.info(
                    &format!("[{}]", recommendation.priority),
                    &recommendation.title.bold().to_string(),
                );
                output.status(&recommendation.description);
                output.status(&recommendation.reasoning);
            }
        }
        AdvisoryResult::ScheduleOptimization(schedule) => {
            output.section("Optimized Schedule");
            for block in &schedule.optimized_schedule {
                output.info(
                    &format!("{}-{}", block.start_time, block.end_time),
                    &block.task_title,
                );
                output.status(&block.reasoning);
            }
            print_tips(&output, &schedule.recommendations);
        }
        AdvisoryResult::DailySummary(summary) => {
            output.section("Daily Summary");
            println!("  {}", summary.summary);
            println!();
            output.kv("Highlights", "");
            for highlight in &summary.highlights {
                output.list_item(highlight);
            }
            output.kv("Improvements", "");
            for improvement in &summary.improvements {
                output.list_item(improvement);
            }
            output.kv("Tomorrow", &summary.tomorrow_focus);
        }
    }
}

fn print_insight(output: &Output, insight: &Insight) {
    println!();
    output.info(
        &format!("[{:.0}%]", insight.confidence * 100.0),
        &insight.title.bold().to_string(),
    );
    println!("  {}", insight.content);
    for item in &insight.action_items {
        output.list_item(item);
    }
}

fn print_tips(output: &Output, tips: &[String]) {
    if tips.is_empty() {
        return;
    }
    println!();
    output.kv("Tips", "");
    for tip in tips {
        output.list_item(tip);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use neurofocus_core::UseCase;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn test_read_request_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("request.json");
        tokio::fs::write(
            &path,
            r#"{"useCase": "task-breakdown", "task": {"title": "Write report", "estimatedDuration": 30}}"#,
        )
        .await
        .unwrap();

        let request = read_request(&path).await.unwrap();
        assert_eq!(request.use_case_tag(), Some("task-breakdown"));
        assert_eq!(request.prepare().unwrap().use_case(), UseCase::TaskBreakdown);
    }

    #[tokio::test]
    async fn test_read_request_rejects_bad_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("request.json");
        tokio::fs::write(&path, "{ not json").await.unwrap();

        assert!(read_request(&path).await.is_err());
    }
}
