//! The advisory engine
//!
//! A request goes through four stages:
//!
//! 1. [`AdvisoryRequest::prepare`] resolves the use case and checks the inputs.
//! 2. [`PreparedRequest::render_prompt`] renders the fixed-layout prompt.
//! 3. The [`Advisor`] sends it to the model exactly once.
//! 4. [`PreparedRequest::interpret`] validates the reply, or
//!    [`PreparedRequest::fallback`] computes the heuristic answer when anything
//!    past step 2 went wrong.
//!
//! Results have the same shape whichever way they were produced.

pub mod fallback;
mod interpreter;
pub mod prompt;
mod request;
mod response;
mod result;

pub use interpreter::{Advisor, Advisory, FallbackReason, InvocationFailure, Provenance};
pub use prompt::build_prompt;
pub use request::{AdvisoryInputs, AdvisoryRequest, PreparedRequest, UseCase};
pub use response::{
    DEFAULT_INSIGHT_CONFIDENCE, DEFAULT_RECOMMENDATION_PRIORITY, EXTERNAL_INSIGHT_CATEGORY,
    parse_response,
};
pub use result::{
    AdvisoryResult, DailySummary, FocusInsights, HabitRecommendations, OptimizedSchedule,
    ScheduledBlock, TaskBreakdown,
};
