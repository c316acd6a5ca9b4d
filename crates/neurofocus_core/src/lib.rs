//! NeuroFocus Core - advisory engine for ADHD-friendly productivity
//!
//! Builds prompts for a small set of productivity use cases, sends them to a
//! generative model, and turns the replies into typed results. When the model
//! is unreachable, slow, or answers with something unusable, deterministic
//! local heuristics produce a result of the same shape instead.

pub mod advisory;
pub mod config;
pub mod error;
pub mod model;
pub mod types;
pub mod utils;

// Macros are automatically available at crate root due to #[macro_export]

pub use advisory::{
    Advisor, Advisory, AdvisoryRequest, AdvisoryResult, FallbackReason, InvocationFailure,
    Provenance, UseCase,
};
pub use config::{AdvisorConfig, ModelConfig};
pub use error::{AdvisoryError, Result};
pub use model::{GenAiGenerator, ScriptedGenerator, TextGenerator};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::advisory::{
        AdvisoryInputs, DailySummary, FocusInsights, HabitRecommendations, OptimizedSchedule,
        ScheduledBlock, TaskBreakdown,
    };
    pub use crate::types::{
        EnergyPattern, FocusSession, HabitPreferences, Insight, Priority, ProductivityMetrics,
        Recommendation, SchedulePreferences, Task, TaskInput, UserContext,
    };
    pub use crate::{
        Advisor, Advisory, AdvisoryError, AdvisoryRequest, AdvisoryResult, FallbackReason,
        Provenance, Result, TextGenerator, UseCase,
    };
}
