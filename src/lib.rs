/// The main library module for mathcoach
pub mod analysis;
pub mod coach;
pub mod config;
pub mod display;
pub mod error;
pub mod generator;
pub mod guardrail;
pub mod hints;
pub mod io;
pub mod logging;
pub mod policy;
pub mod prompt;
pub mod session;
pub mod templates;

// Explicit exports for better API clarity
pub use analysis::{AnalysisInput, Problem, ProblemAnalysis, ProblemAnalyzer, ProblemType};
pub use coach::{Coach, StatsSnapshot};
pub use config::Settings;
pub use error::{CoachError, CoachResult, GeneratorError, GeneratorResult};
pub use generator::{GenerationRequest, OfflineGenerator, ScriptedGenerator, TextGenerator};
pub use guardrail::{Category, MessageClassifier, ResponseScanner, Taxonomy};
pub use hints::{HintState, HintTier, MAX_HINTS};
pub use policy::{PolicyDecision, ResponsePolicy};
pub use prompt::PolicyText;
pub use session::{MemorySink, SessionId, SessionRecord, SessionSink, Turn};
pub use templates::TemplateBank;
