//! Shadow-compare runtime: deterministic sampling, taxonomy classification,
//! fallback-to-baseline, and structured event construction.

pub mod classify;
pub mod config;
pub mod event;
pub mod runtime;
pub mod sampling;

pub use classify::{classify, classify_guardrail, Comparison, Severity, Taxonomy};
pub use config::{resolve as resolve_config, ShadowConfig, ShadowConfigError, TomlShadowConfig};
pub use event::{build_event, compute_state_hash, solved_ref_digest, EventContext, GuardrailFields, ShadowEvent, TaxonomyFields};
pub use runtime::{run, BaselineRun, CandidateRun, Counters, RunOutcome};
pub use sampling::{sample_hit, SampleRate, SampleRateError};
