use std::collections::HashMap;

use camino::Utf8PathBuf;
use sudoku_contracts::{Catalog, SpecPayload};
use sudoku_eventlog::EventLog;
use sudoku_shadow::ShadowConfig;
use sudoku_store::ArtifactStore;
use sudoku_validation::ProfileConfig;

/// Everything one `run_pipeline` invocation needs. Assembled by the binary
/// from config-file/env/CLI layers; the orchestrator itself resolves none
/// of that precedence — it only consumes the already-resolved values.
pub struct PipelineInputs<'a> {
    pub puzzle_kind: &'a str,
    pub root_seed: &'a str,
    pub run_id: &'a str,
    pub profile_name: &'a str,
    pub profile: &'a ProfileConfig,
    pub spec: SpecPayload,
    pub router_policy_toml: Option<&'a str>,
    pub environment: &'a HashMap<String, String>,
    pub output_dir: Utf8PathBuf,
    pub store: &'a ArtifactStore,
    pub catalog: Option<&'a Catalog>,
    pub shadow_config: &'a ShadowConfig,
    pub shadow_event_log: &'a EventLog,
    pub commit_sha: &'a str,
    pub baseline_sha: &'a str,
    pub hw_fingerprint: &'a str,
}
