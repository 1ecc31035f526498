//! Command-line interface: argument parsing plus the `run()` entrypoint that
//! `main.rs` calls. All I/O, logging, and exit-code mapping happens here;
//! `main.rs` itself only forwards the returned [`ExitCode`] to
//! `std::process::exit`.

use camino::Utf8PathBuf;
use clap::{Parser, Subcommand};
use sudoku_contracts::{ArtifactType, Catalog};
use sudoku_orchestrator::PipelineInputs;
use sudoku_router::Role;
use sudoku_validation::{Profile, ProfileConfig};

use crate::config::Config;
use crate::error::PipelineError;
use crate::exit_codes::ExitCode;

/// Deterministic, content-addressed Sudoku pipeline with a shadow-compare
/// harness between a `legacy` and a `novus` solver implementation.
#[derive(Parser, Debug)]
#[command(name = "sudoku-pipeline")]
#[command(about = "Generate, verify, and export a Sudoku puzzle through a content-addressed pipeline")]
#[command(long_about = r#"
sudoku-pipeline runs four content-addressed stages over a puzzle spec:
config -> generate -> solve/verify -> export, optionally shadow-comparing
the solver against a second implementation and logging any mismatch.

EXAMPLES:
  # Run the full pipeline with a given seed
  sudoku-pipeline --puzzle sudoku-9x9 --root-seed my-seed run

  # Run with shadow-compare forced on at full sample rate
  sudoku-pipeline --puzzle sudoku-9x9 --root-seed my-seed \
      --shadow-enabled --shadow-sample-rate 1.0 run

  # Load policy/profile from a feature file
  sudoku-pipeline --config pipeline.toml run

  # Validate a previously produced artifact file
  sudoku-pipeline validate artifacts/Spec/sha256-abc.json --artifact-type spec

  # Inspect what the router would resolve for a role
  sudoku-pipeline --puzzle sudoku-9x9 router show --role solver

CONFIGURATION:
  Precedence (lowest to highest): built-in defaults, config file (--config),
  process environment (PUZZLE_*), CLI flags. Router (`[modules.*]`) and
  shadow (`[shadow]`) policy tables in the config file are forwarded as-is
  to sudoku-router/sudoku-shadow, which apply the same precedence to them.
"#)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Path to a TOML feature file (overrides discovery defaults).
    #[arg(long, global = true)]
    pub config: Option<Utf8PathBuf>,

    /// Select puzzle kind.
    #[arg(long, global = true)]
    pub puzzle: Option<String>,

    /// Deterministic root seed driving every derived stage seed/timestamp.
    #[arg(long = "root-seed", global = true)]
    pub root_seed: Option<String>,

    /// Validation profile: dev, ci, or prod.
    #[arg(long, global = true)]
    pub profile: Option<String>,

    /// Output directory for exported PDFs. Default "exports".
    #[arg(long = "output-dir", global = true)]
    pub output_dir: Option<Utf8PathBuf>,

    /// Directory containing PuzzleContracts/catalog.json; omit to skip
    /// catalog-backed schema-identity checks.
    #[arg(long = "contracts-dir", global = true)]
    pub contracts_dir: Option<Utf8PathBuf>,

    /// Spec payload file (TOML or JSON); omit to use the built-in 9x9 demo spec.
    #[arg(long = "spec-file", global = true)]
    pub spec_file: Option<Utf8PathBuf>,

    /// Override the master shadow-compare switch on.
    #[arg(long = "shadow-enabled", global = true, conflicts_with = "shadow_disabled")]
    pub shadow_enabled: bool,

    /// Override the master shadow-compare switch off.
    #[arg(long = "shadow-disabled", global = true)]
    pub shadow_disabled: bool,

    /// Decimal sample rate string, e.g. "0.25".
    #[arg(long = "shadow-sample-rate", global = true)]
    pub shadow_sample_rate: Option<String>,

    /// Whether to emit a JSONL event on mismatch.
    #[arg(long = "shadow-log-mismatch", global = true)]
    pub shadow_log_mismatch: Option<bool>,

    /// p95 latency budget in milliseconds.
    #[arg(long = "shadow-budget-ms-p95", global = true)]
    pub shadow_budget_ms_p95: Option<u64>,

    /// Salt mixed into the sampling hash; required under the prod profile.
    #[arg(long = "shadow-hash-salt", global = true)]
    pub shadow_hash_salt: Option<String>,

    /// Force sticky sampling (decision independent of run_id).
    #[arg(long = "shadow-sticky", global = true, conflicts_with = "shadow_sticky_off")]
    pub shadow_sticky: bool,

    /// Force non-sticky sampling.
    #[arg(long = "shadow-sticky-off", global = true)]
    pub shadow_sticky_off: bool,

    /// Run identifier; random if omitted. Not part of any artifact id.
    #[arg(long = "run-id", global = true)]
    pub run_id: Option<String>,

    #[arg(long = "commit-sha", global = true)]
    pub commit_sha: Option<String>,

    #[arg(long = "baseline-sha", global = true)]
    pub baseline_sha: Option<String>,

    #[arg(long = "hw-fingerprint", global = true)]
    pub hw_fingerprint: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the full config -> generate -> solve -> export pipeline.
    Run,
    /// Validate a stored artifact file against its schema/invariants/crossrefs.
    Validate {
        /// Path to a canonical JSON artifact file.
        artifact_file: Utf8PathBuf,
        #[arg(long = "artifact-type")]
        artifact_type: String,
    },
    /// Inspect router policy resolution without running the pipeline.
    Router {
        #[command(subcommand)]
        action: RouterAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum RouterAction {
    /// Show which implementation the router would resolve for a role.
    Show {
        #[arg(long)]
        role: String,
    },
}

fn parse_artifact_type(name: &str) -> Result<ArtifactType, PipelineError> {
    match name {
        "spec" | "Spec" => Ok(ArtifactType::Spec),
        "complete_grid" | "CompleteGrid" => Ok(ArtifactType::CompleteGrid),
        "verdict" | "Verdict" => Ok(ArtifactType::Verdict),
        "export_bundle" | "ExportBundle" => Ok(ArtifactType::ExportBundle),
        other => Err(PipelineError::Config(format!("unknown artifact type '{other}'"))),
    }
}

fn parse_role(name: &str) -> Result<Role, PipelineError> {
    match name {
        "generator" => Ok(Role::Generator),
        "solver" => Ok(Role::Solver),
        "printer" => Ok(Role::Printer),
        "difficulty" => Ok(Role::Difficulty),
        other => Err(PipelineError::Config(format!("unknown role '{other}'"))),
    }
}

fn load_catalog(contracts_dir: Option<&Utf8PathBuf>) -> Result<Option<Catalog>, PipelineError> {
    match contracts_dir {
        Some(dir) => Ok(Some(Catalog::load(dir.as_std_path())?)),
        None => Ok(None),
    }
}

/// `artifacts/` and `logs/` (spec.md §6.4) are siblings of `--output-dir`,
/// not nested under it, so derive their common parent from it.
fn state_root(output_dir: &Utf8PathBuf) -> Utf8PathBuf {
    output_dir.parent().map(|p| p.to_path_buf()).unwrap_or_else(|| Utf8PathBuf::from("."))
}

/// Parse arguments, resolve configuration, dispatch the subcommand, and map
/// any error to an [`ExitCode`]. Returns `Ok(())` on success so `main.rs` can
/// exit 0 implicitly.
pub fn run() -> Result<(), ExitCode> {
    let cli = Cli::parse();
    crate::logging::init();

    match run_inner(&cli) {
        Ok(()) => Ok(()),
        Err(err) => {
            let code = ExitCode::from(&err);
            tracing::error!(error = %err, exit_code = code.as_i32(), "sudoku-pipeline failed");
            Err(code)
        }
    }
}

fn run_inner(cli: &Cli) -> Result<(), PipelineError> {
    let (config, _raw_toml) = Config::discover(cli)?;
    let catalog = load_catalog(config.contracts_dir.as_ref())?;

    match &cli.command {
        Command::Run => run_pipeline_command(cli, &config, catalog.as_ref()),
        Command::Validate { artifact_file, artifact_type } => {
            validate_command(&config, catalog.as_ref(), artifact_file, artifact_type)
        }
        Command::Router { action } => router_command(&config, action),
    }
}

fn run_pipeline_command(cli: &Cli, config: &Config, catalog: Option<&Catalog>) -> Result<(), PipelineError> {
    let spec = config.load_spec(cli.spec_file.as_ref())?;
    let profile: Profile = config
        .validation_profile
        .parse()
        .map_err(PipelineError::Config)?;
    let profile_config = ProfileConfig::for_profile(profile);

    let toml_shadow = config
        .router_policy_toml
        .as_deref()
        .map(|text| text.parse::<toml::Value>())
        .transpose()
        .map_err(|source| PipelineError::ConfigParse {
            path: Utf8PathBuf::from("<config>"),
            source,
        })?
        .unwrap_or_else(|| toml::Value::Table(Default::default()));
    let toml_shadow_config = sudoku_shadow::TomlShadowConfig::from_toml_value(&toml_shadow);
    let shadow_config = sudoku_shadow::resolve_config(&config.validation_profile, &toml_shadow_config, &config.environment)?;

    std::fs::create_dir_all(config.output_dir.as_std_path())?;
    let root = state_root(&config.output_dir);
    let store = sudoku_store::ArtifactStore::new(root.join("artifacts"));
    let event_log = sudoku_eventlog::EventLog::new(root.join("logs"), "shadow");

    let inputs = PipelineInputs {
        puzzle_kind: &config.puzzle_kind,
        root_seed: &config.root_seed,
        run_id: &config.run_id,
        profile_name: &config.validation_profile,
        profile: &profile_config,
        spec,
        router_policy_toml: config.router_policy_toml.as_deref(),
        environment: &config.environment,
        output_dir: config.output_dir.clone(),
        store: &store,
        catalog,
        shadow_config: &shadow_config,
        shadow_event_log: &event_log,
        commit_sha: &config.commit_sha,
        baseline_sha: &config.baseline_sha,
        hw_fingerprint: &config.hw_fingerprint,
    };

    let outcome = sudoku_orchestrator::run_pipeline(&inputs)?;

    tracing::info!(
        spec_id = %outcome.spec.id,
        complete_id = %outcome.complete.id,
        verdict_id = %outcome.verdict.id,
        bundle_id = outcome.bundle.as_ref().map(|b| b.id.as_str()),
        pdf_path = outcome.pdf_path.as_ref().map(|p| p.as_str()),
        shadow_skipped = outcome.shadow_counters.shadow_skipped,
        shadow_ok = outcome.shadow_counters.shadow_ok,
        shadow_mismatch = ?outcome.shadow_counters.shadow_mismatch,
        "pipeline run complete"
    );

    Ok(())
}

fn validate_command(
    config: &Config,
    catalog: Option<&Catalog>,
    artifact_file: &Utf8PathBuf,
    artifact_type: &str,
) -> Result<(), PipelineError> {
    let artifact_type = parse_artifact_type(artifact_type)?;
    let bytes = std::fs::read(artifact_file.as_std_path())?;
    let value: serde_json::Value = serde_json::from_slice(&bytes)
        .map_err(|e| PipelineError::Config(format!("invalid artifact JSON: {e}")))?;

    let profile: Profile = config.validation_profile.parse().map_err(PipelineError::Config)?;
    let profile_config = ProfileConfig::for_profile(profile);
    let store = sudoku_store::ArtifactStore::new(state_root(&config.output_dir).join("artifacts"));
    let resolver = move |reference: &str| match store.resolve_reference(reference) {
        sudoku_store::Reference::Digest(id) => store.load(&id).ok(),
        sudoku_store::Reference::Path(path) => std::fs::read(path.as_std_path())
            .ok()
            .and_then(|bytes| serde_json::from_slice(&bytes).ok()),
    };

    let report = sudoku_validation::validate(&value, artifact_type, &profile_config, &resolver, catalog);
    tracing::info!(ok = report.ok, errors = report.errors.len(), warnings = report.warnings.len(), "validation report");
    for issue in &report.errors {
        tracing::error!(code = %issue.code, path = %issue.path, "{}", issue.message);
    }
    for issue in &report.warnings {
        tracing::warn!(code = %issue.code, path = %issue.path, "{}", issue.message);
    }

    sudoku_validation::assert_valid(report, profile_config.warn_as_error)
        .map_err(|failed| PipelineError::Orchestrator(sudoku_orchestrator::OrchestratorError::Validation {
            stage: "validate",
            report: failed.report,
        }))?;
    Ok(())
}

fn router_command(config: &Config, action: &RouterAction) -> Result<(), PipelineError> {
    let RouterAction::Show { role } = action;
    let role = parse_role(role)?;
    let resolved = sudoku_router::resolve(
        &config.puzzle_kind,
        role,
        &config.validation_profile,
        config.router_policy_toml.as_deref(),
        &config.environment,
    )?;
    tracing::info!(
        puzzle_kind = %resolved.puzzle_kind,
        role = %resolved.role,
        impl_id = %resolved.impl_id,
        state = %resolved.state,
        decision_source = resolved.decision_source.as_str(),
        fallback_used = resolved.fallback_used,
        "router resolution"
    );
    Ok(())
}

