//! Top-level configuration: merges a TOML feature file, process environment,
//! and CLI-forwarded overrides into one resolved [`Config`], tracking which
//! layer won each field in `source_attribution` — the same precedence model
//! the router (C5) and shadow runtime (§4.7.1) apply to their own policy
//! tables, lifted one level up for the fields this binary owns directly.

use std::collections::HashMap;

use camino::Utf8PathBuf;
use sudoku_contracts::{Block, Limits, SpecPayload};

use crate::cli::Cli;
use crate::error::PipelineError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigSource {
    Default,
    ConfigFile,
    Env,
    Cli,
}

impl ConfigSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConfigSource::Default => "default",
            ConfigSource::ConfigFile => "config_file",
            ConfigSource::Env => "env",
            ConfigSource::Cli => "cli",
        }
    }
}

/// Resolved configuration for one invocation. `router_policy_toml` and
/// `shadow_toml` are the raw document text/value handed to `sudoku-router`
/// and `sudoku-shadow`, which own their own precedence chains over
/// `[modules.*]` / `[shadow]` — this struct only resolves the fields this
/// binary is directly responsible for.
#[derive(Debug, Clone)]
pub struct Config {
    pub root_seed: String,
    pub puzzle_kind: String,
    pub validation_profile: String,
    pub output_dir: Utf8PathBuf,
    pub contracts_dir: Option<Utf8PathBuf>,
    pub run_id: String,
    pub commit_sha: String,
    pub baseline_sha: String,
    pub hw_fingerprint: String,
    pub router_policy_toml: Option<String>,
    pub environment: HashMap<String, String>,
    pub source_attribution: HashMap<String, ConfigSource>,
}

fn default_nine_by_nine_spec() -> SpecPayload {
    SpecPayload {
        name: "classic".to_string(),
        size: 9,
        block: Block { rows: 3, cols: 3 },
        alphabet: (1..=9).map(|d| d.to_string()).collect(),
        limits: Limits { solver_timeout_ms: 5_000 },
    }
}

/// Raw `[pipeline]`-adjacent top-level fields read out of the feature file;
/// `[shadow]` and `[modules.*]` tables are left untouched for their owning
/// crates to parse.
#[derive(Debug, Clone, Default)]
struct TomlConfig {
    root_seed: Option<String>,
    puzzle_kind: Option<String>,
    validation_profile: Option<String>,
    output_dir: Option<String>,
    contracts_dir: Option<String>,
    run_id: Option<String>,
    commit_sha: Option<String>,
    baseline_sha: Option<String>,
    hw_fingerprint: Option<String>,
}

impl TomlConfig {
    fn from_toml_value(value: &toml::Value) -> Self {
        let as_string = |key: &str| value.get(key).and_then(toml::Value::as_str).map(str::to_string);
        Self {
            root_seed: as_string("root_seed"),
            puzzle_kind: as_string("puzzle_kind"),
            validation_profile: as_string("validation_profile"),
            output_dir: as_string("output_dir"),
            contracts_dir: as_string("contracts_dir"),
            run_id: as_string("run_id"),
            commit_sha: as_string("commit_sha"),
            baseline_sha: as_string("baseline_sha"),
            hw_fingerprint: as_string("hw_fingerprint"),
        }
    }
}

impl Config {
    /// Merge defaults, an optional config file, the process environment, and
    /// CLI flags, in that precedence order (later layers win).
    pub fn discover(cli: &Cli) -> Result<(Self, toml::Value), PipelineError> {
        let mut attribution = HashMap::new();

        let mut root_seed = None;
        let mut puzzle_kind = None;
        let mut validation_profile = "dev".to_string();
        let mut output_dir = Utf8PathBuf::from("exports");
        let mut contracts_dir = None;
        let mut run_id = None;
        let mut commit_sha = "unknown".to_string();
        let mut baseline_sha = "unknown".to_string();
        let mut hw_fingerprint = "unknown".to_string();
        attribution.insert("validation_profile".to_string(), ConfigSource::Default);
        attribution.insert("output_dir".to_string(), ConfigSource::Default);
        attribution.insert("commit_sha".to_string(), ConfigSource::Default);
        attribution.insert("baseline_sha".to_string(), ConfigSource::Default);
        attribution.insert("hw_fingerprint".to_string(), ConfigSource::Default);

        let mut raw_toml_text = String::new();
        let mut parsed_toml = toml::Value::Table(Default::default());

        if let Some(path) = &cli.config {
            raw_toml_text = std::fs::read_to_string(path.as_std_path()).map_err(|source| PipelineError::ConfigRead {
                path: path.clone(),
                source,
            })?;
            parsed_toml = raw_toml_text
                .parse::<toml::Value>()
                .map_err(|source| PipelineError::ConfigParse {
                    path: path.clone(),
                    source,
                })?;
            let file_config = TomlConfig::from_toml_value(&parsed_toml);

            if let Some(v) = file_config.root_seed {
                root_seed = Some(v);
                attribution.insert("root_seed".to_string(), ConfigSource::ConfigFile);
            }
            if let Some(v) = file_config.puzzle_kind {
                puzzle_kind = Some(v);
                attribution.insert("puzzle_kind".to_string(), ConfigSource::ConfigFile);
            }
            if let Some(v) = file_config.validation_profile {
                validation_profile = v;
                attribution.insert("validation_profile".to_string(), ConfigSource::ConfigFile);
            }
            if let Some(v) = file_config.output_dir {
                output_dir = Utf8PathBuf::from(v);
                attribution.insert("output_dir".to_string(), ConfigSource::ConfigFile);
            }
            if let Some(v) = file_config.contracts_dir {
                contracts_dir = Some(Utf8PathBuf::from(v));
                attribution.insert("contracts_dir".to_string(), ConfigSource::ConfigFile);
            }
            if let Some(v) = file_config.run_id {
                run_id = Some(v);
                attribution.insert("run_id".to_string(), ConfigSource::ConfigFile);
            }
            if let Some(v) = file_config.commit_sha {
                commit_sha = v;
                attribution.insert("commit_sha".to_string(), ConfigSource::ConfigFile);
            }
            if let Some(v) = file_config.baseline_sha {
                baseline_sha = v;
                attribution.insert("baseline_sha".to_string(), ConfigSource::ConfigFile);
            }
            if let Some(v) = file_config.hw_fingerprint {
                hw_fingerprint = v;
                attribution.insert("hw_fingerprint".to_string(), ConfigSource::ConfigFile);
            }
        }

        if let Ok(v) = std::env::var("PUZZLE_ROOT_SEED") {
            root_seed = Some(v);
            attribution.insert("root_seed".to_string(), ConfigSource::Env);
        }
        if let Ok(v) = std::env::var("PUZZLE_KIND") {
            puzzle_kind = Some(v);
            attribution.insert("puzzle_kind".to_string(), ConfigSource::Env);
        }
        if let Ok(v) = std::env::var("PUZZLE_VALIDATION_PROFILE") {
            validation_profile = v;
            attribution.insert("validation_profile".to_string(), ConfigSource::Env);
        }

        if let Some(v) = &cli.root_seed {
            root_seed = Some(v.clone());
            attribution.insert("root_seed".to_string(), ConfigSource::Cli);
        }
        if let Some(v) = &cli.puzzle {
            puzzle_kind = Some(v.clone());
            attribution.insert("puzzle_kind".to_string(), ConfigSource::Cli);
        }
        if let Some(v) = &cli.profile {
            validation_profile = v.clone();
            attribution.insert("validation_profile".to_string(), ConfigSource::Cli);
        }
        if let Some(v) = &cli.output_dir {
            output_dir = v.clone();
            attribution.insert("output_dir".to_string(), ConfigSource::Cli);
        }
        if let Some(v) = &cli.contracts_dir {
            contracts_dir = Some(v.clone());
            attribution.insert("contracts_dir".to_string(), ConfigSource::Cli);
        }
        if let Some(v) = &cli.run_id {
            run_id = Some(v.clone());
            attribution.insert("run_id".to_string(), ConfigSource::Cli);
        }
        if let Some(v) = &cli.commit_sha {
            commit_sha = v.clone();
            attribution.insert("commit_sha".to_string(), ConfigSource::Cli);
        }
        if let Some(v) = &cli.baseline_sha {
            baseline_sha = v.clone();
            attribution.insert("baseline_sha".to_string(), ConfigSource::Cli);
        }
        if let Some(v) = &cli.hw_fingerprint {
            hw_fingerprint = v.clone();
            attribution.insert("hw_fingerprint".to_string(), ConfigSource::Cli);
        }

        let root_seed = root_seed.ok_or_else(|| PipelineError::Config("root_seed is required (config file, PUZZLE_ROOT_SEED, or --root-seed)".to_string()))?;
        let puzzle_kind = puzzle_kind.ok_or_else(|| PipelineError::Config("puzzle_kind is required (config file, PUZZLE_KIND, or --puzzle)".to_string()))?;
        if !matches!(validation_profile.as_str(), "dev" | "ci" | "prod") {
            return Err(PipelineError::Config(format!(
                "unknown validation profile '{validation_profile}', expected one of dev, ci, prod"
            )));
        }
        let run_id = run_id.unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

        let environment = build_environment(cli);

        Ok((
            Config {
                root_seed,
                puzzle_kind,
                validation_profile,
                output_dir,
                contracts_dir,
                run_id,
                commit_sha,
                baseline_sha,
                hw_fingerprint,
                router_policy_toml: if raw_toml_text.is_empty() { None } else { Some(raw_toml_text) },
                environment,
                source_attribution: attribution,
            },
            parsed_toml,
        ))
    }

    pub fn load_spec(&self, spec_file: Option<&Utf8PathBuf>) -> Result<SpecPayload, PipelineError> {
        match spec_file {
            Some(path) => {
                let text = std::fs::read_to_string(path.as_std_path()).map_err(|source| PipelineError::ConfigRead {
                    path: path.clone(),
                    source,
                })?;
                let spec: SpecPayload = if path.extension() == Some("json") {
                    serde_json::from_str(&text).map_err(|e| PipelineError::Config(format!("invalid spec JSON: {e}")))?
                } else {
                    toml::from_str(&text).map_err(|source| PipelineError::ConfigParse {
                        path: path.clone(),
                        source,
                    })?
                };
                Ok(spec)
            }
            None => Ok(default_nine_by_nine_spec()),
        }
    }
}

/// Fold `PUZZLE_*`/`CLI_PUZZLE_*` process env vars plus this invocation's
/// shadow/router CLI overrides into one case-normalised map, the shape
/// `sudoku-router`/`sudoku-shadow` expect to receive.
fn build_environment(cli: &Cli) -> HashMap<String, String> {
    let mut environment: HashMap<String, String> = std::env::vars()
        .filter(|(k, _)| k.starts_with("PUZZLE_") || k.starts_with("CLI_PUZZLE_"))
        .collect();

    if cli.shadow_enabled {
        environment.insert("CLI_PUZZLE_SHADOW_ENABLED".to_string(), "true".to_string());
    }
    if cli.shadow_disabled {
        environment.insert("CLI_PUZZLE_SHADOW_ENABLED".to_string(), "false".to_string());
    }
    if let Some(v) = &cli.shadow_sample_rate {
        environment.insert("CLI_PUZZLE_SHADOW_SAMPLE_RATE".to_string(), v.clone());
    }
    if let Some(v) = cli.shadow_log_mismatch {
        environment.insert("CLI_PUZZLE_SHADOW_LOG_MISMATCH".to_string(), v.to_string());
    }
    if let Some(v) = cli.shadow_budget_ms_p95 {
        environment.insert("CLI_PUZZLE_SHADOW_BUDGET_MS_P95".to_string(), v.to_string());
    }
    if let Some(v) = &cli.shadow_hash_salt {
        environment.insert("CLI_PUZZLE_SHADOW_HASH_SALT".to_string(), v.clone());
    }
    if cli.shadow_sticky {
        environment.insert("CLI_PUZZLE_SHADOW_STICKY".to_string(), "true".to_string());
    }
    if cli.shadow_sticky_off {
        environment.insert("CLI_PUZZLE_SHADOW_STICKY".to_string(), "false".to_string());
    }

    environment
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn cli_with(args: &[&str]) -> Cli {
        let mut full = vec!["sudoku-pipeline"];
        full.extend_from_slice(args);
        Cli::try_parse_from(full).expect("valid CLI args")
    }

    #[test]
    fn missing_root_seed_is_a_config_error() {
        let cli = cli_with(&["--puzzle", "sudoku-9x9", "run"]);
        let result = Config::discover(&cli);
        assert!(matches!(result, Err(PipelineError::Config(_))));
    }

    #[test]
    fn cli_flags_resolve_a_complete_config() {
        let cli = cli_with(&["--puzzle", "sudoku-9x9", "--root-seed", "seed-1", "run"]);
        let (config, _) = Config::discover(&cli).expect("config resolves");
        assert_eq!(config.puzzle_kind, "sudoku-9x9");
        assert_eq!(config.root_seed, "seed-1");
        assert_eq!(config.validation_profile, "dev");
        assert_eq!(config.source_attribution.get("root_seed"), Some(&ConfigSource::Cli));
        assert_eq!(config.source_attribution.get("validation_profile"), Some(&ConfigSource::Default));
    }

    #[test]
    fn unknown_profile_is_a_config_error() {
        let cli = cli_with(&["--puzzle", "sudoku-9x9", "--root-seed", "seed-1", "--profile", "staging", "run"]);
        let result = Config::discover(&cli);
        assert!(matches!(result, Err(PipelineError::Config(_))));
    }
}
