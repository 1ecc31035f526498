//! Module resolution router (C5): resolves which generator/solver/printer/
//! difficulty implementation to use, from a layered policy.

mod registry;

use std::collections::HashMap;
use std::fmt;

use serde_json::{Map, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Generator,
    Solver,
    Printer,
    Difficulty,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Generator => "generator",
            Role::Solver => "solver",
            Role::Printer => "printer",
            Role::Difficulty => "difficulty",
        }
    }

    fn env_prefix(&self) -> &'static str {
        match self {
            Role::Generator => "GENERATOR",
            Role::Solver => "SOLVER",
            Role::Printer => "PRINTER",
            Role::Difficulty => "DIFFICULTY",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecisionSource {
    Config,
    Env,
    Cli,
    Fallback,
}

impl DecisionSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            DecisionSource::Config => "config",
            DecisionSource::Env => "env",
            DecisionSource::Cli => "cli",
            DecisionSource::Fallback => "fallback",
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RouterError {
    #[error("puzzle '{0}' is not registered")]
    UnknownPuzzle(String),
    #[error("state '{state}' is not permitted for role '{role}' under the ci profile")]
    ForbiddenCiState { role: Role, state: String },
    #[error("implementation '{impl_id}' for role '{role}' is not registered and no fallback is available")]
    Unresolvable { role: Role, impl_id: String },
    #[error("failed to parse router policy TOML: {0}")]
    PolicyParse(#[from] toml::de::Error),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedModule {
    pub puzzle_kind: String,
    pub role: Role,
    pub impl_id: String,
    pub state: String,
    pub decision_source: DecisionSource,
    pub sample_rate_millionths: u32,
    pub allow_fallback: bool,
    pub fallback_used: bool,
    pub config: Map<String, Value>,
}

impl ResolvedModule {
    /// `sample_rate` as a `0.0..=1.0` float, reconstructed from the
    /// millionths fixed-point value the resolver stores internally.
    pub fn sample_rate(&self) -> f64 {
        self.sample_rate_millionths as f64 / 1_000_000.0
    }
}

const DEFAULT_IMPL: &str = "legacy";
const DEFAULT_STATE: &str = "default";

/// Per-role policy after TOML defaults/profile overrides have been merged,
/// before env/CLI layers are applied.
#[derive(Debug, Clone, Default)]
struct RolePolicy {
    impl_id: String,
    state: String,
    sample_rate_millionths: u32,
    allow_fallback: bool,
    extra: Map<String, Value>,
}

/// Parse the `[modules.<puzzle_kind>.<role>]` table (with optional
/// `by_profile.<profile>` overrides) out of a router policy TOML document.
fn extract_role_policy(toml_value: &toml::Value, puzzle_kind: &str, role: Role, profile: &str) -> RolePolicy {
    let mut policy = RolePolicy {
        impl_id: DEFAULT_IMPL.to_string(),
        state: DEFAULT_STATE.to_string(),
        sample_rate_millionths: 0,
        allow_fallback: true,
        extra: Map::new(),
    };

    let Some(role_table) = toml_value
        .get("modules")
        .and_then(|m| m.get(puzzle_kind))
        .and_then(|p| p.get(role.as_str()))
        .and_then(toml::Value::as_table)
    else {
        return policy;
    };

    apply_table(&mut policy, role_table);

    if let Some(profile_table) = role_table
        .get("by_profile")
        .and_then(toml::Value::as_table)
        .and_then(|by_profile| by_profile.get(profile))
        .and_then(toml::Value::as_table)
    {
        apply_table(&mut policy, profile_table);
    }

    policy
}

fn apply_table(policy: &mut RolePolicy, table: &toml::map::Map<String, toml::Value>) {
    for (key, value) in table {
        if key == "by_profile" {
            continue;
        }
        match key.as_str() {
            "impl" => {
                if let Some(s) = value.as_str() {
                    policy.impl_id = s.to_string();
                }
            }
            "state" => {
                if let Some(s) = value.as_str() {
                    policy.state = s.to_string();
                }
            }
            "sample_rate" => {
                if let Some(rate) = value.as_float() {
                    policy.sample_rate_millionths = to_millionths(rate);
                }
            }
            "allow_fallback" => {
                if let Some(b) = value.as_bool() {
                    policy.allow_fallback = b;
                }
            }
            _ => {
                if let Ok(json) = serde_json::to_value(value) {
                    policy.extra.insert(key.clone(), json);
                }
            }
        }
    }
}

fn to_millionths(rate: f64) -> u32 {
    (rate.clamp(0.0, 1.0) * 1_000_000.0).round() as u32
}

/// `resolve(puzzle_kind, role, profile, environment)`. `environment` carries
/// both `PUZZLE_<ROLE>_*` process env vars and `CLI_PUZZLE_<ROLE>_*`
/// CLI-forwarded overrides, already merged into one case-insensitive map —
/// callers normalise keys to uppercase before calling.
pub fn resolve(
    puzzle_kind: &str,
    role: Role,
    profile: &str,
    policy_toml: Option<&str>,
    environment: &HashMap<String, String>,
) -> Result<ResolvedModule, RouterError> {
    if !registry::is_puzzle_known(puzzle_kind) {
        return Err(RouterError::UnknownPuzzle(puzzle_kind.to_string()));
    }

    let parsed_toml = match policy_toml {
        Some(text) => text.parse::<toml::Value>()?,
        None => toml::Value::Table(Default::default()),
    };
    let mut policy = extract_role_policy(&parsed_toml, puzzle_kind, role, profile);

    let mut decision_source = DecisionSource::Config;

    let role_upper = role.env_prefix();
    let env_impl_key = format!("PUZZLE_{role_upper}_IMPL");
    let env_state_key = format!("PUZZLE_{role_upper}_STATE");
    let env_rate_key = format!("PUZZLE_{role_upper}_SAMPLE_RATE");
    let cli_impl_key = format!("CLI_PUZZLE_{role_upper}_IMPL");
    let cli_state_key = format!("CLI_PUZZLE_{role_upper}_STATE");
    let cli_rate_key = format!("CLI_PUZZLE_{role_upper}_SAMPLE_RATE");

    if let Some(v) = environment.get(&env_impl_key).filter(|s| !s.is_empty()) {
        policy.impl_id = v.clone();
        decision_source = DecisionSource::Env;
    }
    if let Some(v) = environment.get(&env_state_key).filter(|s| !s.is_empty()) {
        policy.state = v.clone();
        decision_source = DecisionSource::Env;
    }
    if let Some(v) = environment.get(&env_rate_key).and_then(|s| s.parse::<f64>().ok()) {
        policy.sample_rate_millionths = to_millionths(v);
        decision_source = DecisionSource::Env;
    }

    if let Some(v) = environment.get(&cli_impl_key).filter(|s| !s.is_empty()) {
        policy.impl_id = v.clone();
        decision_source = DecisionSource::Cli;
    }
    if let Some(v) = environment.get(&cli_state_key).filter(|s| !s.is_empty()) {
        policy.state = v.clone();
        decision_source = DecisionSource::Cli;
    }
    if let Some(v) = environment.get(&cli_rate_key).and_then(|s| s.parse::<f64>().ok()) {
        policy.sample_rate_millionths = to_millionths(v);
        decision_source = DecisionSource::Cli;
    }

    if profile == "ci" && matches!(policy.state.as_str(), "shadow" | "canary") {
        return Err(RouterError::ForbiddenCiState {
            role,
            state: policy.state,
        });
    }

    let mut impl_id = policy.impl_id.clone();
    let mut fallback_used = false;

    if !registry::is_registered(puzzle_kind, role, &impl_id) {
        if policy.allow_fallback && impl_id != DEFAULT_IMPL && registry::is_registered(puzzle_kind, role, DEFAULT_IMPL) {
            impl_id = DEFAULT_IMPL.to_string();
            fallback_used = true;
            decision_source = DecisionSource::Fallback;
        } else {
            return Err(RouterError::Unresolvable { role, impl_id });
        }
    }

    tracing::debug!(
        puzzle_kind,
        role = %role,
        impl_id = %impl_id,
        state = %policy.state,
        decision_source = decision_source.as_str(),
        "resolved module"
    );

    Ok(ResolvedModule {
        puzzle_kind: puzzle_kind.to_string(),
        role,
        impl_id,
        state: policy.state,
        decision_source,
        sample_rate_millionths: policy.sample_rate_millionths,
        allow_fallback: policy.allow_fallback,
        fallback_used,
        config: policy.extra,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_resolve_to_legacy() {
        let env = HashMap::new();
        let resolved = resolve("sudoku-9x9", Role::Solver, "dev", None, &env).unwrap();
        assert_eq!(resolved.impl_id, "legacy");
        assert_eq!(resolved.decision_source, DecisionSource::Config);
        assert!(!resolved.fallback_used);
    }

    #[test]
    fn env_overrides_toml_config() {
        let toml = r#"
            [modules.sudoku-9x9.solver]
            impl = "novus"
        "#;
        let mut env = HashMap::new();
        env.insert("PUZZLE_SOLVER_IMPL".to_string(), "legacy".to_string());
        let resolved = resolve("sudoku-9x9", Role::Solver, "dev", Some(toml), &env).unwrap();
        assert_eq!(resolved.impl_id, "legacy");
        assert_eq!(resolved.decision_source, DecisionSource::Env);
    }

    #[test]
    fn cli_overrides_env() {
        let mut env = HashMap::new();
        env.insert("PUZZLE_SOLVER_IMPL".to_string(), "legacy".to_string());
        env.insert("CLI_PUZZLE_SOLVER_IMPL".to_string(), "novus".to_string());
        let resolved = resolve("sudoku-9x9", Role::Solver, "dev", None, &env).unwrap();
        assert_eq!(resolved.impl_id, "novus");
        assert_eq!(resolved.decision_source, DecisionSource::Cli);
    }

    #[test]
    fn ci_profile_rejects_shadow_state() {
        let toml = r#"
            [modules.sudoku-9x9.solver]
            state = "shadow"
        "#;
        let env = HashMap::new();
        let err = resolve("sudoku-9x9", Role::Solver, "ci", Some(toml), &env).unwrap_err();
        assert!(matches!(err, RouterError::ForbiddenCiState { .. }));
    }

    #[test]
    fn missing_impl_without_fallback_errors() {
        let toml = r#"
            [modules.sudoku-9x9.printer]
            impl = "novus"
            allow_fallback = false
        "#;
        let env = HashMap::new();
        let err = resolve("sudoku-9x9", Role::Printer, "dev", Some(toml), &env).unwrap_err();
        assert!(matches!(err, RouterError::Unresolvable { .. }));
    }

    #[test]
    fn unregistered_impl_falls_back_to_legacy() {
        let toml = r#"
            [modules.sudoku-9x9.printer]
            impl = "novus"
        "#;
        let env = HashMap::new();
        let resolved = resolve("sudoku-9x9", Role::Printer, "dev", Some(toml), &env).unwrap();
        assert_eq!(resolved.impl_id, "legacy");
        assert!(resolved.fallback_used);
        assert_eq!(resolved.decision_source, DecisionSource::Fallback);
    }

    #[test]
    fn unknown_puzzle_is_rejected() {
        let env = HashMap::new();
        let err = resolve("sudoku-16x16", Role::Solver, "dev", None, &env).unwrap_err();
        assert!(matches!(err, RouterError::UnknownPuzzle(_)));
    }
}
