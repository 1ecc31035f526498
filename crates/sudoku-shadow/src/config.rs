use std::collections::HashMap;

use crate::sampling::{SampleRate, SampleRateError};

#[derive(Debug, thiserror::Error)]
pub enum ShadowConfigError {
    #[error("invalid shadow sample_rate: {0}")]
    SampleRate(#[from] SampleRateError),
    #[error("shadow hash_salt is required under the prod profile")]
    MissingSaltInProd,
}

/// Effective shadow policy after the §4.5 precedence chain (defaults ← TOML
/// ← env ← CLI-forwarded env) has been applied.
#[derive(Debug, Clone)]
pub struct ShadowConfig {
    pub enabled: bool,
    pub sample_rate: SampleRate,
    pub primary: String,
    pub secondary: String,
    pub log_mismatch: bool,
    pub budget_ms_p95: Option<u64>,
    pub hash_salt: Option<String>,
    pub sticky: bool,
}

fn default_sample_rate_for_profile(profile: &str) -> &'static str {
    match profile {
        "dev" | "test" => "0.25",
        "pilot" => "1.0",
        _ => "0.0",
    }
}

/// Raw TOML-sourced fields for the `[shadow]` table, before env/CLI layers.
#[derive(Debug, Clone, Default)]
pub struct TomlShadowConfig {
    pub enabled: Option<bool>,
    pub sample_rate: Option<String>,
    pub primary: Option<String>,
    pub secondary: Option<String>,
    pub log_mismatch: Option<bool>,
    pub budget_ms_p95: Option<u64>,
    pub hash_salt: Option<String>,
    pub sticky: Option<bool>,
}

impl TomlShadowConfig {
    pub fn from_toml_value(value: &toml::Value) -> Self {
        let Some(table) = value.get("shadow").and_then(toml::Value::as_table) else {
            return Self::default();
        };
        Self {
            enabled: table.get("enabled").and_then(toml::Value::as_bool),
            sample_rate: table.get("sample_rate").map(|v| match v {
                toml::Value::String(s) => s.clone(),
                other => {
                    tracing::warn!(
                        value = %other,
                        "sample_rate given as a TOML number, not a string; this numeric-override path is deprecated"
                    );
                    other.to_string()
                }
            }),
            primary: table.get("primary").and_then(toml::Value::as_str).map(str::to_string),
            secondary: table.get("secondary").and_then(toml::Value::as_str).map(str::to_string),
            log_mismatch: table.get("log_mismatch").and_then(toml::Value::as_bool),
            budget_ms_p95: table.get("budget_ms_p95").and_then(toml::Value::as_integer).map(|v| v as u64),
            hash_salt: table.get("hash_salt").and_then(toml::Value::as_str).map(str::to_string),
            sticky: table.get("sticky").and_then(toml::Value::as_bool),
        }
    }
}

/// Resolve the effective shadow policy. `environment` carries both
/// `PUZZLE_SHADOW_*` process env vars and `CLI_PUZZLE_SHADOW_*`
/// CLI-forwarded overrides, keys already uppercased.
pub fn resolve(
    profile: &str,
    toml_config: &TomlShadowConfig,
    environment: &HashMap<String, String>,
) -> Result<ShadowConfig, ShadowConfigError> {
    let mut enabled = toml_config.enabled.unwrap_or(false);
    let mut sample_rate_text = toml_config
        .sample_rate
        .clone()
        .unwrap_or_else(|| default_sample_rate_for_profile(profile).to_string());
    let mut primary = toml_config.primary.clone().unwrap_or_else(|| "legacy".to_string());
    let mut secondary = toml_config.secondary.clone().unwrap_or_else(|| "novus".to_string());
    let mut log_mismatch = toml_config.log_mismatch.unwrap_or(true);
    let mut budget_ms_p95 = toml_config.budget_ms_p95;
    let mut hash_salt = toml_config.hash_salt.clone();
    let mut sticky = toml_config.sticky.unwrap_or(false);

    for prefix in ["PUZZLE_SHADOW_", "CLI_PUZZLE_SHADOW_"] {
        if let Some(v) = environment.get(&format!("{prefix}ENABLED")) {
            enabled = v.eq_ignore_ascii_case("true") || v == "1";
        }
        if let Some(v) = environment.get(&format!("{prefix}SAMPLE_RATE")) {
            sample_rate_text = v.clone();
        }
        if let Some(v) = environment.get(&format!("{prefix}PRIMARY")) {
            primary = v.clone();
        }
        if let Some(v) = environment.get(&format!("{prefix}SECONDARY")) {
            secondary = v.clone();
        }
        if let Some(v) = environment.get(&format!("{prefix}LOG_MISMATCH")) {
            log_mismatch = v.eq_ignore_ascii_case("true") || v == "1";
        }
        if let Some(v) = environment.get(&format!("{prefix}BUDGET_MS_P95")) {
            if let Ok(parsed) = v.parse() {
                budget_ms_p95 = Some(parsed);
            }
        }
        if let Some(v) = environment.get(&format!("{prefix}HASH_SALT")) {
            hash_salt = Some(v.clone());
        }
        if let Some(v) = environment.get(&format!("{prefix}STICKY")) {
            sticky = v.eq_ignore_ascii_case("true") || v == "1";
        }
    }

    if profile == "prod" && hash_salt.as_deref().unwrap_or("").is_empty() {
        return Err(ShadowConfigError::MissingSaltInProd);
    }

    let sample_rate = SampleRate::parse(&sample_rate_text)?;

    Ok(ShadowConfig {
        enabled,
        sample_rate,
        primary,
        secondary,
        log_mismatch,
        budget_ms_p95,
        hash_salt,
        sticky,
    })
}
