use std::collections::{HashMap, HashSet};

use crate::issue::Severity;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Profile {
    Dev,
    Ci,
    Prod,
}

impl Profile {
    pub fn as_str(&self) -> &'static str {
        match self {
            Profile::Dev => "dev",
            Profile::Ci => "ci",
            Profile::Prod => "prod",
        }
    }
}

impl std::str::FromStr for Profile {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "dev" => Ok(Profile::Dev),
            "ci" => Ok(Profile::Ci),
            "prod" => Ok(Profile::Prod),
            other => Err(format!("unknown profile: {other}")),
        }
    }
}

/// Which stages and rules a profile enables, plus severity remaps. Data, not
/// inline control flow — mirrors the rulebook/profile split used upstream.
#[derive(Debug, Clone)]
pub struct ProfileConfig {
    pub name: Profile,
    pub check_schema: bool,
    pub check_invariants: bool,
    pub check_crossrefs: bool,
    pub warn_as_error: bool,
    /// Rule names disabled for a given artifact type. Absent type = all enabled.
    disabled_invariants: HashMap<&'static str, HashSet<&'static str>>,
    /// `(artifact_type, code) -> severity`. `"*"` matches any artifact type.
    severity_overrides: HashMap<(&'static str, &'static str), Severity>,
}

impl ProfileConfig {
    pub fn for_profile(profile: Profile) -> Self {
        match profile {
            Profile::Dev => Self {
                name: profile,
                check_schema: true,
                check_invariants: true,
                check_crossrefs: true,
                warn_as_error: false,
                disabled_invariants: HashMap::new(),
                severity_overrides: HashMap::new(),
            },
            Profile::Ci => Self {
                name: profile,
                check_schema: true,
                check_invariants: true,
                check_crossrefs: true,
                warn_as_error: true,
                disabled_invariants: HashMap::new(),
                severity_overrides: HashMap::new(),
            },
            Profile::Prod => {
                let mut disabled_invariants = HashMap::new();
                disabled_invariants.insert("CompleteGrid", HashSet::from(["grid_canonical_hash"]));

                let mut severity_overrides = HashMap::new();
                severity_overrides.insert(
                    ("Verdict", "verdict.cutoff.invalid"),
                    Severity::Warn,
                );

                Self {
                    name: profile,
                    check_schema: true,
                    check_invariants: true,
                    check_crossrefs: true,
                    warn_as_error: false,
                    disabled_invariants,
                    severity_overrides,
                }
            }
        }
    }

    pub fn is_invariant_enabled(&self, artifact_type: &'static str, rule: &'static str) -> bool {
        !self
            .disabled_invariants
            .get(artifact_type)
            .map(|set| set.contains(rule))
            .unwrap_or(false)
    }

    /// Apply this profile's severity override for `(artifact_type, code)`, if any.
    pub fn remap_severity(&self, artifact_type: &'static str, code: &str, severity: Severity) -> Severity {
        if let Some(overridden) = self.severity_overrides.get(&(artifact_type, code)) {
            return *overridden;
        }
        if let Some(overridden) = self.severity_overrides.get(&("*", code)) {
            return *overridden;
        }
        severity
    }
}
