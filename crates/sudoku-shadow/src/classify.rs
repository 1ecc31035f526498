use sudoku_contracts::VerdictPayload;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Critical,
    Major,
    Minor,
    None,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Critical => "CRITICAL",
            Severity::Major => "MAJOR",
            Severity::Minor => "MINOR",
            Severity::None => "NONE",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Taxonomy {
    pub code: &'static str,
    pub severity: Severity,
    pub reason: String,
}

impl Taxonomy {
    fn new(code: &'static str, severity: Severity, reason: impl Into<String>) -> Self {
        Self {
            code,
            severity,
            reason: reason.into(),
        }
    }

    pub fn none() -> Self {
        Self::new("NONE", Severity::None, "payloads are equivalent")
    }

    /// The baseline solver itself raised instead of returning a verdict to
    /// compare — spec.md §7 bullet 3: this becomes a `C6`-style event with
    /// severity MINOR, and does not propagate.
    pub fn baseline_error(reason: impl Into<String>) -> Self {
        Self::new("C6", Severity::Minor, reason)
    }

    pub fn is_match(&self) -> bool {
        self.severity == Severity::None
    }
}

pub const GUARDRAIL_NODES_LIMIT: u64 = 200_000;
pub const GUARDRAIL_BT_DEPTH_LIMIT: u64 = 60;
pub const GUARDRAIL_TIME_MS_LIMIT: u64 = 2_000;

/// Guardrail (C4): a resource-budget predicate on the baseline's own
/// self-reported metrics. Supersedes payload classification when it fires.
pub fn classify_guardrail(baseline: &VerdictPayload) -> Option<Taxonomy> {
    let mut exceeded = Vec::new();
    if baseline.bt_depth.unwrap_or(0) > GUARDRAIL_BT_DEPTH_LIMIT {
        exceeded.push("bt_depth");
    }
    if baseline.nodes.unwrap_or(0) > GUARDRAIL_NODES_LIMIT {
        exceeded.push("nodes");
    }
    if baseline.time_ms > GUARDRAIL_TIME_MS_LIMIT {
        exceeded.push("time_ms");
    }
    if exceeded.is_empty() {
        return None;
    }
    exceeded.sort_unstable();
    Some(Taxonomy::new(
        "C4",
        Severity::Major,
        format!("guardrail_exceeded_{}", exceeded.join("+")),
    ))
}

pub struct Comparison<'a> {
    pub baseline: &'a VerdictPayload,
    pub candidate: &'a VerdictPayload,
    pub baseline_grid: &'a str,
    pub candidate_grid: &'a str,
}

/// Classify a (baseline, candidate) pair. Guardrail is checked first and,
/// if it fires, supersedes the payload classifier (spec.md §4.7.4, P8).
pub fn classify(comparison: &Comparison<'_>) -> Taxonomy {
    if let Some(guardrail) = classify_guardrail(comparison.baseline) {
        return guardrail;
    }
    classify_payload(comparison)
}

fn classify_payload(comparison: &Comparison<'_>) -> Taxonomy {
    let Comparison {
        baseline,
        candidate,
        baseline_grid,
        candidate_grid,
    } = *comparison;

    if baseline.unique != candidate.unique {
        return Taxonomy::new("C1", Severity::Critical, "unique flags differ");
    }

    if baseline.unique && candidate.unique && baseline_grid != candidate_grid {
        return Taxonomy::new("C2", Severity::Critical, "grids differ while both claim unique");
    }

    if baseline_grid == candidate_grid && baseline.trace != candidate.trace {
        return Taxonomy::new("C3", Severity::Major, "grids match but solve traces differ");
    }

    if baseline_grid == candidate_grid
        && baseline.trace == candidate.trace
        && baseline.candidates != candidate.candidates
    {
        return Taxonomy::new("C5", Severity::Minor, "candidate sets differ while grid/trace agree");
    }

    if baseline.nodes != candidate.nodes || baseline.bt_depth != candidate.bt_depth || baseline.cutoff != candidate.cutoff {
        return Taxonomy::new("C6", Severity::Minor, "other structural inequality");
    }

    Taxonomy::none()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn verdict(unique: bool, time_ms: u64) -> VerdictPayload {
        VerdictPayload {
            unique,
            time_ms,
            ..Default::default()
        }
    }

    #[test]
    fn differing_unique_is_c1_critical() {
        let baseline = verdict(false, 1);
        let candidate = verdict(true, 1);
        let comparison = Comparison {
            baseline: &baseline,
            candidate: &candidate,
            baseline_grid: "same",
            candidate_grid: "same",
        };
        let taxonomy = classify(&comparison);
        assert_eq!(taxonomy.code, "C1");
        assert_eq!(taxonomy.severity, Severity::Critical);
    }

    #[test]
    fn differing_grids_both_unique_is_c2_critical() {
        let baseline = verdict(true, 1);
        let candidate = verdict(true, 1);
        let comparison = Comparison {
            baseline: &baseline,
            candidate: &candidate,
            baseline_grid: "aaa",
            candidate_grid: "bbb",
        };
        assert_eq!(classify(&comparison).code, "C2");
    }

    #[test]
    fn differing_trace_same_grid_is_c3_major() {
        let mut baseline = verdict(true, 1);
        baseline.trace = Some(json!(["a"]));
        let mut candidate = verdict(true, 1);
        candidate.trace = Some(json!(["b"]));
        let comparison = Comparison {
            baseline: &baseline,
            candidate: &candidate,
            baseline_grid: "same",
            candidate_grid: "same",
        };
        let taxonomy = classify(&comparison);
        assert_eq!(taxonomy.code, "C3");
        assert_eq!(taxonomy.severity, Severity::Major);
    }

    #[test]
    fn identical_payloads_are_none() {
        let baseline = verdict(true, 1);
        let candidate = verdict(true, 1);
        let comparison = Comparison {
            baseline: &baseline,
            candidate: &candidate,
            baseline_grid: "same",
            candidate_grid: "same",
        };
        assert!(classify(&comparison).is_match());
    }

    #[test]
    fn guardrail_supersedes_payload_classification() {
        let mut baseline = verdict(false, 2500);
        baseline.nodes = Some(300_000);
        baseline.bt_depth = Some(70);
        let candidate = verdict(true, 1);
        let comparison = Comparison {
            baseline: &baseline,
            candidate: &candidate,
            baseline_grid: "same",
            candidate_grid: "same",
        };
        let taxonomy = classify(&comparison);
        assert_eq!(taxonomy.code, "C4");
        assert_eq!(taxonomy.reason, "guardrail_exceeded_bt_depth+nodes+time_ms");
    }
}
