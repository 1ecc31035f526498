//! Pipeline orchestrator (C6): deterministic seed derivation, the four-stage
//! artifact graph, shadow-subsystem consultation, and the export gate.

pub mod config;
pub mod error;
pub mod seed;
mod stages;

use camino::Utf8PathBuf;
use serde_json::Value;
use sudoku_contracts::{ArtifactType, VerdictPayload};
use sudoku_ports::{
    GeneratorPort, LegacyGenerator, LegacyPrinter, LegacySolver, NovusGenerator, NovusSolver,
    PrinterInput, PrinterPort, SolverPort,
};
use sudoku_router::Role;
use sudoku_shadow::{BaselineRun, CandidateRun, Counters, EventContext};
use sudoku_store::{ArtifactStore, Reference};

pub use config::PipelineInputs;
pub use error::OrchestratorError;
pub use stages::StagedArtifact;

pub struct PipelineOutcome {
    pub spec: StagedArtifact,
    pub complete: StagedArtifact,
    pub verdict: StagedArtifact,
    pub bundle: Option<StagedArtifact>,
    pub pdf_path: Option<Utf8PathBuf>,
    pub shadow_counters: Counters,
    pub shadow_fallback_used: bool,
}

fn make_resolver(store: &ArtifactStore) -> impl Fn(&str) -> Option<Value> + '_ {
    move |reference: &str| match store.resolve_reference(reference) {
        Reference::Digest(id) => store.load(&id).ok(),
        Reference::Path(path) => std::fs::read(path.as_std_path())
            .ok()
            .and_then(|bytes| serde_json::from_slice(&bytes).ok()),
    }
}

fn generator_for(impl_id: &str) -> Box<dyn GeneratorPort> {
    match impl_id {
        "novus" => Box::new(NovusGenerator),
        _ => Box::new(LegacyGenerator),
    }
}

fn solver_for(impl_id: &str) -> Box<dyn SolverPort> {
    match impl_id {
        "novus" => Box::new(NovusSolver),
        _ => Box::new(LegacySolver),
    }
}

fn printer_for(_impl_id: &str) -> Box<dyn PrinterPort> {
    Box::new(LegacyPrinter)
}

/// Exactly one of `candidate_ref`/`solved_ref` is set, keyed on the verdict's
/// own `unique` flag (spec.md §3.2).
fn attach_complete_ref(mut verdict: VerdictPayload, complete_id: &str) -> VerdictPayload {
    if verdict.unique {
        verdict.solved_ref = Some(complete_id.to_string());
    } else {
        verdict.candidate_ref = Some(complete_id.to_string());
    }
    verdict
}

pub fn run_pipeline(inputs: &PipelineInputs<'_>) -> Result<PipelineOutcome, OrchestratorError> {
    let resolver = make_resolver(inputs.store);

    // stage.config.spec
    let spec_artifact = stages::build_spec_artifact(
        inputs.spec.clone(),
        inputs.root_seed,
        inputs.run_id,
        inputs.catalog,
    );
    let staged_spec = stages::finalize_and_store(
        spec_artifact,
        ArtifactType::Spec,
        "stage.config.spec",
        inputs.profile,
        &resolver,
        inputs.catalog,
        inputs.store,
    )?;

    // stage.generate.complete
    let resolved_generator = sudoku_router::resolve(
        inputs.puzzle_kind,
        Role::Generator,
        inputs.profile_name,
        inputs.router_policy_toml,
        inputs.environment,
    )?;
    let generator = generator_for(&resolved_generator.impl_id);
    let generate_seed = seed::derive_seed(inputs.root_seed, "stage.generate.complete", &staged_spec.id);
    let generated = generator.generate(&inputs.spec, &generate_seed)?;
    let complete_grid = generated.grid;

    let complete_artifact = stages::build_complete_artifact(
        complete_grid.clone(),
        &staged_spec.id,
        inputs.root_seed,
        inputs.run_id,
        inputs.catalog,
    )?;
    let staged_complete = stages::finalize_and_store(
        complete_artifact,
        ArtifactType::CompleteGrid,
        "stage.generate.complete",
        inputs.profile,
        &resolver,
        inputs.catalog,
        inputs.store,
    )?;

    // stage.solve.verify — candidate (primary) solve, then shadow consultation.
    let resolved_solver = sudoku_router::resolve(
        inputs.puzzle_kind,
        Role::Solver,
        inputs.profile_name,
        inputs.router_policy_toml,
        inputs.environment,
    )?;
    let solver = solver_for(&resolved_solver.impl_id);
    let solve_seed = seed::derive_seed(inputs.root_seed, "stage.solve.verify", &staged_complete.id);
    let candidate_verdict = solver.check_uniqueness(&inputs.spec, &complete_grid, &solve_seed)?;

    let puzzle_digest = sudoku_codec::sha256_hex(complete_grid.as_bytes());
    let candidate_run = CandidateRun {
        verdict: &candidate_verdict,
        grid: &complete_grid,
    };
    let ts_iso8601 = seed::derive_created_at(inputs.root_seed, "stage.solve.verify");
    let event_ctx = EventContext {
        run_id: inputs.run_id,
        ts_iso8601: &ts_iso8601,
        commit_sha: inputs.commit_sha,
        baseline_sha: inputs.baseline_sha,
        hw_fingerprint: inputs.hw_fingerprint,
        profile: inputs.profile_name,
        puzzle_digest: &puzzle_digest,
        solver_primary: &resolved_solver.impl_id,
        solver_shadow: &inputs.shadow_config.secondary,
        sample_rate: inputs.shadow_config.sample_rate.as_str(),
    };

    let candidate_verdict_artifact = stages::build_verdict_artifact(
        candidate_verdict.clone(),
        &staged_spec.id,
        &staged_complete.id,
        inputs.root_seed,
        inputs.run_id,
        inputs.catalog,
    );
    let candidate_artifact_value = candidate_verdict_artifact.to_value();

    let secondary_impl = inputs.shadow_config.secondary.clone();
    let spec_for_baseline = inputs.spec.clone();
    let grid_for_baseline = complete_grid.clone();
    let outcome = sudoku_shadow::run(
        inputs.shadow_config,
        inputs.run_id,
        &puzzle_digest,
        &inputs.spec.alphabet,
        &candidate_run,
        &candidate_artifact_value,
        &event_ctx,
        resolved_solver.allow_fallback,
        move || {
            let baseline_solver = solver_for(&secondary_impl);
            let verdict = baseline_solver.check_uniqueness(&spec_for_baseline, &grid_for_baseline, &solve_seed)?;
            Ok::<_, OrchestratorError>(BaselineRun {
                verdict,
                grid: grid_for_baseline,
            })
        },
    );

    if let Some(event) = &outcome.event {
        let event_value = serde_json::to_value(event).expect("ShadowEvent always serializes");
        inputs.shadow_event_log.append(&event_value)?;
    }

    let shadow_fallback_used = outcome.fallback_used;
    let final_verdict = match (outcome.fallback_used, outcome.baseline) {
        (true, Some(baseline)) => baseline.verdict,
        _ => candidate_verdict,
    };
    let final_verdict = attach_complete_ref(final_verdict, &staged_complete.id);

    let verdict_artifact = stages::build_verdict_artifact(
        final_verdict,
        &staged_spec.id,
        &staged_complete.id,
        inputs.root_seed,
        inputs.run_id,
        inputs.catalog,
    );
    let staged_verdict = stages::finalize_and_store(
        verdict_artifact,
        ArtifactType::Verdict,
        "stage.solve.verify",
        inputs.profile,
        &resolver,
        inputs.catalog,
        inputs.store,
    )?;

    // stage.export.bundle — cross-reference gate before the printer runs.
    let bundle_artifact = stages::build_bundle_artifact(
        &staged_complete.id,
        &staged_verdict.id,
        &staged_spec.id,
        "default",
        "A4",
        150,
        inputs.root_seed,
        inputs.run_id,
        inputs.catalog,
    );
    let staged_bundle = match stages::finalize_and_store(
        bundle_artifact,
        ArtifactType::ExportBundle,
        "stage.export.bundle",
        inputs.profile,
        &resolver,
        inputs.catalog,
        inputs.store,
    ) {
        Ok(staged) => staged,
        Err(OrchestratorError::Validation { report, .. }) => {
            return Err(OrchestratorError::ExportGateFailed { report });
        }
        Err(other) => return Err(other),
    };

    let resolved_printer = sudoku_router::resolve(
        inputs.puzzle_kind,
        Role::Printer,
        inputs.profile_name,
        inputs.router_policy_toml,
        inputs.environment,
    )?;
    let printer = printer_for(&resolved_printer.impl_id);
    let printer_input = PrinterInput {
        spec: &inputs.spec,
        grid: &complete_grid,
    };
    let printer_output = printer.export(&printer_input, inputs.output_dir.as_std_path())?;
    let pdf_path = Utf8PathBuf::from_path_buf(printer_output.path).unwrap_or_default();

    Ok(PipelineOutcome {
        spec: staged_spec,
        complete: staged_complete,
        verdict: staged_verdict,
        bundle: Some(staged_bundle),
        pdf_path: Some(pdf_path),
        shadow_counters: outcome.counters,
        shadow_fallback_used,
    })
}
