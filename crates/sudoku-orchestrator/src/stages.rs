use serde_json::{json, Value};
use sudoku_contracts::{
    ArtifactType, Artifact, Catalog, CompleteGridPayload, Encoding, Envelope, ExportBundlePayload,
    Inputs, Metrics, RenderMeta, SeedValue, SpecPayload, Target, VerdictPayload, PUZZLE_TYPE_SUDOKU,
};
use sudoku_store::ArtifactStore;
use sudoku_validation::{ProfileConfig, Resolver};

use crate::error::OrchestratorError;
use crate::seed;

pub struct StagedArtifact {
    pub id: String,
    pub value: Value,
}

fn catalog_entry(catalog: Option<&Catalog>, artifact_type: ArtifactType) -> (String, String, String) {
    if let Some(catalog) = catalog {
        if let Ok(entry) = catalog.entry(artifact_type) {
            return (entry.version.clone(), entry.schema_id.clone(), entry.schema_path.clone());
        }
    }
    let (version, schema_id, schema_path) = match artifact_type {
        ArtifactType::Spec => ("1.0.0", "sudoku.spec.v1", "schemas/spec.schema.json"),
        ArtifactType::CompleteGrid => ("1.0.0", "sudoku.complete_grid.v1", "schemas/complete_grid.schema.json"),
        ArtifactType::Verdict => ("1.0.0", "sudoku.verdict.v1", "schemas/verdict.schema.json"),
        ArtifactType::ExportBundle => ("1.0.0", "sudoku.export_bundle.v1", "schemas/export_bundle.schema.json"),
    };
    (version.to_string(), schema_id.to_string(), schema_path.to_string())
}

#[allow(clippy::too_many_arguments)]
fn build_envelope(
    artifact_type: ArtifactType,
    catalog: Option<&Catalog>,
    root: &str,
    stage: &'static str,
    run_id: &str,
    spec_ref: Option<String>,
    parents: Vec<String>,
) -> Envelope {
    let (schema_version, schema_id, schema_path) = catalog_entry(catalog, artifact_type);
    Envelope {
        artifact_type,
        schema_version,
        schema_id,
        schema_path,
        artifact_id: String::new(),
        created_at: seed::derive_created_at(root, stage),
        puzzle_type: PUZZLE_TYPE_SUDOKU.to_string(),
        spec_ref,
        run_id: run_id.to_string(),
        seed: SeedValue::Str(root.to_string()),
        stage: stage.to_string(),
        parents,
        metrics: Metrics {
            time_ms: seed::derive_time_ms(root, stage),
        },
        warnings: Vec::new(),
        errors: Vec::new(),
        ext: serde_json::Map::new(),
    }
}

pub fn build_spec_artifact(
    spec_payload: SpecPayload,
    root: &str,
    run_id: &str,
    catalog: Option<&Catalog>,
) -> Artifact<SpecPayload> {
    let envelope = build_envelope(ArtifactType::Spec, catalog, root, "stage.config.spec", run_id, None, Vec::new());
    Artifact {
        envelope,
        payload: spec_payload,
    }
}

pub fn build_complete_artifact(
    grid: String,
    spec_id: &str,
    root: &str,
    run_id: &str,
    catalog: Option<&Catalog>,
) -> Result<Artifact<CompleteGridPayload>, sudoku_codec::CodecError> {
    let canonical_hash = format!("sha256-{}", sudoku_codec::sha256_hex(grid.as_bytes()));
    let envelope = build_envelope(
        ArtifactType::CompleteGrid,
        catalog,
        root,
        "stage.generate.complete",
        run_id,
        Some(spec_id.to_string()),
        vec![spec_id.to_string()],
    );
    Ok(Artifact {
        envelope,
        payload: CompleteGridPayload {
            encoding: Encoding::default(),
            grid,
            canonical_hash,
        },
    })
}

pub fn build_verdict_artifact(
    verdict: VerdictPayload,
    spec_id: &str,
    complete_id: &str,
    root: &str,
    run_id: &str,
    catalog: Option<&Catalog>,
) -> Artifact<VerdictPayload> {
    let envelope = build_envelope(
        ArtifactType::Verdict,
        catalog,
        root,
        "stage.solve.verify",
        run_id,
        Some(spec_id.to_string()),
        vec![spec_id.to_string(), complete_id.to_string()],
    );
    Artifact {
        envelope,
        payload: verdict,
    }
}

pub fn build_bundle_artifact(
    complete_id: &str,
    verdict_id: &str,
    spec_id: &str,
    template: &str,
    page: &str,
    dpi: u32,
    root: &str,
    run_id: &str,
    catalog: Option<&Catalog>,
) -> Artifact<ExportBundlePayload> {
    let envelope = build_envelope(
        ArtifactType::ExportBundle,
        catalog,
        root,
        "stage.export.bundle",
        run_id,
        Some(spec_id.to_string()),
        vec![complete_id.to_string(), verdict_id.to_string()],
    );
    Artifact {
        envelope,
        payload: ExportBundlePayload {
            inputs: Inputs {
                complete_ref: complete_id.to_string(),
                verdict_ref: verdict_id.to_string(),
            },
            target: Target {
                format: "pdf".to_string(),
                template: template.to_string(),
            },
            render_meta: RenderMeta {
                page: page.to_string(),
                dpi,
            },
        },
    }
}

/// Store `artifact`, fill in the store-computed `artifact_id`, and validate
/// the resulting JSON before handing a usable [`StagedArtifact`] back.
pub fn finalize_and_store<P: serde::Serialize>(
    artifact: Artifact<P>,
    artifact_type: ArtifactType,
    stage_name: &'static str,
    profile: &ProfileConfig,
    resolver: &Resolver,
    catalog: Option<&Catalog>,
    store: &ArtifactStore,
) -> Result<StagedArtifact, OrchestratorError> {
    let mut draft = artifact.to_value();
    if let Some(obj) = draft.as_object_mut() {
        obj.remove("artifact_id");
    }
    let id = store.save(artifact_type, &draft)?;
    let mut value = draft;
    value["artifact_id"] = json!(id.clone());

    let report = sudoku_validation::validate(&value, artifact_type, profile, resolver, catalog);
    if !report.ok {
        return Err(OrchestratorError::Validation {
            stage: stage_name,
            report,
        });
    }

    Ok(StagedArtifact { id, value })
}
