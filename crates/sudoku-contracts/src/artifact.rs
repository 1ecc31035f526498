use serde::{Deserialize, Serialize};

use crate::envelope::Envelope;

/// An artifact envelope paired with its type-specific payload.
///
/// Both halves are flattened into a single JSON object on the wire, matching
/// spec.md §3: "every artifact is a mapping" with no nested `envelope`/
/// `payload` wrapper keys.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Artifact<P> {
    #[serde(flatten)]
    pub envelope: Envelope,
    #[serde(flatten)]
    pub payload: P,
}

impl<P: Serialize> Artifact<P> {
    /// Serialize to a generic JSON value, e.g. for the codec or the store.
    pub fn to_value(&self) -> serde_json::Value {
        serde_json::to_value(self).expect("Artifact<P> always serializes to a JSON object")
    }

    /// Compute and fill in `artifact_id` from the envelope + payload as they
    /// stand right now. Idempotent: may be called again after mutation.
    pub fn finalize_id(&mut self) -> Result<(), sudoku_codec::CodecError> {
        let value = self.to_value();
        self.envelope.artifact_id = sudoku_codec::compute_artifact_id(&value)?;
        Ok(())
    }
}

pub type SpecArtifact = Artifact<crate::payload::SpecPayload>;
pub type CompleteGridArtifact = Artifact<crate::payload::CompleteGridPayload>;
pub type VerdictArtifact = Artifact<crate::payload::VerdictPayload>;
pub type ExportBundleArtifact = Artifact<crate::payload::ExportBundlePayload>;

/// Expected parent `ArtifactType`s for a given artifact type, per the DAG in
/// spec.md §3.3.
pub fn expected_parent_types(artifact_type: crate::ArtifactType) -> &'static [crate::ArtifactType] {
    use crate::ArtifactType::*;
    match artifact_type {
        Spec => &[],
        CompleteGrid => &[Spec],
        Verdict => &[Spec, CompleteGrid],
        ExportBundle => &[CompleteGrid, Verdict],
    }
}
