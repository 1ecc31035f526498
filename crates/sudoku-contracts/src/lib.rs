//! Artifact envelope, per-type payloads, and the schema catalog (C3 + the
//! data model of spec.md §3).

pub mod artifact;
pub mod catalog;
pub mod envelope;
pub mod payload;

pub use artifact::{
    expected_parent_types, Artifact, CompleteGridArtifact, ExportBundleArtifact, SpecArtifact,
    VerdictArtifact,
};
pub use catalog::{Catalog, CatalogEntry, CatalogError};
pub use envelope::{ArtifactType, Envelope, Metrics, SeedValue, PUZZLE_TYPE_SUDOKU};
pub use payload::{
    Block, CompleteGridPayload, Cutoff, Encoding, ExportBundlePayload, Inputs, Limits, RenderMeta,
    SpecPayload, Target, VerdictPayload,
};
