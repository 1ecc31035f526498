use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

const SECONDS_PER_YEAR: i64 = 3600 * 24 * 365;

fn epoch() -> DateTime<Utc> {
    DateTime::parse_from_rfc3339("2024-01-01T00:00:00Z")
        .expect("constant is a valid RFC3339 timestamp")
        .with_timezone(&Utc)
}

/// `derive_seed(root, stage, parent_id) = hex(uuid_v5(URL_namespace, root
/// + "|" + stage + "|" + parent_id))` (spec.md §4.6).
pub fn derive_seed(root: &str, stage: &str, parent_id: &str) -> String {
    let material = format!("{root}|{stage}|{parent_id}");
    Uuid::new_v5(&Uuid::NAMESPACE_URL, material.as_bytes())
        .simple()
        .to_string()
}

/// Deterministic `created_at`, derived from `(root, stage)` alone so that
/// repeating a stage with the same root yields byte-identical envelopes.
pub fn derive_created_at(root: &str, stage: &str) -> String {
    let material = format!("{root}|{stage}|created_at");
    let id = Uuid::new_v5(&Uuid::NAMESPACE_URL, material.as_bytes());
    let bytes = id.as_bytes();
    let offset_seconds = u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]) as i64 % SECONDS_PER_YEAR;
    let offset_millis = (bytes[4] as i64) * 1000 / 256;
    let ts = epoch() + Duration::seconds(offset_seconds) + Duration::milliseconds(offset_millis);
    ts.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string()
}

/// Synthetic, deterministic `metrics.time_ms`, also derived from `(root,
/// stage)` so identical inputs reproduce identical artifact ids.
pub fn derive_time_ms(root: &str, stage: &str) -> u64 {
    let material = format!("{root}|{stage}|time_ms");
    let id = Uuid::new_v5(&Uuid::NAMESPACE_URL, material.as_bytes());
    let bytes = id.as_bytes();
    (u16::from_be_bytes([bytes[0], bytes[1]]) % 50) as u64 + 1
}
