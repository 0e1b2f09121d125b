use crate::error::{CoreError, CoreResult};

/// Name of the SQL vector primitive a connection is configured to use.
/// Only `Vector32` is implemented end to end: the rest of the core assumes
/// 4-byte elements, so a faithful reimplementation refuses to mix element
/// widths (spec §9, Open Questions). `Vector64`/`Vector8`/`Vector1` are
/// accepted as configuration input, for parity with the source project's
/// option surface, and rejected at `Config::validate()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VectorType {
    Vector32,
    Vector64,
    Vector8,
    Vector1,
}

impl VectorType {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "vector32" => Some(VectorType::Vector32),
            "vector64" => Some(VectorType::Vector64),
            "vector8" => Some(VectorType::Vector8),
            "vector1" => Some(VectorType::Vector1),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            VectorType::Vector32 => "vector32",
            VectorType::Vector64 => "vector64",
            VectorType::Vector8 => "vector8",
            VectorType::Vector1 => "vector1",
        }
    }
}

impl Default for VectorType {
    fn default() -> Self {
        VectorType::Vector32
    }
}

/// Bytes per element for the fixed-width float vector column: the raw
/// little-endian IEEE-754 float32 array (spec §4.1). Readers and writers
/// must not widen, narrow, or byte-swap it.
pub const ELEMENT_BYTES: usize = 4;

/// Encode a vector to its raw little-endian float32 byte representation.
pub fn encode(vector: &[f32]) -> Vec<u8> {
    let mut out = Vec::with_capacity(vector.len() * ELEMENT_BYTES);
    for v in vector {
        out.extend_from_slice(&v.to_le_bytes());
    }
    out
}

/// Decode a raw vector blob, validating its length against `dimensions`.
/// A blob whose length isn't `dimensions * ELEMENT_BYTES` is invalid
/// (spec §4.1). A zero-length blob is treated as NULL by the caller
/// (spec §8, "Boundary behaviors") before this function is ever reached.
pub fn decode(bytes: &[u8], dimensions: usize) -> CoreResult<Vec<f32>> {
    let expected = dimensions * ELEMENT_BYTES;
    if bytes.len() != expected {
        return Err(CoreError::SchemaMismatch {
            expected,
            found: bytes.len(),
        });
    }
    Ok(bytes
        .chunks_exact(ELEMENT_BYTES)
        .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .collect())
}

/// Validate that an embedder's output matches the declared dimensionality
/// (spec §4.4, §7 `EmbedDimensionMismatch`).
pub fn validate_dimensions(vector: &[f32], dimensions: usize) -> CoreResult<()> {
    if vector.len() != dimensions {
        return Err(CoreError::EmbedDimensionMismatch {
            expected: dimensions,
            got: vector.len(),
        });
    }
    Ok(())
}

/// Cosine distance `1 - cosine_similarity`, used to rank `startTask`
/// candidates (spec §4.3). Returns `1.0` (maximal distance) if either
/// vector has zero norm, matching the teacher's vector-search fallback
/// convention of excluding degenerate matches rather than dividing by zero.
pub fn cosine_distance(a: &[f32], b: &[f32]) -> f64 {
    1.0 - cosine_similarity(a, b)
}

pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f64 {
    let dot: f64 = a.iter().zip(b.iter()).map(|(x, y)| (*x as f64) * (*y as f64)).sum();
    let norm_a: f64 = a.iter().map(|x| (*x as f64) * (*x as f64)).sum::<f64>().sqrt();
    let norm_b: f64 = b.iter().map(|x| (*x as f64) * (*x as f64)).sum::<f64>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip() {
        let v = vec![1.0_f32, -2.5, 0.0, 3.25];
        let bytes = encode(&v);
        assert_eq!(bytes.len(), v.len() * ELEMENT_BYTES);
        let back = decode(&bytes, v.len()).unwrap();
        assert_eq!(back, v);
    }

    #[test]
    fn wrong_length_is_schema_mismatch() {
        let bytes = encode(&[1.0, 2.0, 3.0]);
        let err = decode(&bytes, 8).unwrap_err();
        matches!(err, CoreError::SchemaMismatch { .. });
    }

    #[test]
    fn identical_vectors_have_zero_distance() {
        let v = vec![1.0_f32, 2.0, 3.0];
        assert!(cosine_distance(&v, &v).abs() < 1e-9);
    }

    #[test]
    fn orthogonal_vectors_have_unit_distance() {
        let a = vec![1.0_f32, 0.0];
        let b = vec![0.0_f32, 1.0];
        assert!((cosine_distance(&a, &b) - 1.0).abs() < 1e-9);
    }

    use proptest::prelude::*;

    proptest! {
        #[test]
        fn encode_decode_round_trips_any_finite_vector(
            values in prop::collection::vec(-1e6f32..1e6, 0..64),
        ) {
            let bytes = encode(&values);
            let back = decode(&bytes, values.len()).unwrap();
            prop_assert_eq!(back, values);
        }

        #[test]
        fn cosine_similarity_is_bounded(
            a in prop::collection::vec(-100f32..100.0, 1..16),
            b in prop::collection::vec(-100f32..100.0, 1..16),
        ) {
            // Mismatched lengths zip-truncate; still must stay in [-1, 1].
            let sim = cosine_similarity(&a, &b);
            prop_assert!(sim >= -1.0001 && sim <= 1.0001, "similarity {} out of bounds", sim);
        }
    }
}
