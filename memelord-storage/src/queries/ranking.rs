//! `startTask` retrieval ranking (spec §4.3, §4.4): fetch every embedded
//! memory, score `(1 - cosineDistance) * decayRate^daysSinceLastRetrieved`,
//! sort descending, truncate to `topK`. No SQL-level vector primitive is
//! available, so the candidate set is fetched once and ranked in Rust —
//! the client-side fallback spec §9 explicitly sanctions.

use rusqlite::Connection;

use memelord_core::retrieval::RetrievedMemory;
use memelord_scoring::decay;

use crate::error::StorageResult;
use crate::queries::memory_ops::list_ranking_candidates;

const SECONDS_PER_DAY: f64 = 86_400.0;

/// Rank every embedded memory against `query_embedding` as of `now`, return
/// the top `top_k` as [`RetrievedMemory`] (similarity-only score, per spec
/// §4.4 "weight does not enter per-task ranking").
pub fn rank_for_task(
    conn: &Connection,
    query_embedding: &[f32],
    dimensions: usize,
    decay_rate: f64,
    top_k: usize,
    now: i64,
) -> StorageResult<Vec<RetrievedMemory>> {
    let candidates = list_ranking_candidates(conn, dimensions)?;

    let mut scored: Vec<(f64, RetrievedMemory)> = candidates
        .into_iter()
        .map(|c| {
            let similarity = memelord_core::vector::cosine_similarity(query_embedding, &c.embedding);
            let days_since = ((now - c.recency_anchor).max(0) as f64) / SECONDS_PER_DAY;
            let score = similarity * decay::factor(decay_rate, days_since);
            (
                score,
                RetrievedMemory {
                    memory_id: c.id,
                    content: c.content,
                    category: c.category,
                    score: similarity,
                },
            )
        })
        .collect();

    // Sort by the combined score (similarity * decay), but the score
    // reported back to the caller is similarity alone (spec §4.4).
    scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));

    Ok(scored.into_iter().take(top_k).map(|(_, m)| m).collect())
}
