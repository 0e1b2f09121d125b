//! # memelord
//!
//! Per-project persistent memory layer for coding agents. Wraps
//! `memelord-storage` (schema, connections) and `memelord-scoring` (the
//! pure scoring algebra) behind the stateful [`MemoryStore`] facade that
//! implements the public contract: `startTask`, `reportCorrection`,
//! `reportUserInput`, `insertRawMemory`, `embedPending`, `endTask`,
//! `contradictMemory`, `penalizeMemory`, `decay`, `purge`, `getTopByWeight`,
//! `getStats`.
//!
//! Not thread-safe by design (spec §5): the store is meant to be called by
//! one process's single control flow at a time, short-lived connections
//! are what make multi-*process* access safe. Wrap a `MemoryStore` in a
//! mutex yourself if you need to share it across threads.

pub mod error;

pub mod testing;

use std::sync::Arc;

use memelord_core::memory::{Category, Memory, MemoryId, TaskId, UserInputSource};
use memelord_core::retrieval::{MemoryRetrieval, RetrievedMemory, WeightedMemory};
use memelord_core::task::{SelfReport, Task, TaskOutcome};
use memelord_core::{vector, Baseline, Clock, Config, SystemClock};
use memelord_scoring::{credit, task_score, weight};
use memelord_storage::{queries, Storage};

pub use error::{MemelordError, MemelordResult};
pub use memelord_core::{CoreError, EmbeddingProvider};
pub use memelord_storage::StorageError;

/// The weight floor below which `decay()` is willing to delete a memory
/// (spec §4.3 `decay`).
const DECAY_DELETE_WEIGHT_THRESHOLD: f64 = 0.15;
/// A memory must have been retrieved more than this many times before
/// `decay()` is allowed to delete it, protecting brand-new low-weight
/// memories that have never been tried (spec §4.3 `decay`).
const DECAY_DELETE_MIN_RETRIEVALS: i64 = 5;
/// Weight assigned to a correction inserted by `contradictMemory` (spec
/// §4.3 `contradictMemory`).
const CONTRADICTION_WEIGHT: f64 = 2.0;

/// Arguments to [`MemoryStore::report_correction`] (spec §4.3
/// `reportCorrection`).
pub struct Correction {
    pub lesson: String,
    pub what_failed: String,
    pub what_worked: String,
    pub tokens_wasted: Option<i64>,
}

/// Outcome counters and optional per-memory self-reports supplied to
/// [`MemoryStore::end_task`] (spec §4.3 `endTask`).
pub struct EndTask {
    pub tokens_used: i64,
    pub tool_calls: i64,
    pub errors: i64,
    pub user_corrections: i64,
    pub completed: bool,
    pub self_report: Vec<SelfReport>,
}

/// Result of [`MemoryStore::contradict_memory`] (spec §4.3
/// `contradictMemory`).
pub struct Contradiction {
    pub deleted: bool,
    pub correction_id: Option<MemoryId>,
}

/// Result of [`MemoryStore::decay`] (spec §4.3 `decay`).
pub struct DecayResult {
    pub decayed: usize,
    pub deleted: usize,
}

/// Result of [`MemoryStore::get_stats`] (spec §4.3 `getStats`).
pub struct Stats {
    pub total_memories: i64,
    pub task_count: i64,
    pub avg_task_score: Option<f64>,
    pub top_memories: Vec<WeightedMemory>,
}

/// The stateful facade over storage and scoring (spec §2, layer 3). Owns
/// the session id, the current task id, and the baseline cache reloaded
/// from storage at [`MemoryStore::init`].
pub struct MemoryStore {
    storage: Storage,
    config: Config,
    clock: Arc<dyn Clock>,
    baseline: Baseline,
    current_task_id: Option<TaskId>,
}

impl MemoryStore {
    /// Open (or create) the database at `config.db_path`, create the
    /// schema if missing, repair truncated embeddings, and load the
    /// baseline cache (spec §4.3 `init`). Uses the system wall clock.
    pub fn init(config: Config) -> MemelordResult<Self> {
        Self::init_with_clock(config, Arc::new(SystemClock))
    }

    /// As [`MemoryStore::init`], with an injected clock — the seam tests
    /// use to advance time deterministically (spec §9 "Time source").
    pub fn init_with_clock(config: Config, clock: Arc<dyn Clock>) -> MemelordResult<Self> {
        config.validate()?;
        let storage = Storage::new(config.db_path.clone());
        memelord_storage::init(&storage, config.dimensions)?;
        let baseline = storage.with_connection(|conn| queries::meta_ops::get_baseline(conn))?;
        Ok(Self {
            storage,
            config,
            clock,
            baseline,
            current_task_id: None,
        })
    }

    /// Drop cached state. There is no persistent connection to close; the
    /// next [`MemoryStore::init`] re-reads everything from disk (spec §4.3
    /// `close`).
    pub fn close(self) {}

    fn now(&self) -> i64 {
        self.clock.now()
    }

    fn embed(&self, text: &str) -> MemelordResult<Vec<f32>> {
        let v = self.config.embed.embed(text)?;
        vector::validate_dimensions(&v, self.config.dimensions)?;
        Ok(v)
    }

    /// Embed every memory currently stored with `embedding = NULL`, one at
    /// a time with no connection held, then write each back in its own
    /// short transaction (spec §4.3 `embedPending`). Safe to call
    /// concurrently from multiple processes: the write is
    /// `UPDATE ... WHERE embedding IS NULL`, so a racing writer's embedding
    /// wins if it lands first.
    pub fn embed_pending(&mut self) -> MemelordResult<usize> {
        let pending = self
            .storage
            .with_connection(|conn| queries::memory_ops::list_pending(conn))?;

        let mut count = 0;
        for id in pending {
            // Re-fetch content right before embedding: another process may
            // have deleted the memory between the list and this point.
            let content = self
                .storage
                .with_connection(|conn| queries::memory_ops::get_memory(conn, &id, self.config.dimensions))?;
            let Some(memory) = content else { continue };
            if !memory.is_pending() {
                continue;
            }
            let embedding = self.embed(&memory.content)?;
            self.storage.with_connection(|conn| {
                queries::memory_ops::set_embedding(conn, &id, &embedding)
            })?;
            count += 1;
        }
        Ok(count)
    }

    /// Begin a task: embed its description, rank and retrieve the
    /// top-`topK` memories among already-embedded memories, and record the
    /// retrievals (spec §4.3 `startTask`).
    ///
    /// Deliberately does not call [`MemoryStore::embed_pending`] itself:
    /// a memory inserted moments ago via `insertRawMemory` stays invisible
    /// to retrieval until something calls `embedPending`, explicitly.
    /// Collaborators that want pending memories to become searchable by
    /// the next task call `embedPending` on their own schedule (e.g. after
    /// every `endTask`).
    pub fn start_task(&mut self, description: &str) -> MemelordResult<(TaskId, Vec<RetrievedMemory>)> {
        let desc_vec = self.embed(description)?;

        let task_id = uuid::Uuid::new_v4().to_string();
        let now = self.now();

        let task = Task {
            id: task_id.clone(),
            description: description.to_string(),
            description_embedding: Some(desc_vec.clone()),
            tokens_used: 0,
            tool_calls: 0,
            errors: 0,
            user_corrections: 0,
            completed: false,
            task_score: None,
            started_at: now,
            finished_at: None,
        };

        let retrieved = self.storage.with_connection(|conn| {
            let tx = conn.unchecked_transaction()?;
            queries::task_ops::insert_task(&tx, &task)?;
            let ranked = queries::ranking::rank_for_task(
                &tx,
                &desc_vec,
                self.config.dimensions,
                self.config.decay_rate,
                self.config.top_k,
                now,
            )?;
            for memory in &ranked {
                queries::retrieval_ops::record_retrieval(&tx, &memory.memory_id, &task_id, memory.score)?;
                queries::memory_ops::mark_retrieved(&tx, &memory.memory_id, now)?;
            }
            tx.commit()?;
            Ok(ranked)
        })?;

        self.current_task_id = Some(task_id.clone());
        Ok((task_id, retrieved))
    }

    /// Record a correction: fixed content template, synchronous embedding,
    /// initial weight scaled by tokens wasted relative to the average task
    /// cost (spec §4.3 `reportCorrection`).
    pub fn report_correction(&mut self, correction: Correction) -> MemelordResult<MemoryId> {
        let content = format!(
            "{}\n\nFailed approach: {}\nWorking approach: {}",
            correction.lesson, correction.what_failed, correction.what_worked
        );
        let embedding = self.embed(&content)?;
        let tokens_wasted = correction.tokens_wasted.unwrap_or(0);

        let avg_tokens = self
            .storage
            .with_connection(|conn| queries::task_ops::avg_tokens_used(conn))?;
        let initial_weight = weight::correction_initial_weight(tokens_wasted, avg_tokens);

        self.insert_memory(
            content,
            Some(embedding),
            Category::Correction,
            initial_weight.value(),
            tokens_wasted,
        )
    }

    /// Record a user-sourced memory: embed the lesson, initial weight
    /// keyed by `source` (spec §4.3 `reportUserInput`).
    pub fn report_user_input(&mut self, lesson: &str, source: UserInputSource) -> MemelordResult<MemoryId> {
        let embedding = self.embed(lesson)?;
        let initial_weight = weight::user_initial_weight(source);
        self.insert_memory(
            lesson.to_string(),
            Some(embedding),
            Category::User,
            initial_weight.value(),
            0,
        )
    }

    /// Insert a memory with `embedding = NULL`; embedding is deferred to
    /// [`MemoryStore::embed_pending`]. Used on the hook hot path, where
    /// blocking on model inference is unacceptable (spec §4.3
    /// `insertRawMemory`).
    pub fn insert_raw_memory(
        &mut self,
        content: &str,
        category: Category,
        initial_weight: f64,
    ) -> MemelordResult<MemoryId> {
        self.insert_memory(content.to_string(), None, category, initial_weight, 0)
    }

    fn insert_memory(
        &mut self,
        content: String,
        embedding: Option<Vec<f32>>,
        category: Category,
        initial_weight: f64,
        initial_cost: i64,
    ) -> MemelordResult<MemoryId> {
        let id = uuid::Uuid::new_v4().to_string();
        let memory = Memory {
            id: id.clone(),
            content,
            embedding,
            category,
            weight: initial_weight.into(),
            initial_cost,
            created_at: self.now(),
            last_retrieved: None,
            retrieval_count: 0,
            source_task: self.current_task_id.clone(),
        };
        self.storage
            .with_connection(|conn| queries::memory_ops::insert_memory(conn, &memory))?;
        Ok(id)
    }

    /// Close out a task: score it against the pre-update baseline,
    /// advance the baseline, apply per-memory credit from any self-reports,
    /// and clear `current_task_id` if it matches (spec §4.3 `endTask`).
    pub fn end_task(&mut self, task_id: &str, outcome: EndTask) -> MemelordResult<f64> {
        let score = task_score::compute(
            &self.baseline,
            task_score::Outcome {
                tokens: outcome.tokens_used as f64,
                errors: outcome.errors as f64,
                user_corrections: outcome.user_corrections as f64,
                completed: outcome.completed,
            },
        );
        let updated_baseline = memelord_scoring::welford::update(
            &self.baseline,
            outcome.tokens_used as f64,
            outcome.errors as f64,
            outcome.user_corrections as f64,
        );

        let now = self.now();
        let rated_count = outcome.self_report.len();
        let task_outcome = TaskOutcome {
            tokens_used: outcome.tokens_used,
            tool_calls: outcome.tool_calls,
            errors: outcome.errors,
            user_corrections: outcome.user_corrections,
            completed: outcome.completed,
        };

        self.storage.with_connection(|conn| {
            let tx = conn.unchecked_transaction()?;
            queries::task_ops::finish_task(&tx, task_id, &task_outcome, score, now)?;
            queries::meta_ops::set_baseline(&tx, &updated_baseline)?;

            for report in &outcome.self_report {
                let memory_credit = credit::compute(score, report.self_report, rated_count);
                if let Some(current_weight) = queries::memory_ops::get_weight(&tx, &report.memory_id)? {
                    let updated = weight::ema_update(
                        current_weight.into(),
                        memory_credit,
                        self.config.learning_rate,
                    );
                    queries::memory_ops::update_weight(&tx, &report.memory_id, updated.value())?;
                }
                queries::retrieval_ops::set_self_report(&tx, &report.memory_id, task_id, report.self_report)?;
                queries::retrieval_ops::set_credit(&tx, &report.memory_id, task_id, memory_credit)?;
            }

            tx.commit()?;
            Ok(())
        })?;

        self.baseline = updated_baseline;
        if self.current_task_id.as_deref() == Some(task_id) {
            self.current_task_id = None;
        }
        Ok(score)
    }

    /// Delete a memory and its retrieval history; optionally replace it
    /// with a corrected memory at weight 2.0 (spec §4.3 `contradictMemory`).
    /// A missing memory is a soft failure: `{deleted: false}`, not an
    /// error (spec §7).
    pub fn contradict_memory(
        &mut self,
        memory_id: &str,
        correction: Option<&str>,
    ) -> MemelordResult<Contradiction> {
        let deleted = self
            .storage
            .with_connection(|conn| queries::memory_ops::delete_memory(conn, memory_id))?;

        if !deleted {
            return Ok(Contradiction {
                deleted: false,
                correction_id: None,
            });
        }

        let correction_id = match correction {
            Some(text) => {
                let embedding = self.embed(text)?;
                Some(self.insert_memory(
                    text.to_string(),
                    Some(embedding),
                    Category::Correction,
                    CONTRADICTION_WEIGHT,
                    0,
                )?)
            }
            None => None,
        };

        Ok(Contradiction {
            deleted: true,
            correction_id,
        })
    }

    /// Multiply a memory's weight by `factor`, floored at `Weight::MIN`
    /// (spec §4.3 `penalizeMemory`).
    pub fn penalize_memory(&mut self, memory_id: &str, factor: f64) -> MemelordResult<()> {
        self.storage.with_connection(|conn| {
            if let Some(current) = queries::memory_ops::get_weight(conn, memory_id)? {
                let updated = weight::penalize(current.into(), factor);
                queries::memory_ops::update_weight(conn, memory_id, updated.value())?;
            }
            Ok(())
        })?;
        Ok(())
    }

    /// Multiply every memory's weight by `decayRate`, then delete memories
    /// with `weight < 0.15 AND retrieval_count > 5` (spec §4.3 `decay`).
    pub fn decay(&mut self) -> MemelordResult<DecayResult> {
        let decay_rate = self.config.decay_rate;
        let (decayed, deleted) = self.storage.with_connection(|conn| {
            let decayed = queries::memory_ops::decay_all_weights(conn, decay_rate)?;
            let deleted = queries::memory_ops::delete_decayed(
                conn,
                DECAY_DELETE_WEIGHT_THRESHOLD,
                DECAY_DELETE_MIN_RETRIEVALS,
            )?;
            Ok((decayed, deleted))
        })?;
        Ok(DecayResult { decayed, deleted })
    }

    /// Delete every memory with `weight < threshold`, no retrieval-count
    /// guard (spec §4.3 `purge`).
    pub fn purge(&mut self, threshold: f64) -> MemelordResult<usize> {
        if !threshold.is_finite() {
            return Err(memelord_core::CoreError::InvalidArgument {
                reason: format!("purge threshold must be finite, got {threshold}"),
            }
            .into());
        }
        let deleted = self
            .storage
            .with_connection(|conn| queries::memory_ops::purge_below(conn, threshold))?;
        Ok(deleted)
    }

    /// The `n` highest-weight memories, ranked purely by stored weight —
    /// no embedding needed (spec §4.3 `getTopByWeight`).
    pub fn get_top_by_weight(&self, n: usize) -> MemelordResult<Vec<WeightedMemory>> {
        let memories = self
            .storage
            .with_connection(|conn| queries::memory_ops::top_by_weight(conn, n, self.config.dimensions))?;
        Ok(memories
            .into_iter()
            .map(|m| WeightedMemory {
                memory_id: m.id,
                content: m.content,
                category: m.category,
                score: m.weight.value(),
            })
            .collect())
    }

    /// Aggregate counts and the top 10 memories by weight (spec §4.3
    /// `getStats`).
    pub fn get_stats(&self) -> MemelordResult<Stats> {
        let (total_memories, task_count, avg_task_score) = self.storage.with_connection(|conn| {
            let total = queries::memory_ops::count_memories(conn)?;
            let tasks = queries::task_ops::count_tasks(conn)?;
            let avg = queries::task_ops::avg_task_score(conn)?;
            Ok((total, tasks, avg))
        })?;
        let top_memories = self.get_top_by_weight(10)?;
        Ok(Stats {
            total_memories,
            task_count,
            avg_task_score,
            top_memories,
        })
    }

    /// All self-reported retrievals for a task, exposed for external
    /// tooling (e.g. a status command) rather than part of the core's
    /// public contract narrowly read from spec §4.3.
    pub fn rated_retrievals(&self, task_id: &str) -> MemelordResult<Vec<MemoryRetrieval>> {
        Ok(self
            .storage
            .with_connection(|conn| queries::retrieval_ops::rated_retrievals_for_task(conn, task_id))?)
    }

    pub fn current_task_id(&self) -> Option<&str> {
        self.current_task_id.as_deref()
    }

    pub fn baseline(&self) -> &Baseline {
        &self.baseline
    }
}
