//! Shared builders for the test suites across crates.
//!
//! Every builder returns a fully-formed `BaseMemory` so tests only spell out
//! what they care about.

use chrono::{DateTime, Duration, Utc};

use cortex_core::memory::types::{
    EpisodeContext, EpisodicContent, ExtractedFact, SemanticContent, TribalContent,
};
use cortex_core::memory::{BaseMemory, Confidence, Importance, TypedContent};
use cortex_core::traits::IEmbeddingProvider;
use cortex_core::CortexResult;

/// A tribal memory with the given knowledge, summarized by the same text.
pub fn tribal(knowledge: &str) -> BaseMemory {
    BaseMemory::new(
        TypedContent::Tribal(TribalContent {
            knowledge: knowledge.to_string(),
            ..Default::default()
        }),
        knowledge,
    )
    .expect("valid tribal fixture")
}

/// An episodic memory with a focus and one extracted fact per entry in `facts`.
pub fn episode(focus: &str, interaction: &str, facts: &[(&str, f64)]) -> BaseMemory {
    let content = TypedContent::Episodic(EpisodicContent {
        interaction: interaction.to_string(),
        context: EpisodeContext {
            focus: focus.to_string(),
            files_touched: Vec::new(),
        },
        extracted_facts: facts
            .iter()
            .map(|(fact, confidence)| ExtractedFact {
                fact: fact.to_string(),
                confidence: *confidence,
                extracted_at: None,
            })
            .collect(),
        ..Default::default()
    });
    BaseMemory::new(content, interaction).expect("valid episodic fixture")
}

/// A semantic memory for a topic.
pub fn semantic(topic: &str, knowledge: &str) -> BaseMemory {
    BaseMemory::new(
        TypedContent::Semantic(SemanticContent {
            topic: topic.to_string(),
            knowledge: knowledge.to_string(),
            ..Default::default()
        }),
        knowledge,
    )
    .expect("valid semantic fixture")
}

/// Backdate a memory's creation and transaction coordinates.
pub fn aged(mut memory: BaseMemory, days: i64) -> BaseMemory {
    let then = Utc::now() - Duration::days(days);
    memory.created_at = then;
    memory.updated_at = then;
    memory.transaction_time = then;
    memory.valid_time = then;
    memory.last_accessed = then;
    memory
}

/// Set confidence on a memory.
pub fn with_confidence(mut memory: BaseMemory, value: f64) -> BaseMemory {
    memory.confidence = Confidence::new(value);
    memory
}

/// Set importance on a memory.
pub fn with_importance(mut memory: BaseMemory, importance: Importance) -> BaseMemory {
    memory.importance = importance;
    memory
}

/// Set access telemetry on a memory.
pub fn with_access(mut memory: BaseMemory, count: u64, last: DateTime<Utc>) -> BaseMemory {
    memory.access_count = count;
    memory.last_accessed = last;
    memory
}

/// Deterministic embedding provider for tests: hashes text into a unit
/// vector, so identical texts agree and different texts (usually) differ.
pub struct HashEmbedder {
    dims: usize,
}

impl HashEmbedder {
    pub fn new(dims: usize) -> Self {
        Self { dims }
    }
}

impl Default for HashEmbedder {
    fn default() -> Self {
        Self::new(64)
    }
}

impl IEmbeddingProvider for HashEmbedder {
    fn name(&self) -> &str {
        "hash-test"
    }

    fn dimensions(&self) -> usize {
        self.dims
    }

    fn max_tokens(&self) -> usize {
        8192
    }

    fn initialize(&self) -> CortexResult<()> {
        Ok(())
    }

    fn embed(&self, text: &str) -> CortexResult<Vec<f32>> {
        let mut vector = vec![0.0f32; self.dims];
        // FNV-style rolling hash spread over the dimensions.
        let mut state: u64 = 0xcbf29ce484222325;
        for (i, byte) in text.bytes().enumerate() {
            state = state.wrapping_mul(0x100000001b3) ^ (byte as u64);
            let idx = (state as usize) % self.dims;
            vector[idx] += if i % 2 == 0 { 1.0 } else { -0.5 };
        }
        let magnitude: f32 = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
        if magnitude > 0.0 {
            for v in &mut vector {
                *v /= magnitude;
            }
        }
        Ok(vector)
    }

    fn embed_batch(&self, texts: &[String]) -> CortexResult<Vec<Vec<f32>>> {
        texts.iter().map(|t| self.embed(t)).collect()
    }

    fn is_available(&self) -> bool {
        true
    }
}

/// An embedding provider that is never available, for degradation tests.
#[derive(Default)]
pub struct OfflineEmbedder;

impl IEmbeddingProvider for OfflineEmbedder {
    fn name(&self) -> &str {
        "offline-test"
    }

    fn dimensions(&self) -> usize {
        64
    }

    fn max_tokens(&self) -> usize {
        8192
    }

    fn initialize(&self) -> CortexResult<()> {
        Err(cortex_core::CortexError::ProviderUnavailable {
            name: "offline-test".to_string(),
        })
    }

    fn embed(&self, _text: &str) -> CortexResult<Vec<f32>> {
        Err(cortex_core::CortexError::ProviderUnavailable {
            name: "offline-test".to_string(),
        })
    }

    fn embed_batch(&self, _texts: &[String]) -> CortexResult<Vec<Vec<f32>>> {
        Err(cortex_core::CortexError::ProviderUnavailable {
            name: "offline-test".to_string(),
        })
    }

    fn is_available(&self) -> bool {
        false
    }
}
