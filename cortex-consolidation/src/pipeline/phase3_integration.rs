//! Phase 3 — integration: abstracted facts become semantic memories, or
//! merge into existing ones. A contradicting semantic memory gets a
//! `contradicts` edge, never a silent overwrite.

use cortex_causal::{CausalGraph, EdgeRequest};
use cortex_core::errors::CortexResult;
use cortex_core::memory::types::SemanticContent;
use cortex_core::memory::{BaseMemory, MemoryPatch, MemoryQuery, MemoryType, TypedContent};
use cortex_core::models::{CausalEvidence, CausalRelation, EvidenceType};
use cortex_core::traits::IMemoryStorage;

use super::phase2_abstraction::AbstractedFact;

/// Negation cues used to spot a contradicting statement on the same topic.
const CONTRAST_CUES: [&str; 6] = ["not ", "never ", "avoid ", "don't ", "do not ", "no longer "];

#[derive(Debug, Default)]
pub struct IntegrationOutcome {
    /// Semantic memories created or merged.
    pub integrated_count: usize,
    /// Episode ids whose facts made it into semantic memory.
    pub integrated_episodes: Vec<String>,
}

pub fn integrate(
    storage: &dyn IMemoryStorage,
    graph: &CausalGraph,
    facts: &[AbstractedFact],
) -> CortexResult<IntegrationOutcome> {
    let mut outcome = IntegrationOutcome::default();

    for fact in facts {
        match integrate_one(storage, graph, fact) {
            Ok(()) => {
                outcome.integrated_count += 1;
                for episode_id in &fact.source_episodes {
                    if !outcome.integrated_episodes.contains(episode_id) {
                        outcome.integrated_episodes.push(episode_id.clone());
                    }
                }
            }
            Err(e) => {
                tracing::warn!(fact = %fact.fact, error = %e, "integration failed for fact");
            }
        }
    }
    Ok(outcome)
}

fn integrate_one(
    storage: &dyn IMemoryStorage,
    graph: &CausalGraph,
    fact: &AbstractedFact,
) -> CortexResult<()> {
    // Topic lives in the payload, so filter in code after a type query.
    let existing: Vec<BaseMemory> = storage
        .search(&MemoryQuery {
            types: Some(vec![MemoryType::Semantic]),
            limit: Some(cortex_core::constants::MAX_QUERY_LIMIT),
            ..Default::default()
        })?
        .into_iter()
        .filter(|m| matches!(&m.content, TypedContent::Semantic(c) if c.topic == fact.focus))
        .collect();

    let normalized = fact.fact.to_lowercase();
    let same_knowledge = existing.iter().find(|m| {
        matches!(&m.content, TypedContent::Semantic(c)
            if c.topic == fact.focus && c.knowledge.to_lowercase() == normalized)
    });

    if let Some(target) = same_knowledge {
        // Merge: extend provenance, bump the evidence counter.
        let TypedContent::Semantic(content) = &target.content else {
            unreachable!("filtered to semantic above");
        };
        let mut merged = content.clone();
        for episode_id in &fact.source_episodes {
            if !merged.consolidated_from.contains(episode_id) {
                merged.consolidated_from.push(episode_id.clone());
            }
        }
        merged.supporting_evidence += fact.source_episodes.len() as u32;
        storage.update(
            &target.id,
            &MemoryPatch {
                content: Some(TypedContent::Semantic(merged)),
                confidence: Some(target.confidence.value().max(fact.confidence)),
                ..Default::default()
            },
        )?;
        return Ok(());
    }

    let new_memory = semantic_from_fact(fact)?;
    storage.create(&new_memory)?;

    // A same-topic memory that negates what this one asserts gets an edge,
    // and both statements stay on record.
    if let Some(contradicted) = existing
        .iter()
        .find(|m| contrasts(&knowledge_of(m), &fact.fact))
    {
        graph.create_edge(EdgeRequest {
            source_id: new_memory.id.clone(),
            target_id: contradicted.id.clone(),
            relation: CausalRelation::Contradicts,
            strength: Some(fact.confidence),
            evidence: vec![CausalEvidence {
                evidence_type: EvidenceType::Semantic,
                description: format!("consolidation found opposing statements on {}", fact.focus),
                confidence: fact.confidence,
                detected_at: cortex_core::identity::monotonic_now(),
            }],
            inferred: true,
            created_by: Some("consolidation".to_string()),
        })?;
    }

    Ok(())
}

fn semantic_from_fact(fact: &AbstractedFact) -> CortexResult<BaseMemory> {
    let content = TypedContent::Semantic(SemanticContent {
        topic: fact.focus.clone(),
        knowledge: fact.fact.clone(),
        consolidated_from: fact.source_episodes.clone(),
        supporting_evidence: fact.source_episodes.len() as u32,
    });
    let mut memory = BaseMemory::new(content, fact.fact.clone())?;
    memory.confidence = fact.confidence.into();
    memory.created_by = Some("consolidation".to_string());
    Ok(memory)
}

fn knowledge_of(memory: &BaseMemory) -> String {
    match &memory.content {
        TypedContent::Semantic(c) => c.knowledge.clone(),
        _ => memory.summary.clone(),
    }
}

fn contrasts(a: &str, b: &str) -> bool {
    let a_lower = format!("{} ", a.to_lowercase());
    let b_lower = format!("{} ", b.to_lowercase());
    CONTRAST_CUES
        .iter()
        .any(|cue| a_lower.contains(cue) != b_lower.contains(cue))
}
