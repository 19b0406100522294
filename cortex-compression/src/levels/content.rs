//! Per-type extraction of the knowledge, example, and evidence strings the
//! L2/L3 projections carry.

use cortex_core::memory::{BaseMemory, TypedContent};

/// The main body of knowledge a memory carries.
pub fn knowledge_of(memory: &BaseMemory) -> String {
    match &memory.content {
        TypedContent::Core(c) => c.description.clone(),
        TypedContent::Tribal(c) => c.knowledge.clone(),
        TypedContent::Procedural(c) => c
            .steps
            .iter()
            .map(|s| format!("{}. {}", s.order, s.instruction))
            .collect::<Vec<_>>()
            .join(" "),
        TypedContent::Semantic(c) => c.knowledge.clone(),
        TypedContent::Episodic(c) => c.interaction.clone(),
        TypedContent::PatternRationale(c) => c.rationale.clone(),
        TypedContent::ConstraintOverride(c) => c.justification.clone(),
        TypedContent::DecisionContext(c) => format!("{}: {}", c.decision, c.reasoning),
        TypedContent::CodeSmell(c) => format!("{} at {}: {}", c.smell, c.location, c.remediation),
    }
}

/// Illustrative examples, if the type has any.
pub fn examples_of(memory: &BaseMemory) -> Vec<String> {
    match &memory.content {
        TypedContent::Procedural(c) => c.checklist.clone(),
        TypedContent::PatternRationale(c) => c.tradeoffs.clone(),
        TypedContent::DecisionContext(c) => c.alternatives.clone(),
        _ => Vec::new(),
    }
}

/// Supporting evidence strings.
pub fn evidence_of(memory: &BaseMemory) -> Vec<String> {
    match &memory.content {
        TypedContent::Tribal(c) => {
            let mut evidence = c.warnings.clone();
            evidence.extend(c.consequences.clone());
            evidence
        }
        TypedContent::Procedural(c) => c.corrections.clone(),
        TypedContent::Semantic(c) => c
            .consolidated_from
            .iter()
            .map(|id| format!("from {id}"))
            .collect(),
        TypedContent::Episodic(c) => c.extracted_facts.iter().map(|f| f.fact.clone()).collect(),
        TypedContent::PatternRationale(c) => c.alternatives_rejected.clone(),
        _ => Vec::new(),
    }
}
