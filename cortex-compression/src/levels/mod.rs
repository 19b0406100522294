//! Level projections. Each level is a strict superset of the one below;
//! the render of a projection is what gets token-counted and shipped.

mod content;

use cortex_core::memory::BaseMemory;
use cortex_core::models::{
    CompressedMemory, CompressionLevel, L0Fields, L1Fields, L2Details, L3Full,
};
use cortex_core::traits::ITokenEstimator;

use crate::context::MemoryNeighborhood;

pub use content::{evidence_of, examples_of, knowledge_of};

/// Project a memory at a level. The `tokens` field is the estimator's count
/// of the rendered projection; `neighborhood` feeds L3's related-memory and
/// causal-chain sections and is ignored below L3.
pub fn project(
    memory: &BaseMemory,
    level: CompressionLevel,
    estimator: &dyn ITokenEstimator,
    neighborhood: &MemoryNeighborhood,
) -> CompressedMemory {
    let mut compressed = build(memory, level, neighborhood);
    let tokens = estimator.estimate(&render(&compressed));
    set_tokens(&mut compressed, tokens);
    compressed
}

fn build(
    memory: &BaseMemory,
    level: CompressionLevel,
    neighborhood: &MemoryNeighborhood,
) -> CompressedMemory {
    let base = L0Fields {
        id: memory.id.clone(),
        memory_type: memory.memory_type,
        importance: memory.importance,
        tokens: 0,
    };
    if level == CompressionLevel::L0 {
        return CompressedMemory::L0 { base };
    }

    let brief = L1Fields {
        one_liner: memory.summary.clone(),
        tags: memory.tags.iter().take(3).cloned().collect(),
        confidence: memory.confidence.value(),
    };
    if level == CompressionLevel::L1 {
        return CompressedMemory::L1 { base, brief };
    }

    let details = L2Details {
        knowledge: content::knowledge_of(memory),
        example: content::examples_of(memory).into_iter().next(),
        evidence: content::evidence_of(memory).into_iter().take(2).collect(),
    };
    if level == CompressionLevel::L2 {
        return CompressedMemory::L2 {
            base,
            brief,
            details,
        };
    }

    let full = L3Full {
        complete_knowledge: content::knowledge_of(memory),
        all_examples: content::examples_of(memory),
        all_evidence: content::evidence_of(memory),
        related_memories: neighborhood.related_memories.clone(),
        causal_chain: neighborhood.causal_chain.clone(),
        linked_patterns: memory
            .linked_patterns
            .iter()
            .map(|l| l.pattern_id.clone())
            .collect(),
        linked_constraints: memory
            .linked_constraints
            .iter()
            .map(|l| l.constraint_id.clone())
            .collect(),
        linked_files: memory
            .linked_files
            .iter()
            .map(|c| format!("{}:{}-{}", c.file_path, c.line_start, c.line_end))
            .collect(),
        linked_functions: memory
            .linked_functions
            .iter()
            .map(|l| l.function_name.clone())
            .collect(),
    };
    CompressedMemory::L3 {
        base,
        brief,
        details,
        full,
    }
}

/// The text a consumer receives for a projection.
pub fn render(compressed: &CompressedMemory) -> String {
    match compressed {
        CompressedMemory::L0 { base } => render_l0(base),
        CompressedMemory::L1 { base, brief } => {
            format!("{} {}", render_l0(base), render_l1(brief))
        }
        CompressedMemory::L2 {
            base,
            brief,
            details,
        } => format!(
            "{} {}\n{}",
            render_l0(base),
            render_l1(brief),
            render_l2(details)
        ),
        CompressedMemory::L3 {
            base,
            brief,
            details,
            full,
        } => format!(
            "{} {}\n{}\n{}",
            render_l0(base),
            render_l1(brief),
            render_l2(details),
            render_l3(full)
        ),
    }
}

fn render_l0(base: &L0Fields) -> String {
    format!(
        "[{}|{}] {}",
        short_type(base.memory_type),
        base.importance.as_str(),
        base.id
    )
}

fn render_l1(brief: &L1Fields) -> String {
    let mut parts = vec![brief.one_liner.clone()];
    if !brief.tags.is_empty() {
        parts.push(format!("tags: {}", brief.tags.join(", ")));
    }
    parts.push(format!("conf {:.2}", brief.confidence));
    parts.join(" | ")
}

fn render_l2(details: &L2Details) -> String {
    let mut parts = vec![details.knowledge.clone()];
    if let Some(example) = &details.example {
        parts.push(format!("e.g. {example}"));
    }
    for evidence in &details.evidence {
        parts.push(format!("- {evidence}"));
    }
    parts.join("\n")
}

fn render_l3(full: &L3Full) -> String {
    let mut parts = Vec::new();
    if !full.all_examples.is_empty() {
        parts.push(format!("examples: {}", full.all_examples.join("; ")));
    }
    if !full.all_evidence.is_empty() {
        parts.push(format!("evidence: {}", full.all_evidence.join("; ")));
    }
    if !full.related_memories.is_empty() {
        parts.push(format!("related: {}", full.related_memories.join(", ")));
    }
    if !full.causal_chain.is_empty() {
        parts.push(format!("chain: {}", full.causal_chain.join(" -> ")));
    }
    if !full.linked_patterns.is_empty() {
        parts.push(format!("patterns: {}", full.linked_patterns.join(", ")));
    }
    if !full.linked_constraints.is_empty() {
        parts.push(format!("constraints: {}", full.linked_constraints.join(", ")));
    }
    if !full.linked_files.is_empty() {
        parts.push(format!("files: {}", full.linked_files.join(", ")));
    }
    if !full.linked_functions.is_empty() {
        parts.push(format!("functions: {}", full.linked_functions.join(", ")));
    }
    parts.join("\n")
}

fn set_tokens(compressed: &mut CompressedMemory, tokens: usize) {
    match compressed {
        CompressedMemory::L0 { base }
        | CompressedMemory::L1 { base, .. }
        | CompressedMemory::L2 { base, .. }
        | CompressedMemory::L3 { base, .. } => base.tokens = tokens,
    }
}

fn short_type(memory_type: cortex_core::memory::MemoryType) -> &'static str {
    use cortex_core::memory::MemoryType;
    match memory_type {
        MemoryType::Core => "core",
        MemoryType::Tribal => "trib",
        MemoryType::Procedural => "proc",
        MemoryType::Semantic => "sem",
        MemoryType::Episodic => "epis",
        MemoryType::PatternRationale => "rat",
        MemoryType::ConstraintOverride => "ovr",
        MemoryType::DecisionContext => "dec",
        MemoryType::CodeSmell => "smell",
    }
}
