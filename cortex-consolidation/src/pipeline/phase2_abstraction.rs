//! Phase 2 — abstraction: group episodes by focus, keep facts that recur.

use std::collections::HashMap;

use cortex_core::config::ConsolidationConfig;
use cortex_core::memory::{BaseMemory, TypedContent};

/// A fact that recurred often enough to graduate.
#[derive(Debug, Clone)]
pub struct AbstractedFact {
    /// The group key, from `context.focus`.
    pub focus: String,
    /// Original casing of the first occurrence.
    pub fact: String,
    /// Max confidence over the instances.
    pub confidence: f64,
    /// How many times the fact appeared.
    pub occurrences: usize,
    /// Episodes the fact came from.
    pub source_episodes: Vec<String>,
}

pub fn abstract_facts(
    episodes: &[BaseMemory],
    config: &ConsolidationConfig,
) -> Vec<AbstractedFact> {
    // focus -> normalized fact -> accumulator
    let mut groups: HashMap<String, HashMap<String, AbstractedFact>> = HashMap::new();
    let mut group_sizes: HashMap<String, usize> = HashMap::new();

    for episode in episodes {
        let TypedContent::Episodic(content) = &episode.content else {
            continue;
        };
        let focus = content.context.focus.clone();
        *group_sizes.entry(focus.clone()).or_insert(0) += 1;

        let facts = groups.entry(focus.clone()).or_default();
        for extracted in &content.extracted_facts {
            let normalized = extracted.fact.to_lowercase().trim().to_string();
            if normalized.is_empty() {
                continue;
            }
            let entry = facts.entry(normalized).or_insert_with(|| AbstractedFact {
                focus: focus.clone(),
                fact: extracted.fact.clone(),
                confidence: extracted.confidence,
                occurrences: 0,
                source_episodes: Vec::new(),
            });
            entry.occurrences += 1;
            entry.confidence = entry.confidence.max(extracted.confidence);
            if !entry.source_episodes.contains(&episode.id) {
                entry.source_episodes.push(episode.id.clone());
            }
        }
    }

    // Only groups with at least two members abstract anything, and only
    // facts that recurred survive.
    let mut result: Vec<AbstractedFact> = groups
        .into_iter()
        .filter(|(focus, _)| group_sizes.get(focus).copied().unwrap_or(0) >= 2)
        .flat_map(|(_, facts)| facts.into_values())
        .filter(|fact| fact.occurrences >= config.min_fact_frequency)
        .collect();
    result.sort_by(|a, b| b.occurrences.cmp(&a.occurrences));
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_fixtures::episode;

    #[test]
    fn recurring_fact_graduates_with_max_confidence() {
        let episodes = vec![
            episode("pagination", "added paging to users", &[("Always paginate queries", 0.7)]),
            episode("pagination", "added paging to posts", &[("always paginate queries", 0.9)]),
        ];
        let facts = abstract_facts(&episodes, &Default::default());
        assert_eq!(facts.len(), 1);
        assert_eq!(facts[0].occurrences, 2);
        assert!((facts[0].confidence - 0.9).abs() < 1e-9);
        assert_eq!(facts[0].source_episodes.len(), 2);
    }

    #[test]
    fn singleton_groups_produce_nothing() {
        let episodes = vec![episode(
            "caching",
            "added a cache",
            &[("cache invalidation is hard", 0.8)],
        )];
        assert!(abstract_facts(&episodes, &Default::default()).is_empty());
    }

    #[test]
    fn one_off_facts_are_dropped() {
        let episodes = vec![
            episode("auth", "fixed login", &[("tokens expire", 0.8)]),
            episode("auth", "fixed logout", &[("sessions are sticky", 0.8)]),
        ];
        assert!(abstract_facts(&episodes, &Default::default()).is_empty());
    }
}
