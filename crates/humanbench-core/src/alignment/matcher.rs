//! Four-tier label-to-key matching.
//!
//! # Tiers
//!
//! | Tier | Rule | Tie-break |
//! |------|------|-----------|
//! | 1. Exact | `normalize(label)` is a candidate | n/a |
//! | 2. Normalized exact | case-folded `normalize(label)` equals case-folded `normalize(key)` | last candidate wins |
//! | 3. Token Jaccard | best whitespace-token Jaccard score `> 0.7` | first maximum wins |
//! | 4. Keyword overlap | shares `>= 2` label words longer than 3 chars | first candidate wins |
//!
//! Candidates are ordered (ground-truth document order), so every tie-break is
//! deterministic for a given input.
//!
//! # Usage
//!
//! ```
//! use humanbench_core::KeyMatcher;
//!
//! let matcher = KeyMatcher::default();
//! let keys = vec!["shy".to_string(), "outgoing".to_string()];
//! assert_eq!(matcher.match_label("Shy", &keys), Some("shy"));
//! assert_eq!(matcher.match_label("completely unrelated text", &keys), None);
//! ```

use super::normalize::{normalize, tokens};
use crate::config::MatcherConfig;
use serde::Serialize;
use std::collections::{HashMap, HashSet};

/// Which tier produced a match.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "tier", rename_all = "snake_case")]
pub enum MatchTier {
    Exact,
    NormalizedExact,
    TokenJaccard { score: f64 },
    KeywordOverlap { shared: usize },
}

impl MatchTier {
    /// Short name used in logs and report counters.
    pub fn name(&self) -> &'static str {
        match self {
            MatchTier::Exact => "exact",
            MatchTier::NormalizedExact => "normalized_exact",
            MatchTier::TokenJaccard { .. } => "token_jaccard",
            MatchTier::KeywordOverlap { .. } => "keyword_overlap",
        }
    }
}

/// A resolved key together with the tier that found it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatchOutcome<'a> {
    pub key: &'a str,
    pub tier: MatchTier,
}

/// Resolves free-text labels to ground-truth keys.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeyMatcher {
    config: MatcherConfig,
}

impl KeyMatcher {
    /// Creates a matcher with custom thresholds.
    pub fn new(config: MatcherConfig) -> Self {
        Self { config }
    }

    /// Thresholds in use.
    pub fn config(&self) -> &MatcherConfig {
        &self.config
    }

    /// Returns the matched key, or `None` when no tier succeeds.
    ///
    /// The returned key is always an element of `candidates`.
    pub fn match_label<'a>(&self, label: &str, candidates: &'a [String]) -> Option<&'a str> {
        self.match_detailed(label, candidates).map(|outcome| outcome.key)
    }

    /// Like [`match_label`](Self::match_label), also reporting the tier.
    pub fn match_detailed<'a>(
        &self,
        label: &str,
        candidates: &'a [String],
    ) -> Option<MatchOutcome<'a>> {
        if label.is_empty() || candidates.is_empty() {
            return None;
        }

        let normalized_label = normalize(label);

        // Tier 1: exact
        if let Some(key) = candidates.iter().find(|key| **key == normalized_label) {
            return Some(MatchOutcome {
                key,
                tier: MatchTier::Exact,
            });
        }

        // Normalize each candidate once for tiers 2-4
        let normalized_keys: Vec<String> = candidates.iter().map(|key| normalize(key)).collect();

        // Tier 2: normalized exact, last candidate wins on collision
        let folded: HashMap<String, &'a str> = normalized_keys
            .iter()
            .zip(candidates)
            .map(|(normalized, key)| (normalized.to_lowercase(), key.as_str()))
            .collect();
        if let Some(&key) = folded.get(&normalized_label.to_lowercase()) {
            return Some(MatchOutcome {
                key,
                tier: MatchTier::NormalizedExact,
            });
        }

        let label_tokens: HashSet<String> = tokens(&normalized_label).collect();
        let key_tokens: Vec<HashSet<String>> = normalized_keys
            .iter()
            .map(|normalized| tokens(normalized).collect())
            .collect();

        // Tier 3: token Jaccard, first maximum wins
        let mut best: Option<(usize, f64)> = None;
        if !label_tokens.is_empty() {
            for (idx, candidate_tokens) in key_tokens.iter().enumerate() {
                if candidate_tokens.is_empty() {
                    continue;
                }
                let score = jaccard(&label_tokens, candidate_tokens);
                if best.map_or(true, |(_, best_score)| score > best_score) {
                    best = Some((idx, score));
                }
            }
        }
        if let Some((idx, score)) = best {
            if score > self.config.jaccard_threshold {
                return Some(MatchOutcome {
                    key: &candidates[idx],
                    tier: MatchTier::TokenJaccard { score },
                });
            }
        }

        // Tier 4: keyword overlap, first candidate wins
        let significant: HashSet<&String> = label_tokens
            .iter()
            .filter(|token| token.chars().count() > self.config.significant_word_min_len)
            .collect();
        if significant.is_empty() {
            return None;
        }
        for (idx, candidate_tokens) in key_tokens.iter().enumerate() {
            let shared = significant
                .iter()
                .filter(|token| candidate_tokens.contains(token.as_str()))
                .count();
            if shared >= self.config.keyword_min_overlap {
                return Some(MatchOutcome {
                    key: &candidates[idx],
                    tier: MatchTier::KeywordOverlap { shared },
                });
            }
        }

        None
    }
}

/// `|a ∩ b| / |a ∪ b|`; callers guarantee both sets are non-empty.
fn jaccard(a: &HashSet<String>, b: &HashSet<String>) -> f64 {
    let intersection = a.intersection(b).count();
    let union = a.len() + b.len() - intersection;
    intersection as f64 / union as f64
}
