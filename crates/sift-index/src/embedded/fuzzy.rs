//! Fuzzy term lookup with Levenshtein automata.

use std::{collections::HashSet, str};

use levenshtein_automata::{DFA, Distance, LevenshteinAutomatonBuilder, SINK_STATE};
use tantivy::{Searcher, schema::Field};
use tantivy_fst::Automaton;

use crate::error::IndexError;

/// Largest edit distance ever applied to a term.
const MAX_DISTANCE: u8 = 2;

/// Wrapper that implements `tantivy_fst::Automaton` for `levenshtein_automata::DFA`.
struct LevenshteinDfa(DFA);

impl Automaton for LevenshteinDfa {
    type State = u32;

    fn start(&self) -> Self::State {
        self.0.initial_state()
    }

    fn is_match(&self, state: &Self::State) -> bool {
        matches!(self.0.distance(*state), Distance::Exact(_))
    }

    fn can_match(&self, state: &Self::State) -> bool {
        *state != SINK_STATE
    }

    fn accept(&self, state: &Self::State, byte: u8) -> Self::State {
        self.0.transition(*state, byte)
    }
}

/// Edit distance allowed for a term, scaled by its length in characters.
///
/// Terms of one or two characters must match exactly, terms of three to five may differ by
/// one edit, longer terms by two.
pub fn auto_distance(term: &str) -> u8 {
    match term.chars().count() {
        0..=2 => 0,
        3..=5 => 1,
        _ => MAX_DISTANCE,
    }
}

/// Expands query terms into the indexed terms they fuzzily match.
pub struct FuzzyMatcher {
    /// Automaton builders indexed by edit distance.
    builders: Vec<LevenshteinAutomatonBuilder>,
}

impl Default for FuzzyMatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl FuzzyMatcher {
    /// Creates builders for every distance up to the maximum, counting transpositions as one
    /// edit.
    pub fn new() -> Self {
        Self {
            builders: (0..=MAX_DISTANCE)
                .map(|d| LevenshteinAutomatonBuilder::new(d, true))
                .collect(),
        }
    }

    /// Finds the terms in `field` that match any of `query_terms` within their auto distance.
    ///
    /// Exact-distance terms are returned as-is whether or not they occur in the index.
    pub fn matched_terms(
        &self,
        searcher: &Searcher,
        field: Field,
        query_terms: &[String],
    ) -> Result<HashSet<String>, IndexError> {
        let mut matched = HashSet::new();

        for query_term in query_terms {
            let distance = auto_distance(query_term);
            if distance == 0 {
                matched.insert(query_term.clone());
                continue;
            }
            let builder = &self.builders[usize::from(distance)];

            for segment_reader in searcher.segment_readers() {
                let inverted_index = segment_reader
                    .inverted_index(field)
                    .map_err(|e| IndexError::search(&e))?;
                let dfa = LevenshteinDfa(builder.build_dfa(query_term));
                let mut stream = inverted_index.terms().search(dfa).into_stream()?;

                while stream.advance() {
                    if let Ok(term) = str::from_utf8(stream.key()) {
                        matched.insert(term.to_string());
                    }
                }
            }
        }

        Ok(matched)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn auto_distance_scales_with_length() {
        assert_eq!(auto_distance(""), 0);
        assert_eq!(auto_distance("ab"), 0);
        assert_eq!(auto_distance("abc"), 1);
        assert_eq!(auto_distance("abcde"), 1);
        assert_eq!(auto_distance("abcdef"), 2);
        assert_eq!(auto_distance("größe"), 1);
    }

    #[test]
    fn dfa_accepts_within_distance() {
        let matcher = FuzzyMatcher::new();
        let dfa = LevenshteinDfa(matcher.builders[1].build_dfa("config"));
        let accepts = |word: &str| {
            let mut state = dfa.start();
            for &byte in word.as_bytes() {
                state = dfa.accept(&state, byte);
            }
            dfa.is_match(&state)
        };
        assert!(accepts("config"));
        assert!(accepts("confg"));
        assert!(accepts("cnofig"));
        assert!(!accepts("conflict"));
    }
}
