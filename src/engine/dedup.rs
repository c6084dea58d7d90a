//! Deduplicator (spec §4.8).
//!
//! Grounded on the teacher's `engine/dedup.rs` (`NodeKey` + `seen: HashSet`
//! admission pattern): same idea, one key-set checked/updated sequentially,
//! generalized from a single node-identity key to the two-mode
//! (Location/Content) key spec §4.8 requires.

use std::collections::HashSet;

use crate::Match;

/// Which identity two matches must share to be considered duplicates (spec
/// §4.8).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DedupeMode {
    /// Key = StructuralID: distinct locations of the same secret are distinct
    /// findings.
    Location,
    /// Key = FindingID: the same secret value at different locations
    /// collapses to the first admitted match.
    Content,
}

/// Sequential, single-blob-scan admission set. Not thread-safe; the
/// Coordinator owns one instance per blob and resets it between blobs rather
/// than reallocating (spec §5).
#[derive(Debug)]
pub struct Deduplicator {
    mode: DedupeMode,
    seen: HashSet<String>,
}

impl Deduplicator {
    pub fn new(mode: DedupeMode) -> Self {
        Deduplicator { mode, seen: HashSet::new() }
    }

    fn key<'a>(&self, m: &'a Match) -> &'a str {
        match self.mode {
            DedupeMode::Location => &m.structural_id,
            DedupeMode::Content => &m.finding_id,
        }
    }

    pub fn is_duplicate(&self, m: &Match) -> bool {
        self.seen.contains(self.key(m))
    }

    pub fn add(&mut self, m: &Match) {
        let key = self.key(m).to_string();
        self.seen.insert(key);
    }

    pub fn reset(&mut self) {
        self.seen.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blob_id::BlobId;
    use bstr::BString;

    fn make_match(structural_id: &str, finding_id: &str) -> Match {
        Match {
            rule_id: "r".into(),
            rule_name: "r".into(),
            blob_id: BlobId::compute(b"x"),
            span: (0, 1),
            groups: vec![],
            named_groups: Default::default(),
            snippet: crate::Snippet {
                before: BString::from(Vec::new()),
                matching: BString::from(b"a".to_vec()),
                after: BString::from(Vec::new()),
            },
            structural_id: structural_id.to_string(),
            finding_id: finding_id.to_string(),
        }
    }

    #[test]
    fn location_mode_admits_each_structural_id_once() {
        let mut dedup = Deduplicator::new(DedupeMode::Location);
        let a = make_match("s1", "f1");
        let b = make_match("s1", "f2");
        assert!(!dedup.is_duplicate(&a));
        dedup.add(&a);
        assert!(dedup.is_duplicate(&a));
        assert!(dedup.is_duplicate(&b)); // same structural_id, different finding_id
    }

    #[test]
    fn content_mode_collapses_same_finding_id() {
        let mut dedup = Deduplicator::new(DedupeMode::Content);
        let a = make_match("s1", "f1");
        let b = make_match("s2", "f1");
        dedup.add(&a);
        assert!(dedup.is_duplicate(&b));
    }

    #[test]
    fn reset_clears_admission_state() {
        let mut dedup = Deduplicator::new(DedupeMode::Location);
        let a = make_match("s1", "f1");
        dedup.add(&a);
        assert!(dedup.is_duplicate(&a));
        dedup.reset();
        assert!(!dedup.is_duplicate(&a));
    }
}
