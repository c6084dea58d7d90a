//! Rule data model (spec §3).
//!
//! A [`Rule`] is immutable once loaded: the loader (out of scope for this
//! crate, see spec §1) parses rule definitions from whatever format it likes
//! (YAML, JSON, ...) and hands the core already-parsed [`Rule`] values.
//!
//! Grounded on the teacher's `Rule` struct (`examples/john-wennstrom-astorion/src/lib.rs`),
//! generalized from name+pattern+production to name+pattern+keywords+ignore-list.

use sha2::{Digest, Sha256};

/// Stable external identifier for a rule (e.g. `"np.aws.1"`).
pub type RuleId = String;

/// A named, uniquely identified pattern used to detect a class of secrets.
#[derive(Debug, Clone)]
pub struct Rule {
    /// Stable identifier string, unique within a [`RuleSet`].
    pub id: RuleId,
    /// Human-readable display name.
    pub name: String,
    /// Source pattern string (Perl-style syntax: extended mode, inline
    /// flags, named groups, dot-all, multiline, lookaround, backreferences).
    pub pattern: String,
    /// Literal keywords seeding the prefilter. An empty list means the rule
    /// is always a prefilter candidate.
    pub keywords: Vec<String>,
    /// Substrings that, if found within a match's span + snippet, cause the
    /// match to be rejected after precise matching (spec §9).
    pub ignore_if_contains: Vec<String>,
}

impl Rule {
    /// Content-addressable hash of the normalized pattern string, used as a
    /// stable fingerprint across rule versions (spec §3/§6): equivalent
    /// patterns formatted differently intentionally yield different ids.
    pub fn structural_id(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.pattern.as_bytes());
        let digest = hasher.finalize();
        hex_string(&digest[..16])
    }
}

/// An immutable, ordered collection of [`Rule`]s.
#[derive(Debug, Clone)]
pub struct RuleSet {
    rules: Vec<Rule>,
}

impl RuleSet {
    pub fn new(rules: Vec<Rule>) -> Self {
        RuleSet { rules }
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Rule> {
        self.rules.get(index)
    }
}

pub(crate) fn hex_string(bytes: &[u8]) -> String {
    let mut s = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        s.push_str(&format!("{:02x}", b));
    }
    s
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(pattern: &str) -> Rule {
        Rule {
            id: "test".into(),
            name: "test".into(),
            pattern: pattern.into(),
            keywords: vec![],
            ignore_if_contains: vec![],
        }
    }

    #[test]
    fn structural_id_is_deterministic() {
        let r = rule("AKIA[0-9A-Z]{16}");
        assert_eq!(r.structural_id(), r.structural_id());
    }

    #[test]
    fn structural_id_differs_on_reformat() {
        let a = rule("AKIA[0-9A-Z]{16}");
        let b = rule("AKIA[0-9A-Z]{16} ");
        assert_ne!(a.structural_id(), b.structural_id());
    }
}
