//! Rule Compiler (spec §4.1).
//!
//! Grounded on the teacher's `CompiledRules::new` (`compiled_rules.rs`): the
//! overall shape (turn a flat `&[Rule]` into an indexed, immutable structure
//! once, up front) carries over directly. The teacher's bucket indexing is
//! replaced with fast/fallback routing, since this domain's "coarse gate"
//! (§4.2's keyword prefilter) is exact rather than heuristic.

use std::collections::HashSet;

use regex::bytes::{Regex as FastRegex, RegexSet};

use crate::engine::multipattern::MultiPatternDb;
use crate::error::{Error, Result};
use crate::rule::{Rule, RuleId, RuleSet};

/// Which engine a compiled rule's precise matching goes through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineKind {
    /// Compiled with the RE2-safe `regex` crate; eligible for the
    /// multi-pattern fast path.
    Fast,
    /// Compiled with `fancy-regex` because the pattern needs lookaround or
    /// backreferences that `regex` (RE2) refuses to compile.
    Fallback,
}

/// Either precise-matching engine for one rule, picked at compile time.
pub enum PreciseRegex {
    Fast(FastRegex),
    Fallback(fancy_regex::Regex),
}

/// A compiled rule: the original [`Rule`], its chosen engine, and cached
/// capture-group names in group order (index 0 is the whole match and is
/// always unnamed).
pub struct CompiledRule {
    pub rule: Rule,
    pub kind: EngineKind,
    pub regex: PreciseRegex,
    pub group_names: Vec<Option<String>>,
}

/// The full compiled engine: every rule's compiled form, indexed by its
/// position (`rules[i]` is rule `i`), plus the optional multi-pattern DB
/// built over the fast-set.
pub struct CompiledEngine {
    pub rules: Vec<CompiledRule>,
    pub fast_ids: Vec<usize>,
    pub fallback_ids: Vec<usize>,
    pub always_on_ids: Vec<usize>,
    pub multi_pattern: Option<MultiPatternDb>,
}

/// Flags extracted from an inline flag group during normalization.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExternalFlags {
    pub case_insensitive: bool,
    pub dot_matches_new_line: bool,
    pub multi_line: bool,
}

impl ExternalFlags {
    fn merge_from_group(&mut self, group: &str) {
        let mut negate = false;
        for c in group.chars() {
            match c {
                '-' => negate = true,
                'i' => self.case_insensitive = !negate,
                's' => self.dot_matches_new_line = !negate,
                'm' => self.multi_line = !negate,
                'x' => {} // handled separately by the caller
                _ => {}
            }
        }
    }

    /// Re-embed these flags as a leading inline group, the way a precise
    /// per-pattern compile flag (Hyperscan's `HS_FLAG_CASELESS` et al.) would
    /// be represented if expressed back in pattern text. `regex::bytes::RegexSet`
    /// only exposes uniform (not per-pattern) flags, so the normalized,
    /// comment-free pattern text re-embeds them instead of losing them.
    fn as_inline_prefix(&self) -> String {
        let mut flags = String::new();
        if self.case_insensitive {
            flags.push('i');
        }
        if self.dot_matches_new_line {
            flags.push('s');
        }
        if self.multi_line {
            flags.push('m');
        }
        if flags.is_empty() { String::new() } else { format!("(?{})", flags) }
    }
}

/// Does `group` (the text between `(?` and `)`) consist solely of flag
/// characters, i.e. is this a standalone flag toggle rather than a scoped
/// group, a named group, or a lookaround assertion?
fn is_flag_only_group(group: &str) -> bool {
    !group.is_empty() && group.chars().all(|c| matches!(c, 'i' | 's' | 'm' | 'x' | 'U' | '-'))
}

/// Normalize `pattern` for the fast multi-pattern engine (spec §4.1):
///
/// - Strip a leading extended-mode flag group (and, if present, strip
///   unescaped whitespace and `#`-to-`\n` line comments from the rest of the
///   pattern, preserving escapes and the contents of character classes).
/// - Remove embedded inline flag toggles anywhere else in the pattern,
///   recording them as [`ExternalFlags`] rather than leaving them in the text.
/// - Leave every other construct (lookbehind, lookahead, backreferences)
///   untouched; those are what determine fallback routing, not normalization.
///
/// Returns the normalized pattern text and the flags extracted from it. Per
/// spec §9's resolution of the relevant Open Question, a flag group's
/// non-`x` flags are preserved wherever in the leading group they appear, not
/// only when the group is strictly flags-only at the very start.
pub fn normalize_pattern(pattern: &str) -> (String, ExternalFlags) {
    let mut flags = ExternalFlags::default();
    let mut body = pattern;
    let mut extended = false;

    if let Some(rest) = body.strip_prefix("(?") {
        if let Some(end) = rest.find(')') {
            let group = &rest[..end];
            if is_flag_only_group(group) {
                extended = group.contains('x');
                flags.merge_from_group(group);
                body = &rest[end + 1..];
            }
        }
    }

    let stripped = if extended { strip_extended_whitespace_and_comments(body) } else { body.to_string() };

    let normalized = strip_embedded_inline_flags(&stripped, &mut flags);
    (normalized, flags)
}

/// Strip unescaped whitespace and `#`-led line comments outside character
/// classes, leaving escape sequences and class contents untouched.
fn strip_extended_whitespace_and_comments(pattern: &str) -> String {
    let mut out = String::with_capacity(pattern.len());
    let mut chars = pattern.chars().peekable();
    let mut in_class = false;

    while let Some(c) = chars.next() {
        if c == '\\' {
            out.push(c);
            if let Some(next) = chars.next() {
                out.push(next);
            }
            continue;
        }
        if in_class {
            out.push(c);
            if c == ']' {
                in_class = false;
            }
            continue;
        }
        match c {
            '[' => {
                in_class = true;
                out.push(c);
            }
            '#' => {
                for c2 in chars.by_ref() {
                    if c2 == '\n' {
                        break;
                    }
                }
            }
            c if c.is_whitespace() => {}
            c => out.push(c),
        }
    }

    out
}

/// Remove standalone `(?flags)` toggles found anywhere in `pattern` (outside
/// character classes), folding each into `flags`. Scoped groups like `(?:`,
/// named groups `(?<name>`, and lookaround `(?=`/`(?!`/`(?<=`/`(?<!` are left
/// untouched since they are not flag-only.
fn strip_embedded_inline_flags(pattern: &str, flags: &mut ExternalFlags) -> String {
    let mut out = String::with_capacity(pattern.len());
    let bytes: Vec<char> = pattern.chars().collect();
    let mut i = 0;
    let mut in_class = false;

    while i < bytes.len() {
        let c = bytes[i];
        if c == '\\' {
            out.push(c);
            if i + 1 < bytes.len() {
                out.push(bytes[i + 1]);
            }
            i += 2;
            continue;
        }
        if in_class {
            out.push(c);
            if c == ']' {
                in_class = false;
            }
            i += 1;
            continue;
        }
        if c == '[' {
            in_class = true;
            out.push(c);
            i += 1;
            continue;
        }
        if c == '(' && bytes.get(i + 1) == Some(&'?') {
            if let Some(end_offset) = bytes[i + 2..].iter().position(|&c| c == ')') {
                let group: String = bytes[i + 2..i + 2 + end_offset].iter().collect();
                if is_flag_only_group(&group) {
                    flags.merge_from_group(&group);
                    i = i + 2 + end_offset + 1;
                    continue;
                }
            }
        }
        out.push(c);
        i += 1;
    }

    out
}

fn capture_group_names_fast(re: &FastRegex) -> Vec<Option<String>> {
    re.capture_names().map(|n| n.map(|s| s.to_string())).collect()
}

fn capture_group_names_fallback(re: &fancy_regex::Regex) -> Vec<Option<String>> {
    re.capture_names().map(|n| n.map(|s| s.to_string())).collect()
}

/// Attempt a bulk `RegexSet` compile over `patterns`; on failure, recursively
/// binary-partition the list to isolate incompatible patterns in O(log n)
/// compile attempts (spec §4.1).
fn partition_fast_compilable<'a>(candidates: &[(usize, &'a str)]) -> (Vec<usize>, Vec<usize>) {
    if candidates.is_empty() {
        return (Vec::new(), Vec::new());
    }
    if candidates.len() == 1 {
        let (id, pattern) = candidates[0];
        return match FastRegex::new(pattern) {
            Ok(_) => (vec![id], Vec::new()),
            Err(_) => (Vec::new(), vec![id]),
        };
    }

    match RegexSet::new(candidates.iter().map(|(_, p)| *p)) {
        Ok(_) => (candidates.iter().map(|(id, _)| *id).collect(), Vec::new()),
        Err(_) => {
            let mid = candidates.len() / 2;
            let (left_fast, left_fallback) = partition_fast_compilable(&candidates[..mid]);
            let (right_fast, right_fallback) = partition_fast_compilable(&candidates[mid..]);
            let mut fast = left_fast;
            fast.extend(right_fast);
            let mut fallback = left_fallback;
            fallback.extend(right_fallback);
            (fast, fallback)
        }
    }
}

/// Compile a [`RuleSet`] into a [`CompiledEngine`] (spec §4.1).
///
/// `deny_list` names rules known in advance to be incompatible with the fast
/// engine; they are routed directly to the fallback engine without any
/// compile attempt against `regex`.
pub fn compile_rule_set(rule_set: &RuleSet, deny_list: &HashSet<RuleId>) -> Result<CompiledEngine> {
    if rule_set.is_empty() {
        return Err(Error::NoRules);
    }

    let mut re2_candidates: Vec<(usize, String)> = Vec::new();
    let mut forced_fallback: HashSet<usize> = HashSet::new();

    for (idx, rule) in rule_set.rules().iter().enumerate() {
        if deny_list.contains(&rule.id) {
            forced_fallback.insert(idx);
            continue;
        }
        match FastRegex::new(&rule.pattern) {
            Ok(_) => re2_candidates.push((idx, rule.pattern.clone())),
            Err(_) => {
                forced_fallback.insert(idx);
            }
        }
    }

    let candidate_refs: Vec<(usize, &str)> =
        re2_candidates.iter().map(|(idx, pat)| (*idx, pat.as_str())).collect();
    let (fast_ids_unsorted, demoted) = partition_fast_compilable(&candidate_refs);
    for id in demoted {
        forced_fallback.insert(id);
    }

    let mut compiled_rules: Vec<Option<CompiledRule>> = (0..rule_set.len()).map(|_| None).collect();
    let mut fast_ids = Vec::new();
    let mut fallback_ids = Vec::new();
    let mut always_on_ids = Vec::new();

    for idx in fast_ids_unsorted {
        let rule = rule_set.get(idx).expect("index within bounds");
        let re = FastRegex::new(&rule.pattern)
            .map_err(|e| Error::RuleCompileError { rule_id: rule.id.clone(), cause: e.to_string() })?;
        let group_names = capture_group_names_fast(&re);
        compiled_rules[idx] = Some(CompiledRule {
            rule: rule.clone(),
            kind: EngineKind::Fast,
            regex: PreciseRegex::Fast(re),
            group_names,
        });
        fast_ids.push(idx);
        if rule.keywords.is_empty() {
            always_on_ids.push(idx);
        }
    }

    for idx in 0..rule_set.len() {
        if compiled_rules[idx].is_some() {
            continue;
        }
        let rule = rule_set.get(idx).expect("index within bounds");
        let re = fancy_regex::Regex::new(&rule.pattern)
            .map_err(|e| Error::RuleCompileError { rule_id: rule.id.clone(), cause: e.to_string() })?;
        let group_names = capture_group_names_fallback(&re);
        compiled_rules[idx] = Some(CompiledRule {
            rule: rule.clone(),
            kind: EngineKind::Fallback,
            regex: PreciseRegex::Fallback(re),
            group_names,
        });
        fallback_ids.push(idx);
        if rule.keywords.is_empty() {
            always_on_ids.push(idx);
        }
    }

    let rules: Vec<CompiledRule> = compiled_rules.into_iter().map(|c| c.expect("every index filled")).collect();

    let multi_pattern = if fast_ids.is_empty() {
        None
    } else {
        Some(MultiPatternDb::build(&rules, &fast_ids)?)
    };

    Ok(CompiledEngine { rules, fast_ids, fallback_ids, always_on_ids, multi_pattern })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_leading_extended_flags_and_comments() {
        let (norm, flags) = normalize_pattern("(?xi)AKIA # a comment\n [0-9A-Z]{16}");
        assert_eq!(norm, "AKIA[0-9A-Z]{16}");
        assert!(flags.case_insensitive);
    }

    #[test]
    fn preserves_escaped_whitespace_in_extended_mode() {
        let (norm, _) = normalize_pattern("(?x) a\\ b");
        assert_eq!(norm, "a\\ b");
    }

    #[test]
    fn preserves_hash_inside_character_class() {
        let (norm, _) = normalize_pattern("(?x) [a#b] ");
        assert_eq!(norm, "[a#b]");
    }

    #[test]
    fn strips_embedded_inline_flags_elsewhere() {
        let (norm, flags) = normalize_pattern("foo(?i)bar");
        assert_eq!(norm, "foobar");
        assert!(flags.case_insensitive);
    }

    #[test]
    fn leaves_non_flag_groups_untouched() {
        let (norm, _) = normalize_pattern("(?:abc)(?<name>def)(?=ghi)");
        assert_eq!(norm, "(?:abc)(?<name>def)(?=ghi)");
    }

    #[test]
    fn compiles_lookbehind_rule_to_fallback() {
        let rules = RuleSet::new(vec![Rule {
            id: "lookbehind".into(),
            name: "lookbehind".into(),
            pattern: "(?<=secret:)[a-z0-9]{10}".into(),
            keywords: vec!["secret:".into()],
            ignore_if_contains: vec![],
        }]);
        let engine = compile_rule_set(&rules, &Default::default()).unwrap();
        assert_eq!(engine.fallback_ids, vec![0]);
        assert!(engine.fast_ids.is_empty());
    }

    #[test]
    fn compiles_simple_rule_to_fast_set() {
        let rules = RuleSet::new(vec![Rule {
            id: "aws".into(),
            name: "aws".into(),
            pattern: "AKIA[0-9A-Z]{16}".into(),
            keywords: vec!["AKIA".into()],
            ignore_if_contains: vec![],
        }]);
        let engine = compile_rule_set(&rules, &Default::default()).unwrap();
        assert_eq!(engine.fast_ids, vec![0]);
        assert!(engine.multi_pattern.is_some());
    }

    #[test]
    fn empty_rule_set_errors() {
        let rules = RuleSet::new(vec![]);
        let err = compile_rule_set(&rules, &Default::default()).unwrap_err();
        assert!(matches!(err, Error::NoRules));
    }
}
