//! Error taxonomy (spec §7).
//!
//! Rule-level failures (`RuleTimeout`, `RuleExecutionError`) are normally
//! recovered locally and recorded in [`crate::engine::metrics::RuleStat`];
//! they only surface as an `Error` when [`crate::MatchOptions::tolerant`] is
//! `false`. Compile-time errors are always fatal to construction.

use thiserror::Error;

use crate::rule::RuleId;

#[derive(Debug, Error)]
pub enum Error {
    /// Engine construction requires at least one rule.
    #[error("no rules provided to engine")]
    NoRules,

    /// A rule's pattern failed to compile under both the RE2-safe and the
    /// full Perl-compatible syntax.
    #[error("rule {rule_id:?} failed to compile: {cause}")]
    RuleCompileError { rule_id: RuleId, cause: String },

    /// A transport failure from an external collaborator. The core never
    /// constructs this variant itself; it exists so drivers that wrap
    /// `MatchBlob` (a source enumerator, a streaming server) can surface
    /// their own I/O errors through the same `Error` type.
    #[error("scan I/O error: {0}")]
    ScanIoError(String),

    /// A rule's regex exceeded `ruleTimeout`. Only propagated in strict mode
    /// (`MatchOptions::tolerant == false`); otherwise captured in `RuleStat`.
    #[error("rule {rule_id:?} timed out")]
    RuleTimeout { rule_id: RuleId },

    /// Any other regex execution error. Only propagated in strict mode;
    /// otherwise captured in `RuleStat`.
    #[error("rule {rule_id:?} execution error: {cause}")]
    RuleExecutionError { rule_id: RuleId, cause: String },

    /// The caller's cancellation token fired mid-scan.
    #[error("scan canceled")]
    Canceled,
}

pub type Result<T> = std::result::Result<T, Error>;
