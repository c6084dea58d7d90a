//! Manual smoke-test CLI: reads a blob from stdin, scans it against a small
//! built-in demo rule set, and prints admitted matches.
//!
//! Grounded on the teacher's `src/main.rs`/`debug_report.rs` (a stdin-driven
//! CLI printing a structured report of what the engine found), trimmed to
//! the essentials: no ANSI report renderer is retained, since this binary
//! exists only to exercise [`credmatch_core::Engine`] end-to-end, not as a
//! supported surface (spec §6: "the core has no CLI surface").

use std::io::{self, Read};

use credmatch_core::{BlobId, Engine, MatchOptions, Rule, RuleSet};

fn demo_rules() -> RuleSet {
    RuleSet::new(vec![
        Rule {
            id: "demo.aws.1".into(),
            name: "AWS Access Key ID".into(),
            pattern: "AKIA[0-9A-Z]{16}".into(),
            keywords: vec!["AKIA".into()],
            ignore_if_contains: vec![],
        },
        Rule {
            id: "demo.stripe.1".into(),
            name: "Stripe Live Secret Key".into(),
            pattern: "sk_live_[A-Za-z0-9]{24,}".into(),
            keywords: vec!["sk_live_".into()],
            ignore_if_contains: vec![],
        },
        Rule {
            id: "demo.email.1".into(),
            name: "Email Address".into(),
            pattern: "(?P<user>[A-Za-z0-9._%+-]+)@(?P<domain>[A-Za-z0-9.-]+\\.[A-Za-z]{2,})".into(),
            keywords: vec!["@".into()],
            ignore_if_contains: vec![],
        },
    ])
}

fn main() -> io::Result<()> {
    tracing_subscriber::fmt::init();

    let mut blob = Vec::new();
    io::stdin().read_to_end(&mut blob)?;

    let rules = demo_rules();
    let engine = Engine::new(&rules).expect("demo rule set always compiles");
    let blob_id = BlobId::compute(&blob);

    let mut options = MatchOptions::default();
    options.context_lines = 1;

    match engine.match_blob(&blob, blob_id, &options) {
        Ok(result) => {
            println!("blob_id: {blob_id}");
            println!(
                "summary: {} completed, {} timed-out, {} errored",
                result.summary.completed, result.summary.timed_out, result.summary.errored
            );
            println!("{} match(es):", result.matches.len());
            for m in &result.matches {
                println!(
                    "  [{}] span=({},{}) matching={:?}",
                    m.rule_id, m.span.0, m.span.1, m.snippet.matching
                );
                for (name, value) in &m.named_groups {
                    println!("      {name}={value:?}");
                }
            }
        }
        Err(err) => {
            eprintln!("scan failed: {err}");
            std::process::exit(1);
        }
    }

    Ok(())
}
