//! Fuzzy schedules name an approximate time with `around`.
//!
//! `daily at 09:00` becomes `daily around 09:00` and `weekly on monday at
//! 10:00` becomes `weekly on monday around 10:00`, both in `on.schedule`
//! itself and in the `cron` or `schedule` key of each `on.schedule` item.
//! Cron expressions and monthly schedules are left alone.

use crate::codemod::rule::{edit_frontmatter, Rule, RuleOutput};
use crate::document::Document;
use crate::yaml::{FrontmatterEdit, FrontmatterError, FrontmatterTree, KeyPath};
use once_cell::sync::Lazy;
use regex::Regex;
use semver::Version;

static AT_TIME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(daily|weekly on [A-Za-z]+) at (\S.*)$").expect("valid regex")
});

/// Keys of a schedule item that hold the expression.
const EXPRESSION_KEYS: [&str; 2] = ["cron", "schedule"];

pub fn rule() -> Rule {
    Rule {
        id: "schedule-at-to-around-migration",
        name: "Migrate schedule 'at' syntax to 'around' syntax",
        description: "Fuzzy daily and weekly schedules are scattered around the requested \
                      time, so they are written with 'around' instead of 'at'.",
        introduced_in: Version::new(0, 5, 0),
        apply,
    }
}

fn around(expression: &str) -> Option<String> {
    AT_TIME
        .captures(expression.trim())
        .map(|caps| format!("{} around {}", &caps[1], &caps[2]))
}

fn apply(document: &Document, tree: &FrontmatterTree) -> Result<RuleOutput, FrontmatterError> {
    let mut edits = Vec::new();
    match tree.get(&["on", "schedule"]) {
        Some(FrontmatterTree::Sequence(items)) => {
            for (index, item) in items.iter().enumerate() {
                let index = index.to_string();
                for key in EXPRESSION_KEYS {
                    let Some(updated) = item
                        .lookup(key)
                        .and_then(FrontmatterTree::as_str)
                        .and_then(around)
                    else {
                        continue;
                    };
                    edits.push(FrontmatterEdit::set(
                        KeyPath::from_parts(["on", "schedule", index.as_str(), key]),
                        updated,
                    ));
                }
            }
        }
        Some(schedule) => {
            if let Some(updated) = schedule.as_str().and_then(around) {
                edits.push(FrontmatterEdit::set(
                    KeyPath::from_parts(["on", "schedule"]),
                    updated,
                ));
            }
        }
        None => {}
    }

    if edits.is_empty() {
        return Ok(RuleOutput::unchanged(document));
    }
    edit_frontmatter(document, &edits)
}
