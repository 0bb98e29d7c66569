//! Property-based tests for the codemod engine using proptest.
//!
//! Workflow frontmatter is assembled from shuffled legacy and current
//! sections, with comments and blank lines mixed in, and run through the
//! whole registry.

use aw_fix::codemod::Runner;
use aw_fix::{
    Document, FrontmatterEdit, FrontmatterEditor, FrontmatterTree, KeyPath, Registry, Scalar,
};
use proptest::prelude::*;

const SECTIONS: &[&str] = &[
    "on:\n  command:\n    name: bot\n",
    "timeout_minutes: 10\n",
    "network:\n  firewall: true\n",
    "permissions: read\n",
    "safe-inputs:\n  mode: http  # default now\n  max-size: 100KB\n",
    "safe-outputs:\n  create-agent-task:\n    title: Run tests\n  upload-assets:\n  add-comment:\n    discussion: true\n",
    "mcp-servers:\n  one:\n    mode: stdio\n    network:\n      allowed: [example.com]\n  two:\n    type: http\n",
    "tools:\n  grep: true\n  edit:\n",
    "sandbox:\n  agent: false\n",
    "engine: copilot # current\n",
    "# standalone comment\n",
    "\n",
];

/// Strategy for frontmatter built from a shuffled subset of sections.
fn frontmatter_strategy() -> impl Strategy<Value = String> {
    prop::sample::subsequence(SECTIONS.to_vec(), 0..=SECTIONS.len())
        .prop_shuffle()
        .prop_map(|sections| sections.concat())
}

/// Strategy for Markdown bodies, including lines that look like frontmatter.
fn body_strategy() -> impl Strategy<Value = String> {
    prop::collection::vec(
        prop_oneof![
            "[A-Za-z ]{0,30}",
            Just("---".to_string()),
            Just("network:\n  firewall: true".to_string()),
            Just("- [ ] task".to_string()),
        ],
        0..8,
    )
    .prop_map(|lines| lines.iter().map(|line| format!("{line}\n")).collect())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    /// Property: a second run over migrated output changes nothing
    #[test]
    fn prop_registry_is_idempotent(frontmatter in frontmatter_strategy(), body in body_strategy()) {
        let input = format!("---\n{frontmatter}---\n{body}");
        let registry = Registry::builtin();
        let runner = Runner::new(&registry);

        let first = runner.run_document(&Document::parse(&input).unwrap());
        let second = runner.run_document(&first.document);

        prop_assert!(!second.changed());
        prop_assert_eq!(second.document.render(), first.document.render());
    }

    /// Property: the Markdown body is never modified
    #[test]
    fn prop_body_is_untouched(frontmatter in frontmatter_strategy(), body in body_strategy()) {
        let input = format!("---\n{frontmatter}---\n{body}");
        let registry = Registry::builtin();

        let run = Runner::new(&registry).run_document(&Document::parse(&input).unwrap());

        prop_assert_eq!(run.document.body(), body.as_str());
        let expected_tail = format!("---\n{}", body);
        prop_assert!(run.document.render().ends_with(&expected_tail));
    }

    /// Property: migrated frontmatter still decodes and `on` stays a bare key
    #[test]
    fn prop_output_decodes_with_bare_on(frontmatter in frontmatter_strategy()) {
        let input = format!("---\n{frontmatter}---\n");
        let registry = Registry::builtin();

        let run = Runner::new(&registry).run_document(&Document::parse(&input).unwrap());
        let text = run.document.frontmatter_text();

        prop_assert!(FrontmatterTree::parse(text).is_ok());
        prop_assert!(!text.contains("'on'"));
        prop_assert!(!text.contains("\"on\""));
    }

    /// Property: documents without frontmatter pass through byte for byte
    #[test]
    fn prop_no_frontmatter_is_noop(body in body_strategy()) {
        let input = format!("Intro\n{body}");
        let registry = Registry::builtin();

        let run = Runner::new(&registry).run_document(&Document::parse(&input).unwrap());

        prop_assert!(!run.changed());
        prop_assert_eq!(run.document.render(), input);
    }

    /// Property: merging keeps existing items first, then new items by first
    /// appearance, without duplicates
    #[test]
    fn prop_merge_deduplicates_in_order(
        existing in prop::collection::vec("[a-z]{1,6}\\.com", 1..5),
        incoming in prop::collection::vec("[a-z]{1,6}\\.com", 0..8),
    ) {
        let mut text = String::from("network:\n  allowed:\n");
        for item in &existing {
            text.push_str(&format!("    - {item}\n"));
        }
        text.push_str("tools:\n  edit:\n");

        let mut editor = FrontmatterEditor::new(&text);
        let items: Vec<Scalar> = incoming.iter().map(|item| Scalar::from(item.as_str())).collect();
        editor
            .apply(&FrontmatterEdit::merge(KeyPath::from_parts(["network", "allowed"]), items))
            .unwrap();

        let mut expected: Vec<String> = existing.clone();
        for item in &incoming {
            if !expected.contains(item) {
                expected.push(item.clone());
            }
        }

        let tree = editor.tree().unwrap();
        let merged: Vec<String> = tree
            .get(&["network", "allowed"])
            .and_then(FrontmatterTree::as_sequence)
            .unwrap()
            .iter()
            .map(|item| item.as_str().unwrap().to_string())
            .collect();
        prop_assert_eq!(merged, expected);
        prop_assert!(editor.text().ends_with("tools:\n  edit:\n"));
    }
}
