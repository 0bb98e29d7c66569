//! Integration tests for the built-in codemods
//!
//! Each rule is exercised through `apply_rule` on whole documents so the
//! splitter, editor and rule logic are tested together.

use aw_fix::codemod::Runner;
use aw_fix::{apply_rule, Document, Registry};

/// Helper: run one rule, returning the rendered document and whether it applied
fn run(id: &str, input: &str) -> (String, bool) {
    let registry = Registry::builtin();
    let document = Document::parse(input).unwrap();
    let outcome = apply_rule(&registry, id, &document).unwrap();
    (outcome.document.render(), outcome.applied)
}

/// Helper: wrap frontmatter text in delimiters with a fixed body
fn doc(frontmatter: &str) -> String {
    format!("---\n{frontmatter}---\n# Instructions\n\nDo the thing.\n")
}

#[test]
fn test_agent_task_renamed_to_agent_session() {
    let input = doc("on: push\nsafe-outputs:\n  create-agent-task:\n    title: Run tests\n");
    let (output, applied) = run("agent-task-to-agent-session-migration", &input);

    assert!(applied);
    assert_eq!(
        output,
        doc("on: push\nsafe-outputs:\n  create-agent-session:\n    title: Run tests\n")
    );
}

#[test]
fn test_agent_task_left_alone_when_session_exists() {
    let input = doc(
        "safe-outputs:\n  create-agent-task:\n    title: Old\n  create-agent-session:\n    title: New\n",
    );
    let (output, applied) = run("agent-task-to-agent-session-migration", &input);

    assert!(!applied);
    assert_eq!(output, input);
}

#[test]
fn test_mcp_network_hoisted_to_top_level() {
    let input = doc(
        "on: push\n\
         mcp-servers:\n\
         \x20 one:\n\
         \x20   command: one-server\n\
         \x20   network:\n\
         \x20     allowed: [example.com]\n\
         \x20 two:\n\
         \x20   container: ghcr.io/two\n\
         \x20   network:\n\
         \x20     allowed:\n\
         \x20       - example.com\n\
         \x20       - api.github.com\n",
    );
    let (output, applied) = run("mcp-network-to-top-level-migration", &input);

    assert!(applied);
    assert_eq!(
        output,
        doc("on: push\n\
             mcp-servers:\n\
             \x20 one:\n\
             \x20   command: one-server\n\
             \x20 two:\n\
             \x20   container: ghcr.io/two\n\
             network:\n\
             \x20 allowed:\n\
             \x20   - example.com\n\
             \x20   - api.github.com\n")
    );
}

#[test]
fn test_mcp_network_merges_after_existing_entries() {
    let input = doc(
        "network:\n  allowed:\n    - api.github.com\n    - defaults\n\
         mcp-servers:\n  one:\n    network:\n      allowed:\n        - example.com\n        - defaults\n    command: x\n",
    );
    let (output, applied) = run("mcp-network-to-top-level-migration", &input);

    assert!(applied);
    assert!(output.contains(
        "network:\n  allowed:\n    - api.github.com\n    - defaults\n    - example.com\n"
    ));
    assert!(output.contains("mcp-servers:\n  one:\n    command: x\n"));
}

#[test]
fn test_mcp_network_skipped_for_scalar_network() {
    let input = doc("network: defaults\nmcp-servers:\n  one:\n    network:\n      allowed: [a.com]\n");
    let (output, applied) = run("mcp-network-to-top-level-migration", &input);

    assert!(!applied);
    assert_eq!(output, input);
}

#[test]
fn test_firewall_true_becomes_sandbox_agent() {
    let input = doc(
        "on: push\nnetwork:\n  firewall: true\n  allowed:\n    - a.com\ntools:\n  edit:\n",
    );
    let (output, applied) = run("network-firewall-migration", &input);

    assert!(applied);
    assert_eq!(
        output,
        doc("on: push\nnetwork:\n  allowed:\n    - a.com\nsandbox:\n  agent: awf\ntools:\n  edit:\n")
    );
}

#[test]
fn test_firewall_true_keeps_existing_agent() {
    let input = doc("network:\n  firewall: true\nsandbox:\n  agent: custom\n");
    let (output, applied) = run("network-firewall-migration", &input);

    assert!(applied);
    assert_eq!(output, doc("network:\nsandbox:\n  agent: custom\n"));
    assert_eq!(output.matches("sandbox:").count(), 1);
}

#[test]
fn test_firewall_false_is_just_removed() {
    let input = doc("network:\n  firewall: false\n  allowed: [a.com]\n");
    let (output, applied) = run("network-firewall-migration", &input);

    assert!(applied);
    assert_eq!(output, doc("network:\n  allowed: [a.com]\n"));
}

#[test]
fn test_nested_firewall_subtree_deleted() {
    let input = doc(
        "network:\n  firewall:\n    enabled: true\n    strict: false\n  allowed:\n    - x.com\n",
    );
    let (output, applied) = run("network-firewall-migration", &input);

    assert!(applied);
    assert_eq!(output, doc("network:\n  allowed:\n    - x.com\n"));
    assert!(!output.contains("enabled:"));
    assert!(!output.contains("strict:"));
    assert!(!output.contains("sandbox"));
}

#[test]
fn test_firewall_mention_in_comment_untouched() {
    let input = doc("network:\n  # firewall: true was removed\n  allowed:\n    - a.com\n");
    let (output, applied) = run("network-firewall-migration", &input);

    assert!(!applied);
    assert_eq!(output, input);
}

#[test]
fn test_firewall_found_past_column_zero_comments() {
    let input = doc("network:\n# allowed:\n#   - example.com\n  firewall: true\n");
    let (output, applied) = run("network-firewall-migration", &input);

    assert!(applied);
    assert_eq!(
        output,
        doc("network:\nsandbox:\n  agent: awf\n# allowed:\n#   - example.com\n")
    );
}

#[test]
fn test_sandbox_agent_false_found_past_column_zero_comment() {
    let (output, applied) = run(
        "sandbox-agent-false-removal",
        &doc("on: push\nsandbox:\n# note\n  agent: false\n"),
    );
    assert!(applied);
    assert_eq!(output, doc("on: push\n# note\n"));
}

#[test]
fn test_safe_inputs_mode_block_removed_with_nested_comments() {
    let (output, applied) = run(
        "safe-inputs-mode-removal",
        &doc("safe-inputs:\n  mode:\n    kind: http\n    # trailing\n  max-size: 1\n"),
    );
    assert!(applied);
    assert_eq!(output, doc("safe-inputs:\n  max-size: 1\n"));
}

#[test]
fn test_safe_inputs_mode_removed_with_comment() {
    let input = doc(
        "safe-inputs:\n  mode: http  # HTTP mode is now the default\n  max-size: 100KB  # Maximum size for inputs\n",
    );
    let (output, applied) = run("safe-inputs-mode-removal", &input);

    assert!(applied);
    assert_eq!(
        output,
        doc("safe-inputs:\n  max-size: 100KB  # Maximum size for inputs\n")
    );
}

#[test]
fn test_no_frontmatter_passes_through_every_rule() {
    let input = "# Plain Markdown\n\nnetwork:\n  firewall: true\ntools:\n  grep: true\n";
    let registry = Registry::builtin();
    let document = Document::parse(input).unwrap();

    for rule in registry.rules() {
        let outcome = apply_rule(&registry, rule.id, &document).unwrap();
        assert!(!outcome.applied, "{} applied", rule.id);
        assert_eq!(outcome.document.render(), input);
    }
}

#[test]
fn test_timeout_minutes_renamed() {
    let (output, applied) = run("timeout-minutes-migration", &doc("on: push\ntimeout_minutes: 10\n"));
    assert!(applied);
    assert_eq!(output, doc("on: push\ntimeout-minutes: 10\n"));
}

#[test]
fn test_timeout_minutes_duplicate_dropped() {
    let (output, applied) = run(
        "timeout-minutes-migration",
        &doc("timeout-minutes: 5\ntimeout_minutes: 10\n"),
    );
    assert!(applied);
    assert_eq!(output, doc("timeout-minutes: 5\n"));
}

#[test]
fn test_command_trigger_renamed() {
    let (output, applied) = run(
        "command-to-slash-command-migration",
        &doc("on:\n  command:\n    name: bot\n"),
    );
    assert!(applied);
    assert_eq!(output, doc("on:\n  slash_command:\n    name: bot\n"));
}

#[test]
fn test_upload_assets_renamed() {
    let (output, applied) = run(
        "upload-assets-to-upload-asset-migration",
        &doc("safe-outputs:\n  upload-assets:\n    max: 3\n"),
    );
    assert!(applied);
    assert_eq!(output, doc("safe-outputs:\n  upload-asset:\n    max: 3\n"));
}

#[test]
fn test_add_comment_discussion_removed() {
    let (output, applied) = run(
        "add-comment-discussion-removal",
        &doc("safe-outputs:\n  add-comment:\n    discussion: true\n    max: 2\n"),
    );
    assert!(applied);
    assert_eq!(output, doc("safe-outputs:\n  add-comment:\n    max: 2\n"));
}

#[test]
fn test_permissions_shorthand_expanded() {
    let (output, applied) = run(
        "permissions-read-to-read-all",
        &doc("permissions: read # shorthand\n"),
    );
    assert!(applied);
    assert_eq!(output, doc("permissions: read-all # shorthand\n"));

    let (output, applied) = run("permissions-read-to-read-all", &doc("permissions: write\n"));
    assert!(applied);
    assert_eq!(output, doc("permissions: write-all\n"));

    let input = doc("permissions:\n  contents: read\n");
    let (output, applied) = run("permissions-read-to-read-all", &input);
    assert!(!applied);
    assert_eq!(output, input);
}

#[test]
fn test_write_permission_shorthands_downgraded() {
    let (output, applied) = run(
        "write-permissions-to-read-migration",
        &doc("on: workflow_dispatch\npermissions: write-all\n"),
    );
    assert!(applied);
    assert_eq!(output, doc("on: workflow_dispatch\npermissions: read-all\n"));

    let (output, applied) = run(
        "write-permissions-to-read-migration",
        &doc("permissions: write\n"),
    );
    assert!(applied);
    assert_eq!(output, doc("permissions: read\n"));
}

#[test]
fn test_write_permission_scopes_downgraded_with_comments() {
    let (output, applied) = run(
        "write-permissions-to-read-migration",
        &doc(
            "permissions:\n  contents: write  # Write access for commits\n  issues: read  # Read-only for issues\n  pull-requests: write\n",
        ),
    );
    assert!(applied);
    assert_eq!(
        output,
        doc(
            "permissions:\n  contents: read  # Write access for commits\n  issues: read  # Read-only for issues\n  pull-requests: read\n",
        )
    );
}

#[test]
fn test_read_only_permissions_left_alone() {
    for frontmatter in [
        "permissions:\n  contents: read\n  issues: read\n",
        "permissions: read-all\n",
        "on: push\ntimeout-minutes: 30\n",
    ] {
        let input = doc(frontmatter);
        let (output, applied) = run("write-permissions-to-read-migration", &input);
        assert!(!applied, "{frontmatter}");
        assert_eq!(output, input);
    }
}

#[test]
fn test_write_shorthand_ends_as_read_all_in_pipeline() {
    let registry = Registry::builtin();
    let input = doc("on: push\npermissions: write # legacy\n");

    let result = Runner::new(&registry).run_document(&Document::parse(&input).unwrap());

    assert_eq!(
        result.applied_rules(),
        ["write-permissions-to-read-migration", "permissions-read-to-read-all"]
    );
    assert_eq!(result.document.render(), doc("on: push\npermissions: read-all # legacy\n"));
}

#[test]
fn test_schedule_at_becomes_around() {
    let (output, applied) = run(
        "schedule-at-to-around-migration",
        &doc(
            "on:\n  schedule:\n    - cron: daily at 09:00\n    - cron: weekly on Monday at 10:00 # standup\n    - cron: \"0 9 * * *\"\n",
        ),
    );
    assert!(applied);
    assert_eq!(
        output,
        doc(
            "on:\n  schedule:\n    - cron: daily around 09:00\n    - cron: weekly on Monday around 10:00 # standup\n    - cron: \"0 9 * * *\"\n",
        )
    );
}

#[test]
fn test_schedule_key_and_scalar_forms() {
    let (output, applied) = run(
        "schedule-at-to-around-migration",
        &doc("on:\n  schedule:\n    - schedule: daily at 09:00\n"),
    );
    assert!(applied);
    assert_eq!(output, doc("on:\n  schedule:\n    - schedule: daily around 09:00\n"));

    let (output, applied) = run(
        "schedule-at-to-around-migration",
        &doc("on:\n  schedule: weekly on friday at 17:00\n"),
    );
    assert!(applied);
    assert_eq!(output, doc("on:\n  schedule: weekly on friday around 17:00\n"));
}

#[test]
fn test_schedule_without_at_left_alone() {
    for frontmatter in [
        "on:\n  schedule:\n    - cron: daily around 09:00\n",
        "on:\n  schedule:\n    - cron: \"0 9 * * *\"\n",
        "on:\n  schedule:\n    - cron: monthly on 15 at 14:00\n",
        "on: push\n",
    ] {
        let input = doc(frontmatter);
        let (output, applied) = run("schedule-at-to-around-migration", &input);
        assert!(!applied, "{frontmatter}");
        assert_eq!(output, input);
    }
}

#[test]
fn test_sandbox_agent_false_removes_empty_block() {
    let (output, applied) = run(
        "sandbox-agent-false-removal",
        &doc("on: push\nsandbox:\n  agent: false\ntools:\n  edit:\n"),
    );
    assert!(applied);
    assert_eq!(output, doc("on: push\ntools:\n  edit:\n"));
}

#[test]
fn test_sandbox_agent_false_keeps_siblings() {
    let (output, applied) = run(
        "sandbox-agent-false-removal",
        &doc("sandbox:\n  agent: false\n  mounts: []\n"),
    );
    assert!(applied);
    assert_eq!(output, doc("sandbox:\n  mounts: []\n"));
}

#[test]
fn test_mcp_mode_renamed_to_type() {
    let (output, applied) = run(
        "mcp-mode-to-type-migration",
        &doc("mcp-servers:\n  a:\n    mode: stdio\n    command: x\n  b:\n    type: http\n    mode: remote\n"),
    );
    assert!(applied);
    assert_eq!(
        output,
        doc("mcp-servers:\n  a:\n    type: stdio\n    command: x\n  b:\n    type: http\n    mode: remote\n")
    );
}

#[test]
fn test_grep_tool_removed() {
    let (output, applied) = run(
        "grep-tool-removal",
        &doc("tools:\n  grep: true\n  edit:\n"),
    );
    assert!(applied);
    assert_eq!(output, doc("tools:\n  edit:\n"));
}

#[test]
fn test_full_pipeline_is_idempotent() {
    let input = doc(
        "# Triage workflow\n\
         on:\n\
         \x20 command:\n\
         \x20   name: triage\n\
         timeout_minutes: 15\n\
         permissions: read\n\
         \n\
         network:\n\
         \x20 firewall: true\n\
         tools:\n\
         \x20 grep: true  # no longer needed\n\
         \x20 github:\n",
    );
    let registry = Registry::builtin();
    let runner = Runner::new(&registry);

    let first = runner.run_document(&Document::parse(&input).unwrap());
    assert_eq!(
        first.applied_rules(),
        [
            "timeout-minutes-migration",
            "network-firewall-migration",
            "command-to-slash-command-migration",
            "permissions-read-to-read-all",
            "grep-tool-removal",
        ]
    );
    let output = first.document.render();
    assert!(output.starts_with("---\n# Triage workflow\non:\n  slash_command:\n"));
    assert!(output.contains("timeout-minutes: 15\npermissions: read-all\n\nnetwork:\n"));
    assert!(output.contains("sandbox:\n  agent: awf\n"));
    assert!(!output.contains("grep"));
    assert!(!output.contains("'on'"));
    assert!(output.ends_with("---\n# Instructions\n\nDo the thing.\n"));

    let second = runner.run_document(&first.document);
    assert!(!second.changed());
    assert_eq!(second.document.render(), output);
}
