use crate::codemod::rule::Rule;
use crate::codemod::rules;

/// Minimum Jaro-Winkler similarity for a "did you mean" suggestion.
const SUGGESTION_THRESHOLD: f64 = 0.8;

/// Ordered, read-only catalogue of rules.
#[derive(Debug, Clone)]
pub struct Registry {
    rules: Vec<Rule>,
}

impl Registry {
    pub fn new(rules: Vec<Rule>) -> Self {
        Self { rules }
    }

    /// Every built-in migration in the order it runs.
    ///
    /// Renames run before removals that may depend on the new names. The
    /// firewall migration runs before the `sandbox.agent: false` cleanup, and
    /// write permissions are downgraded before the shorthand is expanded, so
    /// `permissions: write` ends as `read-all`.
    pub fn builtin() -> Self {
        Self::new(vec![
            rules::timeout_minutes::rule(),
            rules::network_firewall::rule(),
            rules::slash_command::rule(),
            rules::safe_inputs_mode::rule(),
            rules::upload_asset::rule(),
            rules::comment_discussion::rule(),
            rules::agent_session::rule(),
            rules::write_permissions::rule(),
            rules::permissions_shorthand::rule(),
            rules::schedule_around::rule(),
            rules::sandbox_agent_false::rule(),
            rules::mcp_network::rule(),
            rules::mcp_mode_type::rule(),
            rules::grep_tool::rule(),
        ])
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn get(&self, id: &str) -> Option<&Rule> {
        self.rules.iter().find(|rule| rule.id == id)
    }

    pub fn ids(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.rules.iter().map(|rule| rule.id)
    }

    /// Closest registered id to an unknown one.
    pub fn suggest(&self, id: &str) -> Option<&'static str> {
        self.ids()
            .map(|candidate| (candidate, strsim::jaro_winkler(id, candidate)))
            .filter(|(_, score)| *score >= SUGGESTION_THRESHOLD)
            .max_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(candidate, _)| candidate)
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::builtin()
    }
}
