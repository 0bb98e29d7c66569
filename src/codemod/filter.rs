use crate::codemod::registry::Registry;
use crate::codemod::rule::Rule;
use crate::codemod::CodemodError;
use crate::config::version::{matches_requirement, parse_requirement, VersionError};
use semver::VersionReq;

/// Which rules of a registry run.
///
/// An empty allow-list selects every rule. Deny-list and version
/// requirement narrow the selection further.
#[derive(Debug, Clone, Default)]
pub struct RuleFilter {
    only: Vec<String>,
    skip: Vec<String>,
    since: Option<VersionReq>,
}

impl RuleFilter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn only<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.only.extend(ids.into_iter().map(Into::into));
        self
    }

    pub fn skip<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.skip.extend(ids.into_iter().map(Into::into));
        self
    }

    pub fn since(mut self, requirement: &str) -> Result<Self, VersionError> {
        self.since = parse_requirement(requirement)?;
        Ok(self)
    }

    pub fn allows(&self, rule: &Rule) -> bool {
        if !self.only.is_empty() && !self.only.iter().any(|id| id == rule.id) {
            return false;
        }
        if self.skip.iter().any(|id| id == rule.id) {
            return false;
        }
        matches_requirement(&rule.introduced_in, self.since.as_ref())
    }

    /// Reject ids the registry does not know.
    pub fn validate(&self, registry: &Registry) -> Result<(), CodemodError> {
        for id in self.only.iter().chain(&self.skip) {
            if registry.get(id).is_none() {
                return Err(CodemodError::UnknownRule {
                    id: id.clone(),
                    suggestion: registry.suggest(id).map(str::to_string),
                });
            }
        }
        Ok(())
    }

    /// Selected rules in registry order.
    pub fn select<'r>(&self, registry: &'r Registry) -> Vec<&'r Rule> {
        registry
            .rules()
            .iter()
            .filter(|rule| self.allows(rule))
            .collect()
    }
}
