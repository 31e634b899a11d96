//! Per-role backend call statistics for `/stats`.

use hydra_domain::RoleId;
use std::collections::BTreeMap;

/// Rough token estimate: one token per four characters, rounded up.
pub fn estimate_tokens(chars: usize) -> usize {
    chars.div_ceil(4)
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoleCallStats {
    pub calls: usize,
    pub failures: usize,
    pub prompt_chars: usize,
    pub completion_chars: usize,
}

impl RoleCallStats {
    pub fn prompt_tokens(&self) -> usize {
        estimate_tokens(self.prompt_chars)
    }

    pub fn completion_tokens(&self) -> usize {
        estimate_tokens(self.completion_chars)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallStats {
    roles: BTreeMap<RoleId, RoleCallStats>,
}

impl CallStats {
    /// Record one backend attempt. `completion_chars` is `None` when it failed.
    pub fn record(&mut self, role: &RoleId, prompt_chars: usize, completion_chars: Option<usize>) {
        let entry = self.roles.entry(role.clone()).or_default();
        entry.calls += 1;
        entry.prompt_chars += prompt_chars;
        match completion_chars {
            Some(chars) => entry.completion_chars += chars,
            None => entry.failures += 1,
        }
    }

    pub fn get(&self, role: &RoleId) -> Option<&RoleCallStats> {
        self.roles.get(role)
    }

    /// Roles in id order
    pub fn iter(&self) -> impl Iterator<Item = (&RoleId, &RoleCallStats)> {
        self.roles.iter()
    }

    pub fn total_calls(&self) -> usize {
        self.roles.values().map(|s| s.calls).sum()
    }

    pub fn reset(&mut self) {
        self.roles.clear();
    }
}
