//! RoleSet - the roles (classes) a creature holds and their levels

use serde::{Deserialize, Serialize};

/// Levels held in one role
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleLevel {
    pub role: String,
    pub level: u32,
}

/// Roles of a creature. The first role taken is the base role.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleSet {
    base_role: Option<String>,
    levels: Vec<RoleLevel>,
}

impl RoleSet {
    pub fn new() -> Self {
        RoleSet {
            base_role: None,
            levels: Vec::new(),
        }
    }

    /// Add levels in a role
    pub fn add_levels(&mut self, role: &str, levels: u32) {
        if self.base_role.is_none() {
            self.base_role = Some(role.to_string());
        }
        match self.levels.iter_mut().find(|r| r.role == role) {
            Some(entry) => entry.level += levels,
            None => self.levels.push(RoleLevel {
                role: role.to_string(),
                level: levels,
            }),
        }
    }

    pub fn base_role(&self) -> Option<&str> {
        self.base_role.as_deref()
    }

    pub fn is_base_role(&self, role: &str) -> bool {
        self.base_role.as_deref() == Some(role)
    }

    pub fn level(&self, role: &str) -> u32 {
        self.levels
            .iter()
            .find(|r| r.role == role)
            .map_or(0, |r| r.level)
    }

    /// Sum of levels across all roles
    pub fn total_level(&self) -> u32 {
        self.levels.iter().map(|r| r.level).sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = &RoleLevel> {
        self.levels.iter()
    }
}
