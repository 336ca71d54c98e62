//! User roles and the permissions they grant

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::ValidationError;

/// Account role stored in `User.role`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Evaluator,
    Guest,
}

/// Capability checked by handlers before acting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Permission {
    ManageUsers,
    ManageData,
    ViewAll,
    ExportData,
    LlmEvaluation,
    ViewBasic,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Evaluator => "evaluator",
            Self::Guest => "guest",
        }
    }

    /// Permissions granted to this role.
    pub fn permissions(&self) -> &'static [Permission] {
        use Permission::*;
        match self {
            Self::Admin => &[ManageUsers, ManageData, ViewAll, ExportData, LlmEvaluation],
            Self::Evaluator => &[ManageData, ViewAll, LlmEvaluation],
            Self::Guest => &[ViewBasic],
        }
    }

    pub fn has(&self, permission: Permission) -> bool {
        self.permissions().contains(&permission)
    }
}

impl Permission {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ManageUsers => "manage_users",
            Self::ManageData => "manage_data",
            Self::ViewAll => "view_all",
            Self::ExportData => "export_data",
            Self::LlmEvaluation => "llm_evaluation",
            Self::ViewBasic => "view_basic",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "admin" => Ok(Self::Admin),
            "evaluator" => Ok(Self::Evaluator),
            "guest" => Ok(Self::Guest),
            _ => Err(ValidationError::InvalidVariant {
                field: "role",
                value: s.to_owned(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admin_has_everything_but_basic() {
        assert!(Role::Admin.has(Permission::ManageUsers));
        assert!(Role::Admin.has(Permission::LlmEvaluation));
        assert!(!Role::Admin.has(Permission::ViewBasic));
    }

    #[test]
    fn evaluator_cannot_manage_users() {
        assert!(Role::Evaluator.has(Permission::ManageData));
        assert!(!Role::Evaluator.has(Permission::ManageUsers));
        assert!(!Role::Evaluator.has(Permission::ExportData));
    }

    #[test]
    fn guest_only_views_basic() {
        assert_eq!(Role::Guest.permissions(), &[Permission::ViewBasic]);
    }

    #[test]
    fn parse_role() {
        assert_eq!("Evaluator".parse::<Role>().unwrap(), Role::Evaluator);
        assert!("root".parse::<Role>().is_err());
    }
}
