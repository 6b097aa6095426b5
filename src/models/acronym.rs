use chrono::{DateTime, Utc};
use sea_orm::FromQueryResult;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::user::PublicUser;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromQueryResult)]
pub struct Acronym {
    pub id: i32,
    pub short: String,
    pub long: String,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<crate::entities::acronyms::Model> for Acronym {
    fn from(model: crate::entities::acronyms::Model) -> Self {
        Self {
            id: model.id,
            short: model.short,
            long: model.long,
            user_id: model.user_id,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

/// Client-settable acronym fields. Ownership and timestamps are never taken from input.
#[derive(Debug, Clone, Deserialize)]
pub struct AcronymInput {
    pub short: String,
    pub long: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct AcronymWithUser {
    pub id: i32,
    pub short: String,
    pub long: String,
    pub user: PublicUser,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: i32,
    pub name: String,
}

impl From<crate::entities::categories::Model> for Category {
    fn from(model: crate::entities::categories::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
        }
    }
}

/// Result of reconciling an acronym's category names against a new list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryDiff {
    pub attach: Vec<String>,
    pub detach: Vec<String>,
}

impl CategoryDiff {
    /// Names only in `desired` are attached; names only in `existing` are detached.
    /// Blank names are ignored and the output is sorted for stable ordering.
    #[must_use]
    pub fn between(existing: &[String], desired: &[String]) -> Self {
        use std::collections::BTreeSet;

        let existing: BTreeSet<&str> = existing
            .iter()
            .map(|n| n.trim())
            .filter(|n| !n.is_empty())
            .collect();
        let desired: BTreeSet<&str> = desired
            .iter()
            .map(|n| n.trim())
            .filter(|n| !n.is_empty())
            .collect();

        Self {
            attach: desired
                .difference(&existing)
                .map(|n| (*n).to_string())
                .collect(),
            detach: existing
                .difference(&desired)
                .map(|n| (*n).to_string())
                .collect(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.attach.is_empty() && self.detach.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn test_diff_swaps_one_category() {
        let diff = CategoryDiff::between(&names(&["A", "B"]), &names(&["B", "C"]));
        assert_eq!(diff.attach, names(&["C"]));
        assert_eq!(diff.detach, names(&["A"]));
    }

    #[test]
    fn test_diff_unchanged_set_is_empty() {
        let diff = CategoryDiff::between(&names(&["Learning"]), &names(&[" Learning "]));
        assert!(diff.is_empty());
    }

    #[test]
    fn test_diff_ignores_blank_names_and_duplicates() {
        let diff = CategoryDiff::between(&[], &names(&["", "Tech", "Tech", "  "]));
        assert_eq!(diff.attach, names(&["Tech"]));
        assert!(diff.detach.is_empty());
    }

    #[test]
    fn test_diff_is_case_sensitive() {
        let diff = CategoryDiff::between(&names(&["tech"]), &names(&["Tech"]));
        assert_eq!(diff.attach, names(&["Tech"]));
        assert_eq!(diff.detach, names(&["tech"]));
    }
}
