use chrono::{DateTime, Utc};

/// Pure user model shared by the domain, storage and REST layers (no serde/schemars).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub user_id: String,
    pub full_name: String,
    pub mob_num: String,
    pub pan_num: String,
    pub manager_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// false once the row has been superseded by a manager reassignment
    pub is_active: bool,
}

/// Raw input for creating a user. Fields are validated and normalized by the service.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewUser {
    pub full_name: Option<String>,
    pub mob_num: Option<String>,
    pub pan_num: Option<String>,
    pub manager_id: Option<String>,
}

/// Partial update applied to every id of a batch.
/// Absent fields keep the stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserPatch {
    pub full_name: Option<String>,
    pub mob_num: Option<String>,
    pub pan_num: Option<String>,
    pub manager_id: Option<String>,
}

/// Lookup used by the query operation. Only active rows ever match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserFilter {
    ById(String),
    ByMobile(String),
    ByManager(String),
    All,
}

impl UserFilter {
    /// Picks the filter by priority: user_id, then mob_num, then manager_id.
    /// Empty strings count as absent.
    pub fn from_parts(
        user_id: Option<String>,
        mob_num: Option<String>,
        manager_id: Option<String>,
    ) -> Self {
        let non_empty = |v: Option<String>| v.filter(|s| !s.is_empty());
        if let Some(id) = non_empty(user_id) {
            Self::ById(id)
        } else if let Some(mob) = non_empty(mob_num) {
            Self::ByMobile(mob)
        } else if let Some(manager) = non_empty(manager_id) {
            Self::ByManager(manager)
        } else {
            Self::All
        }
    }
}

/// Per-batch counters reported by the update operation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpdateSummary {
    /// rows changed in place
    pub updated: usize,
    /// rows superseded by a new row on another manager
    pub forked: usize,
    /// ids that did not resolve to any row
    pub skipped: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn s(v: &str) -> Option<String> {
        Some(v.to_string())
    }

    #[test]
    fn filter_priority_follows_user_id_mobile_manager() {
        assert_eq!(
            UserFilter::from_parts(s("u1"), s("9876543210"), s("m1")),
            UserFilter::ById("u1".into())
        );
        assert_eq!(
            UserFilter::from_parts(None, s("9876543210"), s("m1")),
            UserFilter::ByMobile("9876543210".into())
        );
        assert_eq!(
            UserFilter::from_parts(None, None, s("m1")),
            UserFilter::ByManager("m1".into())
        );
        assert_eq!(UserFilter::from_parts(None, None, None), UserFilter::All);
    }

    #[test]
    fn filter_skips_empty_strings() {
        assert_eq!(
            UserFilter::from_parts(s(""), s(""), s("m1")),
            UserFilter::ByManager("m1".into())
        );
        assert_eq!(UserFilter::from_parts(s(""), None, s("")), UserFilter::All);
    }
}
