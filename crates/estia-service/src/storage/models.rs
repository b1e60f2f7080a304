//! Data models for Estia marketplace storage.

use serde::{Deserialize, Serialize};

/// Roles a user can hold. The role set always contains [`Role::User`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Agent,
    Admin,
}

impl Role {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Agent => "agent",
            Self::Admin => "admin",
        }
    }

    /// Parse a role name. Returns `None` for anything outside the vocabulary.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "user" => Some(Self::User),
            "agent" => Some(Self::Agent),
            "admin" => Some(Self::Admin),
            _ => None,
        }
    }
}

/// Encode a role set as canonical CSV (`user,agent,admin` order, deduplicated,
/// always containing `user`).
pub fn encode_roles(roles: &[Role]) -> String {
    let mut out = String::from(Role::User.as_str());
    for role in [Role::Agent, Role::Admin] {
        if roles.contains(&role) {
            out.push(',');
            out.push_str(role.as_str());
        }
    }
    out
}

/// Decode a CSV role set, ignoring unknown entries.
pub fn decode_roles(csv: &str) -> Vec<Role> {
    let mut roles: Vec<Role> = csv.split(',').filter_map(Role::parse).collect();
    if !roles.contains(&Role::User) {
        roles.push(Role::User);
    }
    roles.sort_unstable();
    roles.dedup();
    roles
}

/// User account status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserStatus {
    NotVerified,
    Pending,
    Active,
    Suspended,
}

impl UserStatus {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NotVerified => "not_verified",
            Self::Pending => "pending",
            Self::Active => "active",
            Self::Suspended => "suspended",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "not_verified" => Some(Self::NotVerified),
            "pending" => Some(Self::Pending),
            "active" => Some(Self::Active),
            "suspended" => Some(Self::Suspended),
            _ => None,
        }
    }
}

/// Review state of an agent application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewState {
    Pending,
    Approved,
    Rejected,
}

impl ReviewState {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(Self::Pending),
            "approved" => Some(Self::Approved),
            "rejected" => Some(Self::Rejected),
            _ => None,
        }
    }
}

/// Direction of the most recent credit mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CreditActionKind {
    Add,
    Deduct,
}

impl CreditActionKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::Deduct => "deduct",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct UserRecord {
    pub id: String,
    pub account_id: String,
    pub email: String,
    pub full_name: String,
    /// Canonical CSV role set, see [`encode_roles`].
    pub roles: String,
    pub status: String,
    pub credits: i64,
    pub last_login_reward: Option<i64>,
    pub last_credit_kind: Option<String>,
    pub last_credit_amount: Option<i64>,
    pub last_credit_reason: Option<String>,
    pub last_credit_at: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl UserRecord {
    pub fn role_set(&self) -> Vec<Role> {
        decode_roles(&self.roles)
    }

    pub fn has_role(&self, role: Role) -> bool {
        self.role_set().contains(&role)
    }

    pub fn user_status(&self) -> Option<UserStatus> {
        UserStatus::parse(&self.status)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct AgentApplication {
    pub id: String,
    pub account_id: String,
    pub full_name: String,
    pub message: String,
    pub state: String,
    pub reviewed_by: Option<String>,
    pub reviewed_at: Option<i64>,
    pub review_notes: Option<String>,
    pub created_at: i64,
}

impl AgentApplication {
    pub fn review_state(&self) -> Option<ReviewState> {
        ReviewState::parse(&self.state)
    }

    /// Legacy compatibility view: verified means approved.
    pub fn verified(&self) -> bool {
        self.review_state() == Some(ReviewState::Approved)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ActivityRecord {
    pub id: String,
    pub actor_id: String,
    pub actor_role: String,
    pub action: String,
    pub message: String,
    pub amount: Option<i64>,
    pub ref_id: Option<String>,
    pub ref_type: Option<String>,
    pub created_at: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Notification {
    pub id: String,
    pub account_id: String,
    pub message: String,
    pub ref_id: Option<String>,
    pub ref_type: Option<String>,
    pub read: i64,
    pub created_at: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roles_round_trip() {
        assert_eq!(encode_roles(&[Role::User]), "user");
        assert_eq!(encode_roles(&[Role::Admin, Role::User]), "user,admin");
        assert_eq!(
            encode_roles(&[Role::Agent, Role::Admin, Role::User]),
            "user,agent,admin"
        );

        assert_eq!(decode_roles("user,agent"), vec![Role::User, Role::Agent]);
        // user is implied even if a legacy row dropped it
        assert_eq!(decode_roles("admin"), vec![Role::User, Role::Admin]);
        // unknown entries are ignored
        assert_eq!(decode_roles("user,superuser"), vec![Role::User]);
    }

    #[test]
    fn status_vocabulary() {
        for status in [
            UserStatus::NotVerified,
            UserStatus::Pending,
            UserStatus::Active,
            UserStatus::Suspended,
        ] {
            assert_eq!(UserStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(UserStatus::parse("Active"), None);
    }

    #[test]
    fn review_state_vocabulary() {
        for state in [
            ReviewState::Pending,
            ReviewState::Approved,
            ReviewState::Rejected,
        ] {
            assert_eq!(ReviewState::parse(state.as_str()), Some(state));
        }
    }
}
