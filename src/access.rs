//! Role gate for pages and API endpoints.
//!
//! Access is decided by a pure function of the caller's role and the set of
//! roles a route admits, so the same check backs HTML pages, the JSON API and
//! the service layer.

use crate::domain::user::UserRole;

/// Roles admitted to agent-facing routes. Admins may act as agents.
pub const AGENT_ROLES: &[UserRole] = &[UserRole::Agent, UserRole::Admin];

/// Roles admitted to admin-only routes.
pub const ADMIN_ROLES: &[UserRole] = &[UserRole::Admin];

/// Outcome of the role gate.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Access {
    Allow,
    /// No user is signed in.
    Unauthenticated,
    /// A user is signed in but their role is not admitted.
    Forbidden,
}

impl Access {
    pub fn is_allowed(self) -> bool {
        self == Access::Allow
    }
}

pub fn authorize(role: Option<UserRole>, allowed: &[UserRole]) -> Access {
    match role {
        None => Access::Unauthenticated,
        Some(role) if allowed.contains(&role) => Access::Allow,
        Some(_) => Access::Forbidden,
    }
}

/// Pages served by the dashboard together with the roles they admit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Page {
    TodaysCalls,
    AllLeads,
    CreateLead,
    LeadDetail,
    Notifications,
    AdminDashboard,
    AdminLeads,
    AdminNotifications,
}

impl Page {
    pub const fn allowed_roles(self) -> &'static [UserRole] {
        match self {
            Page::TodaysCalls
            | Page::AllLeads
            | Page::CreateLead
            | Page::LeadDetail
            | Page::Notifications => AGENT_ROLES,
            Page::AdminDashboard | Page::AdminLeads | Page::AdminNotifications => ADMIN_ROLES,
        }
    }

    /// Route pattern as registered with the router.
    pub const fn path(self) -> &'static str {
        match self {
            Page::TodaysCalls => "/agent",
            Page::AllLeads => "/agent/leads",
            Page::CreateLead => "/agent/lead/new",
            Page::LeadDetail => "/agent/lead/{id}",
            Page::Notifications => "/agent/notifications",
            Page::AdminDashboard => "/admin",
            Page::AdminLeads => "/admin/leads",
            Page::AdminNotifications => "/admin/notifications",
        }
    }

    /// Key used by templates to highlight the active navigation item.
    pub const fn nav_key(self) -> &'static str {
        match self {
            Page::TodaysCalls => "today",
            Page::AllLeads | Page::LeadDetail | Page::CreateLead => "leads",
            Page::Notifications => "notifications",
            Page::AdminDashboard => "admin",
            Page::AdminLeads => "admin_leads",
            Page::AdminNotifications => "admin_notifications",
        }
    }

    pub fn authorize(self, role: Option<UserRole>) -> Access {
        authorize(role, self.allowed_roles())
    }
}

/// Landing path for a freshly signed-in user.
pub const fn home_path(role: UserRole) -> &'static str {
    match role {
        UserRole::Agent => Page::TodaysCalls.path(),
        UserRole::Admin => Page::AdminDashboard.path(),
    }
}
