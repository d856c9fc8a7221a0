//! Route gating for the admin views
//!
//! `can_enter` is a pure decision over a requested route and the current
//! token: protected views bounce unauthenticated visitors to the login view
//! (remembering where they were headed), and the login view bounces
//! authenticated operators back to the dashboard.

use tracing::debug;

use crate::session::AuthSession;

pub const HOME_PATH: &str = "/";
pub const LOGIN_PATH: &str = "/admin/login";
pub const DASHBOARD_PATH: &str = "/admin";

/// A navigable view
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Home,
    Login,
    Dashboard,
    Other(String),
}

impl Route {
    /// Classify a path, ignoring query string, fragment and trailing slash
    pub fn parse(path: &str) -> Self {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let trimmed = path.trim_end_matches('/');

        match trimmed {
            "" => Route::Home,
            LOGIN_PATH => Route::Login,
            DASHBOARD_PATH => Route::Dashboard,
            _ => Route::Other(trimmed.to_string()),
        }
    }

    pub fn path(&self) -> &str {
        match self {
            Route::Home => HOME_PATH,
            Route::Login => LOGIN_PATH,
            Route::Dashboard => DASHBOARD_PATH,
            Route::Other(path) => path,
        }
    }

    pub fn is_protected(&self) -> bool {
        matches!(self, Route::Dashboard)
    }
}

/// Outcome of a navigation check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Allow,
    /// Navigate to `to` instead. `from` is the originally requested path,
    /// set when a protected view was refused so login can return to it.
    Redirect { to: String, from: Option<String> },
}

impl Decision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allow)
    }
}

/// Decide whether `route` may be entered
///
/// `requested` is the raw path that was asked for (remembered on a login
/// redirect); `from` is a path remembered by an earlier redirect.
pub fn can_enter(route: &Route, requested: &str, from: Option<&str>, token: Option<&str>) -> Decision {
    match (route, token) {
        (route, None) if route.is_protected() => Decision::Redirect {
            to: LOGIN_PATH.to_string(),
            from: Some(requested.to_string()),
        },
        (Route::Login, Some(_)) => {
            let to = from
                .filter(|path| Route::parse(path) != Route::Login)
                .unwrap_or(DASHBOARD_PATH);
            Decision::Redirect {
                to: to.to_string(),
                from: None,
            }
        }
        _ => Decision::Allow,
    }
}

/// `can_enter` bound to a live session
#[derive(Debug, Clone)]
pub struct RouteGuard {
    session: AuthSession,
}

impl RouteGuard {
    pub fn new(session: AuthSession) -> Self {
        Self { session }
    }

    /// Check a navigation to `path`, with the path remembered by a previous
    /// redirect if any
    pub fn check(&self, path: &str, from: Option<&str>) -> Decision {
        let route = Route::parse(path);
        let token = self.session.current_token();
        let decision = can_enter(&route, path, from, token.as_deref());

        if let Decision::Redirect { to, .. } = &decision {
            debug!("Navigation to {} redirected to {}", path, to);
        }
        decision
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::storage::MemoryStore;
    use std::sync::Arc;

    #[test]
    fn test_protected_route_without_token_redirects_to_login() {
        let decision = can_enter(&Route::Dashboard, "/admin", None, None);
        assert_eq!(
            decision,
            Decision::Redirect {
                to: LOGIN_PATH.to_string(),
                from: Some("/admin".to_string()),
            }
        );
    }

    #[test]
    fn test_login_route_with_token_redirects_to_dashboard() {
        let decision = can_enter(&Route::Login, LOGIN_PATH, None, Some("x"));
        assert_eq!(
            decision,
            Decision::Redirect {
                to: DASHBOARD_PATH.to_string(),
                from: None,
            }
        );
    }

    #[test]
    fn test_login_route_with_token_returns_to_remembered_path() {
        let decision = can_enter(&Route::Login, LOGIN_PATH, Some("/admin?tab=contacts"), Some("x"));
        assert_eq!(
            decision,
            Decision::Redirect {
                to: "/admin?tab=contacts".to_string(),
                from: None,
            }
        );
    }

    #[test]
    fn test_login_route_never_returns_to_itself() {
        let decision = can_enter(&Route::Login, LOGIN_PATH, Some("/admin/login/"), Some("x"));
        assert_eq!(
            decision,
            Decision::Redirect {
                to: DASHBOARD_PATH.to_string(),
                from: None,
            }
        );
    }

    #[test]
    fn test_remaining_combinations_are_allowed() {
        assert!(can_enter(&Route::Dashboard, "/admin", None, Some("x")).is_allowed());
        assert!(can_enter(&Route::Login, LOGIN_PATH, None, None).is_allowed());
        assert!(can_enter(&Route::Home, "/", None, None).is_allowed());
        assert!(can_enter(&Route::Home, "/", None, Some("x")).is_allowed());
        assert!(can_enter(&Route::Other("/blog".into()), "/blog", None, None).is_allowed());
    }

    #[test]
    fn test_route_parse() {
        assert_eq!(Route::parse("/"), Route::Home);
        assert_eq!(Route::parse(""), Route::Home);
        assert_eq!(Route::parse("/admin/"), Route::Dashboard);
        assert_eq!(Route::parse("/admin?tab=1"), Route::Dashboard);
        assert_eq!(Route::parse("/admin/login#top"), Route::Login);
        assert_eq!(Route::parse("/about"), Route::Other("/about".to_string()));
        assert_eq!(Route::Login.path(), LOGIN_PATH);
    }

    #[test]
    fn test_guard_follows_session_changes() {
        let session = AuthSession::restore(Arc::new(MemoryStore::new()));
        let guard = RouteGuard::new(session.clone());

        assert!(!guard.check("/admin", None).is_allowed());

        session.login("x");
        assert!(guard.check("/admin", None).is_allowed());
        assert!(!guard.check("/admin/login", None).is_allowed());

        session.logout();
        assert!(!guard.check("/admin", None).is_allowed());
    }
}
