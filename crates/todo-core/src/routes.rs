//! Named views and the guard that decides whether each may be shown.

use std::fmt;

use crate::session::Session;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Home,
    Login,
    Register,
    Profile,
    NotFound,
}

/// Who may see a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Policy {
    /// Logged-out users are sent to the login route.
    AuthenticatedOnly,
    /// Logged-in users are sent home.
    GuestOnly,
    Public,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    Render(Route),
    Redirect { from: Route, to: Route },
}

impl Route {
    pub const ALL: [Route; 5] = [
        Route::Home,
        Route::Login,
        Route::Register,
        Route::Profile,
        Route::NotFound,
    ];

    /// Maps a path to a route. Unknown paths are [`Route::NotFound`].
    pub fn parse(path: &str) -> Self {
        let trimmed = path.trim().trim_end_matches('/');
        let trimmed = trimmed.strip_prefix('/').unwrap_or(trimmed);
        match trimmed {
            "" => Route::Home,
            "login" => Route::Login,
            "register" => Route::Register,
            "profile" => Route::Profile,
            _ => Route::NotFound,
        }
    }

    pub fn path(self) -> &'static str {
        match self {
            Route::Home => "/",
            Route::Login => "/login",
            Route::Register => "/register",
            Route::Profile => "/profile",
            Route::NotFound => "*",
        }
    }

    pub fn policy(self) -> Policy {
        match self {
            Route::Home | Route::Profile => Policy::AuthenticatedOnly,
            Route::Login | Route::Register => Policy::GuestOnly,
            Route::NotFound => Policy::Public,
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// Applies `policy` to the current session.
///
/// Returns the redirect target, or `None` when the view may render.
pub fn guard(policy: Policy, session: &Session) -> Option<Route> {
    match policy {
        Policy::AuthenticatedOnly if !session.is_logged_in() => Some(Route::Login),
        Policy::GuestOnly if session.is_logged_in() => Some(Route::Home),
        _ => None,
    }
}

/// Resolves a navigation to `route`.
///
/// Redirect targets are fixed routes whose own policy admits the session
/// that was redirected, so at most one hop happens.
pub fn navigate(route: Route, session: &Session) -> Navigation {
    match guard(route.policy(), session) {
        Some(to) => {
            tracing::debug!(from = %route, %to, "navigation redirected");
            Navigation::Redirect { from: route, to }
        }
        None => Navigation::Render(route),
    }
}

/// Error raised when a view cannot render and the caller must go elsewhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RedirectError {
    pub from: Route,
    pub to: Route,
}

impl fmt::Display for RedirectError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Redirected to {} (from {})", self.to, self.from)
    }
}

impl std::error::Error for RedirectError {}

impl Navigation {
    /// Converts a redirect into a [`RedirectError`].
    ///
    /// # Errors
    /// Returns the redirect when the view may not render.
    pub fn into_result(self) -> Result<Route, RedirectError> {
        match self {
            Navigation::Render(route) => Ok(route),
            Navigation::Redirect { from, to } => Err(RedirectError { from, to }),
        }
    }
}
