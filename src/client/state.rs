//! Module `client`
//!
//! Defines the `Client` struct holding the console's authentication state.

use crate::client::session::SessionContext;

/// Anonymous until a login succeeds; then holds the session.
#[derive(Debug, Default)]
pub struct Client {
    session: Option<SessionContext>,
}

impl Client {
    /// Attaches a freshly authenticated session
    pub fn login(&mut self, session: SessionContext) {
        self.session = Some(session);
    }

    /// Drops the session, returning it if there was one
    pub fn logout(&mut self) -> Option<SessionContext> {
        self.session.take()
    }

    pub fn is_logged_in(&self) -> bool {
        self.session.is_some()
    }

    pub fn session(&self) -> Option<&SessionContext> {
        self.session.as_ref()
    }

    pub fn session_mut(&mut self) -> Option<&mut SessionContext> {
        self.session.as_mut()
    }

    /// Name used in logs; `-` while anonymous
    pub fn log_name(&self) -> &str {
        self.session.as_ref().map_or("-", |s| s.username())
    }

    /// Console prompt, e.g. `alice:/docs> `
    pub fn prompt(&self) -> String {
        match &self.session {
            Some(session) => format!("{}:{}> ", session.username(), session.virtual_cwd()),
            None => "> ".to_string(),
        }
    }
}
