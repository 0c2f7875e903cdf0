//! Login gate for the progress page.

use tracing::{info, warn};

use super::error::{ProgressError, Result};
use super::settings::Settings;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Granted,
    LoginRequired,
}

/// Per-window session state, provided to views through a context signal.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    pub logged_in: bool,
}

impl Session {
    pub fn access(&self, settings: &Settings) -> Access {
        if settings.login_required && !self.logged_in {
            Access::LoginRequired
        } else {
            Access::Granted
        }
    }

    pub fn login(&mut self, settings: &Settings, code: &str) -> Result<()> {
        match settings.access_code.as_deref() {
            Some(expected) if expected != code.trim() => {
                warn!("login rejected");
                Err(ProgressError::InvalidAccessCode)
            }
            _ => {
                self.logged_in = true;
                info!("session logged in");
                Ok(())
            }
        }
    }

    pub fn logout(&mut self) {
        self.logged_in = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gated(code: Option<&str>) -> Settings {
        Settings {
            login_required: true,
            access_code: code.map(str::to_string),
            ..Settings::default()
        }
    }

    #[test]
    fn open_when_login_not_required() {
        assert_eq!(Session::default().access(&Settings::default()), Access::Granted);
    }

    #[test]
    fn gated_until_logged_in() {
        let settings = gated(Some("trail"));
        let mut session = Session::default();
        assert_eq!(session.access(&settings), Access::LoginRequired);

        assert!(matches!(
            session.login(&settings, "road"),
            Err(ProgressError::InvalidAccessCode)
        ));
        assert_eq!(session.access(&settings), Access::LoginRequired);

        session.login(&settings, " trail ").unwrap();
        assert_eq!(session.access(&settings), Access::Granted);

        session.logout();
        assert_eq!(session.access(&settings), Access::LoginRequired);
    }

    #[test]
    fn any_code_accepted_without_configured_code() {
        let settings = gated(None);
        let mut session = Session::default();
        session.login(&settings, "").unwrap();
        assert!(session.logged_in);
    }
}
