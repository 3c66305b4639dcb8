/// The computer's fake desktop login: one known account, one password,
/// and an error modal for bad attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginState {
    Login,
    LoggedIn,
}

/// Which panels the screen would be showing right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PanelVisibility {
    pub login: bool,
    pub logged_in: bool,
    pub error: bool,
}

#[derive(Debug)]
pub struct LoginTerminal {
    state: LoginState,
    error_open: bool,
    username: String,
    expected_password: String,
    typed: String,
}

impl LoginTerminal {
    pub fn new<S: Into<String>>(username: S, expected_password: S) -> Self {
        LoginTerminal {
            state: LoginState::Login,
            error_open: false,
            username: username.into(),
            expected_password: expected_password.into(),
            typed: String::new(),
        }
    }

    #[allow(dead_code)]
    pub fn state(&self) -> LoginState {
        self.state
    }

    #[allow(dead_code)]
    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn panels(&self) -> PanelVisibility {
        PanelVisibility {
            login: self.state == LoginState::Login && !self.error_open,
            logged_in: self.state == LoginState::LoggedIn,
            error: self.error_open,
        }
    }

    pub fn type_password(&mut self, text: &str) {
        if self.panels().login {
            self.typed.push_str(text);
        }
    }

    /// Submit the typed password. Returns whether it matched.
    pub fn submit(&mut self) -> bool {
        if self.typed == self.expected_password {
            self.state = LoginState::LoggedIn;
            self.error_open = false;
            true
        } else {
            self.error_open = true;
            false
        }
    }

    /// Enter only submits while the login panel is the active one.
    pub fn key_enter(&mut self) -> Option<bool> {
        if self.panels().login {
            Some(self.submit())
        } else {
            None
        }
    }

    /// The error modal's OK button: back to a cleared login prompt.
    pub fn acknowledge_error(&mut self) {
        self.error_open = false;
        self.typed.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::{LoginState, LoginTerminal};

    #[test]
    fn correct_password_logs_in() {
        let mut terminal = LoginTerminal::new("Administrador", "1234");
        terminal.type_password("1234");
        assert_eq!(terminal.key_enter(), Some(true));
        assert_eq!(terminal.state(), LoginState::LoggedIn);
        assert!(terminal.panels().logged_in);
        assert!(!terminal.panels().login);
    }

    #[test]
    fn wrong_password_raises_the_error_modal() {
        let mut terminal = LoginTerminal::new("Administrador", "1234");
        terminal.type_password("hunter2");
        assert_eq!(terminal.key_enter(), Some(false));
        let panels = terminal.panels();
        assert!(panels.error);
        assert!(!panels.login);
        assert!(!panels.logged_in);

        // Enter does nothing while the modal is up.
        assert_eq!(terminal.key_enter(), None);
    }

    #[test]
    fn acknowledging_the_error_clears_the_typed_password() {
        let mut terminal = LoginTerminal::new("Administrador", "1234");
        terminal.type_password("nope");
        terminal.submit();
        terminal.acknowledge_error();
        assert!(terminal.panels().login);

        // The old garbage is gone; a fresh correct entry works.
        terminal.type_password("1234");
        assert_eq!(terminal.key_enter(), Some(true));
    }

    #[test]
    fn typing_is_ignored_once_logged_in() {
        let mut terminal = LoginTerminal::new("Administrador", "1234");
        terminal.type_password("1234");
        terminal.submit();
        terminal.type_password("extra");
        assert_eq!(terminal.state(), LoginState::LoggedIn);
    }
}
