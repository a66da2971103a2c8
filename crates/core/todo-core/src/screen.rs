//! The login/register/tasks screen state machine.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Which screen the client is showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Screen {
    #[default]
    Login,
    Register,
    Tasks,
}

/// User- or outcome-driven screen change requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScreenAction {
    SwitchToRegister,
    SwitchToLogin,
    RegisterSucceeded,
    LoginSucceeded,
    Logout,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScreenError {
    #[error("Cannot apply {action:?} on the {from} screen")]
    InvalidTransition { from: Screen, action: ScreenAction },
}

impl Screen {
    /// Apply `action`, returning the next screen.
    ///
    /// `Logout` is accepted from every screen and always lands on `Login`.
    pub fn apply(self, action: ScreenAction) -> Result<Screen, ScreenError> {
        use ScreenAction::*;

        match (self, action) {
            (_, Logout) => Ok(Screen::Login),
            (Screen::Login, SwitchToRegister) => Ok(Screen::Register),
            (Screen::Login, LoginSucceeded) => Ok(Screen::Tasks),
            (Screen::Register, SwitchToLogin | RegisterSucceeded) => Ok(Screen::Login),
            (from, action) => Err(ScreenError::InvalidTransition { from, action }),
        }
    }

    pub fn can_apply(self, action: ScreenAction) -> bool {
        self.apply(action).is_ok()
    }

    pub fn is_authenticated(self) -> bool {
        matches!(self, Screen::Tasks)
    }
}

impl fmt::Display for Screen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Screen::Login => write!(f, "login"),
            Screen::Register => write!(f, "register"),
            Screen::Tasks => write!(f, "tasks"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_SCREENS: [Screen; 3] = [Screen::Login, Screen::Register, Screen::Tasks];
    const ALL_ACTIONS: [ScreenAction; 5] = [
        ScreenAction::SwitchToRegister,
        ScreenAction::SwitchToLogin,
        ScreenAction::RegisterSucceeded,
        ScreenAction::LoginSucceeded,
        ScreenAction::Logout,
    ];

    #[test]
    fn test_initial_screen_is_login() {
        assert_eq!(Screen::default(), Screen::Login);
    }

    #[test]
    fn test_valid_transitions() {
        assert_eq!(
            Screen::Login.apply(ScreenAction::SwitchToRegister),
            Ok(Screen::Register)
        );
        assert_eq!(
            Screen::Register.apply(ScreenAction::SwitchToLogin),
            Ok(Screen::Login)
        );
        assert_eq!(
            Screen::Register.apply(ScreenAction::RegisterSucceeded),
            Ok(Screen::Login)
        );
        assert_eq!(
            Screen::Login.apply(ScreenAction::LoginSucceeded),
            Ok(Screen::Tasks)
        );
    }

    #[test]
    fn test_logout_always_returns_to_login() {
        for screen in ALL_SCREENS {
            assert_eq!(screen.apply(ScreenAction::Logout), Ok(Screen::Login));
        }
    }

    #[test]
    fn test_transition_table_is_closed() {
        let mut valid = 0;
        for screen in ALL_SCREENS {
            for action in ALL_ACTIONS {
                if screen.can_apply(action) {
                    valid += 1;
                }
            }
        }
        // four named transitions plus logout from each of the three screens
        assert_eq!(valid, 7);

        let err = Screen::Tasks
            .apply(ScreenAction::SwitchToRegister)
            .unwrap_err();
        assert_eq!(
            err,
            ScreenError::InvalidTransition {
                from: Screen::Tasks,
                action: ScreenAction::SwitchToRegister
            }
        );
        assert!(err.to_string().contains("tasks"));
    }
}
