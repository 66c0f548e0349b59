//! Back-stack navigation between the four screens.
//!
//! | From            | To             | Stack change              |
//! |-----------------|----------------|---------------------------|
//! | Login           | SignUp         | push                      |
//! | Login           | Home           | pop up to Login inclusive |
//! | Login           | ForgotPassword | push                      |
//! | SignUp          | Login          | push                      |
//! | SignUp          | Home           | push                      |
//! | Home            | Login          | pop up to Home inclusive  |
//! | ForgotPassword  | Login          | pop up to Login inclusive |
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Destination {
    Login,
    SignUp,
    Home,
    ForgotPassword,
}

impl fmt::Display for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Destination::Login => "login",
            Destination::SignUp => "sign-up",
            Destination::Home => "home",
            Destination::ForgotPassword => "forgot-password",
        };

        f.write_str(name)
    }
}

#[derive(Debug)]
pub struct Navigator {
    stack: Vec<Destination>,
}

impl Default for Navigator {
    fn default() -> Self {
        Self::new(Destination::Login)
    }
}

impl Navigator {
    pub fn new(start: Destination) -> Self {
        Self { stack: vec![start] }
    }

    pub fn current(&self) -> Destination {
        // never empty: `back` keeps the root and every pop is followed by a push
        *self.stack.last().unwrap_or(&Destination::Login)
    }

    pub fn stack(&self) -> &[Destination] {
        &self.stack
    }

    pub fn navigate(&mut self, destination: Destination) {
        self.stack.push(destination);
    }

    /// Pops everything above `pop_up_to` (and `pop_up_to` itself when
    /// `inclusive`), then pushes `destination`. A missing `pop_up_to` pops nothing.
    pub fn navigate_popping(
        &mut self,
        destination: Destination,
        pop_up_to: Destination,
        inclusive: bool,
    ) {
        if let Some(index) = self.stack.iter().rposition(|d| *d == pop_up_to) {
            let keep = if inclusive { index } else { index + 1 };
            self.stack.truncate(keep);
        }

        self.stack.push(destination);
    }

    /// Returns false at the root.
    pub fn back(&mut self) -> bool {
        if self.stack.len() <= 1 {
            return false;
        }

        self.stack.pop();
        true
    }
}
