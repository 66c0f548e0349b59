//! Screen flows: what each button does, independent of how screens are drawn.
//!
//! Every action answers with at most one transient [`Notice`] and may move the
//! [`Navigator`]. Entering home builds a [`HomeController`] for the new session
//! and starts loading; leaving home drops it.
use std::sync::Arc;

use records::{NoteDraft, ProductDraft};
use tracing::info;

use crate::{
    controller::HomeController,
    documents::RecordStore,
    navigation::{Destination, Navigator},
    session::Session,
    state::State,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NoticeKind {
    Info,
    Error,
}

/// Short-lived message shown over the current screen.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub text: String,
}

impl Notice {
    pub fn info(text: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Info,
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Error,
            text: text.into(),
        }
    }
}

pub const FILL_ALL_FIELDS: &str = "Fill in all fields";

pub struct Screens {
    state: Arc<State>,
    nav: Navigator,
    home: Option<HomeController>,
}

impl Screens {
    pub fn new(state: Arc<State>) -> Self {
        Self {
            state,
            nav: Navigator::default(),
            home: None,
        }
    }

    pub fn current(&self) -> Destination {
        self.nav.current()
    }

    pub fn navigator(&self) -> &Navigator {
        &self.nav
    }

    pub fn home(&self) -> Option<&HomeController> {
        self.home.as_ref()
    }

    pub fn open_sign_up(&mut self) {
        self.nav.navigate(Destination::SignUp);
    }

    pub fn open_forgot_password(&mut self) {
        self.nav.navigate(Destination::ForgotPassword);
    }

    pub fn open_login(&mut self) {
        self.nav.navigate(Destination::Login);
    }

    /// Home is left only by signing out, so going back from it does nothing.
    pub fn back(&mut self) -> bool {
        if self.nav.current() == Destination::Home {
            return false;
        }

        self.nav.back()
    }

    pub async fn login(&mut self, email: &str, password: &str) -> Option<Notice> {
        if email.is_empty() || password.is_empty() {
            return Some(Notice::error(FILL_ALL_FIELDS));
        }

        match self.state.identity.sign_in(email, password).await {
            Ok(session) => {
                self.enter_home(session);
                self.nav
                    .navigate_popping(Destination::Home, Destination::Login, true);
                None
            }
            Err(e) => Some(Notice::error(e.to_string())),
        }
    }

    pub async fn sign_up(&mut self, email: &str, password: &str) -> Option<Notice> {
        if email.is_empty() || password.is_empty() {
            return Some(Notice::error(FILL_ALL_FIELDS));
        }

        match self.state.identity.sign_up(email, password).await {
            Ok(session) => {
                self.enter_home(session);
                self.nav.navigate(Destination::Home);
                Some(Notice::info("Account created"))
            }
            Err(e) => Some(Notice::error(format!("Could not create account: {e}"))),
        }
    }

    pub async fn forgot_password(&mut self, email: &str) -> Option<Notice> {
        if email.is_empty() {
            return Some(Notice::error("Enter your email"));
        }

        match self.state.identity.reset_password(email).await {
            Ok(()) => {
                self.nav
                    .navigate_popping(Destination::Login, Destination::Login, true);
                Some(Notice::info("Password reset email sent"))
            }
            Err(e) => Some(Notice::error(format!("Error: {e}"))),
        }
    }

    pub fn sign_out(&mut self) {
        self.state.identity.sign_out();
        self.home = None;
        self.nav
            .navigate_popping(Destination::Login, Destination::Home, true);
    }

    pub fn add_note(&self, title: &str, content: &str) -> Option<Notice> {
        let home = self.home.as_ref()?;
        home.add_note(NoteDraft::new(title, content));

        Some(Notice::info("Note added"))
    }

    pub fn add_product(&self, name: &str, price: &str) -> Option<Notice> {
        let home = self.home.as_ref()?;
        home.add_product(ProductDraft::new(name, parse_price(price)));

        Some(Notice::info("Product added"))
    }

    fn enter_home(&mut self, session: Session) {
        info!("Opening home for {}", session.uid);

        let controller =
            HomeController::new(RecordStore::new(self.state.documents.clone(), session));
        controller.load_data();
        self.home = Some(controller);
    }
}

/// Lenient price entry: anything that is not a finite number is zero.
pub fn parse_price(text: &str) -> f64 {
    text.trim()
        .parse::<f64>()
        .ok()
        .filter(|price| price.is_finite())
        .unwrap_or(0.0)
}
