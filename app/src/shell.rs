//! Line-oriented rendition of the four screens.
use std::sync::Arc;

use anyhow::Result;
use firenotes::{Destination, HomeController, Notice, NoticeKind, Screens, State, screens::parse_price};
use records::{NoteDraft, PriceOrder, ProductDraft};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, stdin, stdout};

const LOGIN_HELP: &str = "login <email> <password> | signup | forgot | quit";
const SIGN_UP_HELP: &str = "create <email> <password> | login | back | quit";
const FORGOT_HELP: &str = "send <email> | back | quit";
const HOME_HELP: &str = "notes | products [asc|desc] | reload | whoami | logout | quit\n\
    add-note <title> | <content>\n\
    add-product <name> | <price>\n\
    edit-note <id> <title> | <content>\n\
    edit-product <id> <name> | <price>\n\
    delete-note <id> | delete-product <id>";

pub async fn run(state: Arc<State>) -> Result<()> {
    let mut screens = Screens::new(state.clone());
    let mut lines = BufReader::new(stdin()).lines();
    let mut out = stdout();

    println!("{LOGIN_HELP}");

    loop {
        out.write_all(format!("{}> ", screens.current()).as_bytes())
            .await?;
        out.flush().await?;

        let Some(line) = lines.next_line().await? else {
            return Ok(());
        };
        let line = line.trim();
        let (command, rest) = line.split_once(' ').unwrap_or((line, ""));

        if command == "quit" {
            return Ok(());
        }

        let notice = match screens.current() {
            Destination::Login => login(&mut screens, command, rest).await,
            Destination::SignUp => sign_up(&mut screens, command, rest).await,
            Destination::ForgotPassword => forgot(&mut screens, command, rest).await,
            Destination::Home => home(&state, &mut screens, command, rest),
        };

        if let Some(notice) = notice {
            show(&notice);
        }
    }
}

fn show(notice: &Notice) {
    match notice.kind {
        NoticeKind::Info => println!("* {}", notice.text),
        NoticeKind::Error => println!("! {}", notice.text),
    }
}

fn credentials(rest: &str) -> (&str, &str) {
    rest.trim().split_once(' ').unwrap_or((rest.trim(), ""))
}

/// `<left> | <right>`, both trimmed.
fn pair(rest: &str) -> (&str, &str) {
    let (left, right) = rest.split_once('|').unwrap_or((rest, ""));
    (left.trim(), right.trim())
}

async fn login(screens: &mut Screens, command: &str, rest: &str) -> Option<Notice> {
    match command {
        "login" => {
            let (email, password) = credentials(rest);
            let notice = screens.login(email, password).await;
            if screens.current() == Destination::Home {
                println!("{HOME_HELP}");
            }
            notice
        }
        "signup" => {
            screens.open_sign_up();
            println!("{SIGN_UP_HELP}");
            None
        }
        "forgot" => {
            screens.open_forgot_password();
            println!("{FORGOT_HELP}");
            None
        }
        _ => Some(Notice::info(LOGIN_HELP)),
    }
}

async fn sign_up(screens: &mut Screens, command: &str, rest: &str) -> Option<Notice> {
    match command {
        "create" => {
            let (email, password) = credentials(rest);
            let notice = screens.sign_up(email, password).await;
            if screens.current() == Destination::Home {
                println!("{HOME_HELP}");
            }
            notice
        }
        "login" => {
            screens.open_login();
            None
        }
        "back" => {
            screens.back();
            None
        }
        _ => Some(Notice::info(SIGN_UP_HELP)),
    }
}

async fn forgot(screens: &mut Screens, command: &str, rest: &str) -> Option<Notice> {
    match command {
        "send" => screens.forgot_password(rest.trim()).await,
        "back" => {
            screens.back();
            None
        }
        _ => Some(Notice::info(FORGOT_HELP)),
    }
}

fn home(state: &State, screens: &mut Screens, command: &str, rest: &str) -> Option<Notice> {
    if command == "logout" {
        screens.sign_out();
        return Some(Notice::info("Signed out"));
    }

    if command == "whoami" {
        let text = match state.identity.current_user() {
            Some(user) => format!(
                "{} ({})",
                user.email.unwrap_or_default(),
                user.display_name.unwrap_or_else(|| "no display name".to_string())
            ),
            None => "not signed in".to_string(),
        };
        return Some(Notice::info(text));
    }

    match command {
        "add-note" => {
            let (title, content) = pair(rest);
            return screens.add_note(title, content);
        }
        "add-product" => {
            let (name, price) = pair(rest);
            return screens.add_product(name, price);
        }
        _ => {}
    }

    let controller = screens.home()?;
    handle_home(controller, command, rest)
}

fn handle_home(controller: &HomeController, command: &str, rest: &str) -> Option<Notice> {
    match command {
        "notes" => {
            for note in controller.notes() {
                println!("[{}] {}: {}", note.id, note.title, note.content);
            }
            None
        }
        "products" => {
            let products = match rest.trim() {
                "asc" => controller.products_sorted(PriceOrder::Ascending),
                "desc" => controller.products_sorted(PriceOrder::Descending),
                _ => controller.products(),
            };
            for product in products {
                println!("[{}] {}: {}", product.id, product.name, product.price);
            }
            None
        }
        "reload" => {
            controller.load_data();
            None
        }
        "edit-note" => {
            let (id, fields) = rest.trim().split_once(' ')?;
            let (title, content) = pair(fields);
            controller.edit_note(id, NoteDraft::new(title, content));
            Some(Notice::info("Note updated"))
        }
        "edit-product" => {
            let (id, fields) = rest.trim().split_once(' ')?;
            let (name, price) = pair(fields);
            controller.edit_product(id, ProductDraft::new(name, parse_price(price)));
            Some(Notice::info("Product updated"))
        }
        "delete-note" => {
            controller.delete_note(rest.trim());
            Some(Notice::info("Note deleted"))
        }
        "delete-product" => {
            controller.delete_product(rest.trim());
            Some(Notice::info("Product deleted"))
        }
        _ => Some(Notice::info(HOME_HELP)),
    }
}
