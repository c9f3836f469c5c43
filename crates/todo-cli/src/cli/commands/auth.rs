//! Register, login and logout views.

use anyhow::{Context, Result};
use todo_core::account;
use todo_core::forms::{LoginForm, RegisterForm};
use todo_core::routes::Route;

use crate::cli::App;
use crate::cli::term::{self, TerminalNotifier};

pub async fn register(
    app: &App,
    name: String,
    email: String,
    password: String,
    confirm_password: Option<String>,
) -> Result<()> {
    app.enter(Route::Register)?;

    let form = RegisterForm {
        name,
        confirm_password: confirm_password.unwrap_or_else(|| password.clone()),
        email,
        password,
    };
    let api = app.api()?;
    let (_, next) = account::register(&api, &form, &mut TerminalNotifier).await?;

    if next == Route::Login {
        println!("Next: todo login --email {}", form.email);
    }
    Ok(())
}

pub async fn login(app: &mut App, email: String, password: Option<String>) -> Result<()> {
    app.enter(Route::Login)?;

    let password = match password {
        Some(password) => password,
        None => term::prompt_line("Password: ").context("read password")?,
    };
    let form = LoginForm { email, password };
    let api = app.api()?;
    account::login(&api, &mut app.store, &form, &mut TerminalNotifier).await?;

    if let Some(user) = app.store.current().user() {
        println!("Logged in as {}", user.name);
    }
    println!(
        "  Session saved to: {}",
        app.store.storage().path().display()
    );
    Ok(())
}

pub fn logout(app: &mut App) -> Result<()> {
    if account::logout(&mut app.store)? {
        println!("✓ Logged out");
    } else {
        println!("Not logged in.");
    }
    Ok(())
}
