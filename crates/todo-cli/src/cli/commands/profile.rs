//! Profile view.

use anyhow::{Context, Result};
use todo_core::routes::Route;

use crate::cli::App;

pub fn show(app: &App) -> Result<()> {
    app.enter(Route::Profile)?;

    let session = app.store.current();
    let user = session.user().context("session has no user")?;
    println!("Name:  {}", user.name);
    if let Some(email) = &user.email {
        println!("Email: {email}");
    }
    Ok(())
}
