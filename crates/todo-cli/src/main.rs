mod cli;

use todo_core::routes::{RedirectError, Route};

/// Exit status when the requested view redirected elsewhere.
const EXIT_REDIRECTED: i32 = 3;

fn main() {
    if let Err(e) = cli::run() {
        if let Some(redirect) = e.downcast_ref::<RedirectError>() {
            eprintln!("{redirect}");
            match redirect.to {
                Route::Login => eprintln!("Log in first: todo login --email <EMAIL>"),
                Route::Home => eprintln!("Already logged in. Run `todo logout` to switch accounts."),
                _ => {}
            }
            std::process::exit(EXIT_REDIRECTED);
        }
        eprintln!("{e:#}"); // pretty anyhow chain
        std::process::exit(1);
    }
}
