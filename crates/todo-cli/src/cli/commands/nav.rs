//! Path-based navigation (`todo open <PATH>`).

use anyhow::Result;
use todo_core::routes::Route;

use crate::cli::App;
use crate::cli::commands::{profile, tasks};

pub async fn open(app: &App, route: Route) -> Result<()> {
    match app.enter(route)? {
        Route::Home => tasks::list(app).await,
        Route::Profile => profile::show(app),
        Route::Login => {
            println!("Log in with: todo login --email <EMAIL>");
            Ok(())
        }
        Route::Register => {
            println!(
                "Create an account with: todo register --name <NAME> --email <EMAIL> --password <PASSWORD>"
            );
            Ok(())
        }
        Route::NotFound => {
            println!("404: page not found");
            Ok(())
        }
    }
}
