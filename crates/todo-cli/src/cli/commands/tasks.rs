//! Task views: list, add, edit, delete.

use anyhow::{Result, bail};
use todo_core::api::ApiClient;
use todo_core::board::{DeleteOutcome, TaskBoard};
use todo_core::forms::TaskForm;
use todo_core::notice::AutoConfirm;
use todo_core::routes::Route;

use crate::cli::App;
use crate::cli::term::{StdinConfirm, TerminalNotifier, print_tasks};

/// Prints the list after a mutation, unless the follow-up fetch failed and
/// there is nothing current to show.
fn print_refreshed(board: &TaskBoard<ApiClient, TerminalNotifier>) {
    if board.is_loaded() {
        print_tasks(board.tasks());
    }
}

fn board(app: &App) -> Result<TaskBoard<ApiClient, TerminalNotifier>> {
    app.enter(Route::Home)?;
    Ok(TaskBoard::new(
        app.api()?,
        TerminalNotifier,
        app.store.token(),
    ))
}

pub async fn list(app: &App) -> Result<()> {
    let mut board = board(app)?;
    let tasks = board.list().await?;
    print_tasks(tasks);
    Ok(())
}

pub async fn add(app: &App, title: String, description: String) -> Result<()> {
    let mut board = board(app)?;
    board.create_form = TaskForm::new(title, description);
    board.create().await?;
    print_refreshed(&board);
    Ok(())
}

pub async fn edit(
    app: &App,
    id: &str,
    title: Option<String>,
    description: Option<String>,
) -> Result<()> {
    if title.is_none() && description.is_none() {
        bail!("Nothing to change: pass --title and/or --description");
    }

    let mut board = board(app)?;
    // The edit form is pre-filled from the listed task.
    board.list().await?;
    let form = board.begin_edit(id)?;
    if let Some(title) = title {
        form.title = title;
    }
    if let Some(description) = description {
        form.description = description;
    }

    board.update().await?;
    print_refreshed(&board);
    Ok(())
}

pub async fn delete(app: &App, id: &str) -> Result<()> {
    let mut board = board(app)?;

    let outcome = if app.assume_yes || !app.config.confirm_deletes {
        board.delete(id, &mut AutoConfirm(true)).await?
    } else {
        board.delete(id, &mut StdinConfirm).await?
    };

    match outcome {
        DeleteOutcome::Deleted => print_refreshed(&board),
        DeleteOutcome::Cancelled => println!("Delete cancelled."),
    }
    Ok(())
}
