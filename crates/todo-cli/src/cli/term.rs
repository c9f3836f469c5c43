//! Terminal implementations of the notifier and confirmation seams.

use std::io::{self, BufRead, Write};

use todo_core::notice::{Confirm, ConfirmPrompt, Notice, NoticeLevel, Notifier};
use todo_types::Task;

/// Success and info go to stdout, errors to stderr.
#[derive(Debug, Default)]
pub struct TerminalNotifier;

impl Notifier for TerminalNotifier {
    fn notify(&mut self, notice: Notice) {
        match notice.level {
            NoticeLevel::Success => println!("✓ {}", notice.text),
            NoticeLevel::Info => println!("{}", notice.text),
            NoticeLevel::Error => eprintln!("✗ {}", notice.text),
        }
    }
}

/// Asks on stdout and reads `y/N` from stdin. Anything but yes declines,
/// including end of input.
#[derive(Debug, Default)]
pub struct StdinConfirm;

impl Confirm for StdinConfirm {
    fn confirm(&mut self, prompt: &ConfirmPrompt) -> bool {
        print!(
            "{} {} ({}) [y/N] ",
            prompt.title, prompt.text, prompt.confirm_label
        );
        if io::stdout().flush().is_err() {
            return false;
        }

        let mut response = String::new();
        match io::stdin().lock().read_line(&mut response) {
            Ok(_) => {
                println!();
                let answer = response.trim();
                answer.eq_ignore_ascii_case("y") || answer.eq_ignore_ascii_case("yes")
            }
            Err(err) => {
                tracing::warn!(error = %err, "failed to read confirmation");
                false
            }
        }
    }
}

/// Reads one line from stdin after printing `label`.
pub fn prompt_line(label: &str) -> io::Result<String> {
    print!("{label}");
    io::stdout().flush()?;
    let mut input = String::new();
    io::stdin().lock().read_line(&mut input)?;
    println!();
    Ok(input.trim_end_matches(['\r', '\n']).to_string())
}

pub fn print_tasks(tasks: &[Task]) {
    if tasks.is_empty() {
        println!("No TODOs yet.");
        return;
    }
    for task in tasks {
        println!("{}  {}", task.id, task.title);
        if !task.description.is_empty() {
            println!("    {}", task.description);
        }
    }
}
