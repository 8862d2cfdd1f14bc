//! Line-oriented input loop
//!
//! Each non-empty line is posted under the `user` sender and flushed to the
//! observer straight away, so the user sees their own message before any
//! worker reacts.

use chalkboard_agent::{Blackboard, Feed};
use chalkboard_core::USER_SENDER;
use std::io::{BufRead, Write};
use tokio::sync::mpsc;
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Quit,
    Empty,
    Post(String),
}

/// `quit`, `exit` and `q` (trimmed, any case) stop; blank lines do nothing.
pub fn parse_line(line: &str) -> Command {
    let line = line.trim();
    if line.is_empty() {
        return Command::Empty;
    }
    match line.to_lowercase().as_str() {
        "quit" | "exit" | "q" => Command::Quit,
        _ => Command::Post(line.to_string()),
    }
}

/// Stdin lines, read on a detached thread so a blocked read never holds up
/// shutdown.
pub fn stdin_lines() -> mpsc::Receiver<String> {
    let (tx, rx) = mpsc::channel(16);
    std::thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            match line {
                Ok(line) => {
                    if tx.blocking_send(line).is_err() {
                        break;
                    }
                }
                Err(e) => {
                    warn!(error = %e, "stdin read failed");
                    break;
                }
            }
        }
    });
    rx
}

/// Consume lines until a quit command or end of input. Returns how many
/// messages were posted.
pub async fn run(
    mut lines: mpsc::Receiver<String>,
    board: &Blackboard,
    feed: &Feed,
    show_prompt: bool,
) -> std::io::Result<usize> {
    let mut posted = 0;

    loop {
        if show_prompt {
            print!("> ");
            std::io::stdout().flush()?;
        }
        let Some(line) = lines.recv().await else {
            debug!("input closed");
            break;
        };
        match parse_line(&line) {
            Command::Quit => break,
            Command::Empty => continue,
            Command::Post(text) => {
                let id = board.append(USER_SENDER, text).await;
                debug!(id, "user message posted");
                feed.flush(board).await;
                posted += 1;
            }
        }
    }
    Ok(posted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chalkboard_agent::RecordingObserver;

    fn feed_lines(lines: &[&str]) -> mpsc::Receiver<String> {
        let (tx, rx) = mpsc::channel(lines.len().max(1));
        for line in lines {
            tx.try_send(line.to_string()).unwrap();
        }
        rx
    }

    #[test]
    fn commands() {
        assert_eq!(parse_line("quit"), Command::Quit);
        assert_eq!(parse_line("  EXIT \n"), Command::Quit);
        assert_eq!(parse_line("Q"), Command::Quit);
        assert_eq!(parse_line("   "), Command::Empty);
        assert_eq!(parse_line(""), Command::Empty);
        assert_eq!(parse_line("  quite right "), Command::Post("quite right".into()));
    }

    #[tokio::test]
    async fn posts_until_quit() {
        let board = Blackboard::new();
        let observer = RecordingObserver::new();
        let feed = Feed::new(observer.clone());
        let input = feed_lines(&["Write about cats", "", "   ", "make it short", "quit", "ignored"]);

        let posted = run(input, &board, &feed, false).await.unwrap();
        assert_eq!(posted, 2);
        let texts: Vec<_> = board.all().await.into_iter().map(|m| m.text).collect();
        assert_eq!(texts, vec!["Write about cats", "make it short"]);
        assert!(board.all().await.iter().all(|m| m.is_from_user()));
        assert_eq!(observer.messages().len(), 2);
    }

    #[tokio::test]
    async fn end_of_input_stops() {
        let board = Blackboard::new();
        let feed = Feed::new(RecordingObserver::new());
        let input = feed_lines(&["hello"]);
        assert_eq!(run(input, &board, &feed, false).await.unwrap(), 1);
    }
}
