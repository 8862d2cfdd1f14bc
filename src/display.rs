//! Terminal rendering: the message feed and the startup/shutdown banners

use chalkboard_agent::Observer;
use chalkboard_core::Message;
use chrono::Local;
use crossterm::{
    queue,
    style::{Attribute, Color, Print, ResetColor, SetAttribute, SetForegroundColor},
};
use std::io::{self, IsTerminal, Write};

// ---------------------------------------------------------------------------
// Feed
// ---------------------------------------------------------------------------

/// Prints each message as `[HH:MM:SS] sender: text` followed by a blank line.
pub struct TerminalObserver {
    colored: bool,
}

impl TerminalObserver {
    /// Colours on when stdout is a terminal.
    pub fn new() -> Self {
        Self {
            colored: io::stdout().is_terminal(),
        }
    }

    pub fn plain() -> Self {
        Self { colored: false }
    }
}

impl Default for TerminalObserver {
    fn default() -> Self {
        Self::new()
    }
}

impl Observer for TerminalObserver {
    fn show(&self, messages: &[Message]) {
        let mut out = io::stdout().lock();
        if let Err(e) = write_messages(&mut out, messages, self.colored).and_then(|_| out.flush()) {
            tracing::warn!(error = %e, "failed to write to terminal");
        }
    }
}

/// User in blue, agents in green, everything else unstyled.
pub fn sender_color(message: &Message) -> Option<Color> {
    if message.is_from_user() {
        Some(Color::Blue)
    } else if message.sender.as_str().contains("agent") {
        Some(Color::Green)
    } else {
        None
    }
}

pub fn timestamp(message: &Message) -> String {
    message
        .timestamp
        .with_timezone(&Local)
        .format("%H:%M:%S")
        .to_string()
}

pub fn write_messages<W: Write>(out: &mut W, messages: &[Message], colored: bool) -> io::Result<()> {
    for msg in messages {
        queue!(out, Print(format!("[{}] ", timestamp(msg))))?;
        match sender_color(msg).filter(|_| colored) {
            Some(color) => queue!(
                out,
                SetAttribute(Attribute::Bold),
                SetForegroundColor(color),
                Print(format!("{}: ", msg.sender)),
                SetAttribute(Attribute::Reset),
                ResetColor
            )?,
            None => queue!(out, Print(format!("{}: ", msg.sender)))?,
        }
        queue!(out, Print(&msg.text), Print("\n\n"))?;
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Banners
// ---------------------------------------------------------------------------

pub fn print_banner(provider: &str, roster: &str, workers: &[&str]) {
    println!("╔══════════════════════════════════════════════════╗");
    println!("║  🤖 CHALKBOARD v{:<33}║", env!("CARGO_PKG_VERSION"));
    println!("║     Agents collaborating on a shared board       ║");
    println!("╠══════════════════════════════════════════════════╣");
    println!("║  Provider : {:<37}║", provider);
    println!("║  Roster   : {:<37}║", roster);
    println!("╚══════════════════════════════════════════════════╝");
    println!("Workers: {}", workers.join(", "));
    println!("Type your requests below. Agents will collaborate to help you.");
    println!("Type 'quit' or 'exit' to stop.");
    println!();
}

pub fn print_missing(vars: &[String]) {
    let mut out = io::stdout();
    let _ = queue!(
        out,
        SetAttribute(Attribute::Bold),
        SetForegroundColor(Color::Red),
        Print(format!(
            "⚠️  Missing required environment variables: {}\n",
            vars.join(", ")
        )),
        SetAttribute(Attribute::Reset),
        ResetColor,
        Print("Set them in your environment or in chalkboard.toml and try again.\n")
    );
    let _ = out.flush();
}

pub fn print_goodbye() {
    println!();
    println!("System stopped. Goodbye! 👋");
}

#[cfg(test)]
mod tests {
    use super::*;
    use chalkboard_core::Sender;
    use chrono::Utc;

    fn msg(id: u64, sender: &str, text: &str) -> Message {
        Message {
            id,
            sender: Sender::new(sender),
            text: text.into(),
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn plain_lines() {
        let m = msg(1, "user", "Write about cats");
        let mut buf = Vec::new();
        write_messages(&mut buf, &[m.clone()], false).unwrap();
        let out = String::from_utf8(buf).unwrap();
        assert_eq!(out, format!("[{}] user: Write about cats\n\n", timestamp(&m)));
    }

    #[test]
    fn colours_by_sender() {
        assert_eq!(sender_color(&msg(1, "user", "x")), Some(Color::Blue));
        assert_eq!(sender_color(&msg(2, "writer-agent", "x")), Some(Color::Green));
        assert_eq!(sender_color(&msg(3, "system", "x")), None);
        assert_eq!(sender_color(&msg(4, "moderator", "x")), None);
        assert_eq!(sender_color(&msg(5, "idea-brain", "x")), None);
    }

    #[test]
    fn colored_output_keeps_text() {
        let mut buf = Vec::new();
        write_messages(&mut buf, &[msg(1, "writer-agent", "draft")], true).unwrap();
        let out = String::from_utf8(buf).unwrap();
        assert!(out.contains("writer-agent: "));
        assert!(out.ends_with("draft\n\n"));
        assert!(out.contains('\u{1b}'));
    }

    #[test]
    fn timestamp_shape() {
        let ts = timestamp(&msg(1, "user", "x"));
        assert_eq!(ts.len(), 8);
        assert_eq!(ts.matches(':').count(), 2);
    }
}
