use std::io::BufRead;

use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::session::parts::TimeParts;

/// User actions the terminal host understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostCommand {
    Start,
    Pause,
    Reset,
    Set(TimeParts),
    Quit,
}

impl HostCommand {
    /// Parses one line of user input. Unknown input is ignored.
    pub fn parse(line: &str) -> Option<Self> {
        let mut words = line.split_whitespace();
        let command = words.next()?.to_lowercase();
        match command.as_str() {
            "s" | "start" => Some(Self::Start),
            "p" | "pause" => Some(Self::Pause),
            "r" | "reset" => Some(Self::Reset),
            "q" | "quit" | "exit" => Some(Self::Quit),
            "set" | "t" => {
                let parts = words.next()?.parse().ok()?;
                Some(Self::Set(parts))
            }
            _ => None,
        }
    }
}

/// Reads commands from stdin on a dedicated thread. Blocking reads on a runtime thread would
/// keep the runtime from shutting down, so the thread is left detached and dies with the process.
pub fn spawn_stdin_reader(sender: mpsc::Sender<HostCommand>) {
    std::thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            let line = match line {
                Ok(line) => line,
                Err(e) => {
                    warn!("Stopped reading input: {e}");
                    return;
                }
            };
            match HostCommand::parse(&line) {
                Some(command) => {
                    debug!("Received command {command:?}");
                    if sender.blocking_send(command).is_err() {
                        return;
                    }
                }
                None => debug!("Ignoring input {line:?}"),
            }
        }
    });
}

#[cfg(test)]
mod tests {
    use crate::session::parts::TimeParts;

    use super::HostCommand;

    #[test]
    fn parses_commands() {
        assert_eq!(HostCommand::parse(" Start "), Some(HostCommand::Start));
        assert_eq!(HostCommand::parse("p"), Some(HostCommand::Pause));
        assert_eq!(HostCommand::parse("reset"), Some(HostCommand::Reset));
        assert_eq!(HostCommand::parse("q"), Some(HostCommand::Quit));
        assert_eq!(
            HostCommand::parse("set 99:30"),
            Some(HostCommand::Set(TimeParts::clamped(23, 30, 0)))
        );
        assert_eq!(HostCommand::parse("set"), None);
        assert_eq!(HostCommand::parse("dance"), None);
        assert_eq!(HostCommand::parse(""), None);
    }
}
