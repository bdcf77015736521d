//! Local command parsing.
//!
//! A line whose first non-whitespace character is `#` is a client command;
//! everything else is chat and is sent exactly as typed.

use std::path::PathBuf;

use relaychat_core::protocol::{Command, Envelope};

pub const PM_USAGE: &str = "PM format error. Correct usage: #pm <target> <message>";

pub const HELP: &str = "Commands: #setName <name>, #join [room], #pm <target> <message>, \
#who, #list, #get <file>, #upload <path>, #login, #logoff, #setHost <host>, \
#setPort <port>, #quit";

/// What to do with one line of user input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientInput {
    /// Plain chat text, sent verbatim.
    Chat(String),
    /// Command envelope for the text lane.
    Send(Envelope),
    /// Read a local file and send it as an upload.
    Upload(PathBuf),
    /// Show a local message; nothing is sent.
    Hint(String),
    /// Open a connection to the current target.
    Login,
    /// Close the connection but keep the client running.
    Logoff,
    /// Change the target host. Only allowed while disconnected.
    SetHost(String),
    /// Change the target port. Only allowed while disconnected.
    SetPort(u16),
    Quit,
    Ignore,
}

pub fn parse_line(line: &str) -> ClientInput {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return ClientInput::Ignore;
    }
    if !trimmed.starts_with('#') {
        return ClientInput::Chat(line.to_string());
    }

    let (word, rest) = match trimmed.split_once(char::is_whitespace) {
        Some((w, r)) => (w, r.trim()),
        None => (trimmed, ""),
    };

    match word {
        "#setName" if !rest.is_empty() => {
            ClientInput::Send(Envelope::new(Command::SetName).with_text(rest))
        }
        "#setName" => ClientInput::Hint("Usage: #setName <name>".into()),
        "#join" => ClientInput::Send(Envelope::new(Command::Join).with_text(rest)),
        "#pm" => parse_pm(rest),
        "#who" => ClientInput::Send(Envelope::new(Command::Who)),
        "#list" => ClientInput::Send(Envelope::new(Command::ListFiles)),
        "#get" if !rest.is_empty() => {
            ClientInput::Send(Envelope::new(Command::GetFile).with_arg(rest))
        }
        "#get" => ClientInput::Hint("Usage: #get <file>".into()),
        "#upload" if !rest.is_empty() => ClientInput::Upload(PathBuf::from(rest)),
        "#upload" => ClientInput::Hint("Usage: #upload <path>".into()),
        "#login" => ClientInput::Login,
        "#logoff" => ClientInput::Logoff,
        "#setHost" if !rest.is_empty() => ClientInput::SetHost(rest.to_string()),
        "#setHost" => ClientInput::Hint("Usage: #setHost <host>".into()),
        "#setPort" => match rest.parse::<u16>() {
            Ok(port) if port != 0 => ClientInput::SetPort(port),
            _ => ClientInput::Hint("Usage: #setPort <port>".into()),
        },
        "#quit" => ClientInput::Quit,
        _ => ClientInput::Hint(format!("Unknown command {word}. {HELP}")),
    }
}

fn parse_pm(rest: &str) -> ClientInput {
    match rest.split_once(' ') {
        Some((target, text)) if !target.is_empty() => ClientInput::Send(
            Envelope::new(Command::Pm)
                .with_arg(target)
                .with_text(text),
        ),
        _ => ClientInput::Hint(PM_USAGE.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chat_is_sent_verbatim() {
        assert_eq!(
            parse_line("  hello   world "),
            ClientInput::Chat("  hello   world ".into())
        );
        assert_eq!(parse_line("   "), ClientInput::Ignore);
        assert_eq!(parse_line(""), ClientInput::Ignore);
    }

    #[test]
    fn commands_map_to_envelopes() {
        assert_eq!(
            parse_line("#setName alice"),
            ClientInput::Send(Envelope::new(Command::SetName).with_text("alice"))
        );
        assert_eq!(
            parse_line("  #join lobby"),
            ClientInput::Send(Envelope::new(Command::Join).with_text("lobby"))
        );
        assert_eq!(
            parse_line("#who"),
            ClientInput::Send(Envelope::new(Command::Who))
        );
        assert_eq!(
            parse_line("#list"),
            ClientInput::Send(Envelope::new(Command::ListFiles))
        );
        assert_eq!(
            parse_line("#get notes.txt"),
            ClientInput::Send(Envelope::new(Command::GetFile).with_arg("notes.txt"))
        );
        assert_eq!(
            parse_line("#upload ./docs/a b.txt"),
            ClientInput::Upload(PathBuf::from("./docs/a b.txt"))
        );
        assert_eq!(parse_line("#quit"), ClientInput::Quit);
    }

    #[test]
    fn connection_control_commands() {
        assert_eq!(parse_line("#login"), ClientInput::Login);
        assert_eq!(parse_line("#logoff"), ClientInput::Logoff);
        assert_eq!(
            parse_line("#setHost chat.example.org"),
            ClientInput::SetHost("chat.example.org".into())
        );
        assert_eq!(parse_line("#setPort 5556"), ClientInput::SetPort(5556));
        assert_eq!(
            parse_line("#setPort http"),
            ClientInput::Hint("Usage: #setPort <port>".into())
        );
        assert_eq!(
            parse_line("#setHost"),
            ClientInput::Hint("Usage: #setHost <host>".into())
        );
    }

    #[test]
    fn bare_join_asks_for_default_room() {
        assert_eq!(
            parse_line("#join"),
            ClientInput::Send(Envelope::new(Command::Join).with_text(""))
        );
    }

    #[test]
    fn pm_keeps_message_spacing_after_target() {
        assert_eq!(
            parse_line("#pm   bob  hi  there"),
            ClientInput::Send(
                Envelope::new(Command::Pm)
                    .with_arg("bob")
                    .with_text(" hi  there")
            )
        );
    }

    #[test]
    fn malformed_pm_gets_usage_hint() {
        assert_eq!(parse_line("#pm"), ClientInput::Hint(PM_USAGE.into()));
        assert_eq!(parse_line("#pm bob"), ClientInput::Hint(PM_USAGE.into()));
    }

    #[test]
    fn unknown_command_lists_help() {
        match parse_line("#dance now") {
            ClientInput::Hint(h) => {
                assert!(h.starts_with("Unknown command #dance."));
                assert!(h.contains("#pm <target> <message>"));
            }
            other => unreachable!("unexpected {other:?}"),
        }
    }
}
