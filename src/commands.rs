/// User commands accepted by the dashboard
use std::str::FromStr;

use crate::error::CommandError;
use crate::models::StatusFilter;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Reload the company list
    Companies,
    SelectCompany(i64),
    /// Open the charts of a device; the name is looked up when omitted
    OpenDevice { device_id: i64, device_name: Option<String> },
    CloseDetail,
    Filter(StatusFilter),
    Search(String),
    AutoRefresh(bool),
    TogglePause,
    Refresh,
    /// Open the charts of the first device in the grid
    Dashboard,
    Quit,
}

impl FromStr for Command {
    type Err = CommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        let (name, rest) = match line.split_once(char::is_whitespace) {
            Some((name, rest)) => (name, rest.trim()),
            None => (line, ""),
        };

        match name.to_ascii_lowercase().as_str() {
            "" => Err(CommandError::Empty),
            "companies" => Ok(Command::Companies),
            "company" => Ok(Command::SelectCompany(parse_id(name, rest)?)),
            "open" => {
                let (id, device_name) = match rest.split_once(char::is_whitespace) {
                    Some((id, device_name)) => (id, Some(device_name.trim().to_string())),
                    None => (rest, None),
                };
                Ok(Command::OpenDevice {
                    device_id: parse_id(name, id)?,
                    device_name,
                })
            }
            "close" => Ok(Command::CloseDetail),
            "filter" => {
                let filter = rest.parse().map_err(|_| invalid(name, rest))?;
                Ok(Command::Filter(filter))
            }
            "search" => Ok(Command::Search(rest.to_string())),
            "auto" => match rest.to_ascii_lowercase().as_str() {
                "on" | "true" => Ok(Command::AutoRefresh(true)),
                "off" | "false" => Ok(Command::AutoRefresh(false)),
                "" => Err(CommandError::MissingArgument(name.to_string())),
                _ => Err(invalid(name, rest)),
            },
            "pause" | "resume" => Ok(Command::TogglePause),
            "refresh" => Ok(Command::Refresh),
            "dashboard" => Ok(Command::Dashboard),
            "quit" | "exit" => Ok(Command::Quit),
            other => Err(CommandError::Unknown(other.to_string())),
        }
    }
}

fn parse_id(command: &str, raw: &str) -> Result<i64, CommandError> {
    if raw.is_empty() {
        return Err(CommandError::MissingArgument(command.to_string()));
    }
    raw.parse().map_err(|_| invalid(command, raw))
}

fn invalid(command: &str, value: &str) -> CommandError {
    CommandError::InvalidArgument {
        command: command.to_string(),
        value: value.to_string(),
    }
}
