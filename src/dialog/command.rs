//! Command parsing for idle input

/// A parsed slash command. Tokens are exact and case-sensitive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Start,
    Settings,
    Password,
    Add,
    List,
    Get(Option<String>),
    Delete(Option<String>),
    Change(Option<String>),
    Unknown,
}

impl Command {
    /// Split trimmed text at the first space into a token and an optional
    /// argument (trimmed, empty means absent).
    pub fn parse(text: &str) -> Self {
        let (token, argument) = match text.split_once(' ') {
            Some((token, rest)) => {
                let rest = rest.trim();
                (token, (!rest.is_empty()).then(|| rest.to_string()))
            }
            None => (text, None),
        };

        match token {
            "/start" => Command::Start,
            "/settings" => Command::Settings,
            "/password" => Command::Password,
            "/add" => Command::Add,
            "/list" => Command::List,
            "/get" => Command::Get(argument),
            "/delete" => Command::Delete(argument),
            "/change" => Command::Change(argument),
            _ => Command::Unknown,
        }
    }

    /// Exact texts that pre-empt whichever wizard owns the next line
    pub fn interrupting(text: &str) -> Option<Self> {
        match text {
            "/settings" => Some(Command::Settings),
            "/password" => Some(Command::Password),
            _ => None,
        }
    }
}
