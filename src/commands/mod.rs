//! Built-in bot commands: parsing and permission classes.


/// Known bot commands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Help,
    Streak,
    /// `/set N`; `None` when the argument is missing or not a number.
    Set(Option<u32>),
    Reset,
    ToggleDeletes,
    /// `/lang CODE`; the code is lowercased but not validated.
    Lang(Option<String>),
}

impl Command {
    /// Parse a command from message text. Returns `None` for plain text and
    /// unknown `/` prefixes, which count as ordinary activity.
    pub fn parse(text: &str) -> Option<Self> {
        let mut words = text.split_whitespace();
        let first = words.next()?;
        // Strip @botname suffix (e.g. "/set@streak_bot" → "/set").
        let cmd = first.split('@').next().unwrap_or(first);
        let arg = words.next();
        match cmd {
            "/help" | "/start" => Some(Self::Help),
            "/streak" => Some(Self::Streak),
            "/set" => Some(Self::Set(arg.and_then(|a| a.parse().ok()))),
            "/reset" => Some(Self::Reset),
            "/toggle_deletes" => Some(Self::ToggleDeletes),
            "/lang" | "/language" => Some(Self::Lang(arg.map(str::to_lowercase))),
            _ => None,
        }
    }

    /// Commands that change state are restricted to chat administrators.
    pub fn requires_admin(&self) -> bool {
        !matches!(self, Self::Help | Self::Streak)
    }
}
