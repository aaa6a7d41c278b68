// Transport commands - Host input → event loop

/// Command sent from the input side to the event loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Start,
    Pause,
    Resume,
    Stop,
    Quit,
}

impl Command {
    /// Parse a one-letter keyboard command
    pub fn from_key(key: &str) -> Option<Self> {
        match key.trim() {
            "g" => Some(Command::Start),
            "p" => Some(Command::Pause),
            "r" => Some(Command::Resume),
            "s" => Some(Command::Stop),
            "q" => Some(Command::Quit),
            _ => None,
        }
    }
}
