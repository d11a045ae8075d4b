/// One parsed line of lab input: either a dot-command or raw SQL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplCommand {
    Query(String),
    Tables,
    Schema(Option<String>),
    Sort(String),
    ResetSort,
    Copy,
    Help,
    Quit,
}

impl ReplCommand {
    /// Parse a line. Returns None for blank input. Unknown dot-commands map
    /// to Help so the user sees the command list instead of a SQL error.
    pub fn parse(line: &str) -> Option<Self> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }
        if !line.starts_with('.') {
            return Some(ReplCommand::Query(line.to_string()));
        }

        let mut parts = line.splitn(2, char::is_whitespace);
        let head = parts.next().unwrap_or_default();
        let rest = parts.next().map(str::trim).filter(|s| !s.is_empty());

        match head {
            ".tables" => Some(ReplCommand::Tables),
            ".schema" => Some(ReplCommand::Schema(rest.map(str::to_string))),
            ".sort" => match rest {
                Some(column) => Some(ReplCommand::Sort(column.to_string())),
                None => Some(ReplCommand::Help),
            },
            ".nosort" => Some(ReplCommand::ResetSort),
            ".copy" => Some(ReplCommand::Copy),
            ".help" => Some(ReplCommand::Help),
            ".quit" | ".exit" => Some(ReplCommand::Quit),
            _ => Some(ReplCommand::Help),
        }
    }
}
