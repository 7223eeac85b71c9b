//! Chat command parsing

use crate::models::practice::DiscoveryQuery;

/// Most URLs accepted by one `/batch` command
pub const MAX_BATCH_URLS: usize = 20;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Start,
    Help,
    Process(String),
    Batch(Vec<String>),
    Search(DiscoveryQuery),
    Status,
    Stats,
    /// Known command with missing or bad arguments; carries the usage line
    Usage(&'static str),
    Unknown(String),
}

/// Parse a chat message; `None` when the text is not a command
pub fn parse_command(text: &str) -> Option<Command> {
    let text = text.trim();
    if !text.starts_with('/') {
        return None;
    }

    let (head, rest) = match text.split_once(char::is_whitespace) {
        Some((head, rest)) => (head, rest.trim()),
        None => (text, ""),
    };
    // "/process@leadbot" addresses a specific bot in group chats
    let name = head[1..].split('@').next().unwrap_or_default().to_lowercase();

    let command = match name.as_str() {
        "start" => Command::Start,
        "help" => Command::Help,
        "status" => Command::Status,
        "stats" => Command::Stats,
        "process" => match rest.split_whitespace().next() {
            Some(url) => Command::Process(url.to_string()),
            None => Command::Usage("/process <url>"),
        },
        "batch" => {
            let urls: Vec<String> = rest
                .split(|c: char| c.is_whitespace() || c == ',')
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect();
            if urls.is_empty() || urls.len() > MAX_BATCH_URLS {
                Command::Usage("/batch <url> <url> ... (at most 20)")
            } else {
                Command::Batch(urls)
            }
        }
        "search" => match parse_search(rest) {
            Some(query) => Command::Search(query),
            None => Command::Usage("/search <practice type> [in <location>]"),
        },
        other => Command::Unknown(other.to_string()),
    };
    Some(command)
}

/// "dentist in Austin, TX" becomes type "dentist", location "Austin, TX"
fn parse_search(args: &str) -> Option<DiscoveryQuery> {
    if args.is_empty() {
        return None;
    }

    let lower = args.to_ascii_lowercase();
    let (practice_type, location) = match lower.find(" in ") {
        Some(idx) => (args[..idx].trim(), Some(args[idx + 4..].trim())),
        None => (args.trim(), None),
    };
    if practice_type.is_empty() {
        return None;
    }

    Some(DiscoveryQuery::new(
        practice_type,
        location.filter(|l| !l.is_empty()).map(str::to_string),
    ))
}
