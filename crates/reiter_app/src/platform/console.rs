use reiter_core::Msg;

pub const HELP: &str = "commands: :sync [crawler] | :cancel | :dismiss | :quit | :help \
(while a prompt is open, any other line answers it)";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleCommand {
    Msgs(Vec<Msg>),
    Quit,
    Help,
    Unknown(String),
}

/// Turns one stdin line into messages. With a prompt open, plain lines are answers.
pub fn parse_line(line: &str, prompt_open: bool) -> ConsoleCommand {
    let line = line.trim_end_matches(['\r', '\n']);
    let trimmed = line.trim();
    let mut words = trimmed.split_whitespace();

    match words.next() {
        Some(":sync") => {
            let rest = trimmed[":sync".len()..].trim();
            let crawler = (!rest.is_empty()).then(|| rest.to_string());
            ConsoleCommand::Msgs(vec![Msg::SyncRequested { crawler }])
        }
        Some(":cancel") if prompt_open => ConsoleCommand::Msgs(vec![Msg::PromptCancelled]),
        Some(":cancel") => ConsoleCommand::Msgs(vec![Msg::CancelClicked]),
        Some(":dismiss") => ConsoleCommand::Msgs(vec![Msg::LoginErrorDismissed]),
        Some(":quit") | Some(":q") => ConsoleCommand::Quit,
        Some(":help") => ConsoleCommand::Help,
        _ if prompt_open => ConsoleCommand::Msgs(vec![
            Msg::PromptInputChanged(line.to_string()),
            Msg::PromptSubmitted,
        ]),
        None => ConsoleCommand::Msgs(Vec::new()),
        Some(_) => ConsoleCommand::Unknown(trimmed.to_string()),
    }
}
