//! Slash-command parsing for the REPL.

use devcmd_core::session::{DEFAULT_RESULT_COUNT, SessionEvent, SettingsChange};

/// Slash commands offered for completion.
pub const SLASH_COMMANDS: &[&str] = &[
    "/help",
    "/model",
    "/openrouter",
    "/filter",
    "/tech",
    "/execute",
    "/web",
    "/docs",
    "/search",
    "/docs-search",
    "/docs-download",
    "/status",
    "/refresh",
    "/history",
    "/recall",
    "/voice",
    "/settings",
];

/// Read-only listings rendered straight from controller state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Help,
    Models,
    OpenRouter,
    Technologies,
    Status,
    History,
    Settings,
}

/// What a line of input asks for.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Quit,
    Show(View),
    Dispatch(SessionEvent),
    /// Voice toggle; checked against speech availability before dispatch.
    Voice,
    /// Malformed slash command, with a usage hint.
    Usage(&'static str),
    Unknown(String),
}

pub fn parse(line: &str) -> Command {
    let trimmed = line.trim();
    if trimmed == "quit" || trimmed == "exit" {
        return Command::Quit;
    }
    if !trimmed.starts_with('/') {
        return Command::Dispatch(SessionEvent::Submit(line.to_string()));
    }

    let (name, rest) = match trimmed.split_once(char::is_whitespace) {
        Some((name, rest)) => (name, rest.trim()),
        None => (trimmed, ""),
    };
    let arg = (!rest.is_empty()).then_some(rest);

    match (name, arg) {
        ("/help", _) => Command::Show(View::Help),
        ("/model", None) => Command::Show(View::Models),
        ("/model", Some(id)) => setting(SettingsChange::Model(id.to_string())),
        ("/openrouter", None) => Command::Show(View::OpenRouter),
        ("/openrouter", Some(id)) => setting(SettingsChange::OpenRouterModel(id.to_string())),
        ("/filter", text) => Command::Dispatch(SessionEvent::FilterOpenRouter(
            text.unwrap_or_default().to_string(),
        )),
        ("/tech", None) => Command::Show(View::Technologies),
        ("/tech", Some(tech)) => {
            Command::Dispatch(SessionEvent::SelectTechnology(tech.to_lowercase()))
        }
        ("/execute", arg) => toggle(arg, SettingsChange::ExecuteCommands, "/execute on|off"),
        ("/web", arg) => toggle(arg, SettingsChange::UseWeb, "/web on|off"),
        ("/docs", arg) => toggle(arg, SettingsChange::UseDocs, "/docs on|off"),
        ("/search", None) => Command::Usage("/search <query>"),
        ("/search", Some(query)) => Command::Dispatch(SessionEvent::WebSearch {
            query: query.to_string(),
            num_results: DEFAULT_RESULT_COUNT,
        }),
        ("/docs-search", None) => Command::Usage("/docs-search <query>"),
        ("/docs-search", Some(query)) => Command::Dispatch(SessionEvent::SearchDocs {
            technology: None,
            query: query.to_string(),
            max_results: DEFAULT_RESULT_COUNT,
        }),
        ("/docs-download", tech) => Command::Dispatch(SessionEvent::DownloadDocs {
            technology: tech.map(str::to_lowercase),
        }),
        ("/status", _) => Command::Show(View::Status),
        ("/refresh", _) => Command::Dispatch(SessionEvent::RefreshStatus),
        ("/history", None) => Command::Show(View::History),
        ("/history", Some("reload")) => Command::Dispatch(SessionEvent::LoadHistory),
        ("/history", Some(_)) => Command::Usage("/history [reload]"),
        ("/recall", arg) => match arg.and_then(|n| n.parse::<usize>().ok()) {
            // Listed from 1; the controller indexes from 0.
            Some(n) if n > 0 => Command::Dispatch(SessionEvent::Recall(n - 1)),
            _ => Command::Usage("/recall <n>"),
        },
        ("/voice", _) => Command::Voice,
        ("/settings", _) => Command::Show(View::Settings),
        (other, _) => Command::Unknown(other.to_string()),
    }
}

fn setting(change: SettingsChange) -> Command {
    Command::Dispatch(SessionEvent::SettingsChanged(change))
}

fn toggle(arg: Option<&str>, change: fn(bool) -> SettingsChange, usage: &'static str) -> Command {
    match arg {
        Some("on") => setting(change(true)),
        Some("off") => setting(change(false)),
        _ => Command::Usage(usage),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_input_is_submitted_verbatim() {
        assert_eq!(
            parse("  find large files "),
            Command::Dispatch(SessionEvent::Submit("  find large files ".to_string()))
        );
        assert_eq!(parse("exit"), Command::Quit);
        assert_eq!(parse(" quit "), Command::Quit);
    }

    #[test]
    fn test_listing_commands() {
        assert_eq!(parse("/model"), Command::Show(View::Models));
        assert_eq!(parse("/tech"), Command::Show(View::Technologies));
        assert_eq!(parse("/history"), Command::Show(View::History));
        assert_eq!(parse("/status"), Command::Show(View::Status));
    }

    #[test]
    fn test_setting_commands() {
        assert_eq!(
            parse("/model llama3"),
            setting(SettingsChange::Model("llama3".to_string()))
        );
        assert_eq!(
            parse("/openrouter openai/gpt-4o"),
            setting(SettingsChange::OpenRouterModel("openai/gpt-4o".to_string()))
        );
        assert_eq!(parse("/web on"), setting(SettingsChange::UseWeb(true)));
        assert_eq!(parse("/docs off"), setting(SettingsChange::UseDocs(false)));
        assert_eq!(parse("/execute maybe"), Command::Usage("/execute on|off"));
    }

    #[test]
    fn test_technology_and_filter() {
        assert_eq!(
            parse("/tech Docker"),
            Command::Dispatch(SessionEvent::SelectTechnology("docker".to_string()))
        );
        assert_eq!(
            parse("/filter claude 3"),
            Command::Dispatch(SessionEvent::FilterOpenRouter("claude 3".to_string()))
        );
        assert_eq!(
            parse("/filter"),
            Command::Dispatch(SessionEvent::FilterOpenRouter(String::new()))
        );
    }

    #[test]
    fn test_search_commands() {
        assert_eq!(
            parse("/search tokio select"),
            Command::Dispatch(SessionEvent::WebSearch {
                query: "tokio select".to_string(),
                num_results: DEFAULT_RESULT_COUNT,
            })
        );
        assert_eq!(parse("/docs-search"), Command::Usage("/docs-search <query>"));
        assert_eq!(
            parse("/docs-download"),
            Command::Dispatch(SessionEvent::DownloadDocs { technology: None })
        );
        assert_eq!(
            parse("/docs-download Python"),
            Command::Dispatch(SessionEvent::DownloadDocs {
                technology: Some("python".to_string())
            })
        );
    }

    #[test]
    fn test_recall_is_one_based() {
        assert_eq!(
            parse("/recall 1"),
            Command::Dispatch(SessionEvent::Recall(0))
        );
        assert_eq!(parse("/recall 0"), Command::Usage("/recall <n>"));
        assert_eq!(parse("/recall x"), Command::Usage("/recall <n>"));
    }

    #[test]
    fn test_unknown_slash_command() {
        assert_eq!(parse("/plan"), Command::Unknown("/plan".to_string()));
    }
}
