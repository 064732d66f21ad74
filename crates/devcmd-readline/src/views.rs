//! Listings for `/model`, `/tech`, `/history` and the other read-only
//! commands. Each returns the lines to print.

use std::collections::HashMap;

use colored::Colorize;
use devcmd_core::history::HistoryPanel;
use devcmd_core::selection::{ALL_TECHNOLOGIES, ModelOption, capitalize};
use devcmd_core::session::SessionController;

use crate::commands::View;

const HELP: &[(&str, &str)] = &[
    ("<text>", "Ask the assistant"),
    ("/model [id]", "List models or select one"),
    ("/openrouter [id]", "List OpenRouter models or select one"),
    ("/filter [text]", "Filter the OpenRouter list"),
    ("/tech [name|all]", "List technologies or set the filter"),
    ("/execute on|off", "Let the backend run generated commands"),
    ("/web on|off", "Augment answers with web search"),
    ("/docs on|off", "Augment answers with local documentation"),
    ("/search <query>", "Search the web"),
    ("/docs-search <query>", "Search the selected technology's docs"),
    ("/docs-download [tech]", "Download documentation"),
    ("/status", "Show backend capabilities"),
    ("/refresh", "Re-check backend capabilities"),
    ("/history [reload]", "Show or reload command history"),
    ("/recall <n>", "Put history item n back into the prompt"),
    ("/voice", "Start or stop voice input"),
    ("/settings", "Show current settings"),
    ("quit", "Exit"),
];

pub fn render(view: View, controller: &SessionController) -> Vec<String> {
    match view {
        View::Help => help(),
        View::Models => models(controller),
        View::OpenRouter => openrouter(controller),
        View::Technologies => technologies(controller),
        View::Status => status(controller),
        View::History => history(controller),
        View::Settings => settings(controller),
    }
}

fn help() -> Vec<String> {
    HELP.iter()
        .map(|(usage, description)| {
            format!("  {:<24} {}", usage.bright_cyan(), description.bright_black())
        })
        .collect()
}

fn model_line(option: &ModelOption, selected: bool) -> String {
    let marker = if selected { "*" } else { " " };
    let mut line = format!("{} {:<36} {}", marker, option.id, option.label);
    if let Some(title) = &option.title {
        line.push_str(&format!(" ({})", title));
    }
    if !option.enabled {
        return line.bright_black().strikethrough().to_string();
    }
    if selected {
        return line.bright_green().to_string();
    }
    line
}

fn models(controller: &SessionController) -> Vec<String> {
    let selector = controller.models();
    selector
        .options()
        .iter()
        .map(|option| model_line(option, option.id == selector.selected()))
        .collect()
}

fn openrouter(controller: &SessionController) -> Vec<String> {
    let picker = controller.openrouter();
    let mut lines = Vec::new();
    if !controller.openrouter_visible() {
        lines.push(
            "OpenRouter models apply only while the openrouter model is selected."
                .yellow()
                .to_string(),
        );
    }
    if !picker.filter().is_empty() {
        lines.push(format!("Filter: {}", picker.filter()).bright_black().to_string());
    }
    let visible: Vec<String> = picker
        .visible_options()
        .map(|option| model_line(option, option.id == picker.selected()))
        .collect();
    if visible.is_empty() {
        lines.push("No OpenRouter models match the filter.".bright_black().to_string());
    }
    lines.extend(visible);
    lines
}

fn technologies(controller: &SessionController) -> Vec<String> {
    let bar = controller.tech_bar();
    let docs = &controller.state().capabilities;
    let mut lines = vec![highlight(ALL_TECHNOLOGIES, bar.highlighted() == ALL_TECHNOLOGIES)];
    lines.extend(controller.technologies().iter().map(|tech| {
        let mut line = highlight(tech, bar.highlighted() == tech);
        if docs.is_docs_available(tech) {
            line.push_str(&" [docs]".bright_black().to_string());
        }
        line
    }));
    if let Some(badge) = bar.badge() {
        lines.push(format!("Selected: {}", badge).bright_cyan().to_string());
    }
    lines
}

fn highlight(tech: &str, on: bool) -> String {
    if on {
        format!("* {}", tech).bright_green().to_string()
    } else {
        format!("  {}", tech)
    }
}

fn availability_lines(title: &str, map: &HashMap<String, bool>) -> Vec<String> {
    let mut lines = vec![title.bold().to_string()];
    if map.is_empty() {
        lines.push("  (none reported)".bright_black().to_string());
        return lines;
    }
    let mut entries: Vec<_> = map.iter().collect();
    entries.sort();
    lines.extend(entries.into_iter().map(|(name, &available)| {
        if available {
            format!("  {:<16} {}", name, "yes".green())
        } else {
            format!("  {:<16} {}", name, "no".red())
        }
    }));
    lines
}

fn status(controller: &SessionController) -> Vec<String> {
    let capabilities = &controller.state().capabilities;
    let mut lines = availability_lines("Documentation", &capabilities.docs);
    lines.extend(availability_lines("Model APIs", &capabilities.apis));
    lines.extend(availability_lines("Local models", &capabilities.local_models));
    let speech_model = match capabilities.speech_model {
        Some(true) => "yes".green().to_string(),
        Some(false) => "no".red().to_string(),
        None => "unknown".bright_black().to_string(),
    };
    lines.push(format!("{} {}", "Speech model:".bold(), speech_model));
    lines
}

fn history(controller: &SessionController) -> Vec<String> {
    match controller.history().render() {
        HistoryPanel::Empty(message) => vec![message.bright_black().to_string()],
        HistoryPanel::Items(items) => items
            .into_iter()
            .enumerate()
            .flat_map(|(i, item)| {
                [
                    format!(
                        "{:>3}. {} {}",
                        i + 1,
                        item.technology.bright_cyan(),
                        item.time.bright_black()
                    ),
                    format!("     $ {}", item.command).green().to_string(),
                    format!("     {}", first_line(&item.response)),
                ]
            })
            .collect(),
    }
}

fn first_line(text: &str) -> &str {
    text.lines().next().unwrap_or_default()
}

fn on_off(value: bool) -> String {
    if value {
        "on".green().to_string()
    } else {
        "off".red().to_string()
    }
}

fn settings(controller: &SessionController) -> Vec<String> {
    let toggles = controller.toggles();
    let mut lines = vec![format!("Model:       {}", controller.models().selected())];
    if controller.openrouter_visible() {
        lines.push(format!("OpenRouter:  {}", controller.openrouter().selected()));
    }
    let technology = controller
        .state()
        .selected_technology
        .as_deref()
        .map(capitalize)
        .unwrap_or_else(|| "All".to_string());
    lines.push(format!("Technology:  {}", technology));
    lines.push(format!("Execute:     {}", on_off(toggles.execute_commands)));
    lines.push(format!("Web search:  {}", on_off(toggles.use_web)));
    lines.push(format!("Local docs:  {}", on_off(toggles.use_docs)));
    let voice = if !controller.speech().is_enabled() {
        "unavailable".bright_black().to_string()
    } else if controller.state().listening {
        "listening".bright_red().to_string()
    } else {
        "idle".to_string()
    };
    lines.push(format!("Voice:       {}", voice));
    lines
}
