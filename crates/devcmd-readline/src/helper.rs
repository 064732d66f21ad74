use std::borrow::Cow::{self, Borrowed, Owned};

use colored::Colorize;
use devcmd_core::selection::ALL_TECHNOLOGIES;
use devcmd_infrastructure::AppConfig;
use rustyline::completion::{Completer, Pair};
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::validate::Validator;
use rustyline::{Context, Helper};

use crate::commands::SLASH_COMMANDS;

/// Rustyline helper: completes slash commands and their arguments,
/// highlights commands and hints the rest of a command name.
#[derive(Clone)]
pub struct CliHelper {
    commands: Vec<String>,
    models: Vec<String>,
    openrouter_models: Vec<String>,
    technologies: Vec<String>,
}

impl CliHelper {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            commands: SLASH_COMMANDS.iter().map(|c| c.to_string()).collect(),
            models: config.models.iter().map(|m| m.id.clone()).collect(),
            openrouter_models: config.openrouter_models.iter().map(|m| m.id.clone()).collect(),
            technologies: std::iter::once(ALL_TECHNOLOGIES.to_string())
                .chain(config.technologies.iter().cloned())
                .collect(),
        }
    }

    fn arguments(&self, command: &str) -> &[String] {
        match command {
            "/model" => &self.models,
            "/openrouter" => &self.openrouter_models,
            "/tech" | "/docs-download" => &self.technologies,
            _ => &[],
        }
    }
}

fn pairs<'a>(candidates: impl Iterator<Item = &'a String>, prefix: &str) -> Vec<Pair> {
    candidates
        .filter(|candidate| candidate.starts_with(prefix))
        .map(|candidate| Pair {
            display: candidate.clone(),
            replacement: candidate.clone(),
        })
        .collect()
}

impl Helper for CliHelper {}

impl Completer for CliHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let line = &line[..pos];

        if !line.starts_with('/') {
            return Ok((0, vec![]));
        }

        match line.split_once(' ') {
            None => Ok((0, pairs(self.commands.iter(), line))),
            Some((command, arg)) => {
                let start = command.len() + 1;
                Ok((start, pairs(self.arguments(command).iter(), arg)))
            }
        }
    }
}

impl Highlighter for CliHelper {
    fn highlight<'l>(&self, line: &'l str, _pos: usize) -> Cow<'l, str> {
        if line.starts_with('/') {
            Owned(line.bright_cyan().to_string())
        } else {
            Borrowed(line)
        }
    }

    fn highlight_char(&self, _line: &str, _pos: usize, _forced: bool) -> bool {
        true
    }
}

impl Hinter for CliHelper {
    type Hint = String;

    fn hint(&self, line: &str, pos: usize, _ctx: &Context<'_>) -> Option<String> {
        let line = &line[..pos];

        if line.starts_with('/') && !line.contains(' ') {
            self.commands
                .iter()
                .find(|cmd| cmd.starts_with(line) && cmd.len() > line.len())
                .map(|cmd| cmd[line.len()..].to_string())
        } else {
            None
        }
    }
}

impl Validator for CliHelper {}
