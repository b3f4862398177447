//! rustyline helper: completion, hints and highlighting for the REPL.

use crate::commands::{QUIT_WORDS, SLASH_COMMANDS};
use colored::Colorize;
use rustyline::completion::{Completer, FilenameCompleter, Pair};
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::validate::Validator;
use rustyline::{Context, Helper};
use std::borrow::Cow::{self, Borrowed, Owned};

const MODES: &[&str] = &["texto", "imagen"];

pub struct CliHelper {
    commands: Vec<&'static str>,
    files: FilenameCompleter,
}

impl CliHelper {
    pub fn new() -> Self {
        Self {
            commands: SLASH_COMMANDS
                .iter()
                .map(|(name, _)| *name)
                .chain(QUIT_WORDS.iter().copied())
                .collect(),
            files: FilenameCompleter::new(),
        }
    }
}

fn pairs<'a>(candidates: impl Iterator<Item = &'a str>) -> Vec<Pair> {
    candidates
        .map(|candidate| Pair {
            display: candidate.to_string(),
            replacement: candidate.to_string(),
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
        ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let head = &line[..pos];

        if head.starts_with("/imagen ") {
            return self.files.complete(line, pos, ctx);
        }

        if let Some(arg) = head.strip_prefix("/modo ") {
            let start = pos - arg.len();
            return Ok((start, pairs(MODES.iter().copied().filter(|m| m.starts_with(arg)))));
        }

        if head.starts_with('/') && !head.contains(' ') {
            let candidates = self
                .commands
                .iter()
                .copied()
                .filter(|cmd| cmd.starts_with(head));
            return Ok((0, pairs(candidates)));
        }

        Ok((0, vec![]))
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

    fn highlight_hint<'h>(&self, hint: &'h str) -> Cow<'h, str> {
        Owned(hint.bright_black().to_string())
    }

    fn highlight_char(&self, _line: &str, _pos: usize, _forced: bool) -> bool {
        true
    }
}

impl Hinter for CliHelper {
    type Hint = String;

    fn hint(&self, line: &str, pos: usize, _ctx: &Context<'_>) -> Option<String> {
        let head = &line[..pos];

        if head.starts_with('/') && !head.contains(' ') {
            self.commands
                .iter()
                .find(|cmd| cmd.starts_with(head) && cmd.len() > head.len())
                .map(|cmd| cmd[head.len()..].to_string())
        } else {
            None
        }
    }
}

impl Validator for CliHelper {}
