use std::io::{self, IsTerminal, Write};

use colored::Colorize;
use devcmd_core::transcript::{EntryId, EntryKind, TranscriptEntry, TranscriptSink};

/// Moves to the start of the current row, up `n` rows, and clears to the
/// end of the screen.
fn erase_lines(n: usize) -> String {
    format!("\r\x1b[{}A\x1b[J", n)
}

/// Prints transcript entries to the terminal as they are appended.
///
/// A removed entry is erased only while it is the last thing printed;
/// anything older stays in the scrollback.
pub struct TerminalRenderer<W: Write + Send> {
    out: W,
    erase_removed: bool,
    /// Last printed entry and the number of rows it took.
    last: Option<(EntryId, usize)>,
}

impl TerminalRenderer<io::Stdout> {
    pub fn stdout() -> Self {
        let out = io::stdout();
        let erase_removed = out.is_terminal();
        Self {
            out,
            erase_removed,
            last: None,
        }
    }
}

impl<W: Write + Send> TerminalRenderer<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            erase_removed: true,
            last: None,
        }
    }

    fn write(&mut self, text: &str) {
        if let Err(e) = write!(self.out, "{}", text).and_then(|_| self.out.flush()) {
            tracing::warn!("[Renderer] Failed to write: {}", e);
        }
    }
}

impl<W: Write + Send> TranscriptSink for TerminalRenderer<W> {
    fn appended(&mut self, entry: &TranscriptEntry) {
        let rendered = format_entry(entry.kind, &entry.message);
        self.write(&format!("{}\n", rendered));
        self.last = Some((entry.id, entry.message.lines().count().max(1)));
    }

    fn removed(&mut self, id: EntryId) {
        match self.last {
            Some((last_id, rows)) if last_id == id && self.erase_removed => {
                self.write(&erase_lines(rows));
                self.last = None;
            }
            _ => tracing::trace!("[Renderer] Entry {:?} left in scrollback", id),
        }
    }
}

/// Colours every line of a message according to its kind.
pub fn format_entry(kind: EntryKind, message: &str) -> String {
    message
        .lines()
        .enumerate()
        .map(|(i, line)| match kind {
            EntryKind::Command if i == 0 => format!("$ {}", line).green().bold().to_string(),
            EntryKind::Command => format!("  {}", line).green().to_string(),
            EntryKind::Output => line.bright_white().to_string(),
            EntryKind::Error => line.red().to_string(),
            EntryKind::Success => line.bright_green().to_string(),
            EntryKind::Info => line.bright_black().to_string(),
        })
        .collect::<Vec<_>>()
        .join("\n")
}
