// Console reporter: everything the operator reads goes through here.
// Output is written to any `Write` so tests can capture it; styling and
// spinners are only used when writing to an interactive terminal.

use std::fmt::Display;
use std::io::{self, IsTerminal, Stdout, Write};
use std::time::Duration;

use crossterm::style::Stylize;
use indicatif::{ProgressBar, ProgressStyle};

const RULE_WIDTH: usize = 70;

pub struct Reporter<W: Write> {
    out: W,
    color: bool,
    spinners: bool,
}

impl Reporter<Stdout> {
    /// Reporter on stdout. Color and spinners are dropped when stdout is
    /// not a terminal or `color` is false.
    pub fn stdout(color: bool) -> Self {
        let tty = io::stdout().is_terminal();
        Reporter {
            out: io::stdout(),
            color: color && tty,
            spinners: tty,
        }
    }
}

impl<W: Write> Reporter<W> {
    /// Plain reporter without color or spinners.
    pub fn new(out: W) -> Self {
        Reporter { out, color: false, spinners: false }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    /// Title between two `=` rules.
    pub fn banner(&mut self, title: &str) -> io::Result<()> {
        let rule = "=".repeat(RULE_WIDTH);
        writeln!(self.out, "{}", rule)?;
        if self.color {
            writeln!(self.out, "{}", title.bold())?;
        } else {
            writeln!(self.out, "{}", title)?;
        }
        writeln!(self.out, "{}", rule)
    }

    /// Numbered stage header, e.g. `[2] Planting a test tree...`.
    pub fn stage(&mut self, number: u8, title: &str) -> io::Result<()> {
        let tag = format!("[{}]", number);
        if self.color {
            writeln!(self.out, "\n{} {}", tag.cyan().bold(), title)
        } else {
            writeln!(self.out, "\n{} {}", tag, title)
        }
    }

    pub fn pass(&mut self, message: impl Display) -> io::Result<()> {
        if self.color {
            writeln!(self.out, "{} {}", "✅".green(), message)
        } else {
            writeln!(self.out, "✅ {}", message)
        }
    }

    pub fn fail(&mut self, message: impl Display) -> io::Result<()> {
        if self.color {
            writeln!(self.out, "{} {}", "❌".red(), message.to_string().red())
        } else {
            writeln!(self.out, "❌ {}", message)
        }
    }

    pub fn note(&mut self, message: impl Display) -> io::Result<()> {
        writeln!(self.out, "\n📝 {}", message)
    }

    /// Indented `label: value` line.
    pub fn detail(&mut self, label: &str, value: impl Display) -> io::Result<()> {
        if self.color {
            writeln!(self.out, "   {}: {}", label.dim(), value)
        } else {
            writeln!(self.out, "   {}: {}", label, value)
        }
    }

    /// `- label: value` at the given indentation depth.
    pub fn item(&mut self, depth: usize, label: &str, value: impl Display) -> io::Result<()> {
        let pad = "  ".repeat(depth + 1);
        writeln!(self.out, "{}  - {}: {}", pad, label, value)
    }

    pub fn line(&mut self, text: impl Display) -> io::Result<()> {
        writeln!(self.out, "{}", text)
    }

    pub fn blank(&mut self) -> io::Result<()> {
        writeln!(self.out)
    }

    /// Spinner shown while a request is in flight. Hidden unless stdout is a terminal.
    pub fn spinner(&self, message: &str) -> ProgressBar {
        if !self.spinners {
            return ProgressBar::hidden();
        }
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::with_template("{spinner} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        spinner.set_message(message.to_string());
        spinner.enable_steady_tick(Duration::from_millis(100));
        spinner
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(f: impl FnOnce(&mut Reporter<Vec<u8>>) -> io::Result<()>) -> String {
        let mut reporter = Reporter::new(Vec::new());
        f(&mut reporter).unwrap();
        String::from_utf8(reporter.into_inner()).unwrap()
    }

    #[test]
    fn banner_is_framed_by_rules() {
        let out = render(|r| r.banner("SUMMARY"));
        let lines: Vec<_> = out.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "=".repeat(70));
        assert_eq!(lines[1], "SUMMARY");
    }

    #[test]
    fn plain_output_has_no_escape_codes() {
        let out = render(|r| {
            r.stage(1, "Testing Login...")?;
            r.pass("Login successful")?;
            r.fail("Login failed: 401 Unauthorized")?;
            r.detail("User ID", 7)
        });
        assert!(!out.contains('\u{1b}'));
        assert_eq!(
            out,
            "\n[1] Testing Login...\n✅ Login successful\n❌ Login failed: 401 Unauthorized\n   User ID: 7\n"
        );
    }

    #[test]
    fn items_indent_by_depth() {
        let out = render(|r| {
            r.item(0, "id", 1)?;
            r.item(1, "id", 2)
        });
        assert_eq!(out, "    - id: 1\n      - id: 2\n");
    }

    #[test]
    fn spinner_is_hidden_off_terminal() {
        let reporter = Reporter::new(Vec::new());
        assert!(reporter.spinner("Logging in...").is_hidden());
    }
}
