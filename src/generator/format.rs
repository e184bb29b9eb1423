//! Pretty-printing of generated declarations.
//!
//! [`BuiltinFormatter`] covers the subset of TypeScript the generator emits:
//! brace-delimited blocks, one statement or member per line. Anything richer
//! goes through [`CommandFormatter`] and an external tool such as prettier.

use crate::config::FormatterConfig;
use crate::error::{DbError, DbResult};
use serde::{Deserialize, Serialize};
use std::process::Stdio;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::process::Command;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EndOfLine {
    /// Keep whatever the input uses
    #[default]
    Auto,
    Lf,
    Crlf,
    Cr,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FormatterOptions {
    pub tab_width: usize,
    pub use_tabs: bool,
    /// Terminate statements and members with `;`
    pub semi: bool,
    pub single_quote: bool,
    pub end_of_line: EndOfLine,
}

impl Default for FormatterOptions {
    fn default() -> Self {
        Self {
            tab_width: 4,
            use_tabs: false,
            semi: true,
            single_quote: true,
            end_of_line: EndOfLine::Auto,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct BuiltinFormatter {
    options: FormatterOptions,
}

impl BuiltinFormatter {
    pub fn new(options: FormatterOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &FormatterOptions {
        &self.options
    }

    pub fn format(&self, text: &str) -> DbResult<String> {
        let newline = match self.options.end_of_line {
            EndOfLine::Auto if text.contains("\r\n") => "\r\n",
            EndOfLine::Auto | EndOfLine::Lf => "\n",
            EndOfLine::Crlf => "\r\n",
            EndOfLine::Cr => "\r",
        };
        let indent_unit = if self.options.use_tabs {
            "\t".to_string()
        } else {
            " ".repeat(self.options.tab_width)
        };

        let mut lines: Vec<String> = Vec::new();
        let mut depth: usize = 0;
        let mut previous_blank = true;

        for (number, raw) in text.lines().enumerate() {
            let trimmed = raw.trim();
            if trimmed.is_empty() {
                if !previous_blank {
                    lines.push(String::new());
                }
                previous_blank = true;
                continue;
            }
            previous_blank = false;

            let is_comment = trimmed.starts_with("//");
            let mut line = if is_comment {
                trimmed.to_string()
            } else {
                normalize_quotes(trimmed, self.options.single_quote)
            };

            let (opens, closes, leading_closes) = if is_comment {
                (0, 0, 0)
            } else {
                count_braces(&line)
            };
            let level = depth.checked_sub(leading_closes).ok_or_else(|| {
                DbError::format(format!("unbalanced braces at line {}", number + 1))
            })?;
            depth = (depth + opens).checked_sub(closes).ok_or_else(|| {
                DbError::format(format!("unbalanced braces at line {}", number + 1))
            })?;

            if !is_comment {
                line = self.terminate(line);
            }
            lines.push(format!("{}{}", indent_unit.repeat(level), line));
        }

        if depth != 0 {
            return Err(DbError::format(format!(
                "unbalanced braces: {} block(s) left open",
                depth
            )));
        }
        while lines.last().is_some_and(|l| l.is_empty()) {
            lines.pop();
        }

        let mut out = lines.join(newline);
        out.push_str(newline);
        Ok(out)
    }

    fn terminate(&self, line: String) -> String {
        let opens_or_closes_block = line.ends_with('{') || line.ends_with('}');
        if opens_or_closes_block || line.ends_with(',') {
            return line;
        }
        match (self.options.semi, line.strip_suffix(';')) {
            (true, Some(_)) => line,
            (true, None) => line + ";",
            (false, Some(stripped)) => stripped.to_string(),
            (false, None) => line,
        }
    }
}

/// Count `{` and `}` outside string literals. The third value is the number
/// of `}` before any other token on the line.
fn count_braces(line: &str) -> (usize, usize, usize) {
    let mut opens = 0;
    let mut closes = 0;
    let mut leading = 0;
    let mut at_start = true;
    let mut quote: Option<char> = None;
    let mut escaped = false;

    for c in line.chars() {
        if let Some(q) = quote {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == q {
                quote = None;
            }
            continue;
        }
        match c {
            '\'' | '"' | '`' => {
                quote = Some(c);
                at_start = false;
            }
            '{' => {
                opens += 1;
                at_start = false;
            }
            '}' => {
                closes += 1;
                if at_start {
                    leading += 1;
                }
            }
            c if c.is_whitespace() => {}
            _ => at_start = false,
        }
    }
    (opens, closes, leading)
}

/// Rewrite string literals to the preferred quote where that needs no escaping.
fn normalize_quotes(line: &str, single_quote: bool) -> String {
    let (preferred, other) = if single_quote {
        ('\'', '"')
    } else {
        ('"', '\'')
    };
    let chars: Vec<char> = line.chars().collect();
    let mut out = String::with_capacity(line.len());
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        if c != '\'' && c != '"' && c != '`' {
            out.push(c);
            i += 1;
            continue;
        }

        let mut end = i + 1;
        let mut escaped = false;
        while end < chars.len() {
            if escaped {
                escaped = false;
            } else if chars[end] == '\\' {
                escaped = true;
            } else if chars[end] == c {
                break;
            }
            end += 1;
        }
        if end >= chars.len() {
            // Unterminated literal; leave the rest alone
            out.extend(&chars[i..]);
            break;
        }

        let body: String = chars[i + 1..end].iter().collect();
        if c == other && !body.contains(preferred) && !body.contains('\\') {
            out.push(preferred);
            out.push_str(&body);
            out.push(preferred);
        } else {
            out.push(c);
            out.push_str(&body);
            out.push(c);
        }
        i = end + 1;
    }
    out
}

/// Formats by piping text through an external program.
#[derive(Debug, Clone)]
pub struct CommandFormatter {
    program: String,
    args: Vec<String>,
}

impl CommandFormatter {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    pub async fn format(&self, text: &str) -> DbResult<String> {
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| DbError::format(format!("failed to start '{}': {}", self.program, e)))?;

        let (Some(mut stdin), Some(mut stdout), Some(mut stderr)) =
            (child.stdin.take(), child.stdout.take(), child.stderr.take())
        else {
            return Err(DbError::format("formatter pipes unavailable"));
        };

        let input = text.as_bytes().to_vec();
        let write = async move {
            stdin.write_all(&input).await?;
            stdin.shutdown().await
        };
        let mut output = Vec::new();
        let mut errors = Vec::new();
        let (written, read_out, read_err) = tokio::join!(
            write,
            stdout.read_to_end(&mut output),
            stderr.read_to_end(&mut errors)
        );
        written?;
        read_out?;
        read_err?;

        let status = child.wait().await?;
        if !status.success() {
            return Err(DbError::format(format!(
                "'{}' exited with {}: {}",
                self.program,
                status,
                String::from_utf8_lossy(&errors).trim()
            )));
        }

        String::from_utf8(output)
            .map_err(|e| DbError::format(format!("formatter output is not UTF-8: {}", e)))
    }
}

pub enum Formatter {
    Builtin(BuiltinFormatter),
    Command(CommandFormatter),
}

impl Formatter {
    pub fn from_config(config: &FormatterConfig) -> Self {
        match config {
            FormatterConfig::Builtin(options) => {
                Self::Builtin(BuiltinFormatter::new(options.clone()))
            }
            FormatterConfig::Command { program, args } => {
                Self::Command(CommandFormatter::new(program.clone(), args.clone()))
            }
        }
    }

    pub async fn format(&self, text: &str) -> DbResult<String> {
        match self {
            Self::Builtin(f) => f.format(text),
            Self::Command(f) => f.format(text).await,
        }
    }
}

impl Default for Formatter {
    fn default() -> Self {
        Self::Builtin(BuiltinFormatter::default())
    }
}

pub async fn format_types(text: &str, formatter: &Formatter) -> DbResult<String> {
    formatter.format(text).await
}
