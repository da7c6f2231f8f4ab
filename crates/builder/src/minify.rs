//! Built-in minifier.
//!
//! Conservative by construction: it never rewrites tokens, so its output is
//! valid wherever the input was. Comment lines go, each line is trimmed and
//! blank lines are dropped. With `compress`, interior whitespace runs outside
//! string and regex literals collapse to one space.

use sdkpack_core::error::TransformError;
use sdkpack_core::minifier::{Minifier, MinifyOptions};

use crate::transform::strip::{split_lines, strip_comment_lines};

#[derive(Debug, Clone, Copy, Default)]
pub struct BasicMinifier;

impl Minifier for BasicMinifier {
    fn name(&self) -> &str {
        "basic"
    }

    fn minify(&self, code: &str, options: &MinifyOptions) -> Result<String, TransformError> {
        let stripped = strip_comment_lines(code);
        let lines: Vec<String> = split_lines(&stripped)
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(|line| {
                if options.compress {
                    collapse_whitespace(line)
                } else {
                    line.to_string()
                }
            })
            .collect();
        Ok(lines.join("\n"))
    }
}

/// Lexical context of the scanner in [`collapse_whitespace`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Context {
    Code,
    Quoted(char),
    Regex { in_class: bool },
}

/// Keywords after which a `/` starts a regex literal rather than a division.
const REGEX_PREFIX_KEYWORDS: &[&str] = &[
    "return", "typeof", "instanceof", "in", "of", "new", "delete", "void", "throw", "case",
    "do", "else", "yield", "await",
];

fn collapse_whitespace(line: &str) -> String {
    let mut out = String::with_capacity(line.len());
    let mut context = Context::Code;
    let mut escaped = false;
    let mut pending_space = false;
    let mut chars = line.char_indices().peekable();

    while let Some((i, c)) = chars.next() {
        match context {
            Context::Quoted(q) => {
                out.push(c);
                if escaped {
                    escaped = false;
                } else if c == '\\' {
                    escaped = true;
                } else if c == q {
                    context = Context::Code;
                }
                continue;
            }
            Context::Regex { in_class } => {
                out.push(c);
                if escaped {
                    escaped = false;
                } else if c == '\\' {
                    escaped = true;
                } else if c == '[' {
                    context = Context::Regex { in_class: true };
                } else if c == ']' {
                    context = Context::Regex { in_class: false };
                } else if c == '/' && !in_class {
                    context = Context::Code;
                }
                continue;
            }
            Context::Code => {}
        }

        if c.is_whitespace() {
            pending_space = true;
            continue;
        }

        // A trailing comment is kept verbatim
        if c == '/' && matches!(chars.peek(), Some((_, '/' | '*'))) {
            if pending_space {
                out.push(' ');
            }
            out.push_str(&line[i..]);
            return out;
        }

        if pending_space {
            out.push(' ');
            pending_space = false;
        }
        match c {
            '\'' | '"' | '`' => context = Context::Quoted(c),
            '/' if regex_may_start(&out) => context = Context::Regex { in_class: false },
            _ => {}
        }
        out.push(c);
    }

    out
}

/// Whether a `/` following `before` opens a regex literal.
fn regex_may_start(before: &str) -> bool {
    let before = before.trim_end();
    let Some(last) = before.chars().next_back() else {
        return true;
    };
    if matches!(last, ')' | ']') {
        return false;
    }
    if last.is_alphanumeric() || last == '_' || last == '$' {
        let word_start = before
            .rfind(|c: char| !(c.is_alphanumeric() || c == '_' || c == '$'))
            .map_or(0, |i| i + 1);
        return REGEX_PREFIX_KEYWORDS.contains(&&before[word_start..]);
    }
    true
}
