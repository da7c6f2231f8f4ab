//! Line-level comment stripping.
//!
//! This is a textual classifier, not a JavaScript parser: a line whose first
//! non-blank characters open a comment is treated as a comment even when it
//! sits inside a template literal.

/// Split on `\n`, dropping a trailing `\r` from each line.
pub(crate) fn split_lines(code: &str) -> impl Iterator<Item = &str> {
    code.split('\n').map(|line| line.strip_suffix('\r').unwrap_or(line))
}

/// Drop `//` comment lines and block comments that start a line.
///
/// Code following a block comment's closing `*/` on the same line is kept.
/// Every other line survives unchanged and in order.
pub fn strip_comment_lines(code: &str) -> String {
    let mut in_block = false;
    let mut kept: Vec<&str> = Vec::new();

    for line in split_lines(code) {
        let trimmed = line.trim_start();
        let mut out = Some(line);

        if trimmed.starts_with("//") {
            out = None;
        } else if trimmed.starts_with("/*") {
            in_block = true;
            out = None;
        }

        if in_block {
            out = match line.find("*/") {
                Some(end) => {
                    in_block = false;
                    Some(&line[end + 2..])
                }
                None => None,
            };
        }

        if let Some(line) = out {
            kept.push(line);
        }
    }

    kept.join("\n")
}
