//! Command-line parser for tsh.
//!
//! The grammar is deliberately tiny:
//!
//! - words are separated by spaces and tabs
//! - a word opening with `'` runs to the next `'`, spaces included
//! - a final word starting with `&` selects background mode and is dropped
//!
//! There are no pipes, redirections or variable expansion.

use tsh_types::ParsedCommand;

/// Parse one input line.
///
/// Returns `None` for lines with no command word, including a lone `&`.
/// The command text keeps the line as typed, minus its line terminator.
pub fn parse_line(line: &str) -> Option<ParsedCommand> {
    let text = line.trim_end_matches(['\n', '\r']);
    let mut argv = split_words(text);

    let background = argv.last().is_some_and(|word| word.starts_with('&'));
    if background {
        argv.pop();
    }
    ParsedCommand::new(argv, background, text)
}

fn split_words(text: &str) -> Vec<String> {
    let mut words = Vec::new();
    let mut rest = text;

    loop {
        rest = rest.trim_start_matches(is_blank);
        if rest.is_empty() {
            break;
        }

        let (word, tail) = if let Some(quoted) = rest.strip_prefix('\'') {
            // An unterminated quote takes the rest of the line.
            match quoted.find('\'') {
                Some(end) => (&quoted[..end], &quoted[end + 1..]),
                None => (quoted, ""),
            }
        } else {
            match rest.find(is_blank) {
                Some(end) => (&rest[..end], &rest[end..]),
                None => (rest, ""),
            }
        };
        words.push(word.to_string());
        rest = tail;
    }
    words
}

fn is_blank(c: char) -> bool {
    c == ' ' || c == '\t'
}
