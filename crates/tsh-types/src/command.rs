//! Command text storage and the parsed-command hand-off type.

/// Maximum number of bytes of command text retained per job.
pub const MAX_LINE: usize = 1024;

/// Command line retained for `jobs`, `fg` and `bg` echoes.
///
/// Stored inline so a job slot can be cleared from a signal handler without
/// touching the allocator. Text longer than [`MAX_LINE`] bytes is truncated
/// on a character boundary.
#[derive(Clone, Copy)]
pub struct CommandText {
    buf: [u8; MAX_LINE],
    len: usize,
}

impl CommandText {
    pub fn new(text: &str) -> Self {
        let mut end = text.len().min(MAX_LINE);
        while !text.is_char_boundary(end) {
            end -= 1;
        }
        let mut buf = [0u8; MAX_LINE];
        buf[..end].copy_from_slice(&text.as_bytes()[..end]);
        Self { buf, len: end }
    }

    pub fn as_str(&self) -> &str {
        // Built only from a `&str` cut on a char boundary.
        std::str::from_utf8(&self.buf[..self.len]).unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl std::fmt::Display for CommandText {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::fmt::Debug for CommandText {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("CommandText").field(&self.as_str()).finish()
    }
}

impl PartialEq for CommandText {
    fn eq(&self, other: &Self) -> bool {
        self.as_str() == other.as_str()
    }
}

impl Eq for CommandText {}

impl From<&str> for CommandText {
    fn from(text: &str) -> Self {
        Self::new(text)
    }
}

/// A command as handed over by the parser: argv, mode and the typed text.
///
/// `argv` is never empty; [`ParsedCommand::new`] refuses to build one that is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedCommand {
    argv: Vec<String>,
    background: bool,
    text: String,
}

impl ParsedCommand {
    /// Returns `None` when `argv` holds no command word.
    pub fn new(argv: Vec<String>, background: bool, text: impl Into<String>) -> Option<Self> {
        if argv.is_empty() {
            return None;
        }
        Some(Self {
            argv,
            background,
            text: text.into(),
        })
    }

    /// Program or builtin name.
    pub fn name(&self) -> &str {
        self.argv.first().map_or("", String::as_str)
    }

    /// Name followed by its arguments.
    pub fn argv(&self) -> &[String] {
        &self.argv
    }

    /// Arguments after the name.
    pub fn args(&self) -> &[String] {
        self.argv.get(1..).unwrap_or_default()
    }

    /// Whether the line ended with an `&` word.
    pub fn is_background(&self) -> bool {
        self.background
    }

    /// The line as typed, without its trailing newline.
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn mode(&self) -> crate::LaunchMode {
        if self.background {
            crate::LaunchMode::Background
        } else {
            crate::LaunchMode::Foreground
        }
    }
}
