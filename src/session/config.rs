//! Session configuration.

use serde::Deserialize;

use crate::error::Error;

/// Feature switches and texts for one [`Session`](super::Session).
///
/// Every field has a default, so a JSON document only needs to name what it
/// changes:
///
/// ```rust
/// use ushell::session::Config;
///
/// let config = Config::from_json(br#"{"auth":true,"prompt_text":"dev> "}"#).unwrap();
/// assert!(config.auth);
/// assert!(config.echo);
/// assert_eq!(config.prompt_text, "dev> ");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config<'a> {
    /// Require a password before accepting commands.
    pub auth: bool,
    /// Echo typed characters back to the terminal.
    pub echo: bool,
    /// Print the prompt before each line.
    pub prompt: bool,
    /// Record entered lines and allow up/down recall.
    pub history: bool,
    /// Complete command names on TAB.
    pub autocomplete: bool,
    /// Answer `<cmd> -h`/`--help` and the built-in `help` listing.
    pub help: bool,
    /// Render the prompt in color.
    pub color: bool,
    /// Prompt text.
    pub prompt_text: &'a str,
    /// Text printed when the session (re)starts.
    pub banner: &'a str,
    /// Pause between two polls of [`Session::run`](super::Session::run).
    pub poll_interval_ms: u32,
}

impl Default for Config<'_> {
    fn default() -> Self {
        Self {
            auth: false,
            echo: true,
            prompt: true,
            history: true,
            autocomplete: true,
            help: true,
            color: false,
            prompt_text: "ushell> ",
            banner: "\r\nuShell ready. Press Enter to start.\r\n",
            poll_interval_ms: 10,
        }
    }
}

impl<'a> Config<'a> {
    /// Parse a JSON document. Strings are borrowed from `json`.
    ///
    /// Borrowed strings are not unescaped, so texts carrying JSON escapes
    /// such as `\r\n` are refused instead of reaching the terminal raw.
    ///
    /// # Returns
    ///
    /// * `Err(Error::Config)` - the document is malformed, has wrong types, or
    ///   a text field contains an escape
    pub fn from_json(json: &'a [u8]) -> Result<Self, Error> {
        let (config, _): (Self, usize) =
            serde_json_core::from_slice(json).map_err(|_| Error::Config)?;
        if has_escape(config.prompt_text) || has_escape(config.banner) {
            return Err(Error::Config);
        }
        Ok(config)
    }
}

fn has_escape(text: &str) -> bool {
    text.contains('\\')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert!(!config.auth);
        assert!(config.echo && config.prompt && config.history);
        assert_eq!(config.prompt_text, "ushell> ");
    }

    #[test]
    fn test_from_json_partial() {
        let config = Config::from_json(br#"{"echo":false,"poll_interval_ms":50}"#).unwrap();
        assert!(!config.echo);
        assert_eq!(config.poll_interval_ms, 50);
        assert!(config.autocomplete);
    }

    #[test]
    fn test_from_json_rejects_garbage() {
        assert_eq!(Config::from_json(b"{\"echo\":"), Err(Error::Config));
        assert_eq!(Config::from_json(br#"{"echo":"yes"}"#), Err(Error::Config));
    }

    #[test]
    fn test_from_json_rejects_escaped_texts() {
        assert_eq!(
            Config::from_json(br#"{"banner":"\r\nboard v1\r\n"}"#),
            Err(Error::Config)
        );
        assert_eq!(
            Config::from_json(br#"{"prompt_text":"a\"b> "}"#),
            Err(Error::Config)
        );
    }

    #[test]
    fn test_from_json_keeps_plain_texts() {
        let config = Config::from_json(br#"{"banner":"board v1","prompt_text":"$ "}"#).unwrap();
        assert_eq!(config.banner, "board v1");
        assert_eq!(config.prompt_text, "$ ");
    }
}
