//! Console transport implementation

use crate::core::{LogLevel, OutputFormat, ProcessedLogEntry, Result, Transport};
#[cfg(feature = "console")]
use colored::Colorize;

pub struct ConsoleTransport {
    use_colors: bool,
    output_format: OutputFormat,
}

impl ConsoleTransport {
    pub fn new() -> Self {
        Self {
            use_colors: cfg!(feature = "console"),
            output_format: OutputFormat::default(),
        }
    }

    pub fn with_colors(use_colors: bool) -> Self {
        Self {
            use_colors,
            output_format: OutputFormat::default(),
        }
    }

    /// One JSON object per line on stdout, no colors
    pub fn json() -> Self {
        Self {
            use_colors: false,
            output_format: OutputFormat::Json,
        }
    }

    /// Set the output format for this transport
    ///
    /// # Example
    ///
    /// ```
    /// use rust_redacting_logger::transports::ConsoleTransport;
    /// use rust_redacting_logger::OutputFormat;
    ///
    /// let transport = ConsoleTransport::new()
    ///     .with_output_format(OutputFormat::Logfmt);
    /// ```
    #[must_use]
    pub fn with_output_format(mut self, format: OutputFormat) -> Self {
        self.output_format = format;
        self
    }

    pub fn output_format(&self) -> OutputFormat {
        self.output_format
    }

    /// Render an entry the way `send` prints it
    pub fn render(&self, entry: &ProcessedLogEntry) -> String {
        match self.output_format {
            OutputFormat::Text => self.format_text(entry),
            OutputFormat::Json | OutputFormat::Logfmt => self.output_format.format(entry),
        }
    }

    /// Format as text with optional colors on the level tag
    fn format_text(&self, entry: &ProcessedLogEntry) -> String {
        let line = OutputFormat::Text.format(entry);
        if !self.use_colors {
            return line;
        }

        #[cfg(feature = "console")]
        {
            let tag = format!("[{}]", entry.level);
            if let Some(rest) = line.strip_prefix(tag.as_str()) {
                return format!("{}{}", tag.color(entry.level.color_code()), rest);
            }
        }

        line
    }
}

impl Default for ConsoleTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for ConsoleTransport {
    fn send(&self, entry: &ProcessedLogEntry) -> Result<()> {
        let output = self.render(entry);

        // Text errors go to stderr; structured output stays on stdout for collectors
        match (self.output_format, entry.level) {
            (OutputFormat::Text, LogLevel::Error) => eprintln!("{}", output),
            _ => println!("{}", output),
        }
        Ok(())
    }

    fn name(&self) -> &str {
        match self.output_format {
            OutputFormat::Json => "console-json",
            _ => "console",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Map, Value};

    fn entry(message: &str) -> ProcessedLogEntry {
        ProcessedLogEntry::new("app", LogLevel::Warn, message, Map::new())
    }

    #[test]
    fn test_plain_text_render() {
        let transport = ConsoleTransport::with_colors(false);
        assert_eq!(transport.render(&entry("disk low")), "[warn] app: disk low");
    }

    #[test]
    fn test_json_render_uses_msg() {
        let transport = ConsoleTransport::json();
        let parsed: Value = serde_json::from_str(&transport.render(&entry("disk low"))).unwrap();

        assert_eq!(parsed["msg"], "disk low");
        assert_eq!(parsed["level"], "warn");
        assert_eq!(transport.name(), "console-json");
    }

    #[test]
    fn test_send_never_fails() {
        let transport = ConsoleTransport::new();
        assert!(transport.send(&entry("hello")).is_ok());
    }
}
