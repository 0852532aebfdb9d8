//! Output trait for rendering reports to different formats.

/// Target output for reports.
///
/// Reports describe *what* to output using these semantic methods.
/// Implementations decide *how* to render (terminal, JSON, HTML, etc).
pub trait Output {
    /// Start a new section with a heading.
    fn section(&mut self, name: &str);

    /// Render an indented key-value pair.
    fn key_value_indented(&mut self, key: &str, value: &str);

    /// Render a list item at the given nesting depth (1 = top level).
    fn item(&mut self, depth: usize, text: &str);

    /// Render a diagnostic message. Diagnostics go to stderr on a terminal.
    fn diagnostic(&mut self, msg: &str);

    /// Render a block of preformatted text.
    fn preformatted(&mut self, text: &str);

    /// Render a blank line.
    fn newline(&mut self);
}

/// A report that can render itself to an output.
pub trait Report {
    /// Render this report to the given output.
    fn render(&self, out: &mut dyn Output);
}

/// Terminal output implementation.
pub struct TerminalOutput;

impl TerminalOutput {
    pub fn new() -> Self {
        Self
    }
}

impl Default for TerminalOutput {
    fn default() -> Self {
        Self::new()
    }
}

impl Output for TerminalOutput {
    fn section(&mut self, name: &str) {
        println!("{}", name);
    }

    fn key_value_indented(&mut self, key: &str, value: &str) {
        println!("  {}: {}", key, value);
    }

    fn item(&mut self, depth: usize, text: &str) {
        println!("{:indent$}{}", "", text, indent = depth * 2);
    }

    fn diagnostic(&mut self, msg: &str) {
        eprintln!("{}", msg);
    }

    fn preformatted(&mut self, text: &str) {
        println!("{}", text);
    }

    fn newline(&mut self) {
        println!();
    }
}

/// Output that records every line, for tests.
#[cfg(test)]
#[derive(Debug, Default)]
pub struct BufferOutput {
    pub stdout: Vec<String>,
    pub stderr: Vec<String>,
}

#[cfg(test)]
impl Output for BufferOutput {
    fn section(&mut self, name: &str) {
        self.stdout.push(name.to_string());
    }

    fn key_value_indented(&mut self, key: &str, value: &str) {
        self.stdout.push(format!("  {}: {}", key, value));
    }

    fn item(&mut self, depth: usize, text: &str) {
        self.stdout
            .push(format!("{:indent$}{}", "", text, indent = depth * 2));
    }

    fn diagnostic(&mut self, msg: &str) {
        self.stderr.push(msg.to_string());
    }

    fn preformatted(&mut self, text: &str) {
        self.stdout.push(text.to_string());
    }

    fn newline(&mut self) {
        self.stdout.push(String::new());
    }
}
