// Command Builder - typed CLI options rendered into process tokens

use std::path::Path;

pub const DEFAULT_OPTION_PREFIX: &str = "--";

/// Value kind of a single option
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OptionValue {
    /// Bare flag; `false` renders nothing
    Flag(bool),
    Scalar(String),
}

/// One named option, rendered in the position it was added
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliOption {
    pub name: String,
    pub value: OptionValue,
}

impl CliOption {
    pub fn flag(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: OptionValue::Flag(true),
        }
    }

    pub fn scalar(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: OptionValue::Scalar(value.into()),
        }
    }

    pub fn path(name: impl Into<String>, value: &Path) -> Self {
        Self::scalar(name, value.to_string_lossy().into_owned())
    }
}

/// How option names become flags
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderStyle {
    pub prefix: String,
    /// Rewrite `_` to `-` in option names
    pub hyphenate: bool,
}

impl Default for RenderStyle {
    fn default() -> Self {
        Self {
            prefix: DEFAULT_OPTION_PREFIX.to_string(),
            hyphenate: true,
        }
    }
}

impl RenderStyle {
    /// Prefix only, option names passed through verbatim
    pub fn verbatim() -> Self {
        Self {
            hyphenate: false,
            ..Self::default()
        }
    }

    fn flag_name(&self, name: &str) -> String {
        if self.hyphenate {
            format!("{}{}", self.prefix, name.replace('_', "-"))
        } else {
            format!("{}{}", self.prefix, name)
        }
    }
}

/// Flatten options into tokens, preserving insertion order
pub fn render_options(options: &[CliOption], style: &RenderStyle) -> Vec<String> {
    let mut tokens = Vec::with_capacity(options.len() * 2);
    for option in options {
        match &option.value {
            OptionValue::Flag(true) => tokens.push(style.flag_name(&option.name)),
            OptionValue::Flag(false) => {}
            OptionValue::Scalar(value) => {
                tokens.push(style.flag_name(&option.name));
                tokens.push(value.clone());
            }
        }
    }
    tokens
}

/// Immutable program + argument tokens
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine {
    program: String,
    args: Vec<String>,
}

impl CommandLine {
    pub fn build(program: impl Into<String>, options: &[CliOption], style: &RenderStyle) -> Self {
        Self {
            program: program.into(),
            args: render_options(options, style),
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// Program followed by its arguments
    pub fn tokens(&self) -> Vec<String> {
        std::iter::once(self.program.clone())
            .chain(self.args.iter().cloned())
            .collect()
    }
}

impl std::fmt::Display for CommandLine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.tokens().join(" "))
    }
}
