//! Help text extraction.
//!
//! Every action documents itself with a comment block that sits directly
//! above its declaration. The block follows a small convention:
//!
//! ```text
//! # apps:create [NAME]
//! #
//! # create a new app
//! #
//! # -b, --buildpack BUILDPACK  # a buildpack url
//! ```
//!
//! - The first line is the banner (one-line usage synopsis).
//! - Lines matching the option pattern (leading `-`, then a `#` separator
//!   before a description) define flags.
//! - Everything else after the banner is the description; its first line is
//!   the summary.
//!
//! Two entry points produce a [`HelpBlock`]:
//!
//! - [`HelpBlock::extract`] walks a source text upward from a declaration
//!   line and collects the comment block preceding it.
//! - [`HelpBlock::parse`] takes the already-collected text. The `#[commands]`
//!   macro feeds it the doc comment of each action, so no source file is
//!   read at runtime.
//!
//! Missing documentation is a valid state: every accessor degrades to an
//! empty value and never fails.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeMap;

/// Marker that starts a comment line in source text.
pub const COMMENT_MARKER: char = '#';

static OPTION_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^-(.+)#(.+)").expect("option line pattern"));
static SHORT_FLAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^-([A-Za-z])\b").expect("short flag pattern"));
static LONG_FLAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"--([A-Za-z0-9_ -]+)").expect("long flag pattern"));

/// A flag documented in a help block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionSpec {
    /// Single-letter flag, e.g. `b` for `-b`.
    pub short: Option<char>,
    /// Long flag as written, including any value placeholder
    /// (e.g. `buildpack BUILDPACK`).
    pub long: String,
    /// Text after the `#` separator.
    pub description: String,
}

impl OptionSpec {
    /// The option's key: first word of the long flag.
    pub fn name(&self) -> &str {
        self.long.split_whitespace().next().unwrap_or("")
    }

    /// Value placeholder following the name, if any.
    pub fn value_name(&self) -> Option<&str> {
        self.long.split_whitespace().nth(1)
    }

    /// Returns true if the option consumes the following token as its value.
    pub fn takes_value(&self) -> bool {
        self.value_name().is_some()
    }

    /// Parses a single option line. Returns `None` if the line does not
    /// follow the option pattern.
    pub fn parse_line(line: &str) -> Option<Self> {
        let line = line.trim();
        if !is_option_line(line) {
            return None;
        }

        let (flags, description) = line.split_once(COMMENT_MARKER)?;
        let short = SHORT_FLAG
            .captures(flags)
            .and_then(|c| c[1].chars().next());
        let long = LONG_FLAG
            .captures(flags)
            .map(|c| c[1].trim().to_string())
            .filter(|l| !l.is_empty())
            .or_else(|| short.map(String::from))?;

        Some(OptionSpec {
            short,
            long,
            description: description.trim().to_string(),
        })
    }
}

/// Returns true if a (trimmed) line documents an option.
pub fn is_option_line(line: &str) -> bool {
    OPTION_LINE.is_match(line)
}

/// Structured help recovered from a comment block.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HelpBlock {
    text: String,
}

impl HelpBlock {
    /// Builds a help block from already-collected comment text (comment
    /// markers removed). Surrounding blank lines are dropped.
    pub fn parse(text: &str) -> Self {
        Self {
            text: text.trim().to_string(),
        }
    }

    /// Recovers the comment block preceding a declaration.
    ///
    /// `line` is the 1-based line number of the declaration. The walk starts
    /// at the line right above it and moves upward while lines are blank or
    /// start with [`COMMENT_MARKER`], stopping at the first line that is
    /// neither. Collected lines get one leading marker stripped.
    pub fn extract(source: &str, line: usize) -> Self {
        let lines: Vec<&str> = source.lines().collect();
        let mut buffer = Vec::new();

        if line >= 2 && !lines.is_empty() {
            let start = (line - 2).min(lines.len() - 1);
            for candidate in lines[..=start].iter().rev() {
                let stripped = candidate.trim();
                if stripped.is_empty() || stripped.starts_with(COMMENT_MARKER) {
                    buffer.push(stripped.strip_prefix(COMMENT_MARKER).unwrap_or(stripped));
                } else {
                    break;
                }
            }
        }

        buffer.reverse();
        Self::parse(&buffer.join("\n"))
    }

    /// The raw help text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Returns true if no documentation was found.
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// First line of the block, if any.
    pub fn banner(&self) -> Option<&str> {
        self.text
            .lines()
            .next()
            .map(str::trim)
            .filter(|l| !l.is_empty())
    }

    /// Every line after the banner, minus option lines.
    pub fn description(&self) -> String {
        self.text
            .lines()
            .skip(1)
            .map(str::trim)
            .filter(|line| !is_option_line(line))
            .collect::<Vec<_>>()
            .join("\n")
            .trim()
            .to_string()
    }

    /// First line of the description.
    pub fn summary(&self) -> Option<String> {
        self.description().lines().next().map(String::from)
    }

    /// Documented options keyed by long-flag name.
    ///
    /// When several long tokens share a line, the first word is the key.
    pub fn options(&self) -> BTreeMap<String, OptionSpec> {
        self.text
            .lines()
            .filter_map(OptionSpec::parse_line)
            .map(|spec| (spec.name().to_string(), spec))
            .collect()
    }
}
