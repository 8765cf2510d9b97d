//! Text protocol the model uses to request actions
//!
//! Each reply encodes at most one directive. Markers are recognized in a
//! fixed priority order: `# Think`, then `# Action(KIND(target))`, then
//! `# See(url)` when enabled. The first match wins even if later markers are
//! present in the same reply.

use once_cell::sync::Lazy;
use regex::Regex;

static THINK: Lazy<Regex> = Lazy::new(|| Regex::new(r"# Think").expect("valid think regex"));

static REASONING: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"# Think\n([\s\S]*)").expect("valid reasoning regex"));

static ACTION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"# Action\((WRITE|READ|RUN)\(([^)]+)\)\)").expect("valid action regex")
});

static SEE: Lazy<Regex> = Lazy::new(|| Regex::new(r"# See\(([^)]+)\)").expect("valid see regex"));

static BASE_CODE_BLOCK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"```(?:html|css|js|python)\n([\s\S]*?)\n```").expect("valid code block regex")
});

static EXTENDED_CODE_BLOCK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"```(?:html|css|javascript|js|python)\n([\s\S]*?)\n```")
        .expect("valid code block regex")
});

const TERMINATION_MARKER: &str = "# Termin";

/// Only this many leading characters are checked for the termination marker
const TERMINATION_WINDOW: usize = 33;

/// Language hints accepted on a WRITE code fence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CodeHints {
    /// html, css, js, python
    #[default]
    Base,
    /// Base plus javascript
    Extended,
}

impl CodeHints {
    fn regex(self) -> &'static Regex {
        match self {
            CodeHints::Base => &*BASE_CODE_BLOCK,
            CodeHints::Extended => &*EXTENDED_CODE_BLOCK,
        }
    }
}

/// Which parts of the protocol a profile understands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ParseOptions {
    pub allow_see: bool,
    pub code_hints: CodeHints,
}

/// The model followed a marker but left out something it requires
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProtocolViolation {
    MissingCodeBlock { target: String },
}

/// What a single reply asks for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Directive {
    Think { reasoning: String },
    Write {
        target: String,
        code: String,
    },
    Read { target: String },
    Run { target: String },
    See { url: String },
    Malformed(ProtocolViolation),
    /// No marker recognized
    None,
}

impl Directive {
    /// Short label for logs
    pub fn label(&self) -> &'static str {
        match self {
            Directive::Think { .. } => "think",
            Directive::Write { .. } => "write",
            Directive::Read { .. } => "read",
            Directive::Run { .. } => "run",
            Directive::See { .. } => "see",
            Directive::Malformed(_) => "malformed",
            Directive::None => "none",
        }
    }
}

/// Recover the directive encoded in a model reply
pub fn parse(reply: &str, options: &ParseOptions) -> Directive {
    if THINK.is_match(reply) {
        let reasoning = REASONING
            .captures(reply)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().to_string())
            .unwrap_or_default();
        return Directive::Think { reasoning };
    }

    if let Some(caps) = ACTION.captures(reply) {
        let target = caps[2].trim().to_string();
        return match &caps[1] {
            "WRITE" => match options.code_hints.regex().captures(reply) {
                Some(code) => Directive::Write {
                    target,
                    code: code[1].to_string(),
                },
                None => Directive::Malformed(ProtocolViolation::MissingCodeBlock { target }),
            },
            "READ" => Directive::Read { target },
            _ => Directive::Run { target },
        };
    }

    if options.allow_see {
        if let Some(caps) = SEE.captures(reply) {
            return Directive::See {
                url: caps[1].trim().to_string(),
            };
        }
    }

    Directive::None
}

/// Whether the reply ends the run
pub fn is_termination(reply: &str) -> bool {
    let head: String = reply.chars().take(TERMINATION_WINDOW).collect();
    head.trim().contains(TERMINATION_MARKER)
}
