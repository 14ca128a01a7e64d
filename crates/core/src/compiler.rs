//! Template section compiler.
//!
//! Assembles the four independently edited sections of a rule template
//! (user params, AI tunables, helpers, main) plus any attached helper
//! snippets into one executable script. The output format is load-bearing:
//! each section is introduced by an exact header line, and validation-report
//! line numbers are mapped back to sections by locating those headers
//! ([`section_for_line`]). Stored `compiled` text on a template version is a
//! cache of [`compile_template`], so this function must stay deterministic —
//! identical inputs produce byte-identical output.

use std::sync::LazyLock;

use regex::Regex;

/// Header line for the user-params section.
pub const HEADER_USER_PARAMS: &str = "# === USER PARAMS ===";

/// Header line for the AI-tunables section.
pub const HEADER_AI_TUNABLES: &str = "# === AI TUNABLES ===";

/// Header line for the helpers section (user text + attached snippets).
pub const HEADER_HELPERS: &str = "# === HELPERS ===";

/// Header line for the main section.
pub const HEADER_MAIN: &str = "# === MAIN ===";

/// All four headers in emission order.
pub const SECTION_HEADERS: [&str; 4] = [
    HEADER_USER_PARAMS,
    HEADER_AI_TUNABLES,
    HEADER_HELPERS,
    HEADER_MAIN,
];

static BLANK_RUN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n{3,}").expect("valid regex"));

/// The four text sections of a template, as edited in the studio.
#[derive(Debug, Clone, Default)]
pub struct TemplateSections {
    pub user_params: String,
    pub ai_tunables: String,
    pub helpers: String,
    /// Code blocks of attached helper snippets, in attachment order.
    pub helper_snippets: Vec<String>,
    pub main: String,
}

/// A section of the compiled output, identified by its header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    UserParams,
    AiTunables,
    Helpers,
    Main,
}

impl Section {
    /// The exact header line emitted for this section.
    pub fn header(self) -> &'static str {
        match self {
            Section::UserParams => HEADER_USER_PARAMS,
            Section::AiTunables => HEADER_AI_TUNABLES,
            Section::Helpers => HEADER_HELPERS,
            Section::Main => HEADER_MAIN,
        }
    }

    /// Human-readable section name (the text between the `===` markers).
    pub fn name(self) -> &'static str {
        match self {
            Section::UserParams => "USER PARAMS",
            Section::AiTunables => "AI TUNABLES",
            Section::Helpers => "HELPERS",
            Section::Main => "MAIN",
        }
    }

    fn from_header(line: &str) -> Option<Self> {
        match line {
            HEADER_USER_PARAMS => Some(Section::UserParams),
            HEADER_AI_TUNABLES => Some(Section::AiTunables),
            HEADER_HELPERS => Some(Section::Helpers),
            HEADER_MAIN => Some(Section::Main),
            _ => None,
        }
    }
}

/// Normalize one block of text: trim surrounding whitespace and collapse
/// any run of three or more consecutive newlines to a single blank line.
fn normalize(text: &str) -> String {
    BLANK_RUN_RE.replace_all(text.trim(), "\n\n").into_owned()
}

/// Compile template sections into one script.
///
/// Sections are normalized individually; helper snippets are normalized,
/// empty ones dropped, then joined onto the end of the user-entered helpers
/// text with blank-line separators. The four blocks are emitted in fixed
/// order, each introduced by its header line, and a final pass collapses
/// blank-line runs and trims the document tail.
pub fn compile_template(sections: &TemplateSections) -> String {
    let user_params = normalize(&sections.user_params);
    let ai_tunables = normalize(&sections.ai_tunables);
    let helpers = normalize(&sections.helpers);
    let main = normalize(&sections.main);

    let snippet_block: String = sections
        .helper_snippets
        .iter()
        .map(|code| normalize(code))
        .filter(|code| !code.is_empty())
        .collect::<Vec<_>>()
        .join("\n\n");

    let combined_helpers: String = [helpers, snippet_block]
        .into_iter()
        .filter(|block| !block.is_empty())
        .collect::<Vec<_>>()
        .join("\n\n");

    let document = [
        HEADER_USER_PARAMS,
        &user_params,
        "",
        HEADER_AI_TUNABLES,
        &ai_tunables,
        "",
        HEADER_HELPERS,
        &combined_helpers,
        "",
        HEADER_MAIN,
        &main,
        "",
    ]
    .join("\n");

    BLANK_RUN_RE
        .replace_all(&document, "\n\n")
        .trim_end()
        .to_string()
}

/// Map a 1-based line number in compiled output to its owning section.
///
/// Returns the section of the nearest preceding header, or `None` if the
/// line precedes every header (or is out of range). Used to attribute
/// third-party validation findings back to the section a user edited.
pub fn section_for_line(compiled: &str, line_number: usize) -> Option<Section> {
    if line_number == 0 {
        return None;
    }
    let mut current = None;
    for (idx, line) in compiled.lines().enumerate() {
        if idx + 1 > line_number {
            break;
        }
        if let Some(section) = Section::from_header(line) {
            current = Some(section);
        }
    }
    current
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
