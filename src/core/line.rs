//! Line classification for header amalgamation.
//!
//! The classifier recognizes exactly three directive shapes by literal
//! match: the include guard pragma, quoted local includes, and
//! angle-bracket system includes. Everything else is opaque content.
//! Deviations in spacing or quoting are deliberately treated as content
//! rather than repaired; the header corpus this tool consumes depends on
//! that exactness.

/// The literal include-guard line.
pub const GUARD_LINE: &str = "#pragma once";

/// Literal prefix of a local (quoted) include directive.
pub const LOCAL_PREFIX: &str = "#include \"";

/// Literal prefix of a system (angle-bracket) include directive.
pub const SYSTEM_PREFIX: &str = "#include <";

/// Classification of a single source line.
///
/// Lines are classified without their trailing newline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind<'a> {
    /// The literal `#pragma once` guard line.
    Guard,

    /// An empty line. A line of whitespace is *not* blank; it is content.
    Blank,

    /// A quoted include of an in-project header. The token is the text
    /// after the opening quote with one trailing closing quote removed.
    LocalInclude { token: &'a str },

    /// An angle-bracket include of an external dependency, kept verbatim
    /// for hoisting.
    SystemInclude,

    /// Anything else. Seeing content ends directive processing for the
    /// rest of the file.
    Content,
}

/// Classify one line (without its trailing newline).
///
/// Total over all inputs; the default case is [`LineKind::Content`].
pub fn classify(line: &str) -> LineKind<'_> {
    if line.is_empty() {
        return LineKind::Blank;
    }
    if line == GUARD_LINE {
        return LineKind::Guard;
    }
    if let Some(rest) = line.strip_prefix(LOCAL_PREFIX) {
        // The original generator chops the closing quote positionally; a
        // line missing it yields a token that simply fails to resolve.
        let token = rest.strip_suffix('"').unwrap_or(rest);
        return LineKind::LocalInclude { token };
    }
    if line.starts_with(SYSTEM_PREFIX) {
        return LineKind::SystemInclude;
    }
    LineKind::Content
}

/// Whether a content line looks like a failed include directive.
///
/// Used by strict mode to reject near-misses like `#include"x.h"` that
/// the classifier would otherwise pass through as content.
pub fn is_directive_like(line: &str) -> bool {
    line.starts_with("#include") && classify(line) == LineKind::Content
}
