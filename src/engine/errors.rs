//! Bundling error types and diagnostics.

use std::path::PathBuf;

use thiserror::Error;

use crate::util::diagnostic::Diagnostic;

/// Error during a bundling run.
///
/// Every variant is fatal: the run aborts and no artifact is written,
/// since a half-merged header would be structurally invalid.
#[derive(Debug, Error)]
pub enum BundleError {
    #[error("cannot read root header `{}`", file.display())]
    MissingRoot {
        file: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot read local include `{include}` (referenced from `{}`)", referrer.display())]
    MissingInclude {
        include: String,
        referrer: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cyclic include chain")]
    CyclicInclude { chain: Vec<PathBuf> },

    #[error("malformed include directive in `{}`: `{line}`", file.display())]
    MalformedDirective { file: PathBuf, line: String },

    #[error("include depth limit ({limit}) exceeded at `{}`", file.display())]
    DepthExceeded { file: PathBuf, limit: usize },
}

impl BundleError {
    /// Convert to a user-friendly diagnostic.
    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            BundleError::MissingRoot { file, source } => {
                Diagnostic::error(format!("cannot read root header `{}`", file.display()))
                    .with_context(format!("{}", source))
                    .with_suggestion("Check the `roots` list in Coalesce.toml".to_string())
                    .with_suggestion(
                        "Root paths are resolved relative to `base-dir`".to_string(),
                    )
            }

            BundleError::MissingInclude {
                include,
                referrer,
                source,
            } => {
                Diagnostic::error(format!("cannot read local include `{}`", include))
                    .with_location(referrer.clone())
                    .with_context(format!("{}", source))
                    .with_suggestion(
                        "Local includes are resolved relative to `base-dir`, not to the \
                         including file"
                            .to_string(),
                    )
                    .with_suggestion(
                        "Run `coalesce check` to list every unresolvable include".to_string(),
                    )
            }

            BundleError::CyclicInclude { chain } => {
                let rendered: Vec<String> =
                    chain.iter().map(|p| p.display().to_string()).collect();

                Diagnostic::error("cyclic include chain")
                    .with_context(format!("cycle: {}", rendered.join(" -> ")))
                    .with_suggestion(
                        "Break the cycle by moving shared declarations into a header both \
                         sides can include"
                            .to_string(),
                    )
            }

            BundleError::MalformedDirective { file, line } => {
                Diagnostic::error(format!("malformed include directive: `{}`", line))
                    .with_location(file.clone())
                    .with_context(
                        "directives must match `#include \"...\"` or `#include <...>` exactly"
                            .to_string(),
                    )
                    .with_suggestion(
                        "Fix the directive, or disable strict mode to copy it through as \
                         content"
                            .to_string(),
                    )
            }

            BundleError::DepthExceeded { file, limit } => {
                Diagnostic::error(format!("include depth limit ({}) exceeded", limit))
                    .with_location(file.clone())
                    .with_suggestion(
                        "Raise the limit with `BundleOptions::with_max_depth` if the graph \
                         is genuinely this deep"
                            .to_string(),
                    )
            }
        }
    }
}
