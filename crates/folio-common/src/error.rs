//! Error types for folio front-ends.

use std::path::{Path, PathBuf};

use folio_editor_core::PersistError;
use miette::{Diagnostic, NamedSource, SourceSpan};

/// Main error type for folio front-ends.
#[derive(thiserror::Error, Debug, Diagnostic)]
#[non_exhaustive]
pub enum FolioError {
    /// Reading or writing a file failed.
    #[error("could not access {}", path.display())]
    #[diagnostic(code(folio::io))]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Config file is not valid KDL.
    #[error("config file is not valid KDL: {message}")]
    #[diagnostic(code(folio::config::syntax))]
    ConfigSyntax {
        message: String,
        #[source_code]
        src: NamedSource<String>,
        #[label("here")]
        span: SourceSpan,
        #[help]
        advice: Option<String>,
    },

    /// A config node carries a value of the wrong shape.
    #[error("invalid value for `{node}`")]
    #[diagnostic(code(folio::config::value), help("`{node}` expects {expected}"))]
    ConfigValue {
        node: String,
        expected: &'static str,
        #[source_code]
        src: NamedSource<String>,
        #[label("this value")]
        span: SourceSpan,
    },

    /// Note file could not be decoded or encoded.
    #[error(transparent)]
    #[diagnostic(
        code(folio::note),
        help("the file is not a folio note, or was written by a newer version")
    )]
    Note(#[from] PersistError),

    /// An edit script line could not be understood.
    #[error("line {line}: {message}")]
    #[diagnostic(code(folio::script))]
    Script {
        line: usize,
        message: String,
        #[source_code]
        src: NamedSource<String>,
        #[label("not understood")]
        span: SourceSpan,
        #[help]
        advice: Option<String>,
    },
}

impl FolioError {
    pub fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }
}

/// Span of the `line`-th (1-based) line of `src`, for labelling whole lines.
pub fn line_span(src: &str, line: usize) -> SourceSpan {
    let mut offset = 0;
    for (i, text) in src.split_inclusive('\n').enumerate() {
        if i + 1 == line {
            let len = text.trim_end_matches(['\n', '\r']).len();
            return SourceSpan::new(offset.into(), len);
        }
        offset += text.len();
    }
    SourceSpan::new(src.len().into(), 0)
}
