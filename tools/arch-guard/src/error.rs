use std::path::PathBuf;

/// Failure to resolve the repository root. Fatal: no check runs.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("could not read the current directory: {0}")]
    CurrentDir(#[source] std::io::Error),
    #[error(
        "could not find repository root above {0}. Run from within a git repository or use --root-dir."
    )]
    RootNotFound(PathBuf),
    #[error("--root-dir {0} is not a directory")]
    NotADirectory(PathBuf),
}

/// Reasons the endpoint manifest could not be turned into entries.
#[derive(Debug, thiserror::Error)]
pub enum ManifestError {
    #[error("endpoint-manifest.ts not found at {0}")]
    NotFound(PathBuf),
    #[error("failed to read endpoint-manifest.ts: {0}")]
    Read(#[source] std::io::Error),
    #[error("endpoint-manifest.ts does not declare `export const ENDPOINT_MANIFEST = [...]`")]
    MissingDeclaration,
    #[error("unable to parse ENDPOINT_MANIFEST array: unbalanced brackets starting at byte {0}")]
    Unbalanced(usize),
    #[error("ENDPOINT_MANIFEST is empty or malformed")]
    Empty,
}
