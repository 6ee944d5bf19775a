use std::path::PathBuf;

use lll_template::RenderError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LogError {
    #[error("Failed to open {} in append mode: {}", .path.display(), .source)]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write log line: {0}")]
    Write(#[from] std::io::Error),

    #[error(transparent)]
    Render(#[from] RenderError),
}
