use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error(
        "The uploaded CSV must contain the following columns: {} (missing: {})",
        crate::REQUIRED_COLUMNS.join(", "),
        .missing.join(", ")
    )]
    MissingColumns { missing: Vec<String> },

    #[error("No data found after filtering out '{0}' category.")]
    EmptyAfterFilter(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Invalid recommendation catalog: {0}")]
    Catalog(#[from] serde_json::Error),

    #[error("Bot '{bot}' call failed: {source}")]
    Bot {
        bot: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
