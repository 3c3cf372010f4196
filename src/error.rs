//! Error types of the line-breaking engine.

/// Errors a [`TextBoxMeasurer`](crate::measure::TextBoxMeasurer) can report.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MeasureError {
    #[error("No font available for family '{0}'")]
    UnknownFont(String),

    #[error("Cannot measure text '{text}'")]
    Unmeasurable { text: String },
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Item array has {items} items but bidi order info array has {bidi}")]
    LengthMismatch { items: usize, bidi: usize },

    #[error("Measurement failed: {0}")]
    Measure(#[from] MeasureError),

    #[error("Font loading failed: {0}")]
    Font(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
