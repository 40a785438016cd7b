use std::path::PathBuf;
use thiserror::Error;

/// The main error type for yolotile operations.
#[derive(Debug, Error)]
pub enum TilerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid tile geometry: {message}")]
    InvalidGeometry { message: String },

    #[error("Invalid dataset layout at {path}: {message}")]
    LayoutInvalid { path: PathBuf, message: String },

    #[error("Failed to decode image {path}: {source}")]
    ImageDecode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("Failed to read image dimensions from {path}: {source}")]
    ImageDimensionRead {
        path: PathBuf,
        #[source]
        source: imagesize::ImageError,
    },

    #[error("Failed to encode tile image {path}: {source}")]
    ImageEncode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("Failed to read label file {path}: {source}")]
    LabelRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse label file {path} at line {line}: {message}")]
    LabelParse {
        path: PathBuf,
        line: usize,
        message: String,
    },

    #[error("Failed to read data.yaml at {path}: {source}")]
    DataYamlRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse data.yaml at {path}: {source}")]
    DataYamlParse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Failed to render JSON report: {0}")]
    ReportWrite(#[source] serde_json::Error),
}

impl TilerError {
    /// Returns true for failures that only affect a single source image.
    ///
    /// The dataset walker skips the image and keeps going when this holds;
    /// anything else aborts the run.
    pub fn is_per_image(&self) -> bool {
        matches!(
            self,
            TilerError::ImageDecode { .. }
                | TilerError::ImageDimensionRead { .. }
                | TilerError::LabelRead { .. }
        )
    }
}
