//! Error types for tilegate.

/// Result type alias for tilegate operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error type for tilegate.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration directory could not be determined.
    #[error("could not determine configuration directory for this platform")]
    ConfigDirNotFound,

    /// Failed to read configuration file.
    #[error("failed to read config file '{path}'")]
    ConfigRead {
        /// Path to the config file.
        path: std::path::PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse configuration file.
    #[error("failed to parse config file '{path}'")]
    ConfigParse {
        /// Path to the config file.
        path: std::path::PathBuf,
        /// Underlying parse error.
        #[source]
        source: toml::de::Error,
    },

    /// Configuration validation failed.
    #[error("configuration validation failed: {message}")]
    ConfigValidation {
        /// Description of the validation failure.
        message: String,
    },

    /// Failed to write configuration file.
    #[error("failed to write config file '{path}'")]
    ConfigWrite {
        /// Path to the config file.
        path: std::path::PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to serialize configuration.
    #[error("failed to serialize config")]
    ConfigSerialize {
        /// Underlying serialization error.
        #[source]
        source: toml::ser::Error,
    },

    /// Calibration was invoked with an empty sample set.
    #[error("cannot calibrate on an empty validation set")]
    EmptyCalibrationSet,

    /// Validation split contains no tiles.
    #[error("no validation tiles found under '{path}'")]
    NoValidationTiles {
        /// Root of the validation split.
        path: std::path::PathBuf,
    },

    /// Failed to open or decode a tile image.
    #[error("failed to read tile '{path}'")]
    TileRead {
        /// Path to the tile.
        path: std::path::PathBuf,
        /// Underlying decode error.
        #[source]
        source: image::ImageError,
    },

    /// Failed to initialize ONNX runtime.
    #[error("failed to initialize ONNX runtime: {reason}")]
    RuntimeInitialization {
        /// Description of the initialization failure.
        reason: String,
    },

    /// Failed to build the tile scorer.
    #[error("failed to build tile scorer: {reason}")]
    ScorerBuild {
        /// Description of the build failure.
        reason: String,
    },

    /// Inference failed.
    #[error("inference failed: {reason}")]
    Inference {
        /// Description of the inference failure.
        reason: String,
    },

    /// Failed to read the calibration artifact.
    #[error("failed to read calibration artifact '{path}'")]
    ArtifactRead {
        /// Path to the artifact.
        path: std::path::PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Calibration artifact is not valid or is missing required fields.
    #[error("failed to parse calibration artifact '{path}'")]
    ArtifactParse {
        /// Path to the artifact.
        path: std::path::PathBuf,
        /// Underlying parse error.
        #[source]
        source: serde_json::Error,
    },

    /// Failed to serialize the calibration artifact.
    #[error("failed to serialize calibration artifact")]
    ArtifactSerialize {
        /// Underlying serialization error.
        #[source]
        source: serde_json::Error,
    },

    /// Failed to write the calibration artifact.
    #[error("failed to write calibration artifact '{path}'")]
    ArtifactWrite {
        /// Path to the artifact.
        path: std::path::PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to create a decision log file.
    #[error("failed to create log file '{path}'")]
    LogCreate {
        /// Path to the log file.
        path: std::path::PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to open a decision log file for reading.
    #[error("failed to open log file '{path}'")]
    LogOpen {
        /// Path to the log file.
        path: std::path::PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to write a decision record.
    #[error("failed to write record to log file '{path}'")]
    LogWrite {
        /// Path to the log file.
        path: std::path::PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A log line could not be parsed as a decision record.
    #[error("malformed record in '{path}' at line {line}")]
    MalformedRecord {
        /// Path to the log file.
        path: std::path::PathBuf,
        /// 1-based line number of the offending record.
        line: usize,
        /// Underlying parse error.
        #[source]
        source: serde_json::Error,
    },

    /// Failed to serialize a decision record.
    #[error("failed to serialize decision record")]
    RecordSerialize {
        /// Underlying serialization error.
        #[source]
        source: serde_json::Error,
    },

    /// Failed to create an output directory.
    #[error("failed to create output directory '{path}'")]
    OutputDirCreate {
        /// Path to the output directory.
        path: std::path::PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to stage a kept tile into the downlink directory.
    #[error("failed to stage tile '{path}' for downlink")]
    DownlinkCopy {
        /// Path to the source tile.
        path: std::path::PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to serialize the metrics report.
    #[error("failed to serialize metrics report")]
    ReportSerialize {
        /// Underlying serialization error.
        #[source]
        source: serde_json::Error,
    },

    /// Failed to write a report file.
    #[error("failed to write report file '{path}'")]
    ReportWrite {
        /// Path to the report file.
        path: std::path::PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}
