use thiserror::Error;

/// Error types for the halofit-rs library.
#[derive(Error, Debug)]
pub enum HaloFitError {
    /// Malformed or missing data for a single galaxy.
    #[error("Data error for galaxy '{galaxy}': {message}")]
    DataError { galaxy: String, message: String },

    /// Inconsistent fit configuration, raised when the configuration is built.
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    /// Two result tables compared over different galaxy sets.
    #[error(
        "Result tables cover different galaxies ({} only in left, {} only in right)",
        only_left.len(),
        only_right.len()
    )]
    AggregationMismatch {
        only_left: Vec<String>,
        only_right: Vec<String>,
    },

    /// Error indicating a mismatch in matrix dimensions.
    #[error("Matrix dimension mismatch: {0}")]
    DimensionMismatch(String),

    /// Error indicating a singular matrix was encountered.
    #[error("Singular matrix encountered")]
    SingularMatrix,

    /// Error indicating the algorithm failed to converge.
    #[error("Algorithm failed to converge: {0}")]
    ConvergenceFailure(String),

    /// Error for parameter-related problems.
    #[error("Parameter error: {0}")]
    ParameterError(String),

    /// Error for boundary constraint violations.
    #[error("Bounds error: {0}")]
    BoundsError(String),

    /// Parameter not found.
    #[error("Parameter not found: {0}")]
    ParameterNotFound(String),

    /// Error during function evaluation.
    #[error("Function evaluation error: {0}")]
    FunctionEvaluation(String),

    /// I/O error wrapper.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Malformed number in a data table.
    #[error("Parse error: {0}")]
    ParseError(#[from] std::num::ParseFloatError),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl HaloFitError {
    /// Shorthand for a [`HaloFitError::DataError`].
    pub fn data(galaxy: impl Into<String>, message: impl Into<String>) -> Self {
        HaloFitError::DataError {
            galaxy: galaxy.into(),
            message: message.into(),
        }
    }

    /// Whether this error only concerns one galaxy and a batch may continue.
    pub fn is_per_galaxy(&self) -> bool {
        matches!(
            self,
            HaloFitError::DataError { .. }
                | HaloFitError::FunctionEvaluation(_)
                | HaloFitError::SingularMatrix
                | HaloFitError::DimensionMismatch(_)
        )
    }
}

impl From<crate::parameters::parameter::ParameterError> for HaloFitError {
    fn from(err: crate::parameters::parameter::ParameterError) -> Self {
        HaloFitError::ParameterError(format!("{}", err))
    }
}

impl From<crate::parameters::bounds::BoundsError> for HaloFitError {
    fn from(err: crate::parameters::bounds::BoundsError) -> Self {
        HaloFitError::BoundsError(format!("{}", err))
    }
}

/// Result type alias for halofit-rs operations.
pub type Result<T> = std::result::Result<T, HaloFitError>;
