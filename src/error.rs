use std::error;
use std::fmt;
use std::io;




#[derive(Debug)]

/**
 * Error to represent an invalid request made to one of the grid builders.
 * These are fatal at the point of detection: the caller has to fix its
 * inputs and try again.
 */
pub enum ConfigurationError {
    InvalidLimiter { name: String, accepted: Vec<&'static str> },
    MissingLimiter,
    MalformedConfig(String),
    UnsupportedGhostLayers(usize),
    GeometricSpacingOnFirstLayer,
    StartBeyondMaxDistance { start: f64, max_dist: f64 },
    InvalidSpacing(String),
    SpacingDiverged { limit: usize, start: f64, max_dist: f64 },
    LayerMismatch(String),
    EmptyLayer { index: usize, start: f64, end: f64 },
    UnsupportedUnitSystem(String),
    UnknownUnit(String),
    IncompatibleUnits { from: String, to: String },
}




#[derive(Debug)]

/**
 * Top level error type for grid generation and container IO.
 */
pub enum Error {
    Configuration(ConfigurationError),
    Dimensionality { shape: Vec<usize> },
    MissingDataset(String),
    Encode(String),
    Decode(String),
    Io(io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;




// ============================================================================
impl fmt::Display for ConfigurationError {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        use ConfigurationError::*;

        match self {
            InvalidLimiter { name, accepted } => write!(
                fmt,
                "invalid limiter type '{}' (expected one of: {})",
                name,
                accepted.join(", ")
            ),
            MissingLimiter => write!(fmt, "missing [scheme] limiter entry in the configuration"),
            MalformedConfig(msg) => write!(fmt, "malformed configuration: {}", msg),
            UnsupportedGhostLayers(n) => write!(
                fmt,
                "unable to work with {} ghost layers (supported: 1, 2, 3)",
                n
            ),
            GeometricSpacingOnFirstLayer => write!(
                fmt,
                "geometric spacing is not supported for the first layer (use constant spacing)"
            ),
            StartBeyondMaxDistance { start, max_dist } => write!(
                fmt,
                "geometric spacing start ({}) must be less than max distance ({})",
                start, max_dist
            ),
            InvalidSpacing(msg) => write!(fmt, "invalid spacing: {}", msg),
            SpacingDiverged { limit, start, max_dist } => write!(
                fmt,
                "geometric spacing from {} did not reach {} within {} nodes",
                start, max_dist, limit
            ),
            LayerMismatch(msg) => write!(fmt, "inconsistent layer inputs: {}", msg),
            EmptyLayer { index, start, end } => write!(
                fmt,
                "layer {} spanning [{}, {}) contains no cell centers (thinner than one cell?)",
                index, start, end
            ),
            UnsupportedUnitSystem(name) => write!(
                fmt,
                "unsupported unit system '{}' (expected one of: cgs, icf)",
                name
            ),
            UnknownUnit(name) => write!(fmt, "unknown unit '{}'", name),
            IncompatibleUnits { from, to } => {
                write!(fmt, "cannot convert from '{}' to '{}'", from, to)
            }
        }
    }
}

impl error::Error for ConfigurationError {}




// ============================================================================
impl fmt::Display for Error {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        use Error::*;

        match self {
            Configuration(e) => write!(fmt, "configuration error: {}", e),
            Dimensionality { shape } => write!(
                fmt,
                "field shape {:?} is neither 1D nor 2D",
                shape
            ),
            MissingDataset(name) => write!(fmt, "dataset '{}' not found", name),
            Encode(msg) => write!(fmt, "failed to encode container: {}", msg),
            Decode(msg) => write!(fmt, "failed to decode container: {}", msg),
            Io(e) => write!(fmt, "io error: {}", e),
        }
    }
}

impl error::Error for Error {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            Error::Configuration(e) => Some(e),
            Error::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ConfigurationError> for Error {
    fn from(e: ConfigurationError) -> Self {
        Error::Configuration(e)
    }
}

impl From<io::Error> for Error {
    fn from(e: io::Error) -> Self {
        Error::Io(e)
    }
}
