use std::fmt;
use std::io;

/// A problem with a scene description.
#[derive(Clone, Debug, PartialEq)]
pub enum SceneError {
    /// The text could not be tokenized or does not follow the block grammar.
    Syntax { line: usize, message: String },

    /// A block lacks a key it cannot do without.
    MissingField { block: String, field: String },

    /// A key holds a value of the wrong shape or out of range.
    InvalidValue { block: String, field: String, message: String },

    UnknownBlock(String),
    UnknownLightType(String),
    UnknownTexture(String),
}

impl fmt::Display for SceneError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SceneError::Syntax { line, message } =>
                write!(f, "syntax error on line {}: {}", line, message),
            SceneError::MissingField { block, field } =>
                write!(f, "{} is missing required key `{}`", block, field),
            SceneError::InvalidValue { block, field, message } =>
                write!(f, "invalid `{}` in {}: {}", field, block, message),
            SceneError::UnknownBlock(name) =>
                write!(f, "unknown block `{}`", name),
            SceneError::UnknownLightType(name) =>
                write!(f, "unknown light type `{}`", name),
            SceneError::UnknownTexture(name) =>
                write!(f, "unknown texture `{}`", name),
        }
    }
}

impl std::error::Error for SceneError {}

/// Any error the tracer's front end can run into.
///
/// Rendering itself never fails; errors come from reading scenes and
/// configuration, writing images and setting up worker threads.
#[derive(Debug)]
pub enum Error {
    Io(io::Error),
    Json(serde_json::Error),
    Scene(SceneError),
    Image(image::ImageError),
    ThreadPool(rayon::ThreadPoolBuildError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Io(e) => write!(f, "I/O error: {}", e),
            Error::Json(e) => write!(f, "JSON error: {}", e),
            Error::Scene(e) => write!(f, "scene error: {}", e),
            Error::Image(e) => write!(f, "image error: {}", e),
            Error::ThreadPool(e) => write!(f, "could not start worker threads: {}", e),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(e) => Some(e),
            Error::Json(e) => Some(e),
            Error::Scene(e) => Some(e),
            Error::Image(e) => Some(e),
            Error::ThreadPool(e) => Some(e),
        }
    }
}

impl From<io::Error> for Error {
    fn from(e: io::Error) -> Error {
        Error::Io(e)
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Error {
        Error::Json(e)
    }
}

impl From<SceneError> for Error {
    fn from(e: SceneError) -> Error {
        Error::Scene(e)
    }
}

impl From<image::ImageError> for Error {
    fn from(e: image::ImageError) -> Error {
        Error::Image(e)
    }
}

impl From<rayon::ThreadPoolBuildError> for Error {
    fn from(e: rayon::ThreadPoolBuildError) -> Error {
        Error::ThreadPool(e)
    }
}

#[test]
fn scene_errors_name_the_culprit() {
    let e = SceneError::MissingField { block: "sphere".into(), field: "radius".into() };
    assert_eq!(e.to_string(), "sphere is missing required key `radius`");

    let e = SceneError::Syntax { line: 4, message: "expected `{`".into() };
    assert_eq!(Error::from(e).to_string(),
        "scene error: syntax error on line 4: expected `{`");
}

#[test]
fn io_errors_convert() {
    let e: Error = io::Error::new(io::ErrorKind::NotFound, "gone").into();
    assert!(matches!(e, Error::Io(_)));
}
