use std::io;

pub type Result<T> = std::result::Result<T, FindError>;

#[derive(Debug)]
pub enum FindError {
    Io(io::Error),
    Json(serde_json::Error),
    InvalidDocument(String),
}

impl std::fmt::Display for FindError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FindError::Io(e) => write!(f, "IO error: {}", e),
            FindError::Json(e) => write!(f, "JSON error: {}", e),
            FindError::InvalidDocument(msg) => write!(f, "Invalid document: {}", msg),
        }
    }
}

impl std::error::Error for FindError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FindError::Io(e) => Some(e),
            FindError::Json(e) => Some(e),
            FindError::InvalidDocument(_) => None,
        }
    }
}

impl From<io::Error> for FindError {
    fn from(e: io::Error) -> Self {
        FindError::Io(e)
    }
}

impl From<serde_json::Error> for FindError {
    fn from(e: serde_json::Error) -> Self {
        FindError::Json(e)
    }
}
