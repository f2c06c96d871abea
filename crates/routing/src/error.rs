#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid trigger pattern: {0}")]
    InvalidPattern(#[from] regex::Error),

    #[error("route already registered: {name}")]
    DuplicateRoute { name: String },

    #[error("unknown route: {name}")]
    UnknownRoute { name: String },

    #[error(transparent)]
    Store(#[from] palaver_sessions::Error),
}

impl Error {
    #[must_use]
    pub fn unknown_route(name: impl Into<String>) -> Self {
        Self::UnknownRoute { name: name.into() }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
