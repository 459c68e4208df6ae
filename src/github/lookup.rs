//! Outcome of a best-effort lookup whose failure must not abort the
//! surrounding analysis.

#[derive(Debug, Clone, PartialEq)]
pub enum Lookup<T> {
    /// The origin answered with data (which may itself be empty).
    Found(T),
    /// The origin answered successfully but had nothing to report.
    Missing,
    /// The request failed; the reason is kept for logging.
    Unavailable(String),
}

impl<T> Lookup<T> {
    pub fn found(self) -> Option<T> {
        match self {
            Lookup::Found(value) => Some(value),
            Lookup::Missing | Lookup::Unavailable(_) => None,
        }
    }

    pub fn as_found(&self) -> Option<&T> {
        match self {
            Lookup::Found(value) => Some(value),
            _ => None,
        }
    }

    pub fn is_unavailable(&self) -> bool {
        matches!(self, Lookup::Unavailable(_))
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Lookup<U> {
        match self {
            Lookup::Found(value) => Lookup::Found(f(value)),
            Lookup::Missing => Lookup::Missing,
            Lookup::Unavailable(reason) => Lookup::Unavailable(reason),
        }
    }
}

impl<T, E: std::fmt::Display> From<Result<Option<T>, E>> for Lookup<T> {
    fn from(result: Result<Option<T>, E>) -> Self {
        match result {
            Ok(Some(value)) => Lookup::Found(value),
            Ok(None) => Lookup::Missing,
            Err(e) => Lookup::Unavailable(e.to_string()),
        }
    }
}
