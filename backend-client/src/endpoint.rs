use reqwest::Method;

/// The backend endpoints the sync core talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    /// `POST users/token.json` with `{username, password}`.
    Token,
    /// `GET sections.json`: the section/subsection/comment hierarchy.
    Hierarchy,
    /// `GET results.json`: results stored on the backend.
    ResultsRead,
    /// `POST results/add`: submit one result.
    ResultsWrite,
}

impl Endpoint {
    pub fn method(self) -> Method {
        match self {
            Self::Token | Self::ResultsWrite => Method::POST,
            Self::Hierarchy | Self::ResultsRead => Method::GET,
        }
    }

    /// Path relative to the API base URL.
    pub fn path(self) -> &'static str {
        match self {
            Self::Token => "users/token.json",
            Self::Hierarchy => "sections.json",
            Self::ResultsRead => "results.json",
            Self::ResultsWrite => "results/add",
        }
    }

    /// Whether the request carries the `token` query parameter.
    pub fn requires_token(self) -> bool {
        !matches!(self, Self::Token)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Token => "token",
            Self::Hierarchy => "hierarchy",
            Self::ResultsRead => "results-read",
            Self::ResultsWrite => "results-write",
        }
    }
}

impl std::fmt::Display for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
