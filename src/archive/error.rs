use reqwest::StatusCode;

/// Transport failure for a listing or detail page.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("http error: {0}")]
    Http(#[source] reqwest::Error),
    #[error("request timed out")]
    Timeout,
    #[error("unexpected status {status} for {url}")]
    Status { url: String, status: StatusCode },
    #[cfg(test)]
    #[error("no stubbed page for {0}")]
    NotStubbed(String),
}

impl FetchError {
    pub fn from_reqwest(err: reqwest::Error) -> Self {
        if err.is_timeout() { FetchError::Timeout } else { FetchError::Http(err) }
    }

    pub fn is_retryable(&self) -> bool {
        match self {
            FetchError::Timeout | FetchError::Http(_) => true,
            FetchError::Status { status, .. } => status.is_server_error() || *status == StatusCode::TOO_MANY_REQUESTS,
            #[cfg(test)]
            FetchError::NotStubbed(_) => false,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ExtractErrorKind {
    #[error("malformed fragment: missing or unreadable {0}")]
    MalformedFragment(&'static str),
    #[error("unrecognized date text {0:?}")]
    DateParse(String),
    #[error("detail fetch failed: {0}")]
    Transport(#[from] FetchError),
}

/// A single work failed to extract. Carries the work id when it could be read.
#[derive(Debug, thiserror::Error)]
#[error("work {}: {kind}", .work_id.as_deref().unwrap_or("<unknown>"))]
pub struct ExtractError {
    pub work_id: Option<String>,
    #[source]
    pub kind: ExtractErrorKind,
}

impl ExtractError {
    pub fn new(work_id: Option<String>, kind: impl Into<ExtractErrorKind>) -> Self {
        Self { work_id, kind: kind.into() }
    }

    pub fn malformed(what: &'static str) -> Self {
        Self::new(None, ExtractErrorKind::MalformedFragment(what))
    }

    pub fn date(text: impl Into<String>) -> Self {
        Self::new(None, ExtractErrorKind::DateParse(text.into()))
    }

    /// Attach the work id if it is not set yet.
    pub fn for_work(mut self, id: &str) -> Self {
        if self.work_id.is_none() { self.work_id = Some(id.to_string()); }
        self
    }

    pub fn is_transport(&self) -> bool { matches!(self.kind, ExtractErrorKind::Transport(_)) }
}
