use std::{error::Error, fmt};

use crate::frontmatter::FrontmatterError;

#[derive(Debug)]
pub enum GithubError {
    Http(reqwest::Error),
    Unauthorized,
    RateLimited,
    NotFound(String),
    ShaConflict(String),
    Decode(base64::DecodeError),
    NotAFile(String),
    UnexpectedStatus(u16, String),
}

impl std::error::Error for GithubError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        use GithubError::*;
        match self {
            Http(e) => Some(e as &dyn Error),
            Decode(e) => Some(e as &dyn Error),
            _ => None,
        }
    }
}

impl fmt::Display for GithubError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use GithubError::*;
        match self {
            Http(e) => write!(f, "Http: {}", e),
            Unauthorized => write!(f, "Unauthorized"),
            RateLimited => write!(f, "RateLimited"),
            NotFound(path) => write!(f, "NotFound: {}", path),
            ShaConflict(path) => write!(f, "ShaConflict: {}", path),
            Decode(e) => write!(f, "Decode: {}", e),
            NotAFile(path) => write!(f, "NotAFile: {}", path),
            UnexpectedStatus(code, body) => write!(f, "UnexpectedStatus: {} {}", code, body),
        }
    }
}

impl From<reqwest::Error> for GithubError {
    fn from(error: reqwest::Error) -> Self {
        GithubError::Http(error)
    }
}

impl From<base64::DecodeError> for GithubError {
    fn from(error: base64::DecodeError) -> Self {
        GithubError::Decode(error)
    }
}

#[derive(Debug)]
pub enum ContentError {
    Github(GithubError),
    Frontmatter(FrontmatterError),
    Validation(Vec<String>),
    NotFound(String),
    SlugTaken(String),
}

impl fmt::Display for ContentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use ContentError::*;
        match self {
            Github(e) => write!(f, "Github: {}", crate::unpack_error(e)),
            Frontmatter(e) => write!(f, "Frontmatter: {}", e),
            Validation(errors) => write!(f, "Validation: {}", errors.join("; ")),
            NotFound(slug) => write!(f, "NotFound: {}", slug),
            SlugTaken(slug) => write!(f, "SlugTaken: {}", slug),
        }
    }
}

impl std::error::Error for ContentError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        use ContentError::*;
        match self {
            Github(e) => Some(e),
            Frontmatter(e) => Some(e),
            _ => None,
        }
    }
}

impl From<GithubError> for ContentError {
    fn from(error: GithubError) -> Self {
        ContentError::Github(error)
    }
}

impl From<FrontmatterError> for ContentError {
    fn from(error: FrontmatterError) -> Self {
        ContentError::Frontmatter(error)
    }
}
