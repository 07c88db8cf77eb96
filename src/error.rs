//! Error types for the simulator.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("markup parse error: {0}")]
    Markup(#[from] quick_xml::Error),

    #[error("unclosed element in markup: <{0}>")]
    UnclosedElement(String),

    #[error("script decode error: {0}")]
    Script(#[from] serde_json::Error),

    #[error("no element matches selector: {0}")]
    SelectorNotFound(String),

    #[error("unsupported selector {0:?}: only #id selectors are recognized")]
    BadSelector(String),
}

pub type Result<T> = std::result::Result<T, Error>;
