/// Errors raised while interpreting catalog values.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("Unknown guide site: {0}")]
    UnknownSite(String),

    #[error("Cursor '{0}' is not a numeric offset")]
    InvalidCursor(String),
}

impl CatalogError {
    pub fn unknown_site(name: impl Into<String>) -> Self {
        Self::UnknownSite(name.into())
    }
}
