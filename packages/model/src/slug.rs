use thiserror::Error;

use crate::requests::NewPage;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ModelError {
    #[error("Title must not be empty")]
    EmptyTitle,

    #[error("Invalid slug {slug:?}: {reason}")]
    InvalidSlug { slug: String, reason: &'static str },
}

/// Check that `slug` is usable in a page URL.
///
/// Accepted: lowercase ASCII letters, digits and single hyphens between them.
pub fn validate_slug(slug: &str) -> Result<(), ModelError> {
    let invalid = |reason| ModelError::InvalidSlug {
        slug: slug.to_string(),
        reason,
    };

    if slug.is_empty() {
        return Err(invalid("slug is empty"));
    }
    if slug.starts_with('-') || slug.ends_with('-') {
        return Err(invalid("slug must not start or end with a hyphen"));
    }
    if slug.contains("--") {
        return Err(invalid("slug must not contain consecutive hyphens"));
    }
    if !slug
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
    {
        return Err(invalid("only lowercase letters, digits and hyphens are allowed"));
    }

    Ok(())
}

pub fn validate_new_page(page: &NewPage) -> Result<(), ModelError> {
    if page.title.trim().is_empty() {
        return Err(ModelError::EmptyTitle);
    }
    validate_slug(&page.slug)
}
