use serde::Serialize;

/// Output of a completed translation run.
///
/// A value of this type always carries a non-empty `tag`; translations that
/// end without one are rejected before a result is produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationResult {
    pub tag: String,
    pub base_image: Option<String>,
    pub pull_always: bool,
    pub body: Vec<u8>,
}

impl TranslationResult {
    pub fn body_text(&self) -> Option<&str> {
        std::str::from_utf8(&self.body).ok()
    }

    pub fn summary(&self) -> TranslationSummary<'_> {
        TranslationSummary {
            tag: &self.tag,
            base_image: self.base_image.as_deref(),
            pull_always: self.pull_always,
            dockerfile: String::from_utf8_lossy(&self.body).into_owned(),
        }
    }
}

/// Serializable view of a [`TranslationResult`] with the body as text.
#[derive(Debug, Serialize)]
pub struct TranslationSummary<'a> {
    pub tag: &'a str,
    pub base_image: Option<&'a str>,
    pub pull_always: bool,
    pub dockerfile: String,
}
