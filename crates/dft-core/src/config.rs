use std::path::PathBuf;

pub const DEFAULT_SOURCE_FILE: &str = "Dockerfile.dft";
pub const DEFAULT_CONTEXT_DIR: &str = ".";
pub const DEFAULT_DOCKER_PROGRAM: &str = "docker";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TranslateOptions {
    /// Replaces any `TAG` directive value when set to a non-empty string.
    pub tag_override: Option<String>,
}

impl TranslateOptions {
    pub fn with_tag_override(tag: impl Into<String>) -> Self {
        Self {
            tag_override: Some(tag.into()),
        }
    }

    pub(crate) fn effective_override(&self) -> Option<&str> {
        self.tag_override.as_deref().filter(|tag| !tag.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildConfig {
    pub context_dir: PathBuf,
}

impl BuildConfig {
    pub fn new(context_dir: impl Into<PathBuf>) -> Self {
        Self {
            context_dir: context_dir.into(),
        }
    }
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self::new(DEFAULT_CONTEXT_DIR)
    }
}
