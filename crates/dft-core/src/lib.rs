pub mod build;
pub mod config;
pub mod error;
pub mod exit_code;
pub mod model;
pub mod translate;
pub mod validate;

pub use crate::build::{DockerCli, ImageBuilder, build_image};
pub use crate::config::{BuildConfig, TranslateOptions};
pub use crate::error::Error;
pub use crate::exit_code::ExitCode;
pub use crate::model::{TranslationResult, TranslationSummary};
pub use crate::translate::{Translator, translate, translate_reader, translate_str};
pub use crate::validate::{DockerfileSummary, validate_dockerfile, validate_translation};
