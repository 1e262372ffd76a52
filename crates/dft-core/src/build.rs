use std::ffi::OsString;
use std::io::Write;
use std::path::Path;
use std::process::Command;

use tracing::{debug, info};

use crate::config::{BuildConfig, DEFAULT_DOCKER_PROGRAM};
use crate::error::Error;
use crate::model::TranslationResult;

const TEMP_PREFIX: &str = ".dft-";
const TEMP_SUFFIX: &str = ".Dockerfile";

/// External image tooling used by [`build_image`].
pub trait ImageBuilder {
    fn pull(&self, image: &str) -> Result<(), Error>;
    fn build(&self, tag: &str, dockerfile: &Path, context_dir: &Path) -> Result<(), Error>;
}

/// [`ImageBuilder`] backed by the `docker` command line client.
#[derive(Debug, Clone)]
pub struct DockerCli {
    program: OsString,
}

impl Default for DockerCli {
    fn default() -> Self {
        Self::new(DEFAULT_DOCKER_PROGRAM)
    }
}

impl DockerCli {
    pub fn new(program: impl Into<OsString>) -> Self {
        Self {
            program: program.into(),
        }
    }

    fn run(&self, mut command: Command, action: &str) -> Result<(), Error> {
        let program = self.program.to_string_lossy().into_owned();
        debug!(?command, "running {action}");
        let status = command
            .status()
            .map_err(|err| Error::command(&program, format!("failed to run {action}: {err}")))?;
        if status.success() {
            Ok(())
        } else {
            Err(Error::command(program, format!("{action} failed with {status}")))
        }
    }
}

impl ImageBuilder for DockerCli {
    fn pull(&self, image: &str) -> Result<(), Error> {
        let mut command = Command::new(&self.program);
        command.arg("pull").arg(image);
        self.run(command, "pull")
    }

    fn build(&self, tag: &str, dockerfile: &Path, context_dir: &Path) -> Result<(), Error> {
        let mut command = Command::new(&self.program);
        command
            .arg("build")
            .arg("-t")
            .arg(tag)
            .arg("-f")
            .arg(dockerfile)
            .arg(context_dir);
        self.run(command, "build")
    }
}

/// Pulls the base image when required, then builds the translated Dockerfile.
///
/// The Dockerfile is written to a uniquely named temporary file inside the
/// build context and removed again whether or not the build succeeds.
pub fn build_image(
    result: &TranslationResult,
    config: &BuildConfig,
    builder: &dyn ImageBuilder,
) -> Result<(), Error> {
    if result.tag.is_empty() {
        return Err(Error::MissingTag);
    }

    let context_dir = config.context_dir.as_path();
    if !context_dir.is_dir() {
        return Err(Error::io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("build context {} is not a directory", context_dir.display()),
        )));
    }

    if result.pull_always {
        if let Some(image) = &result.base_image {
            info!(image = %image, "pulling base image");
            builder.pull(image)?;
        }
    }

    let mut dockerfile = tempfile::Builder::new()
        .prefix(TEMP_PREFIX)
        .suffix(TEMP_SUFFIX)
        .tempfile_in(context_dir)?;
    dockerfile.write_all(&result.body)?;
    dockerfile.flush()?;

    info!(
        tag = %result.tag,
        dockerfile = %dockerfile.path().display(),
        context = %context_dir.display(),
        "building image"
    );
    builder.build(&result.tag, dockerfile.path(), context_dir)?;

    dockerfile.close()?;
    Ok(())
}
