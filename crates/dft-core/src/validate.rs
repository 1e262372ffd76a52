use dockerfile_parser::{Dockerfile, StageParent};

use crate::error::Error;
use crate::model::TranslationResult;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DockerfileSummary {
    pub stages: Vec<StageSummary>,
    pub instruction_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageSummary {
    pub index: usize,
    pub name: Option<String>,
    pub parent: Parent,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Parent {
    Image(String),
    Scratch,
    StageRef(String),
}

/// Checks that translated output parses as a standard Dockerfile.
pub fn validate_dockerfile(input: &str) -> Result<DockerfileSummary, Error> {
    let dockerfile = Dockerfile::parse(input).map_err(|err| Error::validate(format!("{err}")))?;

    let mut stages = Vec::new();
    for parsed_stage in dockerfile.stages().iter() {
        let from = parsed_stage
            .instructions
            .first()
            .and_then(|instruction| instruction.as_from())
            .ok_or_else(|| {
                Error::validate(format!(
                    "stage {} does not start with FROM",
                    parsed_stage.index
                ))
            })?;

        let parent_token = from.image.content.clone();
        let parent = match parsed_stage.parent {
            StageParent::Scratch => Parent::Scratch,
            StageParent::Stage(_) => Parent::StageRef(parent_token),
            StageParent::Image(_) => Parent::Image(parent_token),
        };

        stages.push(StageSummary {
            index: parsed_stage.index,
            name: from.alias.as_ref().map(|alias| alias.content.clone()),
            parent,
        });
    }

    Ok(DockerfileSummary {
        stages,
        instruction_count: dockerfile.instructions.len(),
    })
}

pub fn validate_translation(result: &TranslationResult) -> Result<DockerfileSummary, Error> {
    let text = result
        .body_text()
        .ok_or_else(|| Error::validate("translated Dockerfile is not valid UTF-8"))?;
    validate_dockerfile(text)
}
