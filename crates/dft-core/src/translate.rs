//! Line-oriented translation of extended Dockerfile syntax.
//!
//! The translator is a single pass over the source lines. Most lines are
//! copied through untouched; `//` comments, `FROM`, `RUN` and `TAG` get
//! special handling, and `RUN (` opens a block whose lines are chained into
//! one shell command until a line holding only `)` closes it.

use std::io::BufRead;

use tracing::debug;

use crate::config::TranslateOptions;
use crate::error::Error;
use crate::model::TranslationResult;

const COMMENT_MARKER: &[u8] = b"//";
const PULL_ALWAYS: &[u8] = b"pull-always";
const BLOCK_OPEN: &[u8] = b"(";
const BLOCK_CLOSE: &[u8] = b")";
const CHAIN_SUFFIX: &[u8] = b" && \\\n";

#[derive(Debug)]
enum State {
    Normal,
    CommandBlock {
        opened_at: usize,
        command: Vec<u8>,
        continued: bool,
    },
}

/// Incremental translator fed one physical line at a time.
///
/// Lines are passed without their terminator. Call [`Translator::finish`]
/// once the input is exhausted to obtain the result.
#[derive(Debug)]
pub struct Translator {
    state: State,
    line: usize,
    tag: Option<String>,
    base_image: Option<String>,
    pull_always: bool,
    body: Vec<u8>,
}

impl Default for Translator {
    fn default() -> Self {
        Self::new()
    }
}

impl Translator {
    pub fn new() -> Self {
        Self {
            state: State::Normal,
            line: 0,
            tag: None,
            base_image: None,
            pull_always: false,
            body: Vec::new(),
        }
    }

    pub fn push_line(&mut self, line: &[u8]) -> Result<(), Error> {
        self.line += 1;

        if let State::CommandBlock {
            opened_at,
            command,
            continued,
        } = &mut self.state
        {
            if line.is_empty() {
                return Ok(());
            }
            if line != BLOCK_CLOSE {
                *continued = append_block_line(command, line);
                return Ok(());
            }

            let opened_at = *opened_at;
            let continued = *continued;
            let command = std::mem::take(command);
            self.state = State::Normal;
            return self.emit_block(opened_at, command, continued);
        }

        self.push_directive(line)
    }

    pub fn finish(self, options: &TranslateOptions) -> Result<TranslationResult, Error> {
        if let State::CommandBlock { opened_at, .. } = self.state {
            return Err(Error::parse(
                opened_at,
                "RUN block is never closed with a ')' line",
            ));
        }

        let tag = match options.effective_override() {
            Some(tag) => {
                if let Some(directive) = &self.tag {
                    debug!(directive = %directive, tag, "tag override replaces TAG directive");
                }
                tag.to_string()
            }
            None => self.tag.ok_or(Error::MissingTag)?,
        };

        Ok(TranslationResult {
            tag,
            base_image: self.base_image,
            pull_always: self.pull_always,
            body: self.body,
        })
    }

    fn push_directive(&mut self, line: &[u8]) -> Result<(), Error> {
        if line.is_empty() {
            self.body.push(b'\n');
            return Ok(());
        }

        if let Some(comment) = line.strip_prefix(COMMENT_MARKER) {
            self.body.push(b'#');
            self.body.extend_from_slice(comment);
            self.body.push(b'\n');
            return Ok(());
        }

        let (keyword, argument) = split_token(line);
        match keyword {
            b"FROM" => self.base_image_directive(argument),
            b"RUN" => self.command_directive(line, argument),
            b"TAG" => self.tag_directive(argument),
            _ => {
                self.pass_through(line);
                Ok(())
            }
        }
    }

    fn base_image_directive(&mut self, argument: Option<&[u8]>) -> Result<(), Error> {
        let (image, policy) = match argument.map(split_token) {
            Some((image, policy)) if !image.is_empty() => (image, policy),
            _ => {
                return Err(Error::parse(
                    self.line,
                    "FROM must have an image name and optional pull method",
                ));
            }
        };

        let image_name = self.text(image, "FROM image name")?;
        if let Some(previous) = &self.base_image {
            debug!(line = self.line, previous = %previous, "FROM replaces earlier base image");
        }
        self.pull_always = policy == Some(PULL_ALWAYS);
        debug!(line = self.line, image = %image_name, pull_always = self.pull_always, "FROM");
        self.base_image = Some(image_name);

        self.body.extend_from_slice(b"FROM ");
        self.body.extend_from_slice(image);
        self.body.push(b'\n');
        Ok(())
    }

    fn command_directive(&mut self, line: &[u8], argument: Option<&[u8]>) -> Result<(), Error> {
        let Some(argument) = argument else {
            return Err(Error::parse(self.line, "Invalid RUN command"));
        };

        if argument == BLOCK_OPEN {
            debug!(line = self.line, "RUN block opened");
            self.state = State::CommandBlock {
                opened_at: self.line,
                command: Vec::new(),
                continued: false,
            };
            return Ok(());
        }

        self.pass_through(line);
        Ok(())
    }

    fn tag_directive(&mut self, argument: Option<&[u8]>) -> Result<(), Error> {
        let argument = match argument {
            Some(argument) if !argument.is_empty() => argument,
            _ => {
                return Err(Error::parse(
                    self.line,
                    "TAG must have a repository name and optional tag",
                ));
            }
        };

        if self.tag.is_some() {
            return Err(Error::parse(self.line, "TAG used multiple times"));
        }

        let tag = self.text(argument, "TAG value")?;
        debug!(line = self.line, tag = %tag, "TAG");
        self.tag = Some(tag);
        Ok(())
    }

    fn emit_block(
        &mut self,
        opened_at: usize,
        mut command: Vec<u8>,
        continued: bool,
    ) -> Result<(), Error> {
        if command.is_empty() {
            return Err(Error::parse(opened_at, "RUN block has no commands"));
        }
        if continued {
            return Err(Error::parse(
                self.line,
                "RUN block cannot end with a line continuation",
            ));
        }

        command.truncate(command.len() - CHAIN_SUFFIX.len());
        debug!(opened_at, closed_at = self.line, "RUN block closed");

        self.body.extend_from_slice(b"RUN ");
        self.body.extend_from_slice(&command);
        self.body.push(b'\n');
        Ok(())
    }

    fn pass_through(&mut self, line: &[u8]) {
        self.body.extend_from_slice(line);
        self.body.push(b'\n');
    }

    fn text(&self, bytes: &[u8], what: &str) -> Result<String, Error> {
        String::from_utf8(bytes.to_vec())
            .map_err(|_| Error::parse(self.line, format!("{what} is not valid UTF-8")))
    }
}

/// Appends one block line and reports whether it continues onto the next.
fn append_block_line(command: &mut Vec<u8>, line: &[u8]) -> bool {
    command.extend_from_slice(line);
    if line.ends_with(b"\\") {
        command.push(b'\n');
        true
    } else {
        command.extend_from_slice(CHAIN_SUFFIX);
        false
    }
}

fn split_token(line: &[u8]) -> (&[u8], Option<&[u8]>) {
    match line.iter().position(|byte| *byte == b' ') {
        Some(index) => (&line[..index], Some(&line[index + 1..])),
        None => (line, None),
    }
}

pub fn translate<I, L>(lines: I, options: &TranslateOptions) -> Result<TranslationResult, Error>
where
    I: IntoIterator<Item = L>,
    L: AsRef<[u8]>,
{
    let mut translator = Translator::new();
    for line in lines {
        translator.push_line(line.as_ref())?;
    }
    translator.finish(options)
}

/// Translates `\n`-separated input, dropping a trailing `\r` from each line.
pub fn translate_reader<R: BufRead>(
    reader: R,
    options: &TranslateOptions,
) -> Result<TranslationResult, Error> {
    let mut translator = Translator::new();
    for line in reader.split(b'\n') {
        let mut line = line?;
        if line.last() == Some(&b'\r') {
            line.pop();
        }
        translator.push_line(&line)?;
    }
    translator.finish(options)
}

pub fn translate_str(input: &str, options: &TranslateOptions) -> Result<TranslationResult, Error> {
    translate(input.lines(), options)
}
