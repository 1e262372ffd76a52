use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum Error {
    #[error("parse error on line {line}: {msg}")]
    Parse { line: usize, msg: String },
    #[error("Docker image tag required")]
    MissingTag,
    #[error("dockerfile validation error: {msg}")]
    Validate { msg: String },
    #[error("{program}: {msg}")]
    Command { program: String, msg: String },
    #[error("io error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
}

impl Error {
    pub fn parse(line: usize, msg: impl Into<String>) -> Self {
        Self::Parse {
            line,
            msg: msg.into(),
        }
    }

    pub fn validate(msg: impl Into<String>) -> Self {
        Self::Validate { msg: msg.into() }
    }

    pub fn command(program: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Command {
            program: program.into(),
            msg: msg.into(),
        }
    }

    pub fn io(source: std::io::Error) -> Self {
        Self::Io { source }
    }
}

#[cfg(test)]
mod tests {
    use crate::error::Error;

    #[test]
    fn parse_error_names_the_line() {
        let err = Error::parse(7, "Invalid RUN command");
        assert_eq!(err.to_string(), "parse error on line 7: Invalid RUN command");
    }

    #[test]
    fn io_error_keeps_its_source() {
        let err = Error::from(std::io::Error::from(std::io::ErrorKind::NotFound));
        assert!(std::error::Error::source(&err).is_some());
    }
}
