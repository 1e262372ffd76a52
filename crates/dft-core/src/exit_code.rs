use crate::error::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    Success = 0,
    Parse = 2,
    MissingTag = 3,
    Validate = 4,
    Command = 5,
    Io = 6,
    Usage = 64,
}

impl ExitCode {
    pub const fn as_i32(self) -> i32 {
        self as i32
    }
}

impl From<&Error> for ExitCode {
    fn from(value: &Error) -> Self {
        match value {
            Error::Parse { .. } => Self::Parse,
            Error::MissingTag => Self::MissingTag,
            Error::Validate { .. } => Self::Validate,
            Error::Command { .. } => Self::Command,
            Error::Io { .. } => Self::Io,
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::error::Error;
    use crate::exit_code::ExitCode;

    #[test]
    fn maps_error_variants_to_exit_codes() {
        assert_eq!(
            ExitCode::from(&Error::parse(1, "TAG used multiple times")),
            ExitCode::Parse
        );
        assert_eq!(ExitCode::from(&Error::MissingTag), ExitCode::MissingTag);
        assert_eq!(
            ExitCode::from(&Error::validate("unexpected token")),
            ExitCode::Validate
        );
        assert_eq!(
            ExitCode::from(&Error::command("docker", "exited with status 1")),
            ExitCode::Command
        );
        assert_eq!(
            ExitCode::from(&Error::io(std::io::Error::from(std::io::ErrorKind::Other))),
            ExitCode::Io
        );
    }
}
