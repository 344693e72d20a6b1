use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScheduleError {
    #[error("invalid input: {message}")]
    InvalidInput {
        message: String,
    },

    #[error("cannot parse '{input}': {message}")]
    ParseError {
        input: String,
        message: String,
    },

    #[error("arithmetic error: {message}")]
    ArithmeticError {
        message: String,
    },
}

impl ScheduleError {
    pub fn invalid_input(message: impl Into<String>) -> Self {
        ScheduleError::InvalidInput { message: message.into() }
    }

    pub fn parse(input: impl Into<String>, message: impl Into<String>) -> Self {
        ScheduleError::ParseError {
            input: input.into(),
            message: message.into(),
        }
    }

    pub fn arithmetic(message: impl Into<String>) -> Self {
        ScheduleError::ArithmeticError { message: message.into() }
    }
}

pub type Result<T> = std::result::Result<T, ScheduleError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = ScheduleError::invalid_input("repayment schedule is empty");
        assert_eq!(err.to_string(), "invalid input: repayment schedule is empty");

        let err = ScheduleError::parse("2021-13-01", "input is out of range");
        assert_eq!(err.to_string(), "cannot parse '2021-13-01': input is out of range");

        let err = ScheduleError::arithmetic("total weight is zero");
        assert!(matches!(err, ScheduleError::ArithmeticError { .. }));
    }
}
