//! Error categories and codes (spec.md §7).

use thiserror::Error;

/// Runtime fault sub-codes, numbered to match the classic BASIC error table
/// where one exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuntimeErrorKind {
    NextWithoutFor = 1,
    Syntax = 2,
    ReturnWithoutGosub = 3,
    OutOfData = 4,
    IllegalFunctionCall = 5,
    Overflow = 6,
    UndefinedLineNumber = 8,
    SubscriptOutOfRange = 9,
    DivisionByZero = 11,
    TypeMismatch = 13,
    NoResume = 19,
    ResumeWithoutError = 20,
    FileNotFound = 53,
    FileAlreadyOpen = 55,
    InputPastEnd = 62,
    PathNotFound = 76,
}

impl RuntimeErrorKind {
    pub fn code(self) -> u32 {
        self as u32
    }

    pub fn description(self) -> &'static str {
        use RuntimeErrorKind::*;
        match self {
            NextWithoutFor => "Next without For",
            Syntax => "Syntax error",
            ReturnWithoutGosub => "Return without Gosub",
            OutOfData => "Out of Data",
            IllegalFunctionCall => "Illegal function call",
            Overflow => "Overflow",
            UndefinedLineNumber => "Undefined line number",
            SubscriptOutOfRange => "Subscript out of range",
            DivisionByZero => "Division by zero",
            TypeMismatch => "Type mismatch",
            NoResume => "No Resume",
            ResumeWithoutError => "Resume without error",
            FileNotFound => "File not found",
            FileAlreadyOpen => "File already open",
            InputPastEnd => "Input past end",
            PathNotFound => "Path not found",
        }
    }
}

/// Top-level error type produced by lexing, parsing, or evaluation.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum InterpreterError {
    #[error("Syntax error at line {line}: {message}")]
    Lexical { line: u32, message: String },

    #[error("Syntax error at line {line}: {message}\n  {source_line}")]
    Parse {
        line: u32,
        message: String,
        source_line: String,
    },

    #[error("{kind_desc} at line {line}", kind_desc = kind.description())]
    Runtime {
        kind: RuntimeErrorKind,
        line: u32,
        message: Option<String>,
    },

    #[error("Break")]
    Break,
}

impl InterpreterError {
    pub fn runtime(kind: RuntimeErrorKind, line: u32) -> Self {
        InterpreterError::Runtime {
            kind,
            line,
            message: None,
        }
    }

    pub fn runtime_with(kind: RuntimeErrorKind, line: u32, message: impl Into<String>) -> Self {
        InterpreterError::Runtime {
            kind,
            line,
            message: Some(message.into()),
        }
    }

    /// Classic error code, for `ERR`/`ERL` and `?Error name at line L`.
    pub fn code(&self) -> u32 {
        match self {
            InterpreterError::Lexical { .. } => RuntimeErrorKind::Syntax.code(),
            InterpreterError::Parse { .. } => RuntimeErrorKind::Syntax.code(),
            InterpreterError::Runtime { kind, .. } => kind.code(),
            InterpreterError::Break => 0,
        }
    }

    pub fn line(&self) -> u32 {
        match self {
            InterpreterError::Lexical { line, .. } => *line,
            InterpreterError::Parse { line, .. } => *line,
            InterpreterError::Runtime { line, .. } => *line,
            InterpreterError::Break => 0,
        }
    }
}

pub type Result<T> = std::result::Result<T, InterpreterError>;
