//! Evaluation errors.
//!
//! `EvalErrorKind` is the typed category; `EvalError` adds the rendered
//! message, the location of the failing expression and the chain of calls
//! that led there. Factory functions at the bottom of this module are the
//! public way to build errors; they keep `kind` and `message` in sync.

use std::fmt;
use std::io;

use sky_ir::Location;

/// Typed error category.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EvalErrorKind {
    // Names and values
    UndefinedVariable {
        name: String,
    },
    NoAttribute {
        type_name: String,
        name: String,
    },
    TypeMismatch {
        expected: String,
        got: String,
    },
    InvalidOperands {
        op: String,
        left: String,
        right: String,
    },
    IndexOutOfBounds {
        index: i64,
        len: usize,
    },
    KeyNotFound {
        key: String,
    },
    DivisionByZero,
    IntegerOverflow,
    FrozenMutation {
        type_name: String,
    },

    // Calls
    NotCallable {
        type_name: String,
    },
    MissingArgument {
        function: String,
        name: String,
    },
    UnexpectedArgument {
        function: String,
        name: String,
    },
    TooManyArguments {
        function: String,
        max: usize,
        got: usize,
    },
    RecursiveCall {
        function: String,
    },

    // Build semantics
    Fail {
        message: String,
    },
    BuildFileOnly {
        function: String,
    },
    ExtensionOnly {
        function: String,
    },
    UnexportedRule,
    DuplicateTarget {
        name: String,
    },
    MissingSymbol {
        symbol: String,
        module: String,
    },

    // Environment
    Io {
        kind: io::ErrorKind,
        message: String,
    },
    Interrupted,

    Custom {
        message: String,
    },
}

impl fmt::Display for EvalErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UndefinedVariable { name } => write!(f, "name `{name}` is not defined"),
            Self::NoAttribute { type_name, name } => {
                write!(f, "{type_name} has no attribute `{name}`")
            }
            Self::TypeMismatch { expected, got } => {
                write!(f, "type mismatch: expected {expected}, got {got}")
            }
            Self::InvalidOperands { op, left, right } => {
                write!(f, "unsupported operand types for `{op}`: {left} and {right}")
            }
            Self::IndexOutOfBounds { index, len } => {
                write!(f, "index {index} out of range for sequence of length {len}")
            }
            Self::KeyNotFound { key } => write!(f, "key {key} not found in dict"),
            Self::DivisionByZero => write!(f, "division by zero"),
            Self::IntegerOverflow => write!(f, "integer overflow"),
            Self::FrozenMutation { type_name } => {
                write!(f, "cannot mutate frozen {type_name}")
            }
            Self::NotCallable { type_name } => write!(f, "{type_name} is not callable"),
            Self::MissingArgument { function, name } => {
                write!(f, "{function}() missing required argument `{name}`")
            }
            Self::UnexpectedArgument { function, name } => {
                write!(f, "{function}() got an unexpected keyword argument `{name}`")
            }
            Self::TooManyArguments { function, max, got } => {
                let word = if *max == 1 { "argument" } else { "arguments" };
                write!(
                    f,
                    "{function}() accepts at most {max} positional {word}, got {got}"
                )
            }
            Self::RecursiveCall { function } => {
                write!(f, "function `{function}` called recursively")
            }
            Self::Fail { message } => write!(f, "fail: {message}"),
            Self::BuildFileOnly { function } => write!(
                f,
                "{function} can only be called while evaluating a build file"
            ),
            Self::ExtensionOnly { function } => write!(
                f,
                "{function} can only be called while evaluating an extension file"
            ),
            Self::UnexportedRule => write!(
                f,
                "rule must be assigned to a top-level name before it can be called"
            ),
            Self::DuplicateTarget { name } => {
                write!(f, "target `{name}` is declared more than once")
            }
            Self::MissingSymbol { symbol, module } => {
                write!(f, "symbol `{symbol}` not found in `{module}`")
            }
            Self::Io { message, .. } => write!(f, "{message}"),
            Self::Interrupted => write!(f, "evaluation was interrupted"),
            Self::Custom { message } => write!(f, "{message}"),
        }
    }
}

/// One call in the chain that led to an error.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BacktraceFrame {
    /// Called function.
    pub function: String,
    /// Where it was called from.
    pub call_site: Location,
}

/// Evaluation error.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EvalError {
    pub kind: EvalErrorKind,
    pub message: String,
    /// Innermost location the error was raised at.
    pub location: Option<Location>,
    /// Calls from innermost to outermost.
    pub backtrace: Vec<BacktraceFrame>,
}

impl EvalError {
    /// Create an error with a free-form message.
    #[cold]
    pub fn new(message: impl Into<String>) -> Self {
        let message = message.into();
        EvalError::from_kind(EvalErrorKind::Custom { message })
    }

    #[cold]
    pub fn from_kind(kind: EvalErrorKind) -> Self {
        let message = kind.to_string();
        EvalError {
            kind,
            message,
            location: None,
            backtrace: Vec::new(),
        }
    }

    /// Attach `location` unless a more precise one is already set.
    #[must_use]
    pub fn or_at(mut self, location: impl FnOnce() -> Location) -> Self {
        if self.location.is_none() {
            self.location = Some(location());
        }
        self
    }

    #[must_use]
    pub fn with_frame(mut self, function: impl Into<String>, call_site: Location) -> Self {
        self.backtrace.push(BacktraceFrame {
            function: function.into(),
            call_site,
        });
        self
    }

    pub fn is_interrupted(&self) -> bool {
        matches!(self.kind, EvalErrorKind::Interrupted)
    }

    /// Underlying I/O error, if evaluation failed because a read failed.
    pub fn io_cause(&self) -> Option<io::Error> {
        match &self.kind {
            EvalErrorKind::Io { kind, message } => Some(io::Error::new(*kind, message.clone())),
            _ => None,
        }
    }

    /// Message followed by the call chain, outermost call first.
    pub fn message_with_stack(&self) -> String {
        let mut out = String::new();
        if !self.backtrace.is_empty() {
            out.push_str("Traceback (most recent call last):\n");
            for frame in self.backtrace.iter().rev() {
                out.push_str(&format!("  {}: in {}\n", frame.call_site, frame.function));
            }
        }
        if let Some(location) = &self.location {
            out.push_str(&format!("{location}: "));
        }
        out.push_str(&self.message);
        out
    }
}

impl fmt::Display for EvalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.location {
            Some(location) => write!(f, "{location}: {}", self.message),
            None => write!(f, "{}", self.message),
        }
    }
}

impl std::error::Error for EvalError {}

/// Result of evaluation.
pub type EvalResult<T> = Result<T, EvalError>;

// Factories

#[cold]
pub fn undefined_variable(name: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::UndefinedVariable {
        name: name.to_string(),
    })
}

#[cold]
pub fn no_attribute(type_name: &str, name: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::NoAttribute {
        type_name: type_name.to_string(),
        name: name.to_string(),
    })
}

#[cold]
pub fn type_mismatch(expected: &str, got: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::TypeMismatch {
        expected: expected.to_string(),
        got: got.to_string(),
    })
}

#[cold]
pub fn invalid_operands(op: &str, left: &str, right: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::InvalidOperands {
        op: op.to_string(),
        left: left.to_string(),
        right: right.to_string(),
    })
}

#[cold]
pub fn index_out_of_bounds(index: i64, len: usize) -> EvalError {
    EvalError::from_kind(EvalErrorKind::IndexOutOfBounds { index, len })
}

#[cold]
pub fn key_not_found(key: String) -> EvalError {
    EvalError::from_kind(EvalErrorKind::KeyNotFound { key })
}

#[cold]
pub fn division_by_zero() -> EvalError {
    EvalError::from_kind(EvalErrorKind::DivisionByZero)
}

#[cold]
pub fn integer_overflow() -> EvalError {
    EvalError::from_kind(EvalErrorKind::IntegerOverflow)
}

#[cold]
pub fn frozen_mutation(type_name: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::FrozenMutation {
        type_name: type_name.to_string(),
    })
}

#[cold]
pub fn not_callable(type_name: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::NotCallable {
        type_name: type_name.to_string(),
    })
}

#[cold]
pub fn missing_argument(function: &str, name: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::MissingArgument {
        function: function.to_string(),
        name: name.to_string(),
    })
}

#[cold]
pub fn unexpected_argument(function: &str, name: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::UnexpectedArgument {
        function: function.to_string(),
        name: name.to_string(),
    })
}

#[cold]
pub fn too_many_arguments(function: &str, max: usize, got: usize) -> EvalError {
    EvalError::from_kind(EvalErrorKind::TooManyArguments {
        function: function.to_string(),
        max,
        got,
    })
}

#[cold]
pub fn recursive_call(function: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::RecursiveCall {
        function: function.to_string(),
    })
}

#[cold]
pub fn fail(message: String) -> EvalError {
    EvalError::from_kind(EvalErrorKind::Fail { message })
}

#[cold]
pub fn build_file_only(function: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::BuildFileOnly {
        function: function.to_string(),
    })
}

#[cold]
pub fn extension_only(function: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::ExtensionOnly {
        function: function.to_string(),
    })
}

#[cold]
pub fn unexported_rule() -> EvalError {
    EvalError::from_kind(EvalErrorKind::UnexportedRule)
}

#[cold]
pub fn duplicate_target(name: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::DuplicateTarget {
        name: name.to_string(),
    })
}

#[cold]
pub fn missing_symbol(symbol: &str, module: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::MissingSymbol {
        symbol: symbol.to_string(),
        module: module.to_string(),
    })
}

#[cold]
pub fn io_error(error: &io::Error) -> EvalError {
    EvalError::from_kind(EvalErrorKind::Io {
        kind: error.kind(),
        message: error.to_string(),
    })
}

#[cold]
pub fn interrupted() -> EvalError {
    EvalError::from_kind(EvalErrorKind::Interrupted)
}
