use thiserror::Error;

/// Everything that can abort a load or a running query.
///
/// Logical failure is not an error: a goal that cannot be proved simply
/// produces no solutions. These variants cover malformed source text and
/// runtime faults inside builtins.
#[derive(Error, Debug)]
pub enum PrologError {
    #[error("tokenize error at line {line}: {message}")]
    Tokenize { line: usize, message: String },

    #[error("parse error at line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("arguments are not sufficiently instantiated: {context}")]
    Instantiation { context: String },

    #[error("type error: expected {expected}, found {culprit}")]
    Type {
        expected: &'static str,
        culprit: String,
    },

    #[error("domain error: {domain}, found {culprit}")]
    Domain {
        domain: &'static str,
        culprit: String,
    },

    #[error("existence error: unknown procedure {procedure}")]
    Existence { procedure: String },

    #[error("evaluation error: {0}")]
    Evaluation(EvalError),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvalError {
    #[error("division by zero")]
    DivisionByZero,

    #[error("integer overflow")]
    IntOverflow,
}
