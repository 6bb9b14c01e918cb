//! Error types for class construction and dispatch

/// Result type for class-model operations
pub type ModelResult<T> = Result<T, ModelError>;

/// Errors raised while building classes or dispatching on them.
///
/// Every error is returned synchronously at the call site of `build`,
/// `extend`, instantiation, or a method call. Construction is deterministic,
/// so a caller can fix the definition and simply build again.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ModelError {
    /// Definition input the builder cannot accept
    #[error("invalid class definition: {0}")]
    InvalidDefinition(String),

    /// A class declares an own abstract member without being marked abstract
    #[error("class '{class}' has abstract member '{member}', but is not declared abstract")]
    AbstractMemberNotDeclared {
        /// Diagnostic name of the class being built
        class: String,
        /// Name of the offending member
        member: String,
    },

    /// A concrete subclass leaves an inherited abstract member unimplemented
    #[error("concrete class '{class}' must implement abstract member '{member}', or be declared abstract as well")]
    AbstractMemberUnimplemented {
        /// Diagnostic name of the class being built
        class: String,
        /// Name of the unimplemented member
        member: String,
    },

    /// Instantiating a class whose exact type is declared abstract
    #[error("cannot instantiate abstract class '{class}'")]
    AbstractInstantiation {
        /// Diagnostic name of the abstract class
        class: String,
    },

    /// An abstract member sentinel was invoked without a concrete override
    #[error("abstract member '{member}' must be implemented in a subclass")]
    NotImplemented {
        /// Name of the member that was invoked
        member: String,
    },

    /// Unrecognized method annotation name
    #[error("unknown method annotation: '{0}'")]
    UnknownAnnotation(String),

    /// Member lookup failed on a class or instance
    #[error("class '{class}' has no member '{member}'")]
    MissingMember {
        /// Diagnostic name of the class that was searched
        class: String,
        /// Name of the missing member
        member: String,
    },

    /// A non-callable member was invoked as a method
    #[error("member '{member}' is not callable")]
    NotCallable {
        /// Name of the member
        member: String,
    },

    /// Receiver or value of the wrong kind
    #[error("type mismatch: expected {expected}, got {got}")]
    TypeMismatch {
        /// Expected kind
        expected: String,
        /// Actual kind
        got: String,
    },

    /// A superclass call was made outside of a chained method
    #[error("no superclass call binding is in scope")]
    NoSuperBinding,
}
