use probity_core_types::{RequestId, TraceId};
use thiserror::Error;

/// Result type alias using ProbityError
pub type Result<T> = std::result::Result<T, ProbityError>;

// ========== Error Facility ==========

/// Canonical error kind taxonomy
///
/// Every failure that leaves the engine is classified into one of these
/// kinds. The kind maps to a stable code that callers and tests match on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExErrorKind {
    // Validation
    InvalidInput,
    NotFound,

    // Snapshot semantics
    /// The rows (or header) already exist under this snapshot id
    Conflict,
    /// A mutation targeted a frozen snapshot copy
    Immutable,
    /// Rows were dropped because an endpoint had no copy, under a fail-loud policy
    OrphanedRows,
    /// A stage list violates the collection dependency graph
    DependencyViolation,
    /// The caller cancelled the operation between stages
    Cancelled,

    // Integration/IO
    Persistence,
    Serialization,
    Config,
    Io,

    // Internal
    Internal,
}

impl ExErrorKind {
    /// Get the stable error code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            ExErrorKind::InvalidInput => "ERR_INVALID_INPUT",
            ExErrorKind::NotFound => "ERR_NOT_FOUND",
            ExErrorKind::Conflict => "ERR_CONFLICT",
            ExErrorKind::Immutable => "ERR_IMMUTABLE",
            ExErrorKind::OrphanedRows => "ERR_ORPHANED_ROWS",
            ExErrorKind::DependencyViolation => "ERR_DEPENDENCY_VIOLATION",
            ExErrorKind::Cancelled => "ERR_CANCELLED",
            ExErrorKind::Persistence => "ERR_PERSISTENCE",
            ExErrorKind::Serialization => "ERR_SERIALIZATION",
            ExErrorKind::Config => "ERR_CONFIG",
            ExErrorKind::Io => "ERR_IO",
            ExErrorKind::Internal => "ERR_INTERNAL",
        }
    }
}

/// Canonical structured error type
///
/// Carries a kind for programmatic handling plus the context an operator
/// needs to locate a failure: the operation, the snapshot stage that broke,
/// and the organization/snapshot being processed.
#[derive(Debug, Clone)]
pub struct ExError {
    kind: ExErrorKind,
    op: Option<String>,
    stage: Option<String>,
    organization_id: Option<String>,
    snapshot_id: Option<String>,
    entity_id: Option<String>,
    request_id: Option<RequestId>,
    trace_id: Option<TraceId>,
    message: String,
    source: Option<Box<ExError>>,
}

impl ExError {
    /// Create a new error with the specified kind
    pub fn new(kind: ExErrorKind) -> Self {
        Self {
            kind,
            op: None,
            stage: None,
            organization_id: None,
            snapshot_id: None,
            entity_id: None,
            request_id: None,
            trace_id: None,
            message: String::new(),
            source: None,
        }
    }

    pub fn with_op(mut self, op: impl Into<String>) -> Self {
        self.op = Some(op.into());
        self
    }

    /// Name the snapshot stage (collection) that produced this error
    pub fn with_stage(mut self, stage: impl Into<String>) -> Self {
        self.stage = Some(stage.into());
        self
    }

    pub fn with_organization_id(mut self, id: impl Into<String>) -> Self {
        self.organization_id = Some(id.into());
        self
    }

    pub fn with_snapshot_id(mut self, id: impl Into<String>) -> Self {
        self.snapshot_id = Some(id.into());
        self
    }

    pub fn with_entity_id(mut self, id: impl Into<String>) -> Self {
        self.entity_id = Some(id.into());
        self
    }

    pub fn with_request_id(mut self, request_id: RequestId) -> Self {
        self.request_id = Some(request_id);
        self
    }

    pub fn with_trace_id(mut self, trace_id: TraceId) -> Self {
        self.trace_id = Some(trace_id);
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    pub fn with_source(mut self, source: ExError) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    pub fn kind(&self) -> ExErrorKind {
        self.kind
    }

    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    pub fn op(&self) -> Option<&str> {
        self.op.as_deref()
    }

    pub fn stage(&self) -> Option<&str> {
        self.stage.as_deref()
    }

    pub fn organization_id(&self) -> Option<&str> {
        self.organization_id.as_deref()
    }

    pub fn snapshot_id(&self) -> Option<&str> {
        self.snapshot_id.as_deref()
    }

    pub fn entity_id(&self) -> Option<&str> {
        self.entity_id.as_deref()
    }

    pub fn request_id(&self) -> Option<&RequestId> {
        self.request_id.as_ref()
    }

    pub fn trace_id(&self) -> Option<&TraceId> {
        self.trace_id.as_ref()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn source_error(&self) -> Option<&ExError> {
        self.source.as_deref()
    }

    /// Walk the source chain and return the innermost error
    pub fn root_cause(&self) -> &ExError {
        let mut current = self;
        while let Some(next) = current.source.as_deref() {
            current = next;
        }
        current
    }
}

impl std::fmt::Display for ExError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.code())?;
        if let Some(op) = &self.op {
            write!(f, " in operation '{}'", op)?;
        }
        if let Some(stage) = &self.stage {
            write!(f, " at stage '{}'", stage)?;
        }
        if !self.message.is_empty() {
            write!(f, ": {}", self.message)?;
        }
        if let Some(organization_id) = &self.organization_id {
            write!(f, " (organization_id: {})", organization_id)?;
        }
        if let Some(snapshot_id) = &self.snapshot_id {
            write!(f, " (snapshot_id: {})", snapshot_id)?;
        }
        if let Some(entity_id) = &self.entity_id {
            write!(f, " (entity_id: {})", entity_id)?;
        }
        if let Some(source) = &self.source {
            write!(f, "; caused by {}", source)?;
        }
        Ok(())
    }
}

impl std::error::Error for ExError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_deref()
            .map(|e| e as &(dyn std::error::Error + 'static))
    }
}

// ========== End Error Facility ==========

/// Domain errors raised while validating identifiers, kinds and plans
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProbityError {
    #[error("Invalid tenant id '{value}': expected 16 hex characters")]
    InvalidTenantId { value: String },

    #[error("Invalid identifier '{value}': {reason}")]
    InvalidGid { value: String, reason: String },

    #[error("Unknown entity-type tag: {tag}")]
    UnknownEntityTag { tag: u16 },

    #[error("Unknown snapshot kind: {value}")]
    UnknownSnapshotKind { value: String },

    #[error("Unknown collection: {value}")]
    UnknownCollection { value: String },

    #[error("Unknown orphan policy: {value} (expected 'prune' or 'fail')")]
    UnknownOrphanPolicy { value: String },

    #[error("Snapshot name must not be empty")]
    EmptySnapshotName,

    /// A stage runs before a stage whose copies it reads
    #[error("Stage '{stage}' requires '{requires}' to run first")]
    DependencyNotSatisfied { stage: String, requires: String },

    #[error("Stage '{stage}' appears more than once")]
    DuplicateStage { stage: String },

    #[error("Cyclic dependency among stages: {}", stages.join(", "))]
    CyclicDependency { stages: Vec<String> },
}

impl ProbityError {
    fn kind(&self) -> ExErrorKind {
        match self {
            ProbityError::InvalidTenantId { .. }
            | ProbityError::InvalidGid { .. }
            | ProbityError::UnknownEntityTag { .. }
            | ProbityError::UnknownSnapshotKind { .. }
            | ProbityError::UnknownCollection { .. }
            | ProbityError::UnknownOrphanPolicy { .. }
            | ProbityError::EmptySnapshotName => ExErrorKind::InvalidInput,
            ProbityError::DependencyNotSatisfied { .. }
            | ProbityError::DuplicateStage { .. }
            | ProbityError::CyclicDependency { .. } => ExErrorKind::DependencyViolation,
        }
    }
}

impl From<ProbityError> for ExError {
    fn from(err: ProbityError) -> Self {
        let ex = ExError::new(err.kind()).with_message(err.to_string());
        match &err {
            ProbityError::DependencyNotSatisfied { stage, .. }
            | ProbityError::DuplicateStage { stage } => ex.with_stage(stage.clone()),
            _ => ex,
        }
    }
}
