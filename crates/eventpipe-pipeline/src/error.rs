use thiserror::Error;

/// Any side-effect stage's own error, boxed so the pipeline can contain
/// every stage uniformly regardless of its concrete error type
/// (SPEC_FULL.md §7.1).
#[derive(Debug, Error)]
#[error("{0}")]
pub struct StageError(#[from] Box<dyn std::error::Error + Send + Sync>);

impl StageError {
    pub fn new(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self(Box::new(err))
    }

    pub fn msg(text: impl Into<String>) -> Self {
        #[derive(Debug, Error)]
        #[error("{0}")]
        struct Message(String);
        Self(Box::new(Message(text.into())))
    }
}

/// Errors surfaced from `run_pipeline` itself, outside the per-stage
/// containment boundary. Unlike `StageError`, these abort pipeline
/// entry entirely (SPEC_FULL.md §7: "MissingCache ... treated as
/// already processed"; an unresolvable project/organization is the
/// same shape of no-op).
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("event body missing from processing store, treating as already processed")]
    MissingCache,
    #[error("project {0} not found in rebind cache")]
    UnknownProject(i64),
    #[error("organization {0} not found in rebind cache")]
    UnknownOrganization(i64),
}
