use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("feed client error: {0}")]
    Feed(#[from] sectornews_feed::FeedError),

    #[error("storage error: {0}")]
    Store(#[from] sectornews_store::StoreError),
}
