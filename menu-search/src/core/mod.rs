//! Core search service

pub mod pipeline;
pub mod response;

pub use pipeline::{SearchPipeline, SearchPipelineBuilder};
pub use response::{
    FeedbackOutcome, PipelineError, ResponseMetadata, SearchResponse, SimilarEntry,
};
