//! Pipeline stages: signature extraction, type resolution, binding filter,
//! glue generation, and the pipeline that ties them together.

pub mod codegen;
pub mod extractor;
pub mod filter;
pub mod pipeline;
pub mod resolver;

pub use codegen::GlueGenerator;
pub use extractor::{extract_signatures, EntryState, Extraction, SignatureExtractor};
pub use filter::{classify, BindingFilter, FilterOutcome, Rejection};
pub use pipeline::{
    read_dump, sha256_hex, Pipeline, PipelineOutput, ResolutionContext, WrittenOutputs,
};
pub use resolver::{build_type_graph, Link, ResolutionError, TypeGraph, TypeNode, TypedefAliases};
