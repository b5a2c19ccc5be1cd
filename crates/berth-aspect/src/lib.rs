#![forbid(unsafe_code)]
//! berth-aspect: traversal-time visitors that attach least-privilege pull
//! policies to roles whose resources reference images in another account.
//!
//! Single-threaded by contract: the policy cache is traversal-scoped state
//! owned by the composite visitor, never shared across traversals.

pub mod graph;
pub mod policy;
pub mod visitor;

pub use graph::{
    BatchJobDefinition, ContainerDefinition, ResourceNode, Role, TaskDefinition, TrainingJob,
};
pub use policy::{PolicyCache, PolicyStatement, RepositoryPullPolicy};
pub use visitor::{
    AspectContext, BatchJobMatcher, CompositeAspect, TaskDefinitionMatcher, TrainingJobMatcher,
    Visit,
};
