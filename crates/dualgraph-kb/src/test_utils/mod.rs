// Scripted store doubles for tests
pub mod mocks;

pub use mocks::{MockDocumentStore, MockGraphStore};
