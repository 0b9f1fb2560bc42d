//! Static Export Module
//!
//! Distributes the dataset through an origin that can only serve files (a static site or a
//! bucket), and rebuilds it on the other side.
//!
//! ## Workflow
//! 1. **Export**: `ChunkExporter` projects each record to its compact form and splits the
//!    ordered sequence into fixed-size chunks, plus a manifest listing them.
//! 2. **Publish**: The bundle is written to a directory (`data-{id}.json`, `metadata.json`)
//!    and deployed by whatever means the operator uses.
//! 3. **Assemble**: A consuming process's `ChunkAssembler` fetches the manifest, then each
//!    chunk, expands the records and rebuilds a snapshot.
//!
//! ## Submodules
//! - **`exporter`**: Chunking and manifest generation.
//! - **`assembler`**: Cached, all-or-nothing reconstruction.
//! - **`fetcher`**: `ArtifactFetcher` with HTTP and directory implementations.
//! - **`types`**: Manifest, bundle and error definitions.

pub mod assembler;
pub mod exporter;
pub mod fetcher;
pub mod types;

pub use assembler::ChunkAssembler;
pub use exporter::ChunkExporter;
pub use fetcher::{ArtifactFetcher, DirFetcher, HttpFetcher};
pub use types::{AssemblyError, ChunkInfo, ExportBundle, ExportError, FetchError, Manifest};

#[cfg(test)]
mod tests;
