/// Data layer: core types, parsing, and the fetch-once loader.
///
/// Architecture:
/// ```text
///  base URL + path
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  fetch on a worker thread, cache, notify subscribers
///   └──────────┘
///        │ bytes
///        ▼
///   ┌──────────┐
///   │  parse    │  CSV → Dataset, dynamic typing per cell
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  Dataset  │  columns + rows, shared as Arc, never mutated
///   └──────────┘
/// ```

pub mod loader;
pub mod model;
pub mod parse;
