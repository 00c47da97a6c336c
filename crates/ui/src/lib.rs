pub mod controller;
pub mod document;
pub mod entity;
pub mod metrics;
pub mod render;

pub use controller::{Controller, ExtractOutcome, Handled, Wiring};
pub use document::{Action, Document, Element, ElementIds, ElementKind, MemoryDocument, SelectOption};
pub use entity::{EntityDescriptor, describe};
pub use metrics::{Metrics, MetricsSnapshot};
