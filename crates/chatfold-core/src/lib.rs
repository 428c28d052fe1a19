//! Folds a streamed chat response, delivered as an ordered sequence of small
//! [`Update`] fragments, back into discrete [`Message`]s with coalesced
//! [`ContentBlock`]s and aggregated response metadata.
//!
//! ```
//! use chatfold_core::prelude::*;
//!
//! let response = fold(vec![
//!     Update::text("Hello").role("assistant").message_id("1"),
//!     Update::text(" world").message_id("1"),
//!     Update::text("hi").role("user").message_id("1"),
//! ]);
//!
//! assert_eq!(response.messages.len(), 2);
//! assert_eq!(response.messages[0].text(), "Hello world");
//! assert_eq!(response.messages[1].role(), "user");
//! ```
//!
//! Live-rendering callers can keep folding into a response they already hold
//! with [`apply`] or drive an async source with [`fold_async`].

/// Result-in-progress of a fold.
pub mod accumulator;
/// Message boundary detection.
pub mod boundary;
/// JSON-lines capture format for recorded update sequences.
pub mod capture;
mod coalesce;
/// Content items and folded content blocks.
pub mod content;
/// Error types for the fallible entry points.
pub mod errors;
/// Sync and async fold entry points.
pub mod fold;
/// Scalar field combination rules.
pub mod metadata;
/// Roles and property maps.
pub mod model;
/// Logging bootstrap.
pub mod observability;
/// Common imports for typical usage.
pub mod prelude;
/// Folded messages and responses.
pub mod response;
/// Incoming update fragments.
pub mod update;
/// Usage counters.
pub mod usage;

pub use accumulator::Accumulator;
pub use boundary::{BoundaryReason, detect_boundary};
pub use content::{
    ContentBlock, ContentItem, DataContent, FunctionCallContent, FunctionResultContent,
    ReasoningContent, TextContent, UsageContent,
};
pub use errors::FoldError;
pub use fold::{
    AbortHandle, FoldCancel, UpdateStreamExt, apply, apply_many, apply_many_async,
    apply_many_try_async, cancellation, fold, fold_async, fold_async_with_cancel, fold_try_async,
};
pub use model::{Properties, Role};
pub use observability::{LogConfig, init_observability};
pub use response::{Message, Response};
pub use update::Update;
pub use usage::UsageDetails;
