//! Common imports for typical fold usage.
pub use crate::{
    AbortHandle, Accumulator, ContentBlock, ContentItem, FoldError, Message, Response, Role,
    Update, UpdateStreamExt, UsageDetails, apply, apply_many, fold, fold_async,
};
