//! Merges adjacent same-kind content items of a message into content blocks.

use serde_json::Value;
use tracing::trace;

use crate::content::{ContentBlock, ContentItem, ReasoningContent, TextContent};
use crate::usage::UsageDetails;

/// The block currently accepting merges, if any.
#[derive(Clone, Debug, Default, PartialEq)]
pub(crate) enum OpenBlock {
    #[default]
    NoBlock,
    Text {
        text: String,
        annotations: Option<Vec<Value>>,
    },
    Reasoning {
        text: String,
    },
}

impl OpenBlock {
    fn into_block(self) -> Option<ContentBlock> {
        match self {
            Self::NoBlock => None,
            Self::Text { text, annotations } => Some(ContentBlock::Text { text, annotations }),
            Self::Reasoning { text } => Some(ContentBlock::Reasoning {
                text,
                protected_data: None,
            }),
        }
    }
}

/// Per-message coalescing state.
#[derive(Clone, Debug, Default)]
pub(crate) struct Coalescer {
    open: OpenBlock,
}

impl Coalescer {
    /// Reopens the trailing block of `blocks` when it can still take merges.
    ///
    /// Used when folding resumes from an already-built message: an unsealed
    /// trailing text or reasoning block is exactly the block that was open when
    /// the previous pass stopped.
    pub(crate) fn resume(blocks: &mut Vec<ContentBlock>) -> Self {
        let reopenable = blocks.last().is_some_and(|block| {
            !block.is_sealed()
                && matches!(block, ContentBlock::Text { .. } | ContentBlock::Reasoning { .. })
        });
        let open = match blocks.pop() {
            Some(ContentBlock::Text { text, annotations }) if reopenable => {
                OpenBlock::Text { text, annotations }
            }
            Some(ContentBlock::Reasoning { text, .. }) if reopenable => OpenBlock::Reasoning { text },
            Some(block) => {
                blocks.push(block);
                OpenBlock::NoBlock
            }
            None => OpenBlock::NoBlock,
        };
        Self { open }
    }

    #[cfg(test)]
    pub(crate) fn open(&self) -> &OpenBlock {
        &self.open
    }

    /// Consumes one item against the open block.
    ///
    /// Usage items never reach `blocks`; their counters are added to `usage`.
    pub(crate) fn push(
        &mut self,
        blocks: &mut Vec<ContentBlock>,
        usage: &mut Option<UsageDetails>,
        item: ContentItem,
    ) {
        match item {
            ContentItem::Usage(content) => {
                trace!("usage item lifted into response totals");
                usage.get_or_insert_with(UsageDetails::default).add(&content.counters);
            }
            ContentItem::Text(content) if content.has_annotations() => {
                self.flush(blocks);
                let TextContent { text, annotations } = content;
                blocks.push(ContentBlock::Text { text, annotations });
            }
            ContentItem::Text(TextContent { text, annotations }) => match &mut self.open {
                OpenBlock::Text {
                    text: open_text,
                    annotations: open_annotations,
                } => {
                    open_text.push_str(&text);
                    *open_annotations = annotations;
                }
                _ => {
                    self.flush(blocks);
                    self.open = OpenBlock::Text { text, annotations };
                }
            },
            ContentItem::Reasoning(ReasoningContent {
                text,
                protected_data,
            }) => {
                match &mut self.open {
                    OpenBlock::Reasoning { text: open_text } => open_text.push_str(&text),
                    _ => {
                        self.flush(blocks);
                        self.open = OpenBlock::Reasoning { text };
                    }
                }
                if let Some(protected_data) = protected_data
                    && let OpenBlock::Reasoning { text } = std::mem::take(&mut self.open)
                {
                    trace!("reasoning block sealed by protected data");
                    blocks.push(ContentBlock::Reasoning {
                        text,
                        protected_data: Some(protected_data),
                    });
                }
            }
            opaque => {
                self.flush(blocks);
                trace!(kind = %opaque.kind(), "opaque item kept as standalone block");
                blocks.push(ContentBlock::Opaque(opaque));
            }
        }
    }

    /// Appends the open block, if any, to `blocks`.
    pub(crate) fn flush(&mut self, blocks: &mut Vec<ContentBlock>) {
        if let Some(block) = std::mem::take(&mut self.open).into_block() {
            blocks.push(block);
        }
    }
}
