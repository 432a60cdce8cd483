//! Grounding context assembly.
//!
//! Joins retrieved documents in the order the index ranked them. The
//! assembler never re-sorts and never deduplicates; it only decides how many
//! of the ranked documents fit.

use super::document::Document;

/// Placeholder context when retrieval found nothing.
pub const NO_RELEVANT_DATA: &str = "No relevant data found.";

/// Separator between documents. Multi-line, so it cannot be confused with
/// ordinary paragraph breaks inside a chunk.
pub const CONTEXT_SEPARATOR: &str = "\n\n---\n\n";

#[derive(Debug, Clone, Default)]
pub struct ContextAssembler {
    /// Character budget for the joined context. The first document is always
    /// kept whole; later documents are dropped once the next one would
    /// exceed the budget.
    max_chars: Option<usize>,
}

impl ContextAssembler {
    pub fn new(max_chars: Option<usize>) -> Self {
        Self { max_chars }
    }

    pub fn assemble<'a, I>(&self, documents: I) -> String
    where
        I: IntoIterator<Item = &'a Document>,
    {
        let separator_len = CONTEXT_SEPARATOR.chars().count();
        let mut context = String::new();
        let mut used_chars = 0usize;
        let mut included = 0usize;

        for document in documents {
            let content_len = document.content.chars().count();

            if included > 0 {
                if let Some(max) = self.max_chars {
                    if used_chars + separator_len + content_len > max {
                        tracing::debug!(
                            "Context budget of {} chars reached after {} documents",
                            max,
                            included
                        );
                        break;
                    }
                }
                context.push_str(CONTEXT_SEPARATOR);
                used_chars += separator_len;
            }

            context.push_str(&document.content);
            used_chars += content_len;
            included += 1;
        }

        if included == 0 {
            return NO_RELEVANT_DATA.to_string();
        }

        context
    }
}
