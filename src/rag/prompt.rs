//! The grounded prompt.
//!
//! The template is split around its two slots at compile time and the pieces
//! are concatenated, so braces or `---` lines inside the context or the
//! question are copied verbatim and never re-interpreted.

const PREAMBLE: &str = "\nAnswer the question based only on the following context:\n\n";
const CONTEXT_TO_QUESTION: &str =
    "\n\n---\n\nAnswer the question based on the above context: ";
const EPILOGUE: &str = "\n";

#[derive(Debug, Clone, Copy, Default)]
pub struct PromptBuilder;

impl PromptBuilder {
    pub fn build(&self, context: &str, question: &str) -> String {
        let mut prompt = String::with_capacity(
            PREAMBLE.len() + context.len() + CONTEXT_TO_QUESTION.len() + question.len() + EPILOGUE.len(),
        );
        prompt.push_str(PREAMBLE);
        prompt.push_str(context);
        prompt.push_str(CONTEXT_TO_QUESTION);
        prompt.push_str(question);
        prompt.push_str(EPILOGUE);
        prompt
    }
}
