//! Prompt assembly for command generation.

use crate::context::LoadedContext;
use crate::models::IndexEntry;

pub const SYSTEM_PROMPT: &str = "You are an AMBER/CPPTRAJ assistant.
Only use the provided manual excerpts to craft exact commands or minimal scripts.
If there are multiple valid approaches, show the *most canonical* one, then one alternative.
Return the final command(s) in fenced code blocks with no commentary inside the blocks.
If parameters are unspecified by the user, pick sane defaults and call them out.
";

/// Appended after a truncated excerpt. Not counted against the character cap.
pub const TRUNCATION_MARKER: &str = "\n[...truncated for token limits ...]";

/// User message: program, request, page reference, then the excerpt
pub fn build_user_prompt(
    program: &str,
    query: &str,
    entry: &IndexEntry,
    context: &LoadedContext,
) -> String {
    let mut prompt = format!(
        "Program: {}\nUser request: {}\nAMBER manual pages for '{}' (pp. {}):\n{}",
        program,
        query,
        entry.key(),
        entry.format_pages(),
        context.text
    );
    if context.truncated {
        prompt.push_str(TRUNCATION_MARKER);
    }
    prompt
}
