//! Chunk prompt for relationship extraction

/// Builds the prompt sent to the model for one chunk
pub struct PromptBuilder<'a> {
    chunk: &'a str,
    index: usize,
    total: usize,
}

impl<'a> PromptBuilder<'a> {
    /// Prompt for chunk `index` (zero-based) of `total`
    pub fn new(chunk: &'a str, index: usize, total: usize) -> Self {
        Self { chunk, index, total }
    }

    /// Build the complete prompt
    pub fn build(&self) -> String {
        let mut prompt = format!(
            "Analyze this text chunk ({} of {}) and identify key relationships between entities.\n",
            self.index + 1,
            self.total
        );
        prompt.push_str(FORMAT_INSTRUCTIONS);
        prompt.push_str("\n\n");
        prompt.push_str(EXAMPLES);
        prompt.push_str("\n\n");
        prompt.push_str(OUTPUT_FORMAT_REMINDER);
        prompt.push_str("\n\nText chunk to analyze: ");
        prompt.push_str(self.chunk);
        prompt
    }
}

const FORMAT_INSTRUCTIONS: &str = "Express each relationship using this format: Entity1 to Entity2 (Description of relationship)

Format rules:
1. Each line should be: Entity1 to Entity2 (Description)
2. Keep entity names clear but concise
3. Place the relationship description in parentheses
4. Make descriptions brief and specific
5. Only include relationships that are clear and meaningful";

const EXAMPLES: &str = "Examples:
Google to Chrome Browser (develops and maintains the browser)
Chrome to Web Extensions (provides platform and APIs)
Microsoft to Windows (develops and distributes operating system)";

const OUTPUT_FORMAT_REMINDER: &str = "Only output the relationships, no additional text or explanation.
Each relationship should be on its own line.";
