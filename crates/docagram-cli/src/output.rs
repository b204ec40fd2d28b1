//! Output formatting for the CLI.

use crate::config::OutputFormat;
use crate::error::Result;
use colored::*;
use docagram_domain::Relationship;
use docagram_extractor::{AnalysisOptions, AnalysisReport, Section};
use docagram_store::EntitySummary;
use tabled::{
    builder::Builder,
    settings::{object::Rows, Alignment, Modify, Style},
};

/// Output formatter.
pub struct Formatter {
    format: OutputFormat,
    color_enabled: bool,
}

impl Formatter {
    /// Create a new formatter.
    pub fn new(format: OutputFormat, color_enabled: bool) -> Self {
        Self {
            format,
            color_enabled,
        }
    }

    /// Format relationships output.
    pub fn format_relationships(&self, relationships: &[Relationship]) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(relationships)?),
            OutputFormat::Table => Ok(self.relationships_table(relationships)),
            OutputFormat::Quiet => Ok(relationships
                .iter()
                .map(|r| format!("{} to {} ({})", r.entity1, r.entity2, r.description))
                .collect::<Vec<_>>()
                .join("\n")),
        }
    }

    fn relationships_table(&self, relationships: &[Relationship]) -> String {
        if relationships.is_empty() {
            return self.colorize("No relationships found.", "yellow");
        }

        let mut builder = Builder::default();
        builder.push_record(["Entity", "Relationship", "Entity", "Source"]);
        for rel in relationships {
            builder.push_record([
                rel.entity1.as_str(),
                rel.description.as_str(),
                rel.entity2.as_str(),
                rel.source_url.as_str(),
            ]);
        }

        let mut table = builder.build();
        table
            .with(Style::rounded())
            .with(Modify::new(Rows::first()).with(Alignment::center()));
        table.to_string()
    }

    /// Format the entity list.
    ///
    /// `selected` is marked in table output.
    pub fn format_entities(&self, entities: &[EntitySummary], selected: Option<&str>) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(entities)?),
            OutputFormat::Quiet => Ok(entities
                .iter()
                .map(|e| e.name.as_str())
                .collect::<Vec<_>>()
                .join("\n")),
            OutputFormat::Table => {
                if entities.is_empty() {
                    return Ok(self.colorize("No entities found.", "yellow"));
                }

                let mut builder = Builder::default();
                builder.push_record(["", "Entity", "Count", "Source"]);
                for entity in entities {
                    let marker = if selected == Some(entity.name.as_str()) { "*" } else { "" };
                    builder.push_record([
                        marker.to_string(),
                        entity.name.clone(),
                        entity.count.to_string(),
                        entity.source.clone().unwrap_or_default(),
                    ]);
                }

                let mut table = builder.build();
                table
                    .with(Style::rounded())
                    .with(Modify::new(Rows::first()).with(Alignment::center()));
                Ok(table.to_string())
            }
        }
    }

    /// Format the summary of an analysis run.
    pub fn format_report(&self, report: &AnalysisReport) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(report)?),
            OutputFormat::Quiet => Ok(report.relationships_added.to_string()),
            OutputFormat::Table => {
                let mut msg = format!(
                    "Added {} relationship(s) from {} chunk(s) in {}ms",
                    report.relationships_added, report.chunks_total, report.duration_ms
                );
                if report.summarized {
                    msg.push_str(" (summarized first)");
                }
                let mut out = self.success(&msg);
                if !report.chunks_skipped.is_empty() {
                    let skipped: Vec<String> =
                        report.chunks_skipped.iter().map(|i| (i + 1).to_string()).collect();
                    out.push('\n');
                    out.push_str(&self.warning(&format!("Skipped chunk(s): {}", skipped.join(", "))));
                }
                Ok(out)
            }
        }
    }

    /// Format per-section results.
    pub fn format_sections(&self, sections: &[Section]) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(sections)?),
            OutputFormat::Quiet => Ok(sections
                .iter()
                .map(|s| s.relationships.len().to_string())
                .collect::<Vec<_>>()
                .join("\n")),
            OutputFormat::Table => {
                let mut out = Vec::new();
                for section in sections {
                    out.push(self.colorize(&format!("Section {}", section.index + 1), "cyan"));
                    if let Some(error) = &section.error {
                        out.push(self.error(error));
                    }
                    if !section.summary.is_empty() {
                        out.push(section.summary.clone());
                    }
                    out.push(self.relationships_table(&section.relationships));
                }
                Ok(out.join("\n"))
            }
        }
    }

    /// Format analysis options.
    pub fn format_options(&self, options: &AnalysisOptions) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(options)?),
            OutputFormat::Quiet | OutputFormat::Table => {
                let mut builder = Builder::default();
                builder.push_record(["Option", "Value"]);
                builder.push_record(["temperature".to_string(), options.temperature.to_string()]);
                builder.push_record(["topK".to_string(), options.top_k.to_string()]);
                builder.push_record([
                    "minimumEntityCount".to_string(),
                    options.minimum_entity_count.to_string(),
                ]);
                builder.push_record(["chunkSize".to_string(), options.chunk_size.to_string()]);
                builder.push_record(["systemPrompt".to_string(), first_line(&options.system_prompt)]);

                let mut table = builder.build();
                table.with(Style::rounded());
                Ok(table.to_string())
            }
        }
    }

    /// Format a progress line for stderr.
    pub fn status(&self, message: &str) -> String {
        self.colorize(message, "magenta")
    }

    /// Format a success message.
    pub fn success(&self, message: &str) -> String {
        self.colorize(&format!("✓ {}", message), "green")
    }

    /// Format an error message.
    pub fn error(&self, message: &str) -> String {
        self.colorize(&format!("✗ {}", message), "red")
    }

    /// Format an info message.
    pub fn info(&self, message: &str) -> String {
        self.colorize(&format!("ℹ {}", message), "blue")
    }

    /// Format a warning message.
    pub fn warning(&self, message: &str) -> String {
        self.colorize(&format!("⚠ {}", message), "yellow")
    }

    /// Whether output is quiet.
    pub fn is_quiet(&self) -> bool {
        matches!(self.format, OutputFormat::Quiet)
    }

    /// Colorize text if color is enabled.
    fn colorize(&self, text: &str, color: &str) -> String {
        if !self.color_enabled {
            return text.to_string();
        }

        match color {
            "red" => text.red().to_string(),
            "green" => text.green().to_string(),
            "blue" => text.blue().to_string(),
            "yellow" => text.yellow().to_string(),
            "cyan" => text.cyan().to_string(),
            "magenta" => text.magenta().to_string(),
            _ => text.to_string(),
        }
    }
}

fn first_line(text: &str) -> String {
    match text.lines().next() {
        Some(line) if text.lines().nth(1).is_some() => format!("{}...", line),
        Some(line) => line.to_string(),
        None => String::new(),
    }
}
