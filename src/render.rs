//! Colored terminal rendering for plans and run summaries.

use fixture_sync_core::RunSummary;
use fixture_sync_core::diff::{DiffKind, PlanStep, ReconciliationPlan};
use owo_colors::OwoColorize;

pub trait Render {
    fn render(&self) -> String;
}

impl Render for DiffKind {
    fn render(&self) -> String {
        let symbol = self.symbol();
        match self {
            DiffKind::Create => symbol.green().to_string(),
            DiffKind::Update => symbol.yellow().to_string(),
            DiffKind::Delete => symbol.red().to_string(),
        }
    }
}

fn colorize(kind: DiffKind, text: &str) -> String {
    match kind {
        DiffKind::Create => text.green().to_string(),
        DiffKind::Update => text.yellow().to_string(),
        DiffKind::Delete => text.red().to_string(),
    }
}

impl Render for PlanStep {
    fn render(&self) -> String {
        let kind = self.kind();
        let title = colorize(kind, self.title());

        match self {
            PlanStep::Create { record, .. } => {
                let kickoff = record.start_time.format("%a %d %b %H:%M UTC").to_string();
                format!("{} {} {}", kind.render(), title, kickoff.dimmed())
            }
            PlanStep::Update {
                previous_title,
                record,
                body,
                ..
            } => {
                let kickoff = record.start_time.format("%a %d %b %H:%M UTC").to_string();
                let mut line = format!("{} {} {}", kind.render(), title, kickoff.dimmed());
                if *previous_title != body.title {
                    line.push_str(&format!(" {}", format!("(was: {previous_title})").dimmed()));
                }
                line
            }
            PlanStep::Delete { reason, .. } => {
                format!("{} {} {}", kind.render(), title, format!("({reason})").dimmed())
            }
        }
    }
}

/// Show counts instead of individual steps above this many.
const COMPACT_THRESHOLD: usize = 10;

fn pluralize<'a>(singular: &'a str, plural: &'a str, count: usize) -> &'a str {
    if count == 1 { singular } else { plural }
}

impl Render for ReconciliationPlan {
    fn render(&self) -> String {
        if self.is_empty() {
            return format!("   {}", "Calendar is up to date".dimmed());
        }

        let mut lines = Vec::new();

        if self.steps.len() <= COMPACT_THRESHOLD {
            for step in &self.steps {
                lines.push(format!("   {}", step.render()));
            }
        } else {
            let counts = self.counts();
            if counts.create > 0 {
                let label = format!("({} new {})", counts.create, pluralize("fixture", "fixtures", counts.create));
                lines.push(format!("   {} {}", "+".green(), label.green()));
            }
            if counts.update > 0 {
                let label = format!("({} changed {})", counts.update, pluralize("fixture", "fixtures", counts.update));
                lines.push(format!("   {} {}", "~".yellow(), label.yellow()));
            }
            for (reason, count) in &counts.delete {
                let label = format!("({} {} {})", count, reason, pluralize("entry", "entries", *count));
                lines.push(format!("   {} {}", "-".red(), label.red()));
            }
        }

        for ambiguous in &self.ambiguous {
            lines.push(format!(
                "   {} entry {} matches fixtures {}",
                "?".yellow(),
                ambiguous.entry_id,
                ambiguous.record_ids.join(", ")
            ));
        }

        lines.join("\n")
    }
}

impl Render for RunSummary {
    fn render(&self) -> String {
        let mut lines = vec![format!(
            "{} {} created, {} updated, {} deleted, {} unchanged",
            "✓".green(),
            self.created,
            self.updated,
            self.deleted_total(),
            self.unchanged
        )];

        if self.malformed > 0 {
            lines.push(format!(
                "{} {} malformed {} skipped",
                "!".yellow(),
                self.malformed,
                pluralize("record", "records", self.malformed)
            ));
        }

        if self.cancelled {
            lines.push(format!(
                "{} Cancelled, {} {} not attempted",
                "!".yellow(),
                self.not_attempted,
                pluralize("operation", "operations", self.not_attempted)
            ));
        }

        for failure in &self.failures {
            lines.push(format!("{} {}", "✗".red(), failure.to_string().red()));
        }

        lines.join("\n")
    }
}
