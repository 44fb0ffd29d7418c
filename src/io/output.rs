use crate::core::{Location, RuleTarget};
use crate::summary::CategorySummary;
use crate::suite::SuiteReport;
use colored::*;
use comfy_table::{presets::UTF8_FULL, Cell, ContentArrangement, Table};
use std::io::Write;

pub trait OutputWriter {
    fn write_report(&mut self, report: &SuiteReport) -> anyhow::Result<()>;
}

pub struct JsonWriter<W: Write> {
    writer: W,
}

impl<W: Write> JsonWriter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }
}

impl<W: Write> OutputWriter for JsonWriter<W> {
    fn write_report(&mut self, report: &SuiteReport) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(report)?;
        self.writer.write_all(json.as_bytes())?;
        writeln!(self.writer)?;
        self.writer.flush()?;
        Ok(())
    }
}

/// Human-readable report: category table, worst offenders, improvement list
/// and dead steps.
pub struct TerminalWriter<W: Write> {
    writer: W,
    worst: usize,
}

impl<W: Write> TerminalWriter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer, worst: 5 }
    }

    pub fn with_worst(mut self, worst: usize) -> Self {
        self.worst = worst;
        self
    }
}

impl<W: Write> OutputWriter for TerminalWriter<W> {
    fn write_report(&mut self, report: &SuiteReport) -> anyhow::Result<()> {
        self.write_header()?;
        self.write_categories(report)?;
        self.write_worst_offenders(report)?;
        self.write_improvement_list(report)?;
        self.write_dead_steps(report)?;
        self.write_status(report)?;
        self.writer.flush()?;
        Ok(())
    }
}

impl<W: Write> TerminalWriter<W> {
    fn write_header(&mut self) -> anyhow::Result<()> {
        writeln!(self.writer, "{}", "BDD Suite Report".bold().blue())?;
        writeln!(self.writer, "{}", "================".blue())?;
        writeln!(self.writer)?;
        Ok(())
    }

    fn write_categories(&mut self, report: &SuiteReport) -> anyhow::Result<()> {
        let summary = &report.summary;
        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic)
            .set_header(vec![
                "Category",
                "Total",
                "Score",
                "Average",
                "Min",
                "Max",
                "Good",
                "Bad",
            ]);

        let categories = [
            ("Features", &summary.features),
            ("Scenarios", &summary.scenarios),
            ("Step Definitions", &summary.step_definitions),
            ("Hooks", &summary.hooks),
        ];
        for (name, category) in categories {
            table.add_row(category_row(name, category));
        }

        writeln!(self.writer, "{table}")?;
        writeln!(self.writer)?;
        Ok(())
    }

    fn write_worst_offenders(&mut self, report: &SuiteReport) -> anyhow::Result<()> {
        let thresholds = &report.summary.thresholds;
        let mut offenders: Vec<&dyn RuleTarget> = Vec::new();
        for feature in &report.features {
            offenders.push(feature);
            for scenario in feature.all_scenarios() {
                offenders.push(scenario);
            }
        }
        for definition in &report.step_definitions {
            offenders.push(definition);
        }
        for hook in &report.hooks {
            offenders.push(hook);
        }
        offenders.retain(|target| target.score() > 0);
        if offenders.is_empty() {
            return Ok(());
        }
        offenders.sort_by(|a, b| b.score().cmp(&a.score()));

        writeln!(
            self.writer,
            "{} (top {}):",
            "Worst offenders".bold(),
            self.worst
        )?;
        for target in offenders.into_iter().take(self.worst) {
            let score = if target.good(thresholds.for_kind(target.kind())) {
                target.score().to_string().yellow()
            } else {
                target.score().to_string().red()
            };
            writeln!(
                self.writer,
                "  {:>6}  {} {}",
                score,
                target.kind(),
                target.location()
            )?;
            for (phrase, count) in target.violations().iter() {
                writeln!(self.writer, "          {count} x {phrase}")?;
            }
        }
        writeln!(self.writer)?;
        Ok(())
    }

    fn write_improvement_list(&mut self, report: &SuiteReport) -> anyhow::Result<()> {
        let improvements = &report.summary.improvement_list;
        if improvements.is_empty() {
            return Ok(());
        }

        writeln!(self.writer, "{}:", "Improvements".bold())?;
        for (phrase, count) in improvements.iter() {
            writeln!(self.writer, "  {count:>5}  {phrase}")?;
        }
        writeln!(self.writer)?;
        Ok(())
    }

    fn write_dead_steps(&mut self, report: &SuiteReport) -> anyhow::Result<()> {
        let dead = &report.dead_steps;
        if dead.is_empty() {
            return Ok(());
        }

        writeln!(
            self.writer,
            "{} ({}):",
            "Dead steps".bold().yellow(),
            dead.total
        )?;
        for (file, entries) in &dead.by_file {
            writeln!(self.writer, "  {}", file.display())?;
            for entry in entries {
                writeln!(self.writer, "    {entry}")?;
            }
        }
        writeln!(self.writer)?;
        Ok(())
    }

    fn write_status(&mut self, report: &SuiteReport) -> anyhow::Result<()> {
        let summary = &report.summary;
        let status = if summary.good() {
            "PASS".green().bold()
        } else {
            "FAIL".red().bold()
        };
        writeln!(
            self.writer,
            "{status}: total score {} (threshold {})",
            summary.total_score, summary.thresholds.project
        )?;
        Ok(())
    }
}

fn category_row(name: &str, category: &CategorySummary) -> Vec<Cell> {
    let location = |location: &Option<Location>| {
        location
            .as_ref()
            .map(|l| format!(" ({l})"))
            .unwrap_or_default()
    };
    vec![
        Cell::new(name),
        Cell::new(category.total),
        Cell::new(category.total_score),
        Cell::new(format!("{:.2}", category.average)),
        Cell::new(format!("{}{}", category.min, location(&category.min_location))),
        Cell::new(format!("{}{}", category.max, location(&category.max_location))),
        Cell::new(category.good),
        Cell::new(category.bad),
    ]
}
