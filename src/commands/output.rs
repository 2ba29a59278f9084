//! Rendering of tabular command output.

use crate::args::OutputFormat;
use crate::Result;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fmt::{Debug, Display, Formatter};

/// Rows of output in the requested format.
#[derive(Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Rows {
    /// The structured data as JSON.
    Json(serde_json::Value),
    /// Markdown table as a single formatted string.
    Table(String),
    /// CSV data as a properly escaped string.
    Csv(String),
}

impl Debug for Rows {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Rows::Json(v) => write!(f, "Rows::Json({:?})", v),
            Rows::Table(s) => write!(f, "Rows::Table({} chars)", s.len()),
            Rows::Csv(s) => write!(f, "Rows::Csv({} chars)", s.len()),
        }
    }
}

impl Display for Rows {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Rows::Json(v) => {
                if let Ok(s) = serde_json::to_string_pretty(v) {
                    write!(f, "{}", s)
                } else {
                    write!(f, "{:?}", v)
                }
            }
            Rows::Table(s) => write!(f, "{}", s),
            Rows::Csv(s) => write!(f, "{}", s),
        }
    }
}

/// A header row plus data rows, already converted to display strings.
#[derive(Debug, Clone, Default)]
pub(crate) struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    pub(crate) fn new<S: Into<String>>(headers: impl IntoIterator<Item = S>) -> Self {
        Self {
            headers: headers.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    pub(crate) fn push<S: Into<String>>(&mut self, row: impl IntoIterator<Item = S>) {
        self.rows.push(row.into_iter().map(Into::into).collect());
    }

    /// Renders as a markdown table with padded columns.
    pub(crate) fn markdown(&self) -> String {
        let mut widths: Vec<usize> = self.headers.iter().map(|h| width(h)).collect();
        for row in &self.rows {
            for (ix, cell) in row.iter().enumerate() {
                if let Some(w) = widths.get_mut(ix) {
                    *w = (*w).max(width(cell));
                }
            }
        }

        let line = |cells: &[String]| -> String {
            let padded: Vec<String> = widths
                .iter()
                .enumerate()
                .map(|(ix, w)| {
                    let cell = cells.get(ix).map(String::as_str).unwrap_or("");
                    format!("{cell}{}", " ".repeat(w - width(cell)))
                })
                .collect();
            format!("| {} |", padded.join(" | "))
        };

        let mut out = Vec::with_capacity(self.rows.len() + 2);
        out.push(line(&self.headers));
        let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
        out.push(format!("| {} |", rule.join(" | ")));
        for row in &self.rows {
            out.push(line(row));
        }
        out.join("\n")
    }

    pub(crate) fn csv(&self) -> Result<String> {
        let mut wtr = csv::Writer::from_writer(Vec::new());
        wtr.write_record(&self.headers)
            .context("Unable to write CSV header")?;
        for row in &self.rows {
            wtr.write_record(row).context("Unable to write CSV row")?;
        }
        let bytes = wtr.into_inner().context("Unable to flush CSV writer")?;
        String::from_utf8(bytes).context("CSV output was not valid UTF-8")
    }
}

fn width(s: &str) -> usize {
    s.chars().count()
}

impl Rows {
    /// Renders `table` or, for JSON, `structure`.
    pub(crate) fn render<T: Serialize>(
        format: OutputFormat,
        table: &Table,
        structure: &T,
    ) -> Result<Self> {
        Ok(match format {
            OutputFormat::Table => Rows::Table(table.markdown()),
            OutputFormat::Csv => Rows::Csv(table.csv()?),
            OutputFormat::Json => Rows::Json(
                serde_json::to_value(structure).context("Unable to serialize output as JSON")?,
            ),
        })
    }
}
