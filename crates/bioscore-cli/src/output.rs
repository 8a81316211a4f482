//! Terminal output for the `bioscore` commands
//!
//! Human mode prints styled lines and tables to stdout. JSON mode prints a
//! single `{"status", "data"}` envelope per command through [`OutputWriter::result`];
//! the decorative helpers stay silent so stdout remains parseable.

use console::style;
use serde::Serialize;
use serde_json::Value;
use std::fmt::Display;
use tabled::{settings::Style, Table, Tabled};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Human,
    Json,
}

pub struct OutputWriter {
    format: OutputFormat,
}

impl OutputWriter {
    pub fn new(json: bool) -> Self {
        let format = if json { OutputFormat::Json } else { OutputFormat::Human };
        Self { format }
    }

    pub fn is_json(&self) -> bool {
        self.format == OutputFormat::Json
    }

    pub fn section(&self, title: impl Display) {
        if !self.is_json() {
            println!("\n{}", style(title).bold().underlined());
        }
    }

    pub fn success(&self, message: impl Display) {
        if !self.is_json() {
            println!("{} {}", style("✓").green().bold(), message);
        }
    }

    pub fn info(&self, message: impl Display) {
        if !self.is_json() {
            println!("{} {}", style("ℹ").blue().bold(), message);
        }
    }

    /// Warnings go to stderr in both modes, as a JSON line in JSON mode
    pub fn warning(&self, message: impl Display) {
        if self.is_json() {
            eprintln!("{}", envelope("warning", Value::String(message.to_string())));
        } else {
            eprintln!("{} {}", style("⚠").yellow().bold(), message);
        }
    }

    /// Labelled value; JSON callers put the same fields into `result`
    pub fn kv(&self, key: impl Display, value: impl Display) {
        if !self.is_json() {
            println!("  {}: {}", style(key).bold(), value);
        }
    }

    pub fn table<T: Tabled>(&self, rows: Vec<T>) {
        if self.is_json() {
            return;
        }
        if rows.is_empty() {
            println!("{}", style("(no rows)").dim());
            return;
        }
        let mut table = Table::new(rows);
        table.with(Style::rounded());
        println!("{}", table);
    }

    /// Command payload: the envelope in JSON mode, pretty JSON otherwise
    pub fn result<T: Serialize>(&self, data: T) -> anyhow::Result<()> {
        let data = serde_json::to_value(data)?;
        let rendered = if self.is_json() { envelope("success", data) } else { data };
        println!("{}", serde_json::to_string_pretty(&rendered)?);
        Ok(())
    }
}

fn envelope(status: &str, data: Value) -> Value {
    match status {
        "success" => serde_json::json!({ "status": status, "data": data }),
        _ => serde_json::json!({ "status": status, "message": data }),
    }
}
