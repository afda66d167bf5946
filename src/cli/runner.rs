use crate::client::Lincs;
use crate::document::validate;
use crate::errors::DbError;
use crate::query::{QueryOptions, parse_filter_json};
use crate::types::Row;
use std::io::Write;

use super::command::Command;
use super::util::{parse_fields, read_document, row_to_json};

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum OutputMode {
    Human,
    Plain,
    Json,
}

pub async fn run<W: Write>(
    lincs: &Lincs,
    cmd: Command,
    out: &mut W,
) -> Result<(), Box<dyn std::error::Error>> {
    run_with_format(lincs, cmd, OutputMode::Human, out).await
}

pub async fn run_with_format<W: Write>(
    lincs: &Lincs,
    cmd: Command,
    mode: OutputMode,
    out: &mut W,
) -> Result<(), Box<dyn std::error::Error>> {
    match cmd {
        Command::Compile { filter_json, fields, skip, limit, count } => {
            let filter = parse_filter_json(&filter_json)?;
            let opts = QueryOptions { fields: parse_fields(fields.as_deref()), skip, limit };
            let stmt = lincs.compiler().compile(&filter, &opts, count)?;
            match mode {
                OutputMode::Json => writeln!(out, "{}", serde_json::json!({ "statement": stmt.text }))?,
                OutputMode::Plain | OutputMode::Human => writeln!(out, "{stmt}")?,
            }
            Ok(())
        }
        Command::Keys { ids, fields } => {
            let fields = parse_fields(fields.as_deref());
            let stmt = lincs.compiler().compile_by_ids(ids, fields.as_deref())?;
            match mode {
                OutputMode::Json => writeln!(out, "{}", serde_json::json!({ "statement": stmt.text }))?,
                OutputMode::Plain | OutputMode::Human => writeln!(out, "{stmt}")?,
            }
            Ok(())
        }
        Command::Validate { kind, file } => {
            let doc = read_document(&file)?;
            let report = validate(&doc, kind.schema());
            match mode {
                OutputMode::Json => writeln!(out, "{}", serde_json::to_string(&report)?)?,
                OutputMode::Plain => writeln!(out, "{}", if report.is_valid() { "ok" } else { "invalid" })?,
                OutputMode::Human => writeln!(out, "{}: {report}", file.display())?,
            }
            if report.is_valid() { Ok(()) } else { Err(DbError::Validation(report).into()) }
        }
        Command::Query { filter_json, fields, skip, limit } => {
            let filter = parse_filter_json(&filter_json)?;
            let opts = QueryOptions { fields: parse_fields(fields.as_deref()), skip, limit };
            let rows = lincs.query(&filter, &opts).await?;
            write_rows(out, rows, mode)
        }
        Command::Count { filter_json } => {
            let filter = parse_filter_json(&filter_json)?;
            let n = lincs.count(&filter).await?;
            match mode {
                OutputMode::Json => writeln!(out, "{}", serde_json::json!({ "count": n }))?,
                OutputMode::Plain => writeln!(out, "{n}")?,
                OutputMode::Human => writeln!(out, "count={n}")?,
            }
            Ok(())
        }
        Command::Get { ids, fields } => {
            let fields = parse_fields(fields.as_deref());
            let rows = lincs.get(ids, fields.as_deref()).await?;
            write_rows(out, rows, mode)
        }
    }
}

fn write_rows<W: Write>(
    out: &mut W,
    rows: Vec<Row>,
    mode: OutputMode,
) -> Result<(), Box<dyn std::error::Error>> {
    for row in rows {
        let json = row_to_json(row);
        match mode {
            OutputMode::Human => writeln!(out, "{}", serde_json::to_string_pretty(&json)?)?,
            OutputMode::Plain | OutputMode::Json => writeln!(out, "{json}")?,
        }
    }
    Ok(())
}
