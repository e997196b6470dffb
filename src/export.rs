use std::io::Write;

use crate::analysis::AnalysisReport;
use crate::error::Result;
use crate::extract::{extract, IdentifierCategory};
use crate::record::{ItemKind, VideoRecord};

const BASE_COLUMNS: [&str; 8] = [
    "type",
    "id",
    "title",
    "channel",
    "published_at",
    "description",
    "views",
    "subscribers",
];

pub fn csv_header() -> Vec<String> {
    BASE_COLUMNS
        .iter()
        .map(|column| column.to_string())
        .chain(
            IdentifierCategory::all()
                .iter()
                .map(|category| category.as_str().to_string()),
        )
        .collect()
}

/// One row per record with the identifiers found in its description.
pub fn flatten_record(record: &VideoRecord, separator: &str) -> Vec<String> {
    let identifiers = extract(&record.description);
    let (channel, subscribers) = match record.kind {
        ItemKind::Video => (record.channel_title.clone(), String::new()),
        ItemKind::Channel => (record.title.clone(), record.subscriber_count.to_string()),
    };

    let mut row = vec![
        record.kind.label().to_string(),
        record.record_id(),
        record.title.clone(),
        channel,
        record.published_at.clone(),
        record.description.clone(),
        record.view_count.to_string(),
        subscribers,
    ];
    row.extend(
        IdentifierCategory::all()
            .iter()
            .map(|category| identifiers.get(*category).join(separator)),
    );
    row
}

pub fn write_records_csv<W: Write>(out: W, records: &[VideoRecord], separator: &str) -> Result<()> {
    let mut wtr = csv::WriterBuilder::new().has_headers(true).from_writer(out);
    wtr.write_record(csv_header())?;
    for record in records {
        wtr.write_record(flatten_record(record, separator))?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_report_json<W: Write>(mut out: W, report: &AnalysisReport) -> Result<()> {
    serde_json::to_writer_pretty(&mut out, report)?;
    writeln!(out)?;
    Ok(())
}
