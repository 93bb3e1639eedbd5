pub mod config;
pub mod db;
pub mod models;
pub mod intelligence; // Risk flags, actions, care summary
pub mod trends; // Dashboard chart series
pub mod report; // Doctor visit summary + PDF

use chrono::{Local, NaiveDateTime};
use rusqlite::Connection;
use thiserror::Error;
use tracing_subscriber::EnvFilter;

#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Database(#[from] db::DatabaseError),

    #[error(transparent)]
    Engine(#[from] intelligence::EngineError),

    #[error(transparent)]
    Report(#[from] report::ReportError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Care summaries for every recipient at `now`, newest recipient first.
pub fn summarize_all(
    conn: &Connection,
    now: NaiveDateTime,
) -> Result<Vec<(models::Recipient, intelligence::CareSummary)>, AppError> {
    let mut out = Vec::new();
    for recipient in db::list_recipients(conn)? {
        let summary = intelligence::compose_summary(conn, &recipient.id, now)?;
        out.push((recipient, summary));
    }
    Ok(out)
}

/// Renders summaries as one JSON array document.
pub fn summaries_to_json(
    summaries: &[(models::Recipient, intelligence::CareSummary)],
) -> Result<String, AppError> {
    let list: Vec<&intelligence::CareSummary> = summaries.iter().map(|(_, s)| s).collect();
    Ok(serde_json::to_string_pretty(&list)?)
}

/// Prints the care summaries of all recipients to stdout as a single JSON
/// array; logs go to stderr. With `--export`, also writes each recipient's
/// doctor visit PDF to the exports directory.
pub fn run() -> Result<(), AppError> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();

    tracing::info!("CarePilot starting v{}", config::APP_VERSION);

    let export = std::env::args().skip(1).any(|arg| arg == "--export");
    let conn = db::open_database(&config::database_path())?;
    let now = Local::now().naive_local();

    let summaries = summarize_all(&conn, now)?;

    if export {
        for (recipient, summary) in &summaries {
            let visit = report::build_report(&recipient.display_name(), summary, now);
            let bytes = report::generate_report_pdf(&visit)?;
            report::export_report_to_file(
                &bytes,
                &config::exports_dir(),
                &report::report_filename(&recipient.id),
            )?;
        }
    }

    println!("{}", summaries_to_json(&summaries)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::db::repository::{insert_recipient, NewRecipient};
    use crate::db::sqlite::open_memory_database;

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 3, 10)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    fn add_recipient(conn: &Connection, first: &str) -> uuid::Uuid {
        insert_recipient(
            conn,
            &NewRecipient {
                first_name: first.into(),
                last_name: "Adams".into(),
                relationship: None,
                age: None,
                conditions: None,
            },
        )
        .unwrap()
    }

    #[test]
    fn output_is_single_json_array() {
        let conn = open_memory_database().unwrap();
        let mary = add_recipient(&conn, "Mary");
        let john = add_recipient(&conn, "John");

        let summaries = summarize_all(&conn, now()).unwrap();
        let json = summaries_to_json(&summaries).unwrap();

        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        let items = parsed.as_array().expect("top-level array");
        assert_eq!(items.len(), 2);
        assert_eq!(items[0]["recipient_id"], john.to_string());
        assert_eq!(items[1]["recipient_id"], mary.to_string());
        assert_eq!(items[0]["status"], "Stable");
        assert!(items[0]["lines"].is_array());
    }

    #[test]
    fn no_recipients_is_empty_array() {
        let conn = open_memory_database().unwrap();
        let summaries = summarize_all(&conn, now()).unwrap();
        let parsed: serde_json::Value =
            serde_json::from_str(&summaries_to_json(&summaries).unwrap()).unwrap();
        assert_eq!(parsed, serde_json::json!([]));
    }
}
