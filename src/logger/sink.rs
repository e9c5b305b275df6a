use std::{
    collections::BTreeMap,
    sync::{Arc, Mutex},
};

use once_cell::sync::Lazy;
use tracing::{field::display, info};

use super::{
    colors::{method_color, paint, status_color},
    record::LogRecord,
    Console, LogOutput, Stream,
};

static SEPARATOR: Lazy<String> = Lazy::new(|| "=".repeat(80));

/// Consumer of finished request records.
pub trait RecordSink: Send + Sync {
    fn emit(&self, record: &LogRecord);

    /// Short name used in startup logs.
    fn name(&self) -> &'static str;
}

/// Renders a record as the multi-line console block.
pub fn render_record(record: &LogRecord, color: bool) -> String {
    let mut lines = vec![
        String::new(),
        SEPARATOR.clone(),
        format!(
            "[{}] {} {}",
            record.timestamp_iso(),
            paint(&record.method, method_color(&record.method), color),
            record.full_url
        ),
        format!(
            "Status: {} | Duration: {} | IP: {}",
            paint(record.status, status_color(record.status), color),
            record.duration_display(),
            record.client_addr.as_deref().unwrap_or("-")
        ),
    ];

    if let Some(params) = &record.params {
        lines.push(format!("Params: {}", compact(params)));
    }
    if let Some(query) = &record.query {
        lines.push(format!("Query: {}", compact(query)));
    }

    lines.push(SEPARATOR.clone());
    lines.join("\n")
}

fn compact(map: &BTreeMap<String, String>) -> String {
    serde_json::to_string(map).unwrap_or_default()
}

/// Prints each record to stdout.
#[derive(Clone)]
pub struct ConsoleSink {
    color: bool,
    output: Arc<dyn LogOutput>,
}

impl ConsoleSink {
    pub fn new(color: bool) -> Self {
        Self::with_output(color, Arc::new(Console))
    }

    pub fn with_output(color: bool, output: Arc<dyn LogOutput>) -> Self {
        Self { color, output }
    }
}

impl RecordSink for ConsoleSink {
    fn emit(&self, record: &LogRecord) {
        self.output
            .write_line(Stream::Stdout, &render_record(record, self.color));
    }

    fn name(&self) -> &'static str {
        "console"
    }
}

/// Emits each record as one structured `tracing` event. Absent fields are
/// not recorded.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl RecordSink for TracingSink {
    fn emit(&self, record: &LogRecord) {
        info!(
            target: "request",
            timestamp = %record.timestamp_iso(),
            method = %record.method,
            path = %record.path,
            url = %record.full_url,
            status = record.status,
            duration_ms = record.duration_ms,
            client_addr = record.client_addr.as_deref(),
            user_agent = record.user_agent.as_deref(),
            params = record.params.as_ref().map(compact).map(display),
            query = record.query.as_ref().map(compact).map(display),
            "Request completed"
        );
    }

    fn name(&self) -> &'static str {
        "tracing"
    }
}

/// Keeps every record in memory. Used to observe the middleware in tests.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    records: Arc<Mutex<Vec<LogRecord>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<LogRecord> {
        match self.records.lock() {
            Ok(records) => records.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl RecordSink for MemorySink {
    fn emit(&self, record: &LogRecord) {
        if let Ok(mut records) = self.records.lock() {
            records.push(record.clone());
        }
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logger::CapturedOutput;
    use chrono::{TimeZone, Utc};
    use std::io;
    use tracing_subscriber::fmt::MakeWriter;

    #[derive(Clone, Default)]
    struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

    impl SharedBuffer {
        fn contents(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    impl io::Write for SharedBuffer {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl<'a> MakeWriter<'a> for SharedBuffer {
        type Writer = SharedBuffer;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    fn traced(record: &LogRecord) -> String {
        let buffer = SharedBuffer::default();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(buffer.clone())
            .with_ansi(false)
            .without_time()
            .finish();

        tracing::subscriber::with_default(subscriber, || TracingSink.emit(record));
        buffer.contents()
    }

    fn record() -> LogRecord {
        LogRecord {
            timestamp: Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 5).unwrap(),
            method: "DELETE".to_string(),
            path: "/matches/42/commentary/7".to_string(),
            full_url: "/matches/42/commentary/7".to_string(),
            status: 404,
            duration_ms: 3,
            client_addr: Some("127.0.0.1".to_string()),
            user_agent: Some("curl/8.5.0".to_string()),
            query: None,
            params: Some(BTreeMap::from([
                ("commentary_id".to_string(), "7".to_string()),
                ("id".to_string(), "42".to_string()),
            ])),
        }
    }

    #[test]
    fn test_render_plain_block() {
        let rendered = render_record(&record(), false);
        let lines: Vec<&str> = rendered.lines().collect();

        assert_eq!(
            lines,
            vec![
                "",
                SEPARATOR.as_str(),
                "[2024-03-01T12:30:05.000Z] DELETE /matches/42/commentary/7",
                "Status: 404 | Duration: 3ms | IP: 127.0.0.1",
                r#"Params: {"commentary_id":"7","id":"42"}"#,
                SEPARATOR.as_str(),
            ]
        );
        assert!(!rendered.contains('\x1b'));
    }

    #[test]
    fn test_render_colored_block() {
        let rendered = render_record(&record(), true);

        assert!(rendered.contains("\x1b[31mDELETE\x1b[0m /matches/42/commentary/7"));
        assert!(rendered.contains("Status: \x1b[33m404\x1b[0m"));
    }

    #[test]
    fn test_render_query_and_missing_address() {
        let mut record = record();
        record.method = "GET".to_string();
        record.full_url = "/matches?team=IND".to_string();
        record.status = 200;
        record.client_addr = None;
        record.params = None;
        record.query = Some(BTreeMap::from([("team".to_string(), "IND".to_string())]));

        let rendered = render_record(&record, false);

        assert!(rendered.contains("Status: 200 | Duration: 3ms | IP: -"));
        assert!(rendered.contains(r#"Query: {"team":"IND"}"#));
        assert!(!rendered.contains("Params:"));
    }

    #[test]
    fn test_memory_sink_collects() {
        let sink = MemorySink::new();
        sink.emit(&record());
        sink.emit(&record());

        assert_eq!(sink.records().len(), 2);
        assert_eq!(sink.records()[0], record());
    }

    #[test]
    fn test_console_sink_writes_block_to_stdout() {
        let output = CapturedOutput::new();
        let sink = ConsoleSink::with_output(false, Arc::new(output.clone()));

        sink.emit(&record());

        assert_eq!(
            output.lines(),
            vec![(Stream::Stdout, render_record(&record(), false))]
        );
    }

    #[test]
    fn test_tracing_sink_emits_one_event() {
        let output = traced(&record());
        let lines: Vec<&str> = output.lines().collect();

        assert_eq!(lines.len(), 1);
        let line = lines[0];
        assert!(line.contains("request:"), "{}", line);
        assert!(line.contains("Request completed"));
        assert!(line.contains("status=404"));
        assert!(line.contains("duration_ms=3"));
        assert!(line.contains(r#"params={"commentary_id":"7","id":"42"}"#));
        assert!(line.contains("client_addr="));
        assert!(!line.contains("query="));
    }

    #[test]
    fn test_tracing_sink_omits_absent_fields() {
        let mut record = record();
        record.client_addr = None;
        record.user_agent = None;
        record.params = None;

        let output = traced(&record);

        assert_eq!(output.lines().count(), 1);
        for field in ["client_addr=", "user_agent=", "params=", "query="] {
            assert!(!output.contains(field), "{} recorded in {}", field, output);
        }
        assert!(output.contains("status=404"));
    }

    #[test]
    fn test_sink_names() {
        assert_eq!(ConsoleSink::new(true).name(), "console");
        assert_eq!(TracingSink.name(), "tracing");
        assert_eq!(MemorySink::new().name(), "memory");
    }
}
