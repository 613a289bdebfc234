use geocluster::{ClusterIndex, ClusterOptions, InputPoint};
use log::{Level, LevelFilter, Log, Metadata, Record};
use std::sync::Mutex;

/// Keeps every record emitted by this crate.
struct CaptureLogger {
    records: Mutex<Vec<(Level, String)>>,
}

impl Log for CaptureLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.target().starts_with("geocluster")
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            self.records
                .lock()
                .unwrap()
                .push((record.level(), record.args().to_string()));
        }
    }

    fn flush(&self) {}
}

static LOGGER: CaptureLogger = CaptureLogger {
    records: Mutex::new(Vec::new()),
};

fn take_records() -> Vec<(Level, String)> {
    std::mem::take(&mut *LOGGER.records.lock().unwrap())
}

fn points(count: usize) -> Vec<InputPoint> {
    (0..count)
        .map(|i| InputPoint::from_lng_lat((i % 30) as f64 * 2.0 - 30.0, (i / 30) as f64 * 2.0))
        .collect()
}

/// Build timings go to info with `log` set and to trace otherwise
#[test]
fn test_build_log_level_follows_option() {
    log::set_logger(&LOGGER).unwrap();
    log::set_max_level(LevelFilter::Trace);

    let options = ClusterOptions::default().with_max_zoom(6);

    ClusterIndex::build(options.clone().with_log(true), points(300)).unwrap();
    let loud = take_records();
    let info: Vec<&String> = loud
        .iter()
        .filter(|(level, _)| *level == Level::Info)
        .map(|(_, message)| message)
        .collect();
    assert!(info.iter().any(|m| m.starts_with("prepared 300 points")));
    assert_eq!(info.iter().filter(|m| m.starts_with('z')).count(), 7);
    let summary = info
        .iter()
        .find(|m| m.starts_with("indexed 300 points"))
        .unwrap();
    assert!(summary.contains("over 8 zoom levels"));

    ClusterIndex::build(options.with_log(false), points(300)).unwrap();
    let quiet = take_records();
    assert!(quiet.iter().all(|(level, _)| *level != Level::Info));
    assert!(
        quiet
            .iter()
            .any(|(level, m)| *level == Level::Trace && m.starts_with("indexed 300 points"))
    );
}
