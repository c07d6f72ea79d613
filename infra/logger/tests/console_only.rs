use sprout_logger::{LevelFilter, Logger};

#[test]
fn console_only_logger_has_no_file_writer() {
    let logger = Logger::builder()
        .name("sprout-console-only")
        .level(LevelFilter::DEBUG)
        .init()
        .expect("logger should initialize");

    assert!(!logger.has_file_output());
    tracing::debug!("console output is live");
}
