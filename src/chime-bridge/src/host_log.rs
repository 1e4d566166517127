use crate::context::LogCallback;
use chime_core::redact::redact_secrets;
use std::ffi::CString;
use std::io;
use tracing::{Level, Metadata};
use tracing_subscriber::fmt::MakeWriter;

/// Forwards each formatted log line to the host's callback, redacted and
/// tagged with an integer level (0 trace, 1 debug, 2 info, 3 warn, 4 error).
pub(crate) struct HostLogMakeWriter {
    callback: LogCallback,
}

impl HostLogMakeWriter {
    pub(crate) fn new(callback: LogCallback) -> Self {
        Self { callback }
    }
}

impl<'a> MakeWriter<'a> for HostLogMakeWriter {
    type Writer = HostLogWriter;

    fn make_writer(&'a self) -> Self::Writer {
        HostLogWriter::new(self.callback, level_code(&Level::INFO))
    }

    fn make_writer_for(&'a self, meta: &Metadata<'_>) -> Self::Writer {
        HostLogWriter::new(self.callback, level_code(meta.level()))
    }
}

pub(crate) struct HostLogWriter {
    callback: LogCallback,
    level: i32,
    buf: Vec<u8>,
}

impl HostLogWriter {
    fn new(callback: LogCallback, level: i32) -> Self {
        Self {
            callback,
            level,
            buf: Vec::new(),
        }
    }

    fn forward(&mut self) {
        if self.buf.is_empty() {
            return;
        }
        let text = String::from_utf8_lossy(&self.buf);
        for line in text.lines() {
            let line = line.trim_end();
            if line.is_empty() {
                continue;
            }
            let safe = redact_secrets(line);
            if let Ok(message) = CString::new(safe.as_bytes()) {
                (self.callback)(self.level, message.as_ptr());
            }
        }
        self.buf.clear();
    }
}

fn level_code(level: &Level) -> i32 {
    match *level {
        Level::TRACE => 0,
        Level::DEBUG => 1,
        Level::INFO => 2,
        Level::WARN => 3,
        Level::ERROR => 4,
    }
}

impl io::Write for HostLogWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buf.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.forward();
        Ok(())
    }
}

impl Drop for HostLogWriter {
    fn drop(&mut self) {
        self.forward();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::{c_char, CStr};
    use std::io::Write;
    use std::sync::Mutex;

    static CAPTURED: Mutex<Vec<(i32, String)>> = Mutex::new(Vec::new());

    extern "C" fn capture(level: i32, message: *const c_char) {
        let text = unsafe { CStr::from_ptr(message) }
            .to_string_lossy()
            .into_owned();
        CAPTURED.lock().unwrap().push((level, text));
    }

    #[test]
    fn lines_reach_the_callback_with_level_and_redaction() {
        CAPTURED.lock().unwrap().clear();

        let mut writer = HostLogWriter::new(capture, level_code(&Level::WARN));
        writer
            .write_all(b"refresh rejected for sid=abc123\nsecond line\n")
            .unwrap();
        writer.flush().unwrap();

        let captured = CAPTURED.lock().unwrap();
        assert_eq!(captured.len(), 2);
        assert_eq!(captured[0].0, 3);
        assert!(!captured[0].1.contains("abc123"));
        assert!(captured[0].1.contains("sid=[redacted]"));
        assert_eq!(captured[1].1, "second line");
    }

    #[test]
    fn level_codes_are_ordered() {
        assert_eq!(level_code(&Level::TRACE), 0);
        assert_eq!(level_code(&Level::ERROR), 4);
    }
}
