//! Output sinks for `PRINT` / `PRINTLN`

use std::io::{self, Write};
use std::sync::{Arc, Mutex};

/// Shared, thread-safe output sink
pub type OutputWriter = Arc<Mutex<Box<dyn Write + Send>>>;

/// Writer that forwards to the process's standard output
pub fn stdout_writer() -> OutputWriter {
    Arc::new(Mutex::new(Box::new(io::stdout())))
}

/// Writer that appends into a shared in-memory buffer
///
/// Returns the writer and a handle to read the captured bytes back.
pub fn buffer_writer() -> (OutputWriter, Arc<Mutex<Vec<u8>>>) {
    let buffer = Arc::new(Mutex::new(Vec::new()));
    let writer: OutputWriter = Arc::new(Mutex::new(Box::new(SharedBuffer(buffer.clone()))));
    (writer, buffer)
}

/// Captured buffer contents as a string (lossy UTF-8)
pub fn buffer_contents(buffer: &Arc<Mutex<Vec<u8>>>) -> String {
    let bytes = buffer.lock().unwrap_or_else(|e| e.into_inner());
    String::from_utf8_lossy(&bytes).into_owned()
}

struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
