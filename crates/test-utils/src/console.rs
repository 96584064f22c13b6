use std::io::{self, Write};
use std::sync::{Arc, Mutex};

/// In-memory console for a `ShardLogger`; clones share the buffer.
#[derive(Debug, Clone, Default)]
pub struct SharedConsole {
    buf: Arc<Mutex<Vec<u8>>>,
}

impl SharedConsole {
    pub fn new() -> Self {
        Self::default()
    }

    /// Boxed clone, ready for `ShardLogger::with_console`.
    pub fn sink(&self) -> Box<dyn Write + Send> {
        Box::new(self.clone())
    }

    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.buf.lock().unwrap()).into_owned()
    }

    pub fn lines(&self) -> Vec<String> {
        self.contents().lines().map(str::to_string).collect()
    }
}

impl Write for SharedConsole {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        self.buf.lock().unwrap().extend_from_slice(data);
        Ok(data.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
