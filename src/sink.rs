use std::io::{self, Write};

/// Append-only destination for response text and error messages.
pub trait OutputSink {
    fn write_text(&mut self, text: &str) -> io::Result<()>;
}

pub struct WriterSink<W: Write> {
    inner: W,
}

impl<W: Write> WriterSink<W> {
    pub fn new(inner: W) -> Self {
        Self { inner }
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl<W: Write> OutputSink for WriterSink<W> {
    fn write_text(&mut self, text: &str) -> io::Result<()> {
        self.inner.write_all(text.as_bytes())?;
        self.inner.flush()
    }
}

#[derive(Debug, Default, Clone)]
pub struct MemorySink {
    entries: Vec<String>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn contents(&self) -> String {
        self.entries.concat()
    }
}

impl OutputSink for MemorySink {
    fn write_text(&mut self, text: &str) -> io::Result<()> {
        self.entries.push(text.to_string());
        Ok(())
    }
}
