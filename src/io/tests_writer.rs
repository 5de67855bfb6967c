use crate::solvers::Test;
use anyhow::{Context, Result};
use std::io::Write;

/// A writer for lists of tests.
///
/// Each test is written on its own line: the letter `t`, followed by the identifiers of its events.
#[derive(Default)]
pub struct TestsWriter;

impl TestsWriter {
    /// Writes a list of tests.
    pub fn write(&self, tests: &[Test], writer: &mut dyn Write) -> Result<()> {
        let context = "while writing tests";
        tests
            .iter()
            .try_for_each(|t| writeln!(writer, "{}", t).context(context))?;
        writer.flush().context(context)
    }
}
