use anyhow::Result;
use std::io::Read;

/// The type of callback functions to call when warnings are raised while reading an instance.
///
/// The first parameter is the line (starting at 1) the warning refers to.
pub type WarningHandler = Box<dyn Fn(usize, String)>;

/// A trait implemented by objects able to read instances.
pub trait InstanceReader<T> {
    /// Reads an instance.
    ///
    /// Malformed inputs lead to an error whose chain contains an [`InputFormatError`](crate::utils::InputFormatError).
    /// In case warnings are raised, the callback functions registered by [add_warning_handler](Self::add_warning_handler) are triggered.
    ///
    /// # Example
    ///
    /// ```
    /// # use escover::events::EventStructure;
    /// # use escover::io::{EventStructureReader, InstanceReader};
    /// fn read_events_from_str(s: &str) -> EventStructure {
    ///     let reader = EventStructureReader::default();
    ///     reader.read(&mut s.as_bytes()).expect("invalid event structure")
    /// }
    /// # read_events_from_str("(1, Event(pred=(), icnf=()))");
    /// ```
    fn read(&self, reader: &mut dyn Read) -> Result<T>;

    /// Adds a callback function to call when warnings are raised while reading an instance.
    fn add_warning_handler(&mut self, h: WarningHandler);
}

pub(crate) fn warn_all(handlers: &[WarningHandler], line: usize, message: String) {
    handlers.iter().for_each(|h| (h)(line, message.clone()));
}
