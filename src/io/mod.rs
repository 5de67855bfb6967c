//! Objects used to read instances and write graphs and tests.

mod event_structure_reader;
pub use event_structure_reader::EventStructureReader;

mod graph_reader;
pub use graph_reader::GraphReader;

mod graph_writer;
pub use graph_writer::GraphWriter;

mod smtlib_reader;
pub use smtlib_reader::SmtLibReader;

mod specs;
pub use specs::InstanceReader;
pub use specs::WarningHandler;

mod tests_writer;
pub use tests_writer::TestsWriter;
