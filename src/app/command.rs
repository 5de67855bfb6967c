use anyhow::Result;
use clap::{App, ArgMatches};

/// A subcommand of the application.
///
/// A command describes its own arguments as a clap subcommand and runs itself given the parsed arguments.
/// Command names must be unique in an application.
pub(crate) trait Command<'a> {
    /// Returns the name used to invoke the command.
    fn name(&self) -> &str;

    /// Returns the clap subcommand describing the arguments of this command.
    fn clap_subcommand(&self) -> App<'a, 'a>;

    /// Runs the command.
    ///
    /// An error returned here is reported by the application helper,
    /// which chooses the exit status from the kind of the errors in its chain.
    fn execute(&self, arg_matches: &ArgMatches<'_>) -> Result<()>;
}
