use super::{cli_manager::CliManager, command::Command};
use anyhow::Result;
use escover::utils::InputFormatError;
use log::{error, info};
use std::{ffi::OsString, sync::Once, time::Instant};

static LOGGER_INIT: Once = Once::new();

/// The exit status used when a command fails for another reason than its arguments or its input format.
pub(crate) const EXIT_FAILURE: i32 = 1;

/// The exit status used when the command line cannot be parsed.
pub(crate) const EXIT_USAGE: i32 = 2;

/// The exit status used when an input file is malformed.
pub(crate) const EXIT_INPUT_FORMAT: i32 = 3;

/// The entry point of the application.
///
/// Commands are registered with [`add_command`](Self::add_command), then [`launch_app`](Self::launch_app) initializes the logger,
/// parses the CLI arguments and runs the selected command.
/// If the command fails, the error chain is logged and the process exits with the status given by [`exit_status`].
pub(crate) struct AppHelper<'a> {
    cli_manager: CliManager<'a>,
}

impl<'a> AppHelper<'a> {
    pub(crate) fn new(app_name: &'a str, version: &'a str, author: &'a str, about: &'a str) -> Self {
        AppHelper {
            cli_manager: CliManager::new(app_name, version, author, about),
        }
    }

    pub(crate) fn add_command(&mut self, command: Box<dyn Command<'a>>) {
        self.cli_manager.add_command(command);
    }

    /// Launches the application with the arguments of the process.
    ///
    /// This function consumes the helper.
    pub(crate) fn launch_app(self) {
        self.launch_app_with_args(std::env::args_os())
    }

    pub(crate) fn launch_app_with_args<I, T>(self, args: I)
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        if let Err(e) = self.execute_app(args) {
            error!("an error occurred: {}", e);
            e.chain()
                .skip(1)
                .for_each(|err| error!("caused by: {}", err));
            std::process::exit(exit_status(&e));
        }
    }

    fn execute_app<I, T>(&self, args: I) -> Result<()>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let start_time = Instant::now();
        let result = self.cli_manager.parse_cli(args);
        if result.is_ok() {
            info!("exiting successfully after {:?}", start_time.elapsed());
        }
        result
    }
}

/// Returns the exit status matching an error.
///
/// Argument errors take precedence over input format errors, which take precedence over any other error.
pub(crate) fn exit_status(e: &anyhow::Error) -> i32 {
    if e.chain().any(|c| c.downcast_ref::<clap::Error>().is_some()) {
        EXIT_USAGE
    } else if e
        .chain()
        .any(|c| c.downcast_ref::<InputFormatError>().is_some())
    {
        EXIT_INPUT_FORMAT
    } else {
        EXIT_FAILURE
    }
}

pub(crate) fn init_logger() {
    init_logger_with_level(log::LevelFilter::Info)
}

pub(crate) fn init_logger_with_level(level: log::LevelFilter) {
    LOGGER_INIT.call_once(|| {
        let colors = fern::colors::ColoredLevelConfig::new().info(fern::colors::Color::Cyan);
        fern::Dispatch::new()
            .format(move |out, message, record| {
                out.finish(format_args!(
                    "![{:5}] {} {}",
                    colors.color(record.level()),
                    chrono::Local::now().format("[%Y-%m-%d %H:%M:%S]"),
                    message
                ))
            })
            .level(level)
            .chain(std::io::stdout())
            .apply()
            .unwrap_or(());
    });
}
