use super::{
    app_helper::{init_logger, init_logger_with_level},
    command::Command,
};
use anyhow::Result;
use clap::{App, AppSettings, Arg};
use log::info;
use std::{ffi::OsString, str::FromStr};
use sysinfo::System;

pub(crate) struct CliManager<'a> {
    app_name: &'a str,
    version: &'a str,
    author: &'a str,
    about: &'a str,
    commands: Vec<Box<dyn Command<'a>>>,
}

const LOGGING_LEVEL_ARG: &str = "LOGGING_LEVEL";

pub(crate) fn logging_level_cli_arg<'a>() -> Arg<'a, 'a> {
    Arg::with_name(LOGGING_LEVEL_ARG)
        .long("logging-level")
        .multiple(false)
        .default_value("info")
        .possible_values(&["trace", "debug", "info", "warn", "error", "off"])
        .help("set the minimal logging level")
}

impl<'a> CliManager<'a> {
    pub(crate) fn new(app_name: &'a str, version: &'a str, author: &'a str, about: &'a str) -> Self {
        CliManager {
            app_name,
            version,
            author,
            about,
            commands: vec![],
        }
    }

    pub(crate) fn add_command(&mut self, command: Box<dyn Command<'a>>) {
        self.commands.push(command);
    }

    /// Parses the arguments and runs the selected command.
    ///
    /// Argument errors are returned as [`clap::Error`] values wrapped into the `anyhow` error.
    pub(crate) fn parse_cli<I, T>(&self, args: I) -> Result<()>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let args: Vec<T> = args.into_iter().collect();
        let mut app = App::new(self.app_name)
            .global_setting(AppSettings::DisableVersion)
            .global_setting(AppSettings::VersionlessSubcommands)
            .setting(AppSettings::NeedsSubcommandHelp)
            .setting(AppSettings::SubcommandRequired)
            .version(self.version)
            .author(self.author)
            .about(self.about);
        for c in self.commands.iter() {
            app = app.subcommand(c.clap_subcommand());
        }
        match app.clone().get_matches_from_safe(args.clone()) {
            Ok(matches) => {
                let (name, sub_matches) = matches.subcommand();
                let command = self.commands.iter().find(|c| c.name() == name);
                match (command, sub_matches) {
                    (Some(c), Some(sub_matches)) => {
                        let log_level = sub_matches
                            .value_of(LOGGING_LEVEL_ARG)
                            .and_then(|l| log::LevelFilter::from_str(l).ok())
                            .unwrap_or(log::LevelFilter::Info);
                        init_logger_with_level(log_level);
                        info!("{} {}", self.app_name, self.version);
                        sys_info();
                        c.execute(sub_matches)
                    }
                    _ => {
                        init_logger();
                        self.print_help(&mut app, &[]);
                        Ok(())
                    }
                }
            }
            Err(clap::Error {
                kind: clap::ErrorKind::HelpDisplayed,
                ..
            }) => {
                init_logger();
                let args = args
                    .into_iter()
                    .map(|a| Into::<OsString>::into(a).to_string_lossy().to_string())
                    .collect::<Vec<String>>();
                self.print_help(&mut app, &args);
                Ok(())
            }
            Err(e) => {
                init_logger();
                info!("{} {}", self.app_name, self.version);
                Err(anyhow::Error::new(e))
            }
        }
    }

    fn print_help(&self, app: &mut App, args: &[String]) {
        const HELP_STRINGS: [&str; 3] = ["help", "-h", "--help"];
        let requested_command = match args {
            [_, first, ..] if !HELP_STRINGS.contains(&first.as_str()) => Some(first),
            [_, _, second, ..] => Some(second),
            _ => None,
        };
        let mut message = vec![];
        let written = match requested_command
            .and_then(|name| self.commands.iter().find(|c| c.name() == name.as_str()))
        {
            Some(c) => c.clap_subcommand().write_long_help(&mut message),
            None => app.write_long_help(&mut message),
        };
        if written.is_ok() {
            String::from_utf8_lossy(&message)
                .split('\n')
                .for_each(|s| info!("{}", s));
            info!("");
        }
    }
}

fn sys_info() {
    info!("----------------------------------------");
    let sys = System::new_all();
    let unknown = || "[unknown]".to_string();
    info!("running on {}", System::host_name().unwrap_or_else(unknown));
    info!(
        "OS is {} {} with kernel {}",
        System::name().unwrap_or_else(unknown),
        System::os_version().unwrap_or_else(unknown),
        System::kernel_version().unwrap_or_else(unknown)
    );
    let mut cpu_brands: Vec<&str> = sys.cpus().iter().map(|c| c.brand()).collect();
    cpu_brands.sort_unstable();
    cpu_brands.dedup();
    info!(
        "physical core count: {} {:?}",
        sys.physical_core_count()
            .map_or_else(unknown, |n| n.to_string()),
        cpu_brands
    );
    info!("total memory: {} KB", sys.total_memory() / 1024);
    info!("----------------------------------------");
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::{ArgMatches, SubCommand};
    use std::{cell::RefCell, rc::Rc};

    struct LocalCommand {
        command_involved: Rc<RefCell<bool>>,
        argument_set: Rc<RefCell<bool>>,
    }

    impl<'a> Command<'a> for LocalCommand {
        fn name(&self) -> &str {
            "local"
        }

        fn clap_subcommand(&self) -> App<'a, 'a> {
            SubCommand::with_name("local")
                .arg(Arg::with_name("flag").short("a"))
                .arg(logging_level_cli_arg())
        }

        fn execute(&self, arg_matches: &ArgMatches<'_>) -> Result<()> {
            *self.command_involved.borrow_mut() = true;
            *self.argument_set.borrow_mut() = arg_matches.is_present("flag");
            Ok(())
        }
    }

    fn run(args: Vec<&'static str>) -> Result<(bool, bool)> {
        let mut manager = CliManager::new("app_name", "app_version", "author", "about");
        let command_involved = Rc::new(RefCell::new(false));
        let argument_set = Rc::new(RefCell::new(false));
        manager.add_command(Box::new(LocalCommand {
            command_involved: Rc::clone(&command_involved),
            argument_set: Rc::clone(&argument_set),
        }));
        manager.parse_cli(args)?;
        let result = (*command_involved.borrow(), *argument_set.borrow());
        Ok(result)
    }

    #[test]
    fn test_command_involved() {
        assert_eq!((true, false), run(vec!["app_name", "local"]).unwrap());
    }

    #[test]
    fn test_command_and_arg_involved() {
        assert_eq!((true, true), run(vec!["app_name", "local", "-a"]).unwrap());
    }

    #[test]
    fn test_logging_level() {
        assert_eq!(
            (true, false),
            run(vec!["app_name", "local", "--logging-level", "off"]).unwrap()
        );
    }

    #[test]
    fn test_wrong_subcommand_is_a_clap_error() {
        let e = run(vec!["app_name", "foo"]).unwrap_err();
        assert!(e.downcast_ref::<clap::Error>().is_some());
    }

    #[test]
    fn test_wrong_arg_is_a_clap_error() {
        let e = run(vec!["app_name", "local", "-b"]).unwrap_err();
        assert!(e.downcast_ref::<clap::Error>().is_some());
    }

    #[test]
    fn test_help() {
        assert_eq!((false, false), run(vec!["app_name", "-h"]).unwrap());
        assert_eq!((false, false), run(vec!["app_name", "help", "local"]).unwrap());
        assert_eq!((false, false), run(vec!["app_name", "local", "-h"]).unwrap());
    }
}
