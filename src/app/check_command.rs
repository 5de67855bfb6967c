use super::{
    cli_manager,
    command::Command,
    common::{self, Input},
};
use anyhow::Result;
use clap::{App, AppSettings, ArgMatches, SubCommand};
use escover::graph;
use log::info;

const CMD_NAME: &str = "check";

/// Reads an input file, reports its size and tells whether its compatibility graph is a cograph.
pub(crate) struct CheckCommand;

impl CheckCommand {
    pub(crate) fn new() -> Self {
        CheckCommand
    }
}

impl<'a> Command<'a> for CheckCommand {
    fn name(&self) -> &str {
        CMD_NAME
    }

    fn clap_subcommand(&self) -> App<'a, 'a> {
        SubCommand::with_name(CMD_NAME)
            .about("Checks an input file for errors and reports its size")
            .setting(AppSettings::DisableVersion)
            .args(&common::instance_input_args())
            .arg(common::graph_input_arg())
            .arg(cli_manager::logging_level_cli_arg())
    }

    fn execute(&self, arg_matches: &ArgMatches<'_>) -> Result<()> {
        let graph = match common::read_input(arg_matches, true)? {
            Input::Instance(instance) => {
                info!(
                    "the instance has {} leaf variable(s) and {} constraint(s)",
                    instance.n_leaf_vars(),
                    instance.constraints().len()
                );
                common::build_graph(&instance)?
            }
            Input::Graph(g) => g,
        };
        if graph::is_cograph(&graph) {
            info!("the compatibility graph is a cograph");
        } else {
            info!("the compatibility graph is not a cograph");
        }
        Ok(())
    }
}
