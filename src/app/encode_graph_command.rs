use super::{
    cli_manager,
    command::Command,
    common::{self, Input},
};
use anyhow::{anyhow, Context, Result};
use clap::{App, AppSettings, Arg, ArgMatches, SubCommand};
use escover::io::GraphWriter;
use log::info;
use std::{
    fs::File,
    io::{BufWriter, Write},
};

const CMD_NAME: &str = "encode-graph";

const ARG_OUTPUT: &str = "OUTPUT";

pub(crate) struct EncodeGraphCommand;

impl EncodeGraphCommand {
    pub(crate) fn new() -> Self {
        EncodeGraphCommand
    }
}

impl<'a> Command<'a> for EncodeGraphCommand {
    fn name(&self) -> &str {
        CMD_NAME
    }

    fn clap_subcommand(&self) -> App<'a, 'a> {
        SubCommand::with_name(CMD_NAME)
            .about("Builds the compatibility graph of an instance and writes it")
            .setting(AppSettings::DisableVersion)
            .args(&common::instance_input_args())
            .arg(
                Arg::with_name(ARG_OUTPUT)
                    .short("o")
                    .long("output")
                    .empty_values(false)
                    .multiple(false)
                    .help("the output file (default: standard output)"),
            )
            .arg(cli_manager::logging_level_cli_arg())
    }

    fn execute(&self, arg_matches: &ArgMatches<'_>) -> Result<()> {
        let instance = match common::read_input(arg_matches, false)? {
            Input::Instance(instance) => instance,
            Input::Graph(_) => return Err(anyhow!("a graph cannot be encoded again")),
        };
        let graph = common::build_graph(&instance)?;
        let writer = GraphWriter::default();
        match arg_matches.value_of(ARG_OUTPUT) {
            Some(path) => {
                let context = || format!(r#"while writing the graph to "{}""#, path);
                let file = File::create(path).with_context(context)?;
                let mut out = BufWriter::new(file);
                writer.write(&graph, &mut out).with_context(context)?;
                out.flush().with_context(context)?;
                info!("graph written to {}", path);
            }
            None => {
                let mut out = std::io::stdout();
                writer
                    .write(&graph, &mut out)
                    .context("while writing the graph")?;
                out.flush().context("while writing the graph")?;
            }
        }
        Ok(())
    }
}
