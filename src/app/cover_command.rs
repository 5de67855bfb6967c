use super::{
    cli_manager,
    command::Command,
    common::{self, Input, ProgressLogger},
};
use anyhow::{Context, Result};
use clap::{App, AppSettings, Arg, ArgMatches, SubCommand};
use escover::{
    encodings::CoverInstance,
    graph::{self, BranchAndBoundCliqueFinder, CliqueSearchConfig, CompatibilityGraph},
    io::TestsWriter,
    solvers::{CliqueCoverSolver, CoverComputer, CoverageOptimizer, OptimizerConfig, Test},
    utils::{CoverError, CoverMethod},
};
use log::info;
use std::{
    io::Write,
    time::{Duration, Instant},
};

const CMD_NAME: &str = "cover";

const ARG_CLIQUES: &str = "CLIQUES";
const ARG_INITIAL_TIMEOUT: &str = "INITIAL_TIMEOUT";
const ARG_MAX_RETRIES: &str = "MAX_RETRIES";
const ARG_CLIQUE_TIME_LIMIT: &str = "CLIQUE_TIME_LIMIT";
const ARG_CHECK_COGRAPH: &str = "CHECK_COGRAPH";
const ARG_PRINT_TESTS: &str = "PRINT_TESTS";

/// Computes a set of tests covering the leaf events of an instance.
pub(crate) struct CoverCommand;

impl CoverCommand {
    pub(crate) fn new() -> Self {
        CoverCommand
    }
}

impl<'a> Command<'a> for CoverCommand {
    fn name(&self) -> &str {
        CMD_NAME
    }

    fn clap_subcommand(&self) -> App<'a, 'a> {
        SubCommand::with_name(CMD_NAME)
            .about("Computes a set of tests covering the leaf events")
            .setting(AppSettings::DisableVersion)
            .args(&common::instance_input_args())
            .arg(common::graph_input_arg())
            .args(&cover_args())
            .arg(cli_manager::logging_level_cli_arg())
    }

    fn execute(&self, arg_matches: &ArgMatches<'_>) -> Result<()> {
        let start_time = Instant::now();
        let input = common::read_input(arg_matches, true)?;
        let method = match input {
            Input::Instance(_) if !arg_matches.is_present(ARG_CLIQUES) => {
                CoverMethod::Optimization
            }
            _ => CoverMethod::Cliques,
        };
        info!("METHOD: {}", method);
        let tests = match input {
            Input::Instance(instance) if method == CoverMethod::Optimization => {
                cover_with_optimizer(&instance, arg_matches)?
            }
            Input::Instance(instance) => {
                let graph = common::build_graph(&instance)?;
                cover_with_cliques(graph, arg_matches)?
            }
            Input::Graph(graph) => cover_with_cliques(graph, arg_matches)?,
        };
        info!("Tests in cover: {}", tests.len());
        if arg_matches.is_present(ARG_PRINT_TESTS) {
            let mut out = std::io::stdout();
            TestsWriter::default()
                .write(&tests, &mut out)
                .context("while writing the tests")?;
            out.flush().context("while writing the tests")?;
        }
        info!("total time: {:?}", start_time.elapsed());
        Ok(())
    }
}

fn cover_args() -> Vec<Arg<'static, 'static>> {
    vec![
        Arg::with_name(ARG_CLIQUES)
            .short("c")
            .long("cliques")
            .takes_value(false)
            .help("use the clique-based method instead of the optimization one"),
        Arg::with_name(ARG_INITIAL_TIMEOUT)
            .long("initial-timeout")
            .empty_values(false)
            .multiple(false)
            .validator(common::non_negative_integer_validator)
            .help("the timeout of the first optimization call, in milliseconds"),
        Arg::with_name(ARG_MAX_RETRIES)
            .long("max-retries")
            .empty_values(false)
            .multiple(false)
            .validator(common::non_negative_integer_validator)
            .help("the number of fruitless optimization calls in a row before giving up (default: no limit)"),
        Arg::with_name(ARG_CLIQUE_TIME_LIMIT)
            .long("clique-time-limit")
            .empty_values(false)
            .multiple(false)
            .validator(common::non_negative_integer_validator)
            .help("the time allotted to each maximum clique search, in milliseconds (default: no limit)"),
        Arg::with_name(ARG_CHECK_COGRAPH)
            .long("check-cograph")
            .takes_value(false)
            .help("fail if the compatibility graph is not a cograph"),
        Arg::with_name(ARG_PRINT_TESTS)
            .long("print-tests")
            .takes_value(false)
            .help("print the tests on the standard output"),
    ]
}

fn parse_u64(arg_matches: &ArgMatches<'_>, arg: &str) -> Result<Option<u64>> {
    arg_matches
        .value_of(arg)
        .map(|s| s.parse::<u64>())
        .transpose()
        .with_context(|| format!("while parsing the value of {}", arg))
}

fn cover_with_optimizer(instance: &CoverInstance, arg_matches: &ArgMatches<'_>) -> Result<Vec<Test>> {
    let mut config = OptimizerConfig::default();
    if let Some(ms) = parse_u64(arg_matches, ARG_INITIAL_TIMEOUT)? {
        config.initial_timeout = Duration::from_millis(ms);
    }
    config.max_inconclusive_retries = parse_u64(arg_matches, ARG_MAX_RETRIES)?.map(|n| n as usize);
    info!(
        "the first optimization call is limited to {:?}",
        config.initial_timeout
    );
    let mut optimizer = CoverageOptimizer::new_with_oracle_factory(
        instance,
        common::create_optimization_oracle_factory(),
    );
    optimizer.set_config(config);
    optimizer.add_listener(Box::<ProgressLogger>::default());
    optimizer
        .compute_cover()
        .context("while computing the cover with the optimization method")
}

fn cover_with_cliques(graph: CompatibilityGraph, arg_matches: &ArgMatches<'_>) -> Result<Vec<Test>> {
    if arg_matches.is_present(ARG_CHECK_COGRAPH) {
        if !graph::is_cograph(&graph) {
            return Err(CoverError::NotACograph).context("while checking the compatibility graph");
        }
        info!("the compatibility graph is a cograph");
    }
    let config = CliqueSearchConfig {
        time_limit: parse_u64(arg_matches, ARG_CLIQUE_TIME_LIMIT)?.map(Duration::from_millis),
    };
    let mut solver =
        CliqueCoverSolver::new_with_clique_oracle(graph, Box::new(BranchAndBoundCliqueFinder::new(config)));
    solver.add_listener(Box::<ProgressLogger>::default());
    solver
        .compute_cover()
        .context("while computing the cover with the clique method")
}
