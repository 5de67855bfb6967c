use super::{
    app_helper::AppHelper, command::Command, AuthorsCommand, CheckCommand, CoverCommand,
    EncodeGraphCommand,
};
use anyhow::{anyhow, Context, Result};
use clap::{Arg, ArgMatches};
use escover::{
    encodings::CoverInstance,
    events::EventStructure,
    formula::ConstraintSystem,
    graph::CompatibilityGraph,
    io::{EventStructureReader, GraphReader, InstanceReader, SmtLibReader},
    sat::{
        self, OptimizationOracle, OptimizationOracleFactoryFn, SatBasedOptimizer, SatSolver,
        SatSolverFactoryFn, SolvingListener, SolvingResult,
    },
    solvers::{CompatibilityGraphBuilder, CoverProgress, ProgressListener},
};
use log::{debug, info, warn};
use std::{
    cell::Cell,
    fs::{self, File},
    io::{BufReader, Read},
    path::PathBuf,
    time::{Duration, Instant},
};

pub(crate) fn create_app_helper() -> AppHelper<'static> {
    let app_name = option_env!("CARGO_PKG_NAME").unwrap_or("unknown app name");
    let app_version = option_env!("CARGO_PKG_VERSION").unwrap_or("unknown version");
    let authors = option_env!("CARGO_PKG_AUTHORS").unwrap_or("unknown authors");
    let mut app = AppHelper::new(
        app_name,
        app_version,
        authors,
        "escover, a test suite synthesizer for event structures.",
    );
    let commands: Vec<Box<dyn Command>> = vec![
        Box::new(AuthorsCommand::new(app_name, app_version, authors)),
        Box::new(CheckCommand::new()),
        Box::new(CoverCommand::new()),
        Box::new(EncodeGraphCommand::new()),
    ];
    for c in commands {
        app.add_command(c);
    }
    app
}

pub(crate) const ARG_EVENT_STRUCTURE: &str = "EVENT_STRUCTURE";
pub(crate) const ARG_SMT2: &str = "SMT2";
pub(crate) const ARG_GRAPH: &str = "GRAPH";

pub(crate) fn instance_input_args() -> Vec<Arg<'static, 'static>> {
    vec![
        Arg::with_name(ARG_EVENT_STRUCTURE)
            .short("e")
            .long("event-structure")
            .empty_values(false)
            .multiple(false)
            .help("the input file that contains the event structure"),
        Arg::with_name(ARG_SMT2)
            .short("s")
            .long("smt2")
            .empty_values(false)
            .multiple(false)
            .help("the input file that contains the constraint system (SMT-LIB 2)"),
    ]
}

pub(crate) fn graph_input_arg() -> Arg<'static, 'static> {
    Arg::with_name(ARG_GRAPH)
        .short("g")
        .long("graph")
        .empty_values(false)
        .multiple(false)
        .help("the input file that contains a compatibility graph")
}

pub(crate) fn non_negative_integer_validator(s: String) -> std::result::Result<(), String> {
    s.parse::<u64>()
        .map(|_| ())
        .map_err(|_| format!(r#"expected a non-negative integer, got "{}""#, s))
}

/// The input of a command, as selected from the CLI arguments.
pub(crate) enum Input {
    /// A covering instance, read from an event structure or a constraint system.
    Instance(CoverInstance),
    /// A compatibility graph.
    Graph(CompatibilityGraph),
}

/// Reads the input given on the command line.
///
/// Constraint systems take precedence over event structures, which take precedence over graphs.
/// Graphs are only considered if `allow_graph` is set.
pub(crate) fn read_input(arg_matches: &ArgMatches<'_>, allow_graph: bool) -> Result<Input> {
    if let Some(file) = arg_matches.value_of(ARG_SMT2) {
        if let Some(ignored) = arg_matches.value_of(ARG_EVENT_STRUCTURE) {
            warn!("ignoring event structure {} since a constraint system is given", ignored);
        }
        info!("INPUT: {}", file);
        let system = read_constraint_system(file)?;
        let instance = CoverInstance::from_constraint_system(system)
            .context("while looking for the leaf variables of the constraint system")?;
        info!(
            "the constraint system has {} leaf variable(s)",
            instance.n_leaf_vars()
        );
        Ok(Input::Instance(instance))
    } else if let Some(file) = arg_matches.value_of(ARG_EVENT_STRUCTURE) {
        info!("INPUT: {}", file);
        let structure = read_event_structure(file)?;
        Ok(Input::Instance(CoverInstance::from_event_structure(
            &structure,
        )))
    } else if let Some(file) = arg_matches.value_of(ARG_GRAPH).filter(|_| allow_graph) {
        info!("INPUT: {}", file);
        Ok(Input::Graph(read_graph(file)?))
    } else {
        Err(anyhow!("no input"))
    }
}

fn warning_handler() -> Box<dyn Fn(usize, String)> {
    Box::new(|line, msg| warn!("at line {}: {}", line, msg))
}

pub(crate) fn read_event_structure(file_path: &str) -> Result<EventStructure> {
    let mut reader = EventStructureReader::default();
    reader.add_warning_handler(warning_handler());
    let structure = read_file_path_with(file_path, &|r| reader.read(r))?;
    info!(
        "the event structure has {} event(s), including {} leaf event(s)",
        structure.len(),
        structure.n_leaves()
    );
    Ok(structure)
}

pub(crate) fn read_constraint_system(file_path: &str) -> Result<ConstraintSystem> {
    let mut reader = SmtLibReader::default();
    reader.add_warning_handler(warning_handler());
    let system = read_file_path_with(file_path, &|r| reader.read(r))?;
    info!("the constraint system has {} assertion(s)", system.len());
    Ok(system)
}

pub(crate) fn read_graph(file_path: &str) -> Result<CompatibilityGraph> {
    let mut reader = GraphReader::default();
    reader.add_warning_handler(warning_handler());
    let graph = read_file_path_with(file_path, &|r| reader.read(r))?;
    log_graph_size(&graph);
    Ok(graph)
}

pub(crate) fn log_graph_size(graph: &CompatibilityGraph) {
    info!(
        "the compatibility graph has {} node(s) and {} edge(s)",
        graph.n_nodes(),
        graph.n_edges()
    );
}

pub(crate) fn read_file_path_with<F, R>(file_path: &str, reader: &F) -> Result<R>
where
    F: Fn(&mut dyn Read) -> Result<R>,
{
    let canonicalized = canonicalize_file_path(file_path)?;
    info!("reading input file {:?}", canonicalized);
    let mut file_reader = BufReader::new(
        File::open(&canonicalized)
            .with_context(|| format!(r#"while opening file "{}""#, file_path))?,
    );
    (reader)(&mut file_reader).with_context(|| format!(r#"while reading file "{}""#, file_path))
}

/// Canonicalize a path given by the user.
pub(crate) fn canonicalize_file_path(file_path: &str) -> Result<PathBuf> {
    fs::canonicalize(PathBuf::from(file_path))
        .with_context(|| format!(r#"while opening file "{}""#, file_path))
}

/// Builds the compatibility graph of an instance, logging the progress.
pub(crate) fn build_graph(instance: &CoverInstance) -> Result<CompatibilityGraph> {
    info!("building the compatibility graph");
    let mut builder =
        CompatibilityGraphBuilder::new_with_sat_solver_factory(instance, create_sat_solver_factory());
    builder.add_listener(Box::<ProgressLogger>::default());
    let graph = builder
        .build()
        .context("while building the compatibility graph")?;
    log_graph_size(&graph);
    Ok(graph)
}

pub(crate) fn create_sat_solver_factory() -> Box<SatSolverFactoryFn> {
    Box::new(logged_sat_solver)
}

pub(crate) fn create_optimization_oracle_factory() -> Box<OptimizationOracleFactoryFn> {
    Box::new(|| {
        Box::new(SatBasedOptimizer::new(logged_sat_solver())) as Box<dyn OptimizationOracle>
    })
}

fn logged_sat_solver() -> Box<dyn SatSolver> {
    let mut solver = sat::default_solver();
    solver.add_listener(Box::<SatSolvingLogger>::default());
    solver
}

#[derive(Default)]
struct SatSolvingLogger;

impl SolvingListener for SatSolvingLogger {
    fn solving_start(&self, n_vars: usize, n_clauses: usize) {
        debug!(
            "launching SAT solver on an instance with {} variables and {} clauses",
            n_vars, n_clauses
        );
    }

    fn solving_end(&self, result: &SolvingResult) {
        let r = match result {
            SolvingResult::Satisfiable(_) => "SAT",
            SolvingResult::Unsatisfiable => "UNSAT",
            SolvingResult::Unknown => "UNKNOWN",
        };
        debug!("SAT solver ended with result {}", r);
    }
}

/// Logs the progress of the algorithms, with an estimation of the remaining time.
///
/// A line is logged each time the completed percentage changes.
pub(crate) struct ProgressLogger {
    start: Instant,
    last_percent: Cell<Option<u64>>,
}

impl Default for ProgressLogger {
    fn default() -> Self {
        Self {
            start: Instant::now(),
            last_percent: Cell::new(None),
        }
    }
}

impl ProgressLogger {
    fn percent_changed(&self, fraction: f64) -> bool {
        let percent = (fraction * 100.).floor() as u64;
        if self.last_percent.get() == Some(percent) {
            false
        } else {
            self.last_percent.set(Some(percent));
            true
        }
    }

    fn eta(&self, fraction: f64) -> Option<Duration> {
        if fraction <= 0. {
            return None;
        }
        let elapsed = self.start.elapsed().as_secs_f64();
        Duration::try_from_secs_f64(elapsed * (1. - fraction) / fraction).ok()
    }

    fn format_eta(&self, fraction: f64) -> String {
        match self.eta(fraction) {
            Some(d) => format!("{}s", d.as_secs()),
            None => "unknown".to_string(),
        }
    }
}

impl ProgressListener for ProgressLogger {
    fn on_cover_progress(&self, progress: &CoverProgress) {
        let fraction = progress.fraction_done();
        let message = format!(
            "{} test(s), {}/{} leaf event(s) covered ({:.1}%), ETA {}",
            progress.n_tests,
            progress.n_covered,
            progress.n_total,
            100. * fraction,
            self.format_eta(fraction),
        );
        if self.percent_changed(fraction) {
            info!("{}", message);
        } else {
            debug!("{}", message);
        }
    }

    fn on_graph_progress(&self, n_processed: usize, n_total: usize) {
        let fraction = if n_total == 0 {
            1.
        } else {
            n_processed as f64 / n_total as f64
        };
        let message = format!(
            "compatibility graph: {}/{} variable(s) processed, ETA {}",
            n_processed,
            n_total,
            self.format_eta(fraction),
        );
        if self.percent_changed(fraction) {
            info!("{}", message);
        } else {
            debug!("{}", message);
        }
    }

    fn on_inconclusive_optimization(&self, next_timeout: Duration) {
        warn!(
            "the optimization oracle gave no new test, retrying with a timeout of {:?}",
            next_timeout
        );
    }
}
