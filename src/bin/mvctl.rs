//! Command-line driver: load a JSON document, build the state graph,
//! evaluate the formula, report degrees.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use mvctl::{export, Checker, Document, Error, Evaluation};

#[derive(Parser)]
#[command(name = "mvctl")]
#[command(about = "Quantitative CTL checking for multivalued gene regulatory networks")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate a CTL formula against the model
    Check {
        /// Input JSON document ({network, formula, init_states})
        input: PathBuf,

        /// Formula to check instead of the one in the document
        #[arg(long)]
        formula: Option<String>,

        /// Also print the degree of every reachable state
        #[arg(long)]
        all_states: bool,
    },

    /// Export the reachable state graph as Graphviz DOT
    Graph {
        /// Input JSON document
        input: PathBuf,

        /// Annotate states with the degrees of the document's formula
        #[arg(long)]
        degrees: bool,
    },

    /// List the attractors (terminal behaviors) of the state graph
    Attractors {
        /// Input JSON document
        input: PathBuf,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    if let Err(err) = run(Cli::parse()) {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> mvctl::Result<()> {
    match cli.command {
        Commands::Check { input, formula, all_states } => {
            let doc = load(&input)?;
            let checker = Checker::from_document(&doc)?;
            let formula = formula
                .or_else(|| doc.formula.clone())
                .ok_or_else(|| Error::MalformedModel(
                    "document contains no formula; pass one with --formula".into(),
                ))?;

            let evaluation = checker.check(&formula)?;
            report(&checker, &formula, &evaluation, all_states);
            Ok(())
        }

        Commands::Graph { input, degrees } => {
            let doc = load(&input)?;
            let checker = Checker::from_document(&doc)?;

            let evaluation = match (&doc.formula, degrees) {
                (Some(formula), true) => Some(checker.check(formula)?),
                (None, true) => {
                    return Err(Error::MalformedModel(
                        "document contains no formula to compute degrees from".into(),
                    ));
                }
                _ => None,
            };
            export::write_dot(
                checker.graph(),
                evaluation.as_ref().map(|e| e.degrees()),
                &mut std::io::stdout().lock(),
            )
        }

        Commands::Attractors { input } => {
            let doc = load(&input)?;
            let checker = Checker::from_document(&doc)?;
            let graph = checker.graph();

            for (index, attractor) in graph.attractors().iter().enumerate() {
                let kind = if attractor.len() == 1 { "stable state" } else { "cycle" };
                print!("attractor {index} ({kind}):");
                for &id in attractor {
                    print!(" {}", graph.state(id));
                }
                println!();
            }
            Ok(())
        }
    }
}

fn load(path: &PathBuf) -> mvctl::Result<Document> {
    Document::from_json(&std::fs::read_to_string(path)?)
}

fn report(checker: &Checker, formula: &str, evaluation: &Evaluation, all_states: bool) {
    println!("Formula: {formula}");
    if let Some(summary) = evaluation.summary() {
        println!("Worst value {} in state {}", summary.worst.1, summary.worst.0);
        println!("Best value {} in state {}", summary.best.1, summary.best.0);
        println!("Average value among initial states: {}", summary.average);
    }

    if all_states {
        println!();
        for (id, degree) in evaluation.degrees().iter() {
            println!("{}: {degree}", checker.graph().state(id));
        }
    }
}
