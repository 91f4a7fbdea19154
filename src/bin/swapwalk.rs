//! Main CLI for swapwalk.
use mimalloc::MiMalloc;
#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

use anyhow::{bail, Context, Result};
use clap::{value_t, App, Arg, ArgMatches};
use rand::rngs::SmallRng;
use rand::SeedableRng;
use serde_json::json;
use sha3::{Digest, Sha3_256};
use std::path::PathBuf;
use std::str::FromStr;
use std::{fs, io};
use swapwalk::chain::run::run_chain;
use swapwalk::config::{parse_party_labels, ChainParams, UpdateMode};
use swapwalk::init::{from_networkx, random_parties, stripes};
use swapwalk::stats::{AssignmentsOnlyWriter, JSONLWriter, StatsWriter, TSVWriter};
use tracing_subscriber::EnvFilter;

/// Grid mode defaults to 5 districts of 5 precincts.
const DEFAULT_GRID_DIM: u32 = 5;
/// Grid mode defaults to a fair coin per precinct.
const DEFAULT_PARTY_SHARE: f64 = 0.5;

/// Parses an optional grid-mode argument, exiting on a malformed value.
/// These arguments conflict with `--graph-json`, so they carry no clap
/// default.
fn value_or<T>(matches: &ArgMatches, name: &str, default: T) -> T
where
    T: FromStr,
{
    match matches.value_of(name) {
        Some(_) => value_t!(matches.value_of(name), T).unwrap_or_else(|e| e.exit()),
        None => default,
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let matches = App::new("swapwalk")
        .version("0.1.0")
        .author("Parker J. Rule <parker.rule@tufts.edu>")
        .about("A contiguity-preserving precinct swap Markov chain")
        .arg(
            Arg::with_name("n_steps")
                .long("n-steps")
                .takes_value(true)
                .required(true)
                .help("The number of chain steps (accepted and rejected)."),
        )
        .arg(
            Arg::with_name("rng_seed")
                .long("rng-seed")
                .takes_value(true)
                .required(true)
                .help("The seed of the RNG used to draw proposals."),
        )
        .arg(
            Arg::with_name("n_dists")
                .long("n-dists")
                .takes_value(true)
                .help("The number of districts (grid mode; default: 5)."),
        )
        .arg(
            Arg::with_name("dist_size")
                .long("dist-size")
                .takes_value(true)
                .help("The number of precincts per district (grid mode; default: 5)."),
        )
        .arg(
            Arg::with_name("graph_json")
                .long("graph-json")
                .takes_value(true)
                .conflicts_with_all(&["n_dists", "dist_size"])
                .help("The path of the dual graph (in NetworkX format)."),
        )
        .arg(
            Arg::with_name("assignment_col")
                .long("assignment-col")
                .takes_value(true)
                .default_value("district")
                .help("The name of the assignment column in the graph metadata."),
        )
        .arg(
            Arg::with_name("party_col")
                .long("party-col")
                .takes_value(true)
                .default_value("party")
                .help("The name of the 0/1 party column in the graph metadata."),
        )
        .arg(
            Arg::with_name("parties")
                .long("parties")
                .takes_value(true)
                .conflicts_with("graph_json")
                .help("A JSON array of 0/1 party labels (grid mode; default: random)."),
        )
        .arg(
            Arg::with_name("party_share")
                .long("party-share")
                .takes_value(true)
                .conflicts_with_all(&["graph_json", "parties"])
                .help(
                    "The probability that a random precinct holds the target party \
                     (grid mode; default: 0.5).",
                ),
        )
        .arg(
            Arg::with_name("target_party")
                .long("target-party")
                .takes_value(true)
                .default_value("0")
                .help("The party (0 or 1) whose seats are counted."),
        )
        .arg(
            Arg::with_name("update_mode")
                .long("update-mode")
                .takes_value(true)
                .possible_values(&["local", "full"])
                .default_value("local")
                .help("How the swap set is patched after each proposal."),
        )
        .arg(
            Arg::with_name("writer")
                .long("writer")
                .takes_value(true)
                .possible_values(&["jsonl", "jsonl-full", "tsv", "assignments"])
                .default_value("jsonl"),
        )
        .get_matches();
    let n_steps = value_t!(matches.value_of("n_steps"), u64).unwrap_or_else(|e| e.exit());
    let rng_seed = value_t!(matches.value_of("rng_seed"), u64).unwrap_or_else(|e| e.exit());
    let target_party = value_t!(matches.value_of("target_party"), u8).unwrap_or_else(|e| e.exit());
    let party_share = value_or(&matches, "party_share", DEFAULT_PARTY_SHARE);
    let update_mode =
        value_t!(matches.value_of("update_mode"), UpdateMode).unwrap_or_else(|e| e.exit());
    let writer_str = matches.value_of("writer").unwrap_or("jsonl");

    if target_party > 1 {
        bail!("Parameter error: target party must be 0 or 1");
    }
    if !(0.0..=1.0).contains(&party_share) {
        bail!("Parameter error: party share must be in [0, 1]");
    }

    let mut meta = json!({
        "n_steps": n_steps,
        "rng_seed": rng_seed,
        "target_party": target_party,
        "update_mode": matches.value_of("update_mode"),
    });
    let (graph, plan) = match matches.value_of("graph_json") {
        Some(path) => {
            let graph_json = fs::canonicalize(PathBuf::from(path))
                .with_context(|| format!("Could not find graph {}", path))?
                .into_os_string()
                .into_string()
                .map_err(|_| anyhow::anyhow!("Graph path is not valid UTF-8"))?;
            let assignment_col = matches.value_of("assignment_col").unwrap_or("district");
            let party_col = matches.value_of("party_col").unwrap_or("party");
            let mut graph_file = fs::File::open(&graph_json)?;
            let mut graph_hasher = Sha3_256::new();
            io::copy(&mut graph_file, &mut graph_hasher)?;
            if let Some(obj) = meta.as_object_mut() {
                obj.insert("graph_path".to_string(), json!(graph_json));
                obj.insert(
                    "graph_sha3".to_string(),
                    json!(format!("{:x}", graph_hasher.finalize())),
                );
                obj.insert("assignment_col".to_string(), json!(assignment_col));
                obj.insert("party_col".to_string(), json!(party_col));
            }
            from_networkx(&graph_json, assignment_col, party_col)?
        }
        None => {
            let n_dists = value_or(&matches, "n_dists", DEFAULT_GRID_DIM);
            let dist_size = value_or(&matches, "dist_size", DEFAULT_GRID_DIM);
            let n = n_dists as usize * dist_size as usize;
            let parties = match matches.value_of("parties") {
                Some(raw) => parse_party_labels(raw)?,
                None => {
                    // Party labels draw from their own stream so that the
                    // chain's proposals don't depend on the grid size.
                    let mut rng = SmallRng::seed_from_u64(rng_seed.wrapping_add(1));
                    if let Some(obj) = meta.as_object_mut() {
                        obj.insert("party_share".to_string(), json!(party_share));
                    }
                    random_parties(n, target_party, party_share, &mut rng)
                }
            };
            stripes(n_dists, dist_size, &parties)?
        }
    };

    let num_dists = plan.num_dists;
    let dist_size = (graph.len() / num_dists as usize) as u32;
    let params = ChainParams {
        num_dists,
        dist_size,
        num_steps: n_steps,
        rng_seed,
        target_party,
        update_mode,
    };
    if let Some(obj) = meta.as_object_mut() {
        obj.insert("num_dists".to_string(), json!(num_dists));
        obj.insert("dist_size".to_string(), json!(dist_size));
    }
    let writer: Box<dyn StatsWriter> = match writer_str {
        "tsv" => Box::new(TSVWriter::new()),
        "jsonl-full" => Box::new(JSONLWriter::new(true, true, target_party)),
        "assignments" => Box::new(AssignmentsOnlyWriter::new()),
        _ => Box::new(JSONLWriter::new(false, false, target_party)),
    };

    println!("{}", json!({ "meta": meta }));
    let result = run_chain(&graph, &plan, writer, &params)?;
    let summary = json!({
        "seat_wins": result.stats.seat_wins(),
        "dist_target_counts": result.stats.dist_counts(),
        "dist_wins": result.stats.dist_wins(),
        "accepted": result.counts.accepted,
        "rejected": result.counts.rejected,
        "target_share": result.plan.party_share(target_party),
        "assignments": result.plan.assignments,
    });
    println!("{}", json!({ "summary": summary }));
    Ok(())
}
