use std::path::PathBuf;
use swapwalk::graph::Graph;
use swapwalk::init::from_networkx;
use swapwalk::plan::Plan;
/// Graph/plan fixtures for long-running tests.

/// The location of the graph JSON data w.r.t. the project manifest.
const GRAPH_FIXTURES_DIR: &str = "graphs";

/// 3x3 grid graph (rook adjacency, column stripes, mixed parties).
const THREE_FILENAME: &str = "3x3.json";

/// 6x6 grid graph (rook adjacency, column stripes, 2:1 party split).
const SIX_FILENAME: &str = "6x6.json";

const ASSIGNMENT_COL: &str = "district";
const PARTY_COL: &str = "party";

/// Loads a graph/plan fixture with the default columns.
pub fn default_fixture(key: &str) -> (Graph, Plan) {
    fixture_with_columns(key, ASSIGNMENT_COL, PARTY_COL)
}

/// Loads a graph/plan fixture with alternate assignment and party columns.
pub fn fixture_with_columns(key: &str, assignment_col: &str, party_col: &str) -> (Graph, Plan) {
    let filename = match key {
        "3x3" => THREE_FILENAME,
        "6x6" => SIX_FILENAME,
        bad => panic!("Unknown graph fixture '{}'", bad),
    };

    let mut full_path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    full_path.push(GRAPH_FIXTURES_DIR);
    full_path.push(filename);
    let path_str = full_path.into_os_string().into_string().unwrap();
    from_networkx(&path_str, assignment_col, party_col).unwrap()
}
