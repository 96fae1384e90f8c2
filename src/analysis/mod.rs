pub mod data_flow;
pub mod edge_cases;

pub use data_flow::{analyze_node, analyze_range, analyze_region, DataFlowFacts};
pub use edge_cases::{detect_edge_cases, EdgeCaseReport};
