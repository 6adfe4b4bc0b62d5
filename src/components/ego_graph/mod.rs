pub mod angle;
mod component;
pub mod encoding;
pub mod ingest;
pub mod interaction;
pub mod layout;
mod legend;
mod render;
pub mod simulation;
mod state;
pub mod temporal;
pub mod types;

pub use component::EgoGraphCanvas;
pub use ingest::{WorkingSet, parse_graph_response};
pub use interaction::{NavigateCallback, event_path};
pub use legend::Legend;
pub use types::GraphResponse;
