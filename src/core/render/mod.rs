//! Presentation layers over the graph and code map models. Thin by
//! design: all structure comes from the models themselves, JSON comes from
//! their serde derives.

mod markdown;
mod xml;

pub use markdown::{render_code_map_markdown, render_graph_markdown};
pub use xml::render_code_map_xml;
