//! UI panels

mod timeline;
mod transport;

pub use timeline::{TimelinePanel, TimelineView};
pub use transport::{TransportAction, TransportPanel, TransportView};
