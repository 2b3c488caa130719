// Discovery pipeline: concurrent fan-out, scoring, narrative clustering.

pub mod clustering;
pub mod discovery;

pub use discovery::run_discovery;
