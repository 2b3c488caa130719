// Theme expansion — turning a free-text theme into search angles.
//
// The expander is pure string work: no I/O, no clock. Connectors receive
// its platform-tuned query lists, and the clustering stage reuses its
// cluster definitions as assignment targets.

pub mod communities;
pub mod expander;
