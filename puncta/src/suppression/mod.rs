//! Greedy, intensity-ordered pairwise suppression.
//!
//! Both suppressors sort by descending intensity and walk the list once,
//! flipping entries of a shared `kept` vector. The scan order is the
//! tie-break, so neither pass is parallelized.

mod bridge;
mod line;
mod proximity;


pub use bridge::BridgeSuppressor;
pub use proximity::ProximitySuppressor;
