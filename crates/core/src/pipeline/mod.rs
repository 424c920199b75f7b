//! The APEX pipeline: rename through commit.
//!
//! Structures (PRF, rename table, IQ, LSQ, ROB, branch queue, functional
//! units) and the stage functions that move instructions between them. The
//! simulator drives the stages in a fixed intra-cycle order; see
//! [`crate::sim::simulator`].

pub mod branch;
pub mod commit;
pub mod dispatch;
pub mod frontend;
pub mod fu;
pub mod iq;
pub mod latches;
pub mod lsq;
pub mod prf;
pub mod rename;
pub mod rob;

pub use branch::BranchQueue;
pub use commit::MemStage;
pub use fu::{CycleBuses, FunctionalUnit};
pub use iq::IssueQueue;
pub use lsq::LoadStoreQueue;
pub use prf::PhysRegFile;
pub use rename::RenameTable;
pub use rob::ReorderBuffer;
