//! Pipeline stages for batch PDF splitting.
//!
//! Each submodule implements exactly one transformation step. Keeping
//! stages separate makes each independently testable and lets us swap
//! implementations (e.g. a different document backend) without touching
//! the others.
//!
//! ## Data Flow
//!
//! ```text
//! validate ──▶ codec ──▶ naming ──▶ archive
//! (type/size)  (parse,    (entry     (ZIP
//!               extract)   names)     session)
//! ```
//!
//! 1. [`validate`] — declared media type and size limit; the cheap first
//!    stage of the two-stage input check
//! 2. [`codec`]    — parse bytes into a document, report the page count,
//!    materialise single pages; runs in `spawn_blocking` because the PDF
//!    object model is CPU-bound
//! 3. [`naming`]   — sanitise hostile file names and derive zero-padded,
//!    collision-free archive entry names
//! 4. [`archive`]  — the per-invocation ZIP session that entries are
//!    packed into and finalised from

pub mod archive;
pub mod codec;
pub mod naming;
pub mod validate;
