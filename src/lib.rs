#![warn(clippy::all, clippy::pedantic)]

// disable some style lints
#![allow(clippy::needless_return, clippy::must_use_candidate, clippy::comparison_chain)]
#![allow(clippy::redundant_field_names, clippy::redundant_closure_for_method_calls)]
#![allow(clippy::unreadable_literal, clippy::option_if_let_else, clippy::range_plus_one)]
#![allow(clippy::missing_errors_doc, clippy::missing_panics_doc, clippy::module_name_repetitions)]

#![allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_wrap, clippy::cast_lossless, clippy::cast_sign_loss)]
#![allow(clippy::default_trait_access)]

// Tests lints
#![cfg_attr(test, allow(clippy::float_cmp))]

//! Neighbour lists for molecular and materials simulations.
//!
//! Given particles in a (possibly periodic) triclinic cell, this crate
//! enumerates all ordered pairs closer than a cutoff using a cell-linked
//! list, including periodic images and their integer cell shifts; on top of
//! the pair list it enumerates n-body tuples and reduces per-pair or
//! per-tuple quantities onto the participating sites, in parallel.

pub mod types;
pub use types::{Matrix3, PairIndex, Scalar, StackVec, Vector3D};

mod errors;
pub use self::errors::Error;

mod cell;
pub use self::cell::CellGeometry;

mod binning;
pub use self::binning::LinkedBins;

mod neighbors;
pub use self::neighbors::{Pair, PairList, SiteNeighbors};

mod nbody;
pub use self::nbody::{nbodies, NBodies, Simplex, MAX_ORDER};

mod parallel;
pub use self::parallel::{max_threads, set_max_threads};

mod assembly;
