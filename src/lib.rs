//! ecosim — ecotype speciation parameters from sequence-similarity binning.
//!
//! Purpose
//! -------
//! Infer the three latent parameters of an ecological speciation model,
//! the ecotype-formation rate (omega), the periodic-selection rate (sigma)
//! and the ecotype count (npop), from the branching pattern of a
//! sequence-similarity hierarchy collapsed into a binning curve.
//!
//! Key behaviors
//! -------------
//! - [`phylogeny`]: parse, prune and reroot the Newick hierarchy that
//!   defines the taxon set.
//! - [`binning`]: the validated similarity-to-cluster-count curve the rest
//!   of the pipeline consumes.
//! - [`estimate`]: closed-form two-segment fit seeding the search.
//! - [`simulation`]: the seam to the external stochastic likelihood oracle
//!   (trait, textual protocol, production runner).
//! - [`optimization`]: derivative-free Nelder–Mead refinement of the free
//!   parameters at a fixed rate.
//! - [`confidence`]: the outer omega scan and the profile-likelihood
//!   confidence-interval searches, parallel over a bounded worker pool.
//!
//! Conventions
//! -----------
//! - Likelihoods are success rates; higher is better. The optimizer
//!   internally minimizes their negation.
//! - Errors bubble up as per-domain enums with `From` conversions; this
//!   crate never intentionally panics in non-test code.
//!
//! Downstream usage
//! ----------------
//! - A front-end prepares the tree and binning curve, builds an
//!   [`simulation::ExternalOracle`] over its simulator binary, seeds with
//!   [`estimate::ParameterEstimate`], refines with
//!   [`confidence::OmegaScan`], and brackets the result with
//!   [`confidence::ConfidenceIntervalSearch`].

pub mod binning;
pub mod confidence;
pub mod estimate;
pub mod optimization;
pub mod params;
pub mod phylogeny;
pub mod simulation;

// Re-export frequently used types
pub use binning::{BinLevel, Binning};
pub use confidence::{Bound, ConfidenceInterval, ConfidenceIntervalSearch, GridOptions, OmegaScan};
pub use estimate::ParameterEstimate;
pub use optimization::{FixedParameter, SimplexOptions, SimplexOutcome};
pub use params::ParameterSet;
pub use phylogeny::Tree;
pub use simulation::{ExternalOracle, LikelihoodOracle, SeedSequence};
