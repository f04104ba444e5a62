//! Scalar field profiling along polyline routes.
//!
//! A [Route] is stationed once into a [StationModel], sampled by a
//! [FieldSampler] at stations chosen by a [StepPlanner], and returned
//! as an immutable [Profile] with along-route and side slopes.
//!
//! ```no_run
//! use routeprof::{build_profile, geo::line_string, FieldSource, ProfileConfig, Route};
//! use rastergrid::Raster;
//!
//! let raster = Raster::load_asc("survey.asc").unwrap();
//! let route = Route::planar(line_string![(x: 500_000.0, y: 6_000_000.0), (x: 501_000.0, y: 6_000_400.0)]);
//! let profile = build_profile(&route, &FieldSource::Grid(vec![&raster]), &ProfileConfig::default()).unwrap();
//! println!("{:#?}", profile.summary());
//! ```

mod coverage;
mod cross_slope;
mod error;
pub mod math;
pub mod measure;
mod planner;
mod profile;
mod route;
pub mod sampler;
mod slope;
mod stats;

pub use crate::{
    coverage::{Completion, Coverage, Warning},
    cross_slope::{CancelToken, CrossSlopeEngine, SideSlope},
    error::ProfileError,
    measure::{DistanceMeasure, GeodesicProjector, Measure, Metric},
    planner::{expected_samples, govern, Governed, StepPlanner, StepPolicy},
    profile::{
        build_profile, build_profile_with, FieldSource, Profile, ProfileBuilder, ProfileConfig, Sample,
    },
    route::{Route, Segment, StationModel},
    sampler::{ContourIndex, ContourSource, FieldSampler, GridSource, SourceId},
    slope::{along_slopes, seabed_length, AlongSlope},
    stats::{ProfileSummary, Stats},
};
pub use geo;
