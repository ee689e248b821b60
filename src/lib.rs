// Library root
// -----------
// This crate exposes the probe as a library so the binary (`main.rs`)
// stays a thin wrapper and the stages can be driven from tests.
//
// Module responsibilities:
// - `api`: blocking HTTP calls to the tree service (login, plant, list)
//   and the request/response shapes.
// - `config`: defaults plus environment overrides for the probe.
// - `error`: the `ProbeError` taxonomy and the `Stage` it happened in.
// - `mapping`: pure projections into the browser client's field names.
// - `probe`: the four-stage run and its outcome.
// - `report`: console output (markers, details, spinners).
// - `token`: token previews and JWT claim inspection.
pub mod api;
pub mod config;
pub mod error;
pub mod mapping;
pub mod probe;
pub mod report;
pub mod token;
