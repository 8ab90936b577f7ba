pub(crate) mod common;

mod caller;
mod indentation;
mod phrases;
mod round_trip;
mod safety;
mod scenarios;
