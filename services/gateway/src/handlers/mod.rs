pub mod curves;
pub mod market;
pub mod orders;
pub mod positions;
pub mod valuations;
pub mod ws;
