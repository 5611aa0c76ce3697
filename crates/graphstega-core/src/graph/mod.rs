//! The weighted-graph machinery of the matching loop.
//!
//! Each batch builds a [`spatial::SpatialIndex`] over its live samples, an
//! [`edges::EdgeArena`] of candidate sample trades, and then commits a
//! greedy matching. Reserve passes reuse the same pieces with reserves as
//! the donor side.

pub mod edges;
pub mod matcher;
pub mod reserve;
pub mod spatial;
