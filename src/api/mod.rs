//! Public entry points exposed over the network.

pub mod http;
