//! graph-swissknife: Microsoft Graph tenant administration CLI with Hexagonal Architecture.

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod shared;
pub mod usecases;
