//! Concrete filter stages
//!
//! Stages are collaborators of the chain machinery: each one implements
//! [`Stage`](crate::chain::Stage) and decides for itself whether a given
//! buffer should be transformed. The only stage shipped today is the
//! line-ending normalization applied on the way into the object store.

pub mod crlf;
