pub(crate) mod auth;
pub(crate) mod errors;
pub(crate) mod games;
pub(crate) mod guards;
pub(crate) mod handlers;
pub(crate) mod questions;
pub(crate) mod router;
pub(crate) mod topics;
pub(crate) mod validation;
