pub(crate) mod games;
pub(crate) mod questions;
pub(crate) mod topic_counts;
pub(crate) mod users;
