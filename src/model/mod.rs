pub mod issue;
pub mod snapshot;
