pub mod domain;
pub mod record;
