pub mod invoker;
pub mod query;
pub mod records;
