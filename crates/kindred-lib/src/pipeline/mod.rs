pub mod find;
pub mod link_block;
pub mod scorer;
pub mod terms;
