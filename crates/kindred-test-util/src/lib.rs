pub mod ripgrep;
pub mod vault;
