pub mod card;
pub mod connection;
pub mod fragment;
pub mod record;

pub use card::*;
pub use connection::*;
pub use fragment::*;
pub use record::*;
