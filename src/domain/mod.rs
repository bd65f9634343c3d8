pub mod member;
pub mod club;
pub mod invite;
pub mod team;
pub mod event;
pub mod module;

pub use member::*;
pub use club::*;
pub use invite::*;
pub use team::*;
pub use event::*;
pub use module::*;
