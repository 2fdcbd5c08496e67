pub mod listen;
pub mod users;
