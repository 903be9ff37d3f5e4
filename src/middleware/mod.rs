pub mod jwt;

pub use jwt::{JwtLayer, JwtService};
