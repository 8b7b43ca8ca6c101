mod middleware;
mod password;
mod token;

pub use middleware::{RequireCreator, RequireUser};
pub use password::{hash_password, verify_password};
pub use token::{TokenGenerator, parse_token};
