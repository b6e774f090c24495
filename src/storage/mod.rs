mod session;
mod style;

pub use session::{GeneratedFiles, Session, SessionStorage, DEFAULT_SESSION_TTL};
pub use style::StyleStorage;
