pub mod checksum;
pub mod command;
pub mod logging;
pub mod template;

pub use checksum::ChecksumVerifier;
pub use command::{CommandOutput, CommandRunner, Invocation, SystemRunner};
pub use logging::LogSession;
pub use template::TemplateEngine;
