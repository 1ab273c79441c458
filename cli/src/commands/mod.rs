//! CLI command implementations

pub mod call;
pub mod resource;
pub mod serve;
pub mod smoke;
pub mod tools;

pub use call::call_command;
pub use resource::resource_command;
pub use serve::serve_command;
pub use smoke::smoke_command;
pub use tools::tools_command;
