//! 工具箱：注册表与三个模拟工具（web_search、code_interpreter、constitution_retriever）

pub mod code_interpreter;
pub mod constitution;
pub mod registry;
pub mod web_search;

pub use code_interpreter::{CodeInterpreterTool, CODE_INTERPRETER};
pub use constitution::{retrieve_principles, ConstitutionRetrieverTool, CONSTITUTION_RETRIEVER};
pub use registry::{Tool, ToolArgs, ToolDescriptor, ToolError, ToolRegistry};
pub use web_search::{WebSearchTool, WEB_SEARCH};
