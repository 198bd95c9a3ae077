/// Module assembly stage of a C++ header binding generator
pub mod config;
pub mod error;
pub mod module;
pub mod parsing;
pub mod types;

// Explicit exports for better API clarity
pub use config::{ParserBackend, ParserSettings, Settings};
pub use error::{ModuleError, ModuleResult, ParseError, ParseResult};
pub use module::{CollisionPolicy, Module, discover_headers};
pub use parsing::{HeaderParser, JsonHeaderParser, ParserSession, TreeSitterHeaderParser};
pub use types::{
    Argument, ClassInfo, ClassTemplateInfo, ConstructorInfo, EnumInfo, FieldInfo, FunctionInfo,
    HeaderDescriptor, MethodInfo, TemplateParam, TemplateParamKind, TypedefInfo,
};
