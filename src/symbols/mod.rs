//! Class records and the symbol table they are indexed into.

pub mod table;
pub mod types;

pub use table::{normalize_reference, ClassId, Link, SymbolTable};
pub use types::{
    ClassRecord, HttpMethod, Mapping, MatchConstraints, MethodRecord, Parameter, ParsedFile,
    RouteAnnotation, RoutePrefix,
};
