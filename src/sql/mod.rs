//! SQL text layer: fragments, the statement model, and the emitter.
//!
//! The translator lowers an operator tree into a [`SqlModel`]; [`emit`]
//! renders the model into a [`CompiledQuery`] of final SQL text plus its
//! ordered named parameters. No SQL text is interpolated from user values
//! anywhere in this layer.

pub mod emit;
pub mod fragment;
pub mod model;

pub use emit::emit;
pub use fragment::{ParamCounter, SqlFragment};
pub use model::{
    CompiledQuery, JoinKind, JoinRecord, OrderFragment, QueryShape, SelectFragment, SqlModel,
    UnionBranch, WrapKind,
};

/// Double-quote an identifier, escaping embedded quotes.
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}
