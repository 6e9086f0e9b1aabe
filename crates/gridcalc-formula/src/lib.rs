//! # gridcalc-formula
//!
//! Expression tree evaluator for gridcalc.
//!
//! This crate provides:
//! - Typed value objects (scalars, arrays, references, async results)
//! - Spreadsheet comparison, criteria and search utilities
//! - An arena-based expression tree built from a lexer tree through node factories
//! - Synchronous and asynchronous execution
//! - A library of built-in functions behind a [`FunctionRegistry`]
//!
//! ## Example
//!
//! ```rust
//! use gridcalc_formula::{
//!     AstBuilder, EvalConfig, EvalContext, EvalRuntimeState, FunctionRegistry, LexerItem,
//!     ValueObject,
//! };
//!
//! // SUM(1, 2, 3)
//! let lexer = LexerItem::node("SUM", vec![
//!     LexerItem::token("1"),
//!     LexerItem::token("2"),
//!     LexerItem::token("3"),
//! ]);
//!
//! let (mut tree, root) = AstBuilder::new(FunctionRegistry::builtins()).build(&lexer).unwrap();
//! let config = EvalConfig::default();
//! let runtime = EvalRuntimeState::default();
//! let value = tree.execute(root, &EvalContext::new(&config, &runtime)).unwrap();
//! assert_eq!(value, ValueObject::Number(6.0));
//! ```

pub mod ast;
pub mod compare;
pub mod context;
pub mod error;
pub mod functions;
pub mod value;

pub use ast::{
    AstBuilder, AstNode, AstNodeFactory, AstTree, CreatedNode, FactoryParam, LexerItem, LexerNode,
    NodeId, NodeKind, NodeType, PrefixOperator,
};
pub use compare::{compare, value_object_compare, CompareToken, Criteria};
pub use context::{EngineSettings, EvalConfig, EvalContext, EvalRuntimeState, FunctionContext};
pub use error::{FormulaError, FormulaResult};
pub use functions::{AsyncFunction, CustomFunction, FunctionDef, FunctionExecutor, FunctionRegistry};
pub use value::{
    ArrayOrigin, ArrayValue, AsyncValue, CustomValue, Primitive, ReferenceData, ReferenceValue,
    ValueObject,
};
