//! # gridcalc
//!
//! A spreadsheet formula evaluation engine.
//!
//! Formulas arrive as lexer trees, are built into expression trees by node
//! factories, and are evaluated against immutable cell data snapshots.
//!
//! ## Features
//!
//! - Typed value objects: scalars, arrays, lazy references and async results
//! - Spreadsheet comparison, criteria and lookup search
//! - Synchronous and asynchronous execution
//! - Built-in function library, extensible with custom and async functions
//! - Sequential calculation passes with array spilling
//!
//! ## Example
//!
//! ```rust
//! use gridcalc::prelude::*;
//!
//! let mut data = UnitData::new();
//! data.set_cell("book", "s1", 0, 0, CellValue::Number(2.0));
//! data.set_cell("book", "s1", 1, 0, CellValue::Number(3.0));
//! let config = EvalConfig::new().with_unit_data(data);
//! let runtime = EvalRuntimeState::new("book", "s1");
//!
//! // =SUM(A1:A2)*2
//! let lexer = LexerItem::node("*", vec![
//!     LexerItem::node("SUM", vec![LexerItem::token("A1:A2")]),
//!     LexerItem::token("2"),
//! ]);
//! let (mut tree, root) = AstBuilder::new(FunctionRegistry::builtins()).build(&lexer).unwrap();
//! let value = tree.execute(root, &EvalContext::new(&config, &runtime)).unwrap();
//! assert_eq!(value, ValueObject::Number(10.0));
//! ```

pub mod calculation;
pub mod error;
pub mod prelude;

pub use calculation::{CalculationPass, CalculationStats, FormulaCell};
pub use error::{Error, Result};

// Re-export core types
pub use gridcalc_core::{
    CellAddress, CellError, CellRange, CellValue, SharedString, SheetData, SheetNameMap, UnitData,
    MAX_COLS, MAX_ROWS,
};

// Re-export formula types
pub use gridcalc_formula::{
    compare, value_object_compare, ArrayOrigin, ArrayValue, AstBuilder, AstNode, AstNodeFactory,
    AstTree, AsyncFunction, AsyncValue, CompareToken, CreatedNode, Criteria, CustomFunction,
    CustomValue, EngineSettings, EvalConfig, EvalContext, EvalRuntimeState, FactoryParam,
    FormulaError, FormulaResult, FunctionContext, FunctionDef, FunctionExecutor, FunctionRegistry,
    LexerItem, LexerNode, NodeId, NodeKind, NodeType, Primitive, PrefixOperator, ReferenceData,
    ReferenceValue, ValueObject,
};
