//! Prelude module - common imports for gridcalc users
//!
//! ```rust
//! use gridcalc::prelude::*;
//! ```

pub use crate::{
    // Expression trees
    AstBuilder,
    AstTree,
    // Calculation
    CalculationPass,
    CalculationStats,
    CellError,
    CellRange,
    // Cell data
    CellValue,
    CustomFunction,
    CustomValue,
    // Errors
    Error,
    // Context
    EvalConfig,
    EvalContext,
    EvalRuntimeState,
    FormulaCell,
    FunctionContext,
    // Functions
    FunctionExecutor,
    FunctionRegistry,
    LexerItem,
    NodeId,
    Primitive,
    Result,
    SheetNameMap,
    UnitData,
    // Values
    ValueObject,
};
