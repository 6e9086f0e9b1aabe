//! Function library

pub mod custom;
pub mod date;
pub mod info;
pub mod logical;
pub mod lookup;
pub mod math;
pub mod meta;
pub mod statistical;

pub use custom::{AsyncFunction, CustomFunction};

use std::sync::Arc;

use ahash::AHashMap;
use gridcalc_core::CellError;
use once_cell::sync::Lazy;

use crate::context::FunctionContext;
use crate::value::{CustomValue, ValueObject};

/// Something that can be called by a function node
///
/// Executors receive arguments in call order with references already
/// resolved to arrays, and report failures as error value objects.
pub trait FunctionExecutor: Send + Sync {
    /// Uppercase function name
    fn name(&self) -> &str;

    /// Returns pending values that must be awaited
    fn is_async(&self) -> bool {
        false
    }

    /// Works on plain values through [`FunctionExecutor::calculate_custom`]
    fn is_custom(&self) -> bool {
        false
    }

    /// Returns references instead of values
    fn is_address(&self) -> bool {
        false
    }

    /// Result may differ between calls with the same arguments
    fn is_volatile(&self) -> bool {
        false
    }

    fn calculate(&self, args: &[ValueObject], ctx: &FunctionContext) -> ValueObject;

    /// Entry point for custom executors
    fn calculate_custom(&self, _args: Vec<CustomValue>) -> CustomValue {
        ValueObject::Error(CellError::Value).to_custom_value()
    }
}

/// Function implementation signature
pub type FunctionImpl = fn(&[ValueObject], &FunctionContext) -> ValueObject;

/// Built-in function definition
#[derive(Clone)]
pub struct FunctionDef {
    /// Function name (uppercase)
    pub name: &'static str,
    /// Minimum arguments
    pub min_args: usize,
    /// Maximum arguments (None = unlimited)
    pub max_args: Option<usize>,
    /// Implementation
    pub implementation: FunctionImpl,
    /// Is volatile (recalculates every time)
    pub volatile: bool,
    /// Returns a reference
    pub address: bool,
}

impl FunctionExecutor for FunctionDef {
    fn name(&self) -> &str {
        self.name
    }

    fn is_address(&self) -> bool {
        self.address
    }

    fn is_volatile(&self) -> bool {
        self.volatile
    }

    fn calculate(&self, args: &[ValueObject], ctx: &FunctionContext) -> ValueObject {
        if args.len() < self.min_args {
            return ValueObject::Error(CellError::Na);
        }
        if self.max_args.is_some_and(|max| args.len() > max) {
            return ValueObject::Error(CellError::Value);
        }
        (self.implementation)(args, ctx)
    }
}

impl std::fmt::Debug for FunctionDef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FunctionDef")
            .field("name", &self.name)
            .field("min_args", &self.min_args)
            .field("max_args", &self.max_args)
            .finish()
    }
}

static BUILTINS: Lazy<FunctionRegistry> = Lazy::new(FunctionRegistry::new);

/// Function registry
#[derive(Clone)]
pub struct FunctionRegistry {
    functions: AHashMap<String, Arc<dyn FunctionExecutor>>,
}

impl FunctionRegistry {
    /// Create a new registry with all built-in functions
    pub fn new() -> Self {
        let mut registry = Self::empty();

        registry.register_meta_functions();
        registry.register_math_functions();
        registry.register_statistical_functions();
        registry.register_lookup_functions();
        registry.register_info_functions();
        registry.register_logical_functions();
        registry.register_date_functions();

        registry
    }

    /// Create a registry with no functions
    pub fn empty() -> Self {
        Self {
            functions: AHashMap::new(),
        }
    }

    /// Shared registry of the built-in functions
    pub fn builtins() -> &'static FunctionRegistry {
        &BUILTINS
    }

    /// Register a built-in style function
    pub fn register(&mut self, def: FunctionDef) {
        self.register_executor(Arc::new(def));
    }

    /// Register any executor, replacing one with the same name
    pub fn register_executor(&mut self, executor: Arc<dyn FunctionExecutor>) {
        self.functions.insert(executor.name().to_uppercase(), executor);
    }

    pub fn has_executor(&self, name: &str) -> bool {
        self.functions.contains_key(&name.to_uppercase())
    }

    /// Look up an executor by name (case-insensitive)
    pub fn get_executor(&self, name: &str) -> Option<Arc<dyn FunctionExecutor>> {
        self.functions.get(&name.to_uppercase()).cloned()
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }

    fn register_meta_functions(&mut self) {
        let operators: [(&'static str, FunctionImpl); 10] = [
            ("PLUS", meta::fn_plus),
            ("MULTIPLY", meta::fn_multiply),
            ("DIVIDED", meta::fn_divided),
            ("POWER", meta::fn_power),
            ("EQUALS", meta::fn_equals),
            ("NOT_EQUAL", meta::fn_not_equal),
            ("GREATER_THAN", meta::fn_greater_than),
            ("GREATER_THAN_OR_EQUAL", meta::fn_greater_than_or_equal),
            ("LESS_THAN", meta::fn_less_than),
            ("LESS_THAN_OR_EQUAL", meta::fn_less_than_or_equal),
        ];
        for (name, implementation) in operators {
            self.register(FunctionDef {
                name,
                min_args: 2,
                max_args: Some(2),
                implementation,
                volatile: false,
                address: false,
            });
        }

        // MINUS (negation with one argument)
        self.register(FunctionDef {
            name: "MINUS",
            min_args: 1,
            max_args: Some(2),
            implementation: meta::fn_minus,
            volatile: false,
            address: false,
        });

        // CONCATENATE
        self.register(FunctionDef {
            name: "CONCATENATE",
            min_args: 1,
            max_args: None,
            implementation: meta::fn_concatenate,
            volatile: false,
            address: false,
        });
    }

    fn register_math_functions(&mut self) {
        // SUM
        self.register(FunctionDef {
            name: "SUM",
            min_args: 1,
            max_args: None,
            implementation: math::fn_sum,
            volatile: false,
            address: false,
        });

        // ABS
        self.register(FunctionDef {
            name: "ABS",
            min_args: 1,
            max_args: Some(1),
            implementation: math::fn_abs,
            volatile: false,
            address: false,
        });

        // SQRT
        self.register(FunctionDef {
            name: "SQRT",
            min_args: 1,
            max_args: Some(1),
            implementation: math::fn_sqrt,
            volatile: false,
            address: false,
        });

        // ACOSH
        self.register(FunctionDef {
            name: "ACOSH",
            min_args: 1,
            max_args: Some(1),
            implementation: math::fn_acosh,
            volatile: false,
            address: false,
        });

        // ATANH
        self.register(FunctionDef {
            name: "ATANH",
            min_args: 1,
            max_args: Some(1),
            implementation: math::fn_atanh,
            volatile: false,
            address: false,
        });

        // RAND (volatile)
        self.register(FunctionDef {
            name: "RAND",
            min_args: 0,
            max_args: Some(0),
            implementation: math::fn_rand,
            volatile: true,
            address: false,
        });
    }

    fn register_statistical_functions(&mut self) {
        // AVERAGE
        self.register(FunctionDef {
            name: "AVERAGE",
            min_args: 1,
            max_args: Some(255),
            implementation: statistical::fn_average,
            volatile: false,
            address: false,
        });

        // MAX
        self.register(FunctionDef {
            name: "MAX",
            min_args: 1,
            max_args: Some(255),
            implementation: statistical::fn_max,
            volatile: false,
            address: false,
        });

        // MIN
        self.register(FunctionDef {
            name: "MIN",
            min_args: 1,
            max_args: Some(255),
            implementation: statistical::fn_min,
            volatile: false,
            address: false,
        });

        // COUNT
        self.register(FunctionDef {
            name: "COUNT",
            min_args: 1,
            max_args: Some(255),
            implementation: statistical::fn_count,
            volatile: false,
            address: false,
        });

        // COUNTA
        self.register(FunctionDef {
            name: "COUNTA",
            min_args: 1,
            max_args: Some(255),
            implementation: statistical::fn_counta,
            volatile: false,
            address: false,
        });

        // COUNTIF
        self.register(FunctionDef {
            name: "COUNTIF",
            min_args: 2,
            max_args: Some(2),
            implementation: statistical::fn_countif,
            volatile: false,
            address: false,
        });
    }

    fn register_lookup_functions(&mut self) {
        // LOOKUP
        self.register(FunctionDef {
            name: "LOOKUP",
            min_args: 2,
            max_args: Some(3),
            implementation: lookup::fn_lookup,
            volatile: false,
            address: false,
        });

        // MATCH
        self.register(FunctionDef {
            name: "MATCH",
            min_args: 2,
            max_args: Some(3),
            implementation: lookup::fn_match,
            volatile: false,
            address: false,
        });

        // XMATCH
        self.register(FunctionDef {
            name: "XMATCH",
            min_args: 2,
            max_args: Some(4),
            implementation: lookup::fn_xmatch,
            volatile: false,
            address: false,
        });

        // INDEX
        self.register(FunctionDef {
            name: "INDEX",
            min_args: 2,
            max_args: Some(3),
            implementation: lookup::fn_index,
            volatile: false,
            address: false,
        });

        // ROWS
        self.register(FunctionDef {
            name: "ROWS",
            min_args: 1,
            max_args: Some(1),
            implementation: lookup::fn_rows,
            volatile: false,
            address: false,
        });

        // COLUMNS
        self.register(FunctionDef {
            name: "COLUMNS",
            min_args: 1,
            max_args: Some(1),
            implementation: lookup::fn_columns,
            volatile: false,
            address: false,
        });

        // ROW
        self.register(FunctionDef {
            name: "ROW",
            min_args: 0,
            max_args: Some(1),
            implementation: lookup::fn_row,
            volatile: false,
            address: false,
        });

        // COLUMN
        self.register(FunctionDef {
            name: "COLUMN",
            min_args: 0,
            max_args: Some(1),
            implementation: lookup::fn_column,
            volatile: false,
            address: false,
        });

        // INDIRECT (returns a reference)
        self.register(FunctionDef {
            name: "INDIRECT",
            min_args: 1,
            max_args: Some(2),
            implementation: lookup::fn_indirect,
            volatile: true,
            address: true,
        });
    }

    fn register_info_functions(&mut self) {
        let predicates: [(&'static str, FunctionImpl); 5] = [
            ("ISBLANK", info::fn_isblank),
            ("ISNUMBER", info::fn_isnumber),
            ("ISTEXT", info::fn_istext),
            ("ISERROR", info::fn_iserror),
            ("ISNA", info::fn_isna),
        ];
        for (name, implementation) in predicates {
            self.register(FunctionDef {
                name,
                min_args: 1,
                max_args: Some(1),
                implementation,
                volatile: false,
                address: false,
            });
        }

        // NA
        self.register(FunctionDef {
            name: "NA",
            min_args: 0,
            max_args: Some(0),
            implementation: info::fn_na,
            volatile: false,
            address: false,
        });
    }

    fn register_logical_functions(&mut self) {
        // IF
        self.register(FunctionDef {
            name: "IF",
            min_args: 1,
            max_args: Some(3),
            implementation: logical::fn_if,
            volatile: false,
            address: false,
        });

        // IFERROR
        self.register(FunctionDef {
            name: "IFERROR",
            min_args: 2,
            max_args: Some(2),
            implementation: logical::fn_iferror,
            volatile: false,
            address: false,
        });

        // NOT
        self.register(FunctionDef {
            name: "NOT",
            min_args: 1,
            max_args: Some(1),
            implementation: logical::fn_not,
            volatile: false,
            address: false,
        });
    }

    fn register_date_functions(&mut self) {
        // DATE
        self.register(FunctionDef {
            name: "DATE",
            min_args: 3,
            max_args: Some(3),
            implementation: date::fn_date,
            volatile: false,
            address: false,
        });

        // YEAR
        self.register(FunctionDef {
            name: "YEAR",
            min_args: 1,
            max_args: Some(1),
            implementation: date::fn_year,
            volatile: false,
            address: false,
        });

        // MONTH
        self.register(FunctionDef {
            name: "MONTH",
            min_args: 1,
            max_args: Some(1),
            implementation: date::fn_month,
            volatile: false,
            address: false,
        });

        // DAY
        self.register(FunctionDef {
            name: "DAY",
            min_args: 1,
            max_args: Some(1),
            implementation: date::fn_day,
            volatile: false,
            address: false,
        });

        // TODAY (volatile)
        self.register(FunctionDef {
            name: "TODAY",
            min_args: 0,
            max_args: Some(0),
            implementation: date::fn_today,
            volatile: true,
            address: false,
        });

        // NOW (volatile)
        self.register(FunctionDef {
            name: "NOW",
            min_args: 0,
            max_args: Some(0),
            implementation: date::fn_now,
            volatile: true,
            address: false,
        });
    }
}

impl Default for FunctionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for FunctionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<&String> = self.functions.keys().collect();
        names.sort();
        f.debug_struct("FunctionRegistry").field("functions", &names).finish()
    }
}

/// First error among the arguments, in order
pub(crate) fn first_error_arg(args: &[ValueObject]) -> Option<CellError> {
    args.iter().find_map(ValueObject::error)
}

/// Apply a numeric function to a value, element-wise over arrays
///
/// Elements that do not coerce to a number yield their coercion error;
/// non-finite results become `#NUM!`.
pub(crate) fn map_numeric<F>(value: &ValueObject, f: F) -> ValueObject
where
    F: Fn(f64) -> Result<f64, CellError>,
{
    value.map(|v| match v.to_number().and_then(&f) {
        Ok(n) if n.is_finite() => ValueObject::Number(n),
        Ok(_) => ValueObject::Error(CellError::Num),
        Err(e) => ValueObject::Error(e),
    })
}

/// A 1x1 array argument read as its only element
pub(crate) fn unwrap_single(value: &ValueObject) -> &ValueObject {
    match value {
        ValueObject::Array(a) => a.single().unwrap_or(value),
        other => other,
    }
}

/// Integer part of a numeric argument, saturating at the `i64` bounds
pub(crate) fn to_i64_trunc(value: &ValueObject) -> Result<i64, CellError> {
    unwrap_single(value).to_number().map(|n| n.trunc() as i64)
}
