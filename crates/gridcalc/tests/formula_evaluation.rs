//! Tests for formula evaluation through the public API

use std::sync::Arc;

use futures::executor::block_on;
use gridcalc::prelude::*;
use gridcalc::{ArrayValue, AsyncFunction};
use pretty_assertions::assert_eq;
use serde_json::json;

fn token(t: &str) -> LexerItem {
    LexerItem::token(t)
}

fn call(name: &str, args: Vec<LexerItem>) -> LexerItem {
    LexerItem::node(name, args)
}

fn evaluate_with(config: &EvalConfig, item: &LexerItem) -> ValueObject {
    let runtime = EvalRuntimeState::new("book", "s1");
    let (mut tree, root) = AstBuilder::new(FunctionRegistry::builtins()).build(item).unwrap();
    let value = tree.execute(root, &EvalContext::new(config, &runtime)).unwrap();
    match value.materialize() {
        ValueObject::Array(array) => array.single().cloned().unwrap_or(ValueObject::Array(array)),
        other => other,
    }
}

fn evaluate(item: &LexerItem) -> ValueObject {
    evaluate_with(&EvalConfig::new(), item)
}

fn column_data(values: &[CellValue]) -> EvalConfig {
    let mut data = UnitData::new();
    for (row, value) in values.iter().enumerate() {
        data.set_cell("book", "s1", row as u32, 0, value.clone());
    }
    EvalConfig::new().with_unit_data(data)
}

/// Test basic formula evaluation without cell references
#[test]
fn test_evaluate_simple_formulas() {
    // 1+2*3
    let formula = call("+", vec![token("1"), call("*", vec![token("2"), token("3")])]);
    assert_eq!(evaluate(&formula), ValueObject::Number(7.0));

    // "Hello "&"World"
    let formula = call("&", vec![token("\"Hello \""), token("\"World\"")]);
    assert_eq!(evaluate(&formula), ValueObject::string("Hello World"));

    // 5>3
    let formula = call(">", vec![token("5"), token("3")]);
    assert_eq!(evaluate(&formula), ValueObject::Boolean(true));
}

/// Test IF function
#[test]
fn test_evaluate_if() {
    let yes_no = |condition: LexerItem| call("IF", vec![condition, token("\"Yes\""), token("\"No\"")]);

    assert_eq!(
        evaluate(&yes_no(call(">", vec![token("1"), token("0")]))),
        ValueObject::string("Yes")
    );
    assert_eq!(
        evaluate(&yes_no(call("<", vec![token("1"), token("0")]))),
        ValueObject::string("No")
    );
}

/// Test formula evaluation with cell references
#[test]
fn test_evaluate_with_cell_references() {
    let mut data = UnitData::new();
    data.set_cell("book", "s1", 0, 0, CellValue::Number(10.0));
    data.set_cell("book", "s1", 0, 1, CellValue::Number(5.0));
    data.set_cell("book", "s2", 0, 0, CellValue::Number(100.0));
    let mut names = SheetNameMap::new();
    names.insert("book", "Sheet1", "s1");
    names.insert("book", "Data Sheet", "s2");
    let config = EvalConfig::new().with_unit_data(data).with_sheet_names(names);

    assert_eq!(evaluate_with(&config, &token("A1")), ValueObject::Number(10.0));
    assert_eq!(
        evaluate_with(&config, &call("+", vec![token("A1"), token("B1")])),
        ValueObject::Number(15.0)
    );
    assert_eq!(
        evaluate_with(&config, &call(">", vec![token("A1"), token("B1")])),
        ValueObject::Boolean(true)
    );
    assert_eq!(
        evaluate_with(&config, &call("-", vec![token("'Data Sheet'!A1"), token("A1")])),
        ValueObject::Number(90.0)
    );
}

/// Test AVERAGE and MAX over ranges with blanks
#[test]
fn test_aggregates_over_ranges() {
    let config = column_data(&[
        CellValue::Number(1.0),
        CellValue::Empty,
        CellValue::Number(3.0),
        CellValue::Number(5.0),
    ]);
    assert_eq!(
        evaluate_with(&config, &call("AVERAGE", vec![token("A1:A4")])),
        ValueObject::Number(3.0)
    );
    assert_eq!(
        evaluate_with(&config, &call("MAX", vec![token("A1:A4")])),
        ValueObject::Number(5.0)
    );
    assert_eq!(evaluate(&call("AVERAGE", vec![])), ValueObject::Error(CellError::Na));
    assert_eq!(evaluate(&call("MAX", vec![])), ValueObject::Error(CellError::Na));
}

/// Test LOOKUP and XMATCH against sheet data
#[test]
fn test_lookup_functions() {
    let mut data = UnitData::new();
    for (row, (key, label)) in [(1.0, "one"), (4.0, "four"), (44.0, "forty-four"), (444.0, "many")]
        .into_iter()
        .enumerate()
    {
        data.set_cell("book", "s1", row as u32, 0, CellValue::Number(key));
        data.set_cell("book", "s1", row as u32, 1, CellValue::string(label));
    }
    for (row, name) in ["First", "Second", "Third"].into_iter().enumerate() {
        data.set_cell("book", "s1", row as u32, 2, CellValue::string(name));
    }
    let config = EvalConfig::new().with_unit_data(data);

    let lookup = |value: &str| call("LOOKUP", vec![token(value), token("A1:A4"), token("B1:B4")]);
    assert_eq!(evaluate_with(&config, &lookup("40")), ValueObject::string("four"));
    assert_eq!(evaluate_with(&config, &lookup("44")), ValueObject::string("forty-four"));
    assert_eq!(evaluate_with(&config, &lookup("0")), ValueObject::Error(CellError::Na));

    let xmatch = call("XMATCH", vec![token("\"Second\""), token("C1:C3")]);
    assert_eq!(evaluate_with(&config, &xmatch), ValueObject::Number(2.0));

    // binary search with wildcard matching does not fail
    let xmatch = call("XMATCH", vec![token("\"T*\""), token("C1:C3"), token("2"), token("2")]);
    assert_eq!(evaluate_with(&config, &xmatch), ValueObject::Number(3.0));
}

/// Test array literals and element-wise errors
#[test]
fn test_array_evaluation() {
    let formula = call("*", vec![token("{1,2;3,4}"), token("10")]);
    let expected = ValueObject::Array(ArrayValue::parse_literal("{10,20;30,40}").unwrap());
    assert_eq!(evaluate(&formula), expected);

    let formula = call("ABS", vec![token("{-1,\"x\"}")]);
    let ValueObject::Array(result) = evaluate(&formula) else {
        panic!("expected an array");
    };
    assert_eq!(result.get(0, 0), Some(&ValueObject::Number(1.0)));
    assert_eq!(result.get(0, 1), Some(&ValueObject::Error(CellError::Value)));
}

/// Test tree serialization and repeated execution
#[test]
fn test_serialize_and_idempotence() {
    let formula = call("SUM", vec![token("1"), token("A1")]);
    let (mut tree, root) = AstBuilder::new(FunctionRegistry::builtins()).build(&formula).unwrap();
    assert_eq!(
        tree.serialize(root).unwrap(),
        json!({
            "token": "SUM",
            "nodeType": "FUNCTION",
            "children": [
                {"token": "1", "nodeType": "VALUE"},
                {"token": "A1", "nodeType": "REFERENCE"}
            ]
        })
    );

    let config = column_data(&[CellValue::Number(2.0)]);
    let runtime = EvalRuntimeState::new("book", "s1");
    let ctx = EvalContext::new(&config, &runtime);
    let first = tree.execute(root, &ctx).unwrap();
    let second = tree.execute(root, &ctx).unwrap();
    assert_eq!(first, ValueObject::Number(3.0));
    assert_eq!(first, second);
}

/// Test dates with the 1904 date system
#[test]
fn test_date_systems() {
    let formula = call("DATE", vec![token("2024"), token("1"), token("15")]);
    assert_eq!(evaluate(&formula), ValueObject::Number(45306.0));

    let config = EvalConfig::new().with_settings(gridcalc::EngineSettings { date_1904: true });
    assert_eq!(evaluate_with(&config, &formula), ValueObject::Number(43844.0));
}

/// Test a calculation pass with custom and async functions
#[test]
fn test_calculation_pass_with_registered_functions() {
    let mut registry = FunctionRegistry::new();
    registry.register_executor(Arc::new(CustomFunction::new("TWICE", |args| match args.first() {
        Some(CustomValue::Scalar(Primitive::Number(n))) => CustomValue::Scalar(Primitive::Number(n * 2.0)),
        _ => CustomValue::Scalar(Primitive::from("#VALUE!")),
    })));
    registry.register_executor(Arc::new(AsyncFunction::new(
        "FETCH",
        |_args: Vec<ValueObject>, _ctx: FunctionContext| async { ValueObject::Number(40.0) },
    )));
    let builder = AstBuilder::new(&registry);

    let build = |column: u16, item: LexerItem| FormulaCell::build(&builder, "book", "s1", 0, column, &item).unwrap();
    let cells = vec![
        build(0, call("FETCH", vec![])),
        build(1, call("+", vec![token("A1"), call("TWICE", vec![token("1")])])),
    ];
    let config = EvalConfig::new();

    let mut async_cells = cells.clone();
    let mut pass = CalculationPass::new(&config);
    let stats = block_on(pass.calculate_async(&mut async_cells)).unwrap();
    assert_eq!(stats.errors, 0);
    assert_eq!(async_cells[1].value(), Some(&ValueObject::Number(42.0)));

    let mut sync_cells = cells;
    let mut pass = CalculationPass::new(&config);
    let stats = pass.calculate(&mut sync_cells).unwrap();
    assert_eq!(stats.errors, 2);
    assert_eq!(
        pass.runtime().runtime_data().get_cell("book", "s1", 0, 0),
        Some(&CellValue::Error(CellError::GettingData))
    );
}
