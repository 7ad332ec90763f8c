//! Column references inside a predicate expression.
//!
//! Traversal is a depth-first, pre-order walk over the direct children of
//! each node in source order. Every expression kind is matched explicitly.
//! Subqueries are not entered.

use std::fmt;

use serde::Serialize;
use sqlparser::ast::{Expr, Function, FunctionArg, FunctionArgExpr, ListAggOnOverflow, WindowType};

/// A column identifier exactly as written in the predicate, qualifier included.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct ColumnRef(String);

impl ColumnRef {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ColumnRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Every column reference in `predicate`, in pre-order, duplicates kept.
///
/// An absent predicate yields no columns.
pub fn extract(predicate: Option<&Expr>) -> Vec<ColumnRef> {
    predicate
        .map(|expr| fold_columns(expr, Vec::new()))
        .unwrap_or_default()
}

/// First column in pre-order for which `indexed` holds, stopping there.
pub fn first_indexed_column<F>(predicate: Option<&Expr>, indexed: F) -> Option<ColumnRef>
where
    F: Fn(&str) -> bool,
{
    predicate.and_then(|expr| find_column(expr, &indexed))
}

fn fold_columns(expr: &Expr, acc: Vec<ColumnRef>) -> Vec<ColumnRef> {
    match step(expr) {
        Step::Columns(columns) => {
            let mut acc = acc;
            acc.extend(columns);
            acc
        }
        Step::Descend(children) => children
            .into_iter()
            .fold(acc, |acc, child| fold_columns(child, acc)),
    }
}

fn find_column<F>(expr: &Expr, indexed: &F) -> Option<ColumnRef>
where
    F: Fn(&str) -> bool,
{
    match step(expr) {
        Step::Columns(columns) => columns
            .into_iter()
            .find(|column| indexed(column.as_str())),
        Step::Descend(children) => children
            .into_iter()
            .find_map(|child| find_column(child, indexed)),
    }
}

/// What one node contributes to the walk.
enum Step<'a> {
    /// Column leaves, in source order.
    Columns(Vec<ColumnRef>),
    /// Direct subexpressions, in the order they appear in SQL text.
    Descend(Vec<&'a Expr>),
}

fn step(expr: &Expr) -> Step<'_> {
    use Step::{Columns, Descend};

    match expr {
        Expr::Identifier(_) | Expr::CompoundIdentifier(_) => {
            Columns(vec![ColumnRef(expr.to_string())])
        }
        Expr::MatchAgainst { columns, .. } => Columns(
            columns
                .iter()
                .map(|ident| ColumnRef(ident.to_string()))
                .collect(),
        ),

        Expr::BinaryOp { left, right, .. }
        | Expr::AnyOp { left, right, .. }
        | Expr::AllOp { left, right, .. }
        | Expr::JsonAccess { left, right, .. }
        | Expr::IsDistinctFrom(left, right)
        | Expr::IsNotDistinctFrom(left, right) => Descend(vec![&**left, &**right]),
        Expr::UnaryOp { expr, .. }
        | Expr::Nested(expr)
        | Expr::IsNull(expr)
        | Expr::IsNotNull(expr)
        | Expr::IsTrue(expr)
        | Expr::IsNotTrue(expr)
        | Expr::IsFalse(expr)
        | Expr::IsNotFalse(expr)
        | Expr::IsUnknown(expr)
        | Expr::IsNotUnknown(expr)
        | Expr::Cast { expr, .. }
        | Expr::TryCast { expr, .. }
        | Expr::SafeCast { expr, .. }
        | Expr::Convert { expr, .. }
        | Expr::Collate { expr, .. }
        | Expr::Extract { expr, .. }
        | Expr::Ceil { expr, .. }
        | Expr::Floor { expr, .. }
        | Expr::CompositeAccess { expr, .. }
        | Expr::Named { expr, .. }
        | Expr::AtTimeZone {
            timestamp: expr, ..
        }
        | Expr::InSubquery { expr, .. } => Descend(vec![&**expr]),
        Expr::Interval(interval) => Descend(vec![&*interval.value]),
        Expr::InList { expr, list, .. } => Descend(leading(expr, list)),
        Expr::MapAccess { column, keys } => Descend(leading(column, keys)),
        Expr::ArrayIndex { obj, indexes } => Descend(leading(obj, indexes)),
        Expr::InUnnest {
            expr, array_expr, ..
        } => Descend(vec![&**expr, &**array_expr]),
        Expr::Between {
            expr, low, high, ..
        } => Descend(vec![&**expr, &**low, &**high]),
        Expr::Like { expr, pattern, .. }
        | Expr::ILike { expr, pattern, .. }
        | Expr::SimilarTo { expr, pattern, .. }
        | Expr::RLike { expr, pattern, .. } => Descend(vec![&**expr, &**pattern]),
        Expr::Position { expr, r#in } => Descend(vec![&**expr, &**r#in]),
        Expr::AggregateExpressionWithFilter { expr, filter } => {
            Descend(vec![&**expr, &**filter])
        }
        Expr::Substring {
            expr,
            substring_from,
            substring_for,
            ..
        } => Descend(
            std::iter::once(expr)
                .chain(substring_from)
                .chain(substring_for)
                .map(|e| &**e)
                .collect(),
        ),
        Expr::Trim {
            expr,
            trim_what,
            trim_characters,
            ..
        } => {
            let mut out: Vec<&Expr> = trim_what.iter().map(|e| &**e).collect();
            out.push(&**expr);
            out.extend(trim_characters.iter().flatten());
            Descend(out)
        }
        Expr::Overlay {
            expr,
            overlay_what,
            overlay_from,
            overlay_for,
        } => {
            let mut out = vec![&**expr, &**overlay_what, &**overlay_from];
            out.extend(overlay_for.iter().map(|e| &**e));
            Descend(out)
        }
        Expr::Function(func) => Descend(function_children(func)),
        Expr::ListAgg(agg) => {
            let mut out = vec![&*agg.expr];
            out.extend(agg.separator.iter().map(|e| &**e));
            if let Some(ListAggOnOverflow::Truncate {
                filler: Some(filler),
                ..
            }) = &agg.on_overflow
            {
                out.push(&**filler);
            }
            out.extend(agg.within_group.iter().map(|order| &order.expr));
            Descend(out)
        }
        Expr::ArrayAgg(agg) => {
            let mut out = vec![&*agg.expr];
            out.extend(agg.order_by.iter().flatten().map(|order| &order.expr));
            out.extend(agg.limit.iter().map(|e| &**e));
            Descend(out)
        }
        Expr::Case {
            operand,
            conditions,
            results,
            else_result,
        } => {
            let mut out: Vec<&Expr> = operand.iter().map(|e| &**e).collect();
            for (condition, result) in conditions.iter().zip(results) {
                out.push(condition);
                out.push(result);
            }
            out.extend(else_result.iter().map(|e| &**e));
            Descend(out)
        }
        Expr::Tuple(items) | Expr::Struct { values: items, .. } => Descend(items.iter().collect()),
        Expr::Array(array) => Descend(array.elem.iter().collect()),
        Expr::GroupingSets(sets) | Expr::Cube(sets) | Expr::Rollup(sets) => {
            Descend(sets.iter().flatten().collect())
        }

        // Subquery bodies are separate statements.
        Expr::Exists { .. } | Expr::Subquery(_) | Expr::ArraySubquery(_) => Descend(Vec::new()),
        Expr::Value(_)
        | Expr::IntroducedString { .. }
        | Expr::TypedString { .. }
        | Expr::Wildcard
        | Expr::QualifiedWildcard(_) => Descend(Vec::new()),
    }
}

fn leading<'a>(first: &'a Expr, rest: &'a [Expr]) -> Vec<&'a Expr> {
    std::iter::once(first).chain(rest).collect()
}

/// Arguments, then `FILTER`, then the window's partition and order keys.
fn function_children(func: &Function) -> Vec<&Expr> {
    let mut out: Vec<&Expr> = func
        .args
        .iter()
        .filter_map(|arg| match arg {
            FunctionArg::Named {
                arg: FunctionArgExpr::Expr(expr),
                ..
            }
            | FunctionArg::Unnamed(FunctionArgExpr::Expr(expr)) => Some(expr),
            _ => None,
        })
        .collect();
    out.extend(func.order_by.iter().map(|order| &order.expr));
    out.extend(func.filter.iter().map(|e| &**e));
    if let Some(WindowType::WindowSpec(spec)) = &func.over {
        out.extend(&spec.partition_by);
        out.extend(spec.order_by.iter().map(|order| &order.expr));
    }
    out
}
