use crate::value::Value;
use std::cmp::Ordering;

/// Stable cross-variant rank. Numbers of every width share one rank so they
/// compare by magnitude.
#[must_use]
const fn canonical_rank(value: &Value) -> u8 {
    match value {
        Value::Null => 0,
        Value::Int32(_) | Value::Int64(_) | Value::Double(_) => 1,
        Value::Text(_) => 2,
        Value::Document(_) => 3,
        Value::List(_) => 4,
        Value::Binary(_) => 5,
        Value::ObjectId(_) => 6,
        Value::Bool(_) => 7,
        Value::Date(_) => 8,
        Value::Ref(_) => 9,
    }
}

/// Total canonical comparator used by sort specifications and filters.
///
/// Ordering rules:
/// 1. Canonical variant rank
/// 2. Variant-specific comparison for same-ranked values
#[must_use]
pub fn canonical_cmp(left: &Value, right: &Value) -> Ordering {
    let rank = canonical_rank(left).cmp(&canonical_rank(right));
    if rank != Ordering::Equal {
        return rank;
    }

    canonical_cmp_same_rank(left, right)
}

fn canonical_cmp_same_rank(left: &Value, right: &Value) -> Ordering {
    #[allow(clippy::match_same_arms)]
    match (left, right) {
        (Value::Null, Value::Null) => Ordering::Equal,
        (Value::Int32(a), Value::Int32(b)) => a.cmp(b),
        (Value::Int32(a), Value::Int64(b)) => i64::from(*a).cmp(b),
        (Value::Int64(a), Value::Int32(b)) => a.cmp(&i64::from(*b)),
        (Value::Int64(a), Value::Int64(b)) => a.cmp(b),
        (Value::Text(a), Value::Text(b)) => a.cmp(b),
        (Value::Document(a), Value::Document(b)) => cmp_documents(a.entries(), b.entries()),
        (Value::List(a), Value::List(b)) => cmp_lists(a, b),
        (Value::Binary(a), Value::Binary(b)) => a.cmp(b),
        (Value::ObjectId(a), Value::ObjectId(b)) => a.cmp(b),
        (Value::Bool(a), Value::Bool(b)) => a.cmp(b),
        (Value::Date(a), Value::Date(b)) => a.cmp(b),
        (Value::Ref(a), Value::Ref(b)) => a
            .collection
            .cmp(&b.collection)
            .then_with(|| canonical_cmp(&a.id, &b.id)),
        (a, b) => match (a.as_f64(), b.as_f64()) {
            (Some(x), Some(y)) => x.total_cmp(&y),
            _ => Ordering::Equal,
        },
    }
}

fn cmp_lists(left: &[Value], right: &[Value]) -> Ordering {
    for (l, r) in left.iter().zip(right) {
        let cmp = canonical_cmp(l, r);
        if cmp != Ordering::Equal {
            return cmp;
        }
    }

    left.len().cmp(&right.len())
}

fn cmp_documents(left: &[(String, Value)], right: &[(String, Value)]) -> Ordering {
    for ((lk, lv), (rk, rv)) in left.iter().zip(right) {
        let cmp = lk.cmp(rk).then_with(|| canonical_cmp(lv, rv));
        if cmp != Ordering::Equal {
            return cmp;
        }
    }

    left.len().cmp(&right.len())
}
