use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::money::{share_bps, BasisPoints, Cents};

/// One group of a ranked share-of-total breakdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DimensionBreakdown {
    pub key: String,
    pub amount: Cents,
    pub count: i64,
    /// Share of the grand total in basis points; shares of a breakdown sum
    /// to 10000 within (n-1) points because each group rounds independently
    pub share: BasisPoints,
}

/// Group rows by a dimension, sum amounts per group, and rank descending
/// by amount.
///
/// Groups keep their first-encountered order through an explicit
/// insertion-ordered vector, and the final ranking uses a stable sort, so
/// equal amounts tie-break deterministically instead of inheriting map
/// iteration order.
pub fn breakdown_by<T, K, A>(rows: &[T], key_fn: K, amount_fn: A) -> Vec<DimensionBreakdown>
where
    K: Fn(&T) -> String,
    A: Fn(&T) -> Cents,
{
    let mut groups: Vec<DimensionBreakdown> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for row in rows {
        let key = key_fn(row);
        let amount = amount_fn(row);
        match index.get(&key) {
            Some(&position) => {
                groups[position].amount += amount;
                groups[position].count += 1;
            }
            None => {
                index.insert(key.clone(), groups.len());
                groups.push(DimensionBreakdown {
                    key,
                    amount,
                    count: 1,
                    share: 0,
                });
            }
        }
    }

    let total: Cents = groups.iter().map(|group| group.amount).sum();
    for group in &mut groups {
        group.share = share_bps(group.amount, total);
    }

    groups.sort_by(|a, b| b.amount.cmp(&a.amount));
    groups
}
