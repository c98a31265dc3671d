//! Conflict resolution among matching candidates
//!
//! The strategy comes from the resolver of the highest-priority candidate (ties
//! go to definition order). Without any resolver the strategy is first-match.

use super::graph::EffectivePermission;
use super::types::{Effect, PermissionResolver, ResolutionStrategy};
use std::collections::HashMap;

/// Outcome of resolving a non-empty candidate list
#[derive(Debug, Clone)]
pub struct Resolution<'a> {
    pub winner: &'a EffectivePermission,
    pub strategy: ResolutionStrategy,
    pub trace: Vec<String>,
}

/// Follow `inherit_from` until a concrete strategy appears
fn strategy_of(
    resolver: &PermissionResolver,
    resolvers: &HashMap<String, PermissionResolver>,
) -> Option<ResolutionStrategy> {
    let mut seen: Vec<&str> = Vec::new();
    let mut pending: Vec<&PermissionResolver> = vec![resolver];

    while let Some(current) = pending.pop() {
        if let Some(strategy) = current.strategy {
            return Some(strategy);
        }
        for id in current.inherit_from.iter().rev() {
            if seen.contains(&id.as_str()) {
                continue;
            }
            seen.push(id.as_str());
            if let Some(parent) = resolvers.get(id) {
                pending.push(parent);
            }
        }
    }
    None
}

/// The candidate whose resolver governs the decision
fn governing<'a>(candidates: &[&'a EffectivePermission]) -> Option<&'a EffectivePermission> {
    candidates
        .iter()
        .copied()
        .filter(|c| c.resolver().is_some())
        .fold(None, |best: Option<&EffectivePermission>, c| match best {
            Some(b) if b.priority() >= c.priority() => Some(b),
            _ => Some(c),
        })
}

pub fn resolve<'a>(
    candidates: &[&'a EffectivePermission],
    resolvers: &HashMap<String, PermissionResolver>,
) -> Option<Resolution<'a>> {
    if candidates.is_empty() {
        return None;
    }

    let mut trace = Vec::new();

    let overriding: Vec<&EffectivePermission> = candidates
        .iter()
        .copied()
        .filter(|c| c.resolver().is_some_and(|r| r.override_others))
        .collect();
    let pool: Vec<&EffectivePermission> = if overriding.is_empty() {
        candidates.to_vec()
    } else {
        trace.push(format!(
            "{} overriding candidate(s) shadow {} other(s)",
            overriding.len(),
            candidates.len() - overriding.len()
        ));
        overriding
    };

    let governor = governing(&pool);
    let strategy = governor
        .and_then(|g| g.resolver())
        .and_then(|r| strategy_of(r, resolvers))
        .unwrap_or_default();
    let fallback = governor
        .and_then(|g| g.resolver())
        .and_then(|r| r.fallback)
        .unwrap_or_default();

    match governor {
        Some(g) => trace.push(format!(
            "strategy {} from {} (priority {})",
            strategy,
            g.source,
            g.priority()
        )),
        None => trace.push(format!("strategy {} (default)", strategy)),
    }

    let winner = apply(strategy, fallback, &pool, &mut trace)?;
    trace.push(format!(
        "winner {} ({:?}, scope {:?})",
        winner.permission.id, winner.permission.effect, winner.permission.scope
    ));

    Some(Resolution {
        winner,
        strategy,
        trace,
    })
}

fn apply<'a>(
    strategy: ResolutionStrategy,
    fallback: ResolutionStrategy,
    pool: &[&'a EffectivePermission],
    trace: &mut Vec<String>,
) -> Option<&'a EffectivePermission> {
    match strategy {
        ResolutionStrategy::FirstMatch => first_in_order(pool),
        ResolutionStrategy::Cumulative => cumulative(pool),
        ResolutionStrategy::MostSpecific => {
            let narrowest = pool.iter().map(|c| c.permission.scope.specificity()).min()?;
            let tied = keep(pool, |c| c.permission.scope.specificity() == narrowest);
            let top = tied.iter().map(|c| c.priority()).max()?;
            let tied = keep(&tied, |c| c.priority() == top);
            break_tie(strategy, fallback, tied, trace)
        }
        ResolutionStrategy::PriorityBased => {
            let top = pool.iter().map(|c| c.priority()).max()?;
            let tied = keep(pool, |c| c.priority() == top);
            let narrowest = tied.iter().map(|c| c.permission.scope.specificity()).min()?;
            let tied = keep(&tied, |c| c.permission.scope.specificity() == narrowest);
            break_tie(strategy, fallback, tied, trace)
        }
    }
}

fn keep<'a, F>(pool: &[&'a EffectivePermission], pred: F) -> Vec<&'a EffectivePermission>
where
    F: Fn(&EffectivePermission) -> bool,
{
    pool.iter().copied().filter(|c| pred(c)).collect()
}

fn break_tie<'a>(
    strategy: ResolutionStrategy,
    fallback: ResolutionStrategy,
    tied: Vec<&'a EffectivePermission>,
    trace: &mut Vec<String>,
) -> Option<&'a EffectivePermission> {
    if tied.len() <= 1 {
        return tied.first().copied();
    }

    trace.push(format!("{} candidates tied under {}", tied.len(), strategy));
    match fallback {
        // Ordering already exhausted, so these collapse to definition order
        ResolutionStrategy::MostSpecific
        | ResolutionStrategy::PriorityBased
        | ResolutionStrategy::FirstMatch => first_in_order(&tied),
        ResolutionStrategy::Cumulative => {
            trace.push("fallback cumulative".to_string());
            cumulative(&tied)
        }
    }
}

fn first_in_order<'a>(pool: &[&'a EffectivePermission]) -> Option<&'a EffectivePermission> {
    pool.iter().copied().min_by_key(|c| c.order)
}

/// Deny overrides allow
fn cumulative<'a>(pool: &[&'a EffectivePermission]) -> Option<&'a EffectivePermission> {
    let denies = keep(pool, |c| c.permission.effect == Effect::Deny);
    if denies.is_empty() {
        first_in_order(pool)
    } else {
        first_in_order(&denies)
    }
}
