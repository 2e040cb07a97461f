// src/core/propagation.rs

//! One-level cascade of a second-level domain's policy to its known subdomains.

use crate::core::error::Result;
use crate::core::models::DomainState;
use crate::core::store::StateStore;
use tracing::{debug, info};

/// Whether `child` is a direct subdomain of `parent_domain`, as far as the
/// stored records say.
pub fn is_subdomain_of(parent_domain: &str, parent: &DomainState, child: &DomainState) -> bool {
    parent.is_second_level_domain
        && !child.is_second_level_domain
        && child.parent_domain == parent_domain
}

/// Recomputes `active` on every known subdomain of `parent_domain`.
///
/// Subdomains end up with `parent.active && parent.handle_subdomains`; an
/// activated subdomain also drops its `xssed` flag. Only
/// entries whose stored parent already points at `parent_domain` are touched;
/// nothing is discovered and nothing recurses. The table is persisted once,
/// after all updates. Returns the names of the subdomains visited.
pub async fn propagate(store: &mut StateStore, parent_domain: &str) -> Result<Vec<String>> {
    let parent = store.get_or_create(parent_domain).await?;
    let inherited = parent.active && parent.handle_subdomains;

    let children: Vec<String> = store
        .table()
        .iter()
        .filter(|(_, child)| is_subdomain_of(parent_domain, &parent, child))
        .map(|(name, _)| name.clone())
        .collect();

    for child in &children {
        let updated = store.update_in_place(child, |state| {
            state.active = inherited;
            // Re-activation retires an old finding, as a manual toggle does.
            if inherited {
                state.xssed = false;
            }
        });
        if let Some(state) = updated {
            debug!(
                subdomain = %child,
                parent = %state.parent_domain,
                active = state.active,
                "Subdomain {} automatically.",
                if state.active { "activated" } else { "deactivated" }
            );
        }
    }

    store.persist().await?;
    if !children.is_empty() {
        info!(parent = parent_domain, count = children.len(), active = inherited, "Propagated subdomain policy.");
    }
    Ok(children)
}
