// ABOUTME: Deterministic names and URLs derived from a store's identity.
// ABOUTME: Namespace and release share one name so teardown never needs a lookup.

use crate::types::{EngineProfile, StoreId, StoreName};

/// Namespace and release name of a store.
pub fn release_name(id: &StoreId) -> String {
    format!("store-{id}")
}

/// Public host of a store under `base_domain`.
pub fn storefront_host(name: &StoreName, id: &StoreId, base_domain: &str) -> String {
    format!("{name}-{id}.{base_domain}")
}

pub fn storefront_url(host: &str) -> String {
    format!("https://{host}")
}

pub fn admin_url(host: &str, profile: &EngineProfile) -> String {
    format!("https://{host}{}", profile.admin_path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::StoreEngine;

    #[test]
    fn names_follow_the_store_identity() {
        let id = StoreId::new("abc123");
        let name = StoreName::new("shop-1").unwrap();
        let profile = StoreEngine::WooCommerce.profile().unwrap();

        assert_eq!(release_name(&id), "store-abc123");

        let host = storefront_host(&name, &id, "example.test");
        assert_eq!(host, "shop-1-abc123.example.test");
        assert_eq!(storefront_url(&host), "https://shop-1-abc123.example.test");
        assert_eq!(
            admin_url(&host, &profile),
            "https://shop-1-abc123.example.test/wp-admin"
        );
    }
}
