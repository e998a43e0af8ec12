// ABOUTME: Integration tests for type-safe identifiers and validated types.
// ABOUTME: Tests parsing, validation, and type safety properties.

use storefleet::types::*;

mod store_name_tests {
    use super::*;

    #[test]
    fn valid_names() {
        for name in ["shop", "shop-1", "my-big-store", "abc", "a1b2c3"] {
            assert!(StoreName::new(name).is_ok(), "{name} should be valid");
        }
    }

    #[test]
    fn length_bounds() {
        assert_eq!(StoreName::new(""), Err(StoreNameError::Empty));
        assert_eq!(StoreName::new("ab"), Err(StoreNameError::TooShort));
        assert!(StoreName::new(&"a".repeat(MAX_NAME_LEN)).is_ok());
        assert_eq!(
            StoreName::new(&"a".repeat(MAX_NAME_LEN + 1)),
            Err(StoreNameError::TooLong)
        );
    }

    #[test]
    fn hyphen_placement() {
        assert_eq!(
            StoreName::new("-shop"),
            Err(StoreNameError::StartsWithHyphen)
        );
        assert_eq!(StoreName::new("shop-"), Err(StoreNameError::EndsWithHyphen));
    }

    #[test]
    fn rejects_uppercase_and_symbols() {
        assert_eq!(StoreName::new("Shop"), Err(StoreNameError::NotLowercase));
        assert_eq!(
            StoreName::new("my_shop"),
            Err(StoreNameError::InvalidChar('_'))
        );
        assert_eq!(
            StoreName::new("my.shop"),
            Err(StoreNameError::InvalidChar('.'))
        );
        assert!(StoreName::new("shöp").is_err());
    }

    #[test]
    fn deserialize_validates() {
        let ok: StoreName = serde_json::from_str("\"shop-1\"").unwrap();
        assert_eq!(ok.as_str(), "shop-1");
        assert!(serde_json::from_str::<StoreName>("\"Bad Name\"").is_err());
    }

    #[test]
    fn serializes_as_plain_string() {
        let name = StoreName::new("shop-1").unwrap();
        assert_eq!(serde_json::to_string(&name).unwrap(), "\"shop-1\"");
    }
}

mod store_name_properties {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn well_formed_slugs_are_accepted(name in "[a-z0-9][a-z0-9-]{1,48}[a-z0-9]") {
            let parsed = StoreName::new(&name).unwrap();
            prop_assert_eq!(parsed.as_str(), name.as_str());
        }

        #[test]
        fn accepted_names_are_dns_safe(name in "\\PC{0,60}") {
            if let Ok(parsed) = StoreName::new(&name) {
                let s = parsed.as_str();
                prop_assert!(s.len() >= MIN_NAME_LEN && s.len() <= MAX_NAME_LEN);
                prop_assert!(!s.starts_with('-') && !s.ends_with('-'));
                prop_assert!(s.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-'));
            }
        }

        #[test]
        fn uppercase_is_never_accepted(name in "[a-z]{1,10}[A-Z][a-z]{1,10}") {
            prop_assert!(StoreName::new(&name).is_err());
        }
    }
}

mod engine_tests {
    use super::*;

    #[test]
    fn engines_parse_and_display() {
        for engine in [StoreEngine::WooCommerce, StoreEngine::Medusa] {
            assert_eq!(engine.to_string().parse::<StoreEngine>().unwrap(), engine);
        }
        assert!("magento".parse::<StoreEngine>().is_err());
    }

    #[test]
    fn engine_serde_uses_lowercase_names() {
        assert_eq!(
            serde_json::to_string(&StoreEngine::WooCommerce).unwrap(),
            "\"woocommerce\""
        );
        let medusa: StoreEngine = serde_json::from_str("\"medusa\"").unwrap();
        assert_eq!(medusa, StoreEngine::Medusa);
    }

    #[test]
    fn plans_parse_and_default_to_basic() {
        assert_eq!(StorePlan::default(), StorePlan::Basic);
        assert_eq!("standard".parse::<StorePlan>().unwrap(), StorePlan::Standard);
        let err = "gold".parse::<StorePlan>().unwrap_err();
        assert!(err.to_string().contains("unknown plan 'gold'"));
    }

    #[test]
    fn woocommerce_profile_names_its_workload() {
        let profile = StoreEngine::WooCommerce.profile().unwrap();
        let name = StoreName::new("demo-shop").unwrap();
        assert_eq!(profile.workload_name(&name), "store-demo-shop-wordpress");
        assert_eq!(profile.admin_path, "/wp-admin");
    }
}

mod id_tests {
    use super::*;

    #[test]
    fn generated_ids_are_unique() {
        let a = StoreId::generate();
        let b = StoreId::generate();
        assert_ne!(a, b);
        assert_eq!(a.as_str().len(), 36);
    }

    #[test]
    fn ids_round_trip_through_json_as_strings() {
        let id = JobId::new("job-123");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"job-123\"");
        let back: JobId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn parsing_trims_whitespace() {
        let id: StoreId = " abc ".parse().unwrap();
        assert_eq!(id.as_str(), "abc");
        assert_eq!(id.to_string(), "abc");
        assert_eq!(id.into_inner(), "abc");
    }
}
