//! Proptest generators for property-based testing.

use proptest::prelude::*;

use consent_registry::{AccountName, GrantAttributes, RegistryConfig, Role};

/// Generate a valid account name: 1 to 12 characters, no trailing dot.
pub fn account_name() -> impl Strategy<Value = AccountName> {
    "[a-z1-5]([a-z1-5.]{0,10}[a-z1-5])?".prop_map(|s| {
        AccountName::new(&s).expect("pattern only produces valid names")
    })
}

/// Generate two different account names.
pub fn distinct_pair() -> impl Strategy<Value = (AccountName, AccountName)> {
    (account_name(), account_name()).prop_filter("names must differ", |(a, b)| a != b)
}

/// Generate a Role.
pub fn role() -> impl Strategy<Value = Role> {
    prop_oneof![Just(Role::Generic), Just(Role::Doctor)]
}

/// Generate grant attributes.
pub fn attributes() -> impl Strategy<Value = GrantAttributes> {
    (role(), any::<bool>()).prop_map(|(role, enabled)| GrantAttributes::new(role, enabled))
}

/// Generate a registry configuration covering both revocation policies.
pub fn config() -> impl Strategy<Value = RegistryConfig> {
    prop_oneof![Just(RegistryConfig::default()), Just(RegistryConfig::soft())]
}

#[cfg(test)]
mod tests {
    use super::*;

    proptest! {
        #[test]
        fn test_account_names_round_trip(name in account_name()) {
            let parsed: AccountName = name.to_string().parse().unwrap();
            prop_assert_eq!(parsed, name);
            prop_assert_eq!(AccountName::from_u64(name.value()).unwrap(), name);
        }

        #[test]
        fn test_distinct_pair(pair in distinct_pair()) {
            prop_assert_ne!(pair.0, pair.1);
        }
    }
}
