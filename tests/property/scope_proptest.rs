//! Group scope property tests

use proptest::prelude::*;
use recipebook::backend::recipes::Scope;

proptest! {
    #[test]
    fn owners_always_see_their_rows(user in 1i64..100, group in prop::option::of(1i64..5), other_group in prop::option::of(1i64..5)) {
        let scope = Scope { user_id: user, group_id: group };
        prop_assert!(scope.can_see(user, other_group));
    }

    #[test]
    fn ungrouped_users_see_only_their_rows(user in 1i64..100, owner in 1i64..100, owner_group in prop::option::of(1i64..5)) {
        let scope = Scope { user_id: user, group_id: None };
        prop_assert_eq!(scope.can_see(owner, owner_group), owner == user);
    }

    #[test]
    fn group_visibility_is_symmetric(a in 1i64..50, b in 51i64..100, ga in prop::option::of(1i64..4), gb in prop::option::of(1i64..4)) {
        let first = Scope { user_id: a, group_id: ga };
        let second = Scope { user_id: b, group_id: gb };
        prop_assert_eq!(first.can_see(b, gb), second.can_see(a, ga));
    }
}
