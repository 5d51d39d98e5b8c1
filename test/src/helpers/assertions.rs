/// Assert that a top-level element is present in the tree with the given
/// operation kind
#[macro_export]
macro_rules! assert_top_level {
    ($tree:expr, $entity:expr, $operation:expr) => {
        match $tree.get(&$entity) {
            Some(element) => assert_eq!(
                element.operation_kind, $operation,
                "Element {:?} has operation {:?}, expected {:?}",
                $entity, element.operation_kind, $operation
            ),
            None => panic!("Element {:?} is missing from the tree", $entity),
        }
    };
}

/// Assert that an entity is not a top-level element of the tree
#[macro_export]
macro_rules! assert_not_top_level {
    ($tree:expr, $entity:expr) => {
        assert!(
            !$tree.contains(&$entity),
            "Element {:?} should not be a top-level element of the tree",
            $entity
        );
    };
}
