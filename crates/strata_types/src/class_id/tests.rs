use super::*;

#[test]
fn builtin_ids_are_below_dynamic_range() {
    for class in ClassId::BUILTINS {
        assert!(class.is_builtin(), "{class:?}");
        assert!(class.name().is_some(), "{class:?} has no name");
    }
    assert!(!ClassId::from_raw(ClassId::FIRST_DYNAMIC).is_builtin());
}

#[test]
fn builtin_names_are_unique() {
    let mut names: Vec<&str> = ClassId::BUILTINS.iter().filter_map(|c| c.name()).collect();
    names.sort_unstable();
    names.dedup();
    assert_eq!(names.len(), ClassId::BUILTINS.len());
}

#[test]
fn display_falls_back_for_dynamic_classes() {
    assert_eq!(ClassId::FLOAT64.to_string(), "float64");
    assert_eq!(ClassId::from_raw(70).to_string(), "class#70");
    assert_eq!(format!("{:?}", ClassId::OBJECT), "ClassId(object)");
}
