use super::*;
use pretty_assertions::assert_eq;

fn env<'a>(vars: &'a [(&'a str, &'a str)]) -> impl Fn(&str) -> Option<String> + 'a {
    move |name| {
        vars.iter()
            .find(|(key, _)| *key == name)
            .map(|(_, value)| (*value).to_owned())
    }
}

#[test]
fn test_defaults() {
    let config = CoercionConfig::default();
    assert_eq!(config.max_dims, MAX_DIMS);
    assert_eq!(config.ragged, RaggedPolicy::Deprecate);
    assert_eq!(config.validate(), Ok(()));
}

#[test]
fn test_env_overrides() {
    let config = CoercionConfig::with_env(env(&[(MAX_DIMS_VAR, " 3 "), (RAGGED_VAR, "Reject")]));
    assert_eq!(config.max_dims, 3);
    assert_eq!(config.ragged, RaggedPolicy::Reject);
}

#[test]
fn test_invalid_env_values_are_ignored() {
    let config = CoercionConfig::with_env(env(&[(MAX_DIMS_VAR, "64"), (RAGGED_VAR, "sometimes")]));
    assert_eq!(config, CoercionConfig::default());
    let config = CoercionConfig::with_env(env(&[(MAX_DIMS_VAR, "two")]));
    assert_eq!(config.max_dims, MAX_DIMS);
}

#[test]
fn test_validate_rejects_too_many_dims() {
    let config = CoercionConfig::default().with_max_dims(MAX_DIMS + 1);
    assert_eq!(config.validate(), Err(CoerceError::InvalidMaxDims(MAX_DIMS + 1)));
}

#[test]
fn test_policy_round_trips_through_display() {
    for policy in [RaggedPolicy::Deprecate, RaggedPolicy::Reject] {
        assert_eq!(RaggedPolicy::parse(&policy.to_string()), Some(policy));
    }
}

#[test]
fn test_suppressed_warnings_from_env() {
    let config = CoercionConfig::with_env(env(&[(SUPPRESS_VAR, "w3001, E3001,bogus,,W3002")]));
    assert_eq!(config.diagnostics.suppressed, vec![ErrorCode::W3001, ErrorCode::W3002]);
}
