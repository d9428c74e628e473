use oasval_core::{
    validate_instance, Error, FormatSet, MemoryLoader, ResolveError, ValidationOutcome, Violation,
};
use serde_json::{json, Value};
use url::Url;

fn base() -> Url {
    Url::parse("https://schemas.example.com/root.json").unwrap()
}

fn check(schema: Value, instance: Value) -> Vec<Violation> {
    check_with(schema, instance, FormatSet::v30())
}

fn check_with(schema: Value, instance: Value, formats: FormatSet) -> Vec<Violation> {
    let loader = MemoryLoader::new();
    validate_instance(&instance, &schema, &base(), &loader, formats)
        .unwrap()
        .violations()
        .to_vec()
}

fn paths(violations: &[Violation]) -> Vec<String> {
    violations.iter().map(|v| v.path.to_pointer()).collect()
}

fn node_schema() -> Value {
    json!({
        "$ref": "#/definitions/Node",
        "definitions": {
            "Node": {
                "type": "object",
                "required": ["name"],
                "properties": {
                    "name": {"type": "string"},
                    "children": {"type": "array", "items": {"$ref": "#/definitions/Node"}}
                }
            }
        }
    })
}

#[test]
fn recursive_schema_accepts_finite_nesting() {
    let doc = json!({
        "name": "root",
        "children": [
            {"name": "a", "children": [{"name": "a1", "children": [{"name": "a11"}]}]},
            {"name": "b"}
        ]
    });
    assert!(check(node_schema(), doc).is_empty());
}

#[test]
fn recursive_schema_reports_missing_field_at_depth_three() {
    let doc = json!({
        "name": "root",
        "children": [{"name": "a", "children": [{"name": "a1", "children": [{"children": []}]}]}]
    });
    let violations = check(node_schema(), doc);
    assert_eq!(violations.len(), 1, "{violations:?}");
    assert_eq!(violations[0].path.to_pointer(), "/children/0/children/0/children/0");
    assert_eq!(violations[0].message, "'name' is a required property");
    assert_eq!(
        violations[0].schema_path.to_pointer(),
        "/$ref/properties/children/items/$ref/properties/children/items/$ref/properties/children/items/$ref/required"
    );
}

#[test]
fn circular_root_reference_is_a_setup_error() {
    let schema = json!({
        "$ref": "#/definitions/A",
        "definitions": {"A": {"$ref": "#/definitions/B"}, "B": {"$ref": "#/definitions/A"}}
    });
    let loader = MemoryLoader::new();
    let err = validate_instance(&json!({}), &schema, &base(), &loader, FormatSet::v30()).unwrap_err();
    assert!(
        matches!(err, Error::Setup(ResolveError::CircularReference { .. })),
        "{err}"
    );
}

#[test]
fn circular_reference_below_the_root_is_a_violation() {
    let schema = json!({
        "properties": {"x": {"$ref": "#/definitions/A"}, "y": {"type": "string"}},
        "definitions": {"A": {"$ref": "#/definitions/B"}, "B": {"$ref": "#/definitions/A"}}
    });
    let violations = check(schema, json!({"x": 1, "y": 2}));
    assert_eq!(paths(&violations), ["/x", "/y"]);
    assert!(matches!(
        violations[0].reference_error,
        Some(ResolveError::CircularReference { .. })
    ));
    assert_eq!(violations[1].keyword, "type");
}

#[test]
fn reference_loop_without_progress_is_bounded() {
    let schema = json!({
        "$ref": "#/definitions/Loop",
        "definitions": {"Loop": {"allOf": [{"$ref": "#/definitions/Loop"}]}}
    });
    let violations = check(schema, json!({}));
    assert_eq!(violations.len(), 1);
    assert!(matches!(
        violations[0].reference_error,
        Some(ResolveError::CircularReference { .. })
    ));
}

#[test]
fn one_of_ambiguity_is_a_single_violation() {
    let schema = json!({
        "oneOf": [
            {"type": "object", "properties": {"a": {"type": "string"}}},
            {"type": "object", "required": ["a"]}
        ]
    });
    let violations = check(schema, json!({"a": "x"}));
    assert_eq!(violations.len(), 1, "{violations:?}");
    assert_eq!(violations[0].keyword, "oneOf");
    assert!(violations[0].message.contains("#0, #1"), "{}", violations[0].message);
    assert!(violations[0].causes.is_empty());
}

#[test]
fn one_of_without_match_attaches_branch_failures() {
    let schema = json!({"oneOf": [{"type": "string"}, {"type": "integer"}]});
    let violations = check(schema.clone(), json!(true));
    assert_eq!(violations.len(), 1);
    assert_eq!(violations[0].causes.len(), 2);
    assert_eq!(violations[0].causes[1].schema_path.to_pointer(), "/oneOf/1/type");

    assert!(check(schema, json!(3)).is_empty());
}

#[test]
fn any_of_attaches_every_branch_failure() {
    let schema = json!({"anyOf": [{"minLength": 5}, {"pattern": "^a"}]});
    assert!(check(schema.clone(), json!("abc")).is_empty());

    let violations = check(schema, json!("xyz"));
    assert_eq!(violations.len(), 1);
    let keywords: Vec<_> = violations[0].causes.iter().map(|c| c.keyword.as_str()).collect();
    assert_eq!(keywords, ["minLength", "pattern"]);
}

#[test]
fn all_of_merges_violations_and_not_inverts() {
    let schema = json!({"allOf": [{"minimum": 10}, {"multipleOf": 3}], "not": {"type": "integer"}});
    let violations = check(schema, json!(4));
    let keywords: Vec<_> = violations.iter().map(|v| v.keyword.as_str()).collect();
    assert_eq!(keywords, ["minimum", "multipleOf", "not"]);
}

#[test]
fn sibling_violations_are_all_reported() {
    let schema = json!({
        "type": "object",
        "properties": {
            "a": {"type": "object", "required": ["id"]},
            "b": {"type": "object", "required": ["id"]}
        }
    });
    let violations = check(schema, json!({"a": {}, "b": {}}));
    assert_eq!(paths(&violations), ["/a", "/b"]);
}

#[test]
fn properties_patterns_and_additional_properties_combine() {
    let schema = json!({
        "properties": {"x-fixed": {"type": "string"}},
        "patternProperties": {"^x-": {"minLength": 3}},
        "additionalProperties": false
    });
    // `x-fixed` is checked by both; `other` only by additionalProperties.
    let violations = check(schema, json!({"x-fixed": "a", "x-free": "abc", "other": 1}));
    let summary: Vec<_> = violations
        .iter()
        .map(|v| (v.path.to_pointer(), v.keyword.clone()))
        .collect();
    assert_eq!(
        summary,
        [
            ("/x-fixed".to_string(), "minLength".to_string()),
            (String::new(), "additionalProperties".to_string()),
        ]
    );
    assert_eq!(violations[1].message, "additional property 'other' is not allowed");
}

#[test]
fn additional_properties_schema_applies_to_unmatched_keys() {
    let schema = json!({"properties": {"a": {}}, "additionalProperties": {"type": "integer"}});
    let violations = check(schema, json!({"a": "x", "b": 1, "c": "y"}));
    assert_eq!(paths(&violations), ["/c"]);
}

#[test]
fn type_checks_distinguish_integer_from_number() {
    assert!(check(json!({"type": "integer"}), json!(3)).is_empty());
    assert!(check(json!({"type": "integer"}), json!(3.0)).is_empty());
    assert_eq!(check(json!({"type": "integer"}), json!(3.5)).len(), 1);
    assert!(check(json!({"type": "number"}), json!(3.5)).is_empty());
    assert!(check(json!({"type": ["string", "null"]}), json!(null)).is_empty());

    let violations = check(json!({"type": "string"}), json!(12));
    assert_eq!(violations[0].message, "12 is not of type 'string'");
}

#[test]
fn string_length_counts_characters() {
    let schema = json!({"minLength": 2, "maxLength": 3});
    assert!(check(schema.clone(), json!("héé")).is_empty());
    assert!(check(schema.clone(), json!("日本")).is_empty());
    assert_eq!(check(schema, json!("日本語!")).len(), 1);
}

#[test]
fn numeric_bounds_and_multiples() {
    let schema = json!({"minimum": 0, "maximum": 1, "exclusiveMaximum": true});
    assert!(check(schema.clone(), json!(0)).is_empty());
    assert_eq!(check(schema.clone(), json!(1)).len(), 1);
    assert_eq!(check(schema, json!(-0.5)).len(), 1);

    assert!(check(json!({"multipleOf": 0.1}), json!(0.3)).is_empty());
    assert!(check(json!({"multipleOf": 0.01}), json!(19.99)).is_empty());
    assert_eq!(check(json!({"multipleOf": 2}), json!(7)).len(), 1);
}

#[test]
fn array_keywords() {
    let schema = json!({"items": {"type": "integer"}, "minItems": 1, "maxItems": 3, "uniqueItems": true});
    assert!(check(schema.clone(), json!([1, 2, 3])).is_empty());

    let violations = check(schema, json!(["a", 1, 1.0, 2]));
    let keywords: Vec<_> = violations.iter().map(|v| v.keyword.as_str()).collect();
    assert_eq!(keywords, ["type", "maxItems", "uniqueItems"]);
    assert_eq!(violations[0].path.to_pointer(), "/0");

    let positional = json!({"items": [{"type": "string"}], "additionalItems": false});
    assert!(check(positional.clone(), json!(["a"])).is_empty());
    assert_eq!(check(positional, json!(["a", "b"]))[0].keyword, "additionalItems");
}

#[test]
fn enum_compares_structurally() {
    let schema = json!({"enum": [1, "two", {"three": [3]}]});
    assert!(check(schema.clone(), json!(1.0)).is_empty());
    assert!(check(schema.clone(), json!({"three": [3]})).is_empty());
    assert_eq!(check(schema, json!("one")).len(), 1);
}

#[test]
fn dependencies_in_both_forms() {
    let schema = json!({
        "dependencies": {
            "bearer": ["scheme"],
            "flow": {"required": ["tokenUrl"]}
        }
    });
    assert!(check(schema.clone(), json!({"name": 1})).is_empty());
    let violations = check(schema, json!({"bearer": 1, "flow": "implicit"}));
    let keywords: Vec<_> = violations.iter().map(|v| v.keyword.as_str()).collect();
    assert_eq!(keywords, ["dependencies", "required"]);
}

#[test]
fn formats_follow_the_dialect() {
    let schema = json!({"format": "uuid"});
    assert_eq!(check_with(schema.clone(), json!("nope"), FormatSet::v30()).len(), 1);
    assert!(check_with(schema, json!("nope"), FormatSet::v2()).is_empty());

    assert!(check(json!({"format": "no-such-format"}), json!("anything")).is_empty());
    assert_eq!(check(json!({"format": "date-time"}), json!("yesterday")).len(), 1);
    assert!(check(json!({"format": "date-time"}), json!(5)).is_empty());
}

#[test]
fn malformed_schema_nodes_are_violations() {
    let violations = check(json!({"required": "name", "minLength": -1}), json!({}));
    let keywords: Vec<_> = violations.iter().map(|v| v.keyword.as_str()).collect();
    assert_eq!(keywords, ["required"]);
    assert!(violations[0].message.starts_with("invalid schema"));

    let violations = check(json!({"minLength": -1}), json!("abc"));
    assert_eq!(violations.len(), 1);
    assert!(violations[0].message.starts_with("invalid schema"));

    let violations = check(json!({"pattern": "(unclosed"}), json!("abc"));
    assert_eq!(violations.len(), 1);
    assert_eq!(violations[0].keyword, "pattern");
}

#[test]
fn look_around_and_backreferences_in_patterns() {
    let schema = json!({"pattern": "^(?!admin)"});
    assert!(check(schema.clone(), json!("alice")).is_empty());
    let violations = check(schema, json!("admin"));
    assert_eq!(violations.len(), 1);
    assert_eq!(violations[0].message, "'admin' does not match '^(?!admin)'");

    let schema = json!({
        "patternProperties": {"^(\\w)\\1$": {"type": "integer"}},
        "additionalProperties": false
    });
    assert!(check(schema.clone(), json!({"aa": 1})).is_empty());
    assert_eq!(check(schema, json!({"ab": 1})).len(), 1);
}

#[test]
fn ref_siblings_are_ignored() {
    let schema = json!({
        "properties": {"a": {"$ref": "#/definitions/S", "type": "integer"}},
        "definitions": {"S": {"type": "string"}}
    });
    assert!(check(schema, json!({"a": "text"})).is_empty());
}

#[test]
fn external_schema_refs_use_the_loader() {
    let loader = MemoryLoader::new().with(
        "https://schemas.example.com/pet.yaml",
        "Pet:\n  type: object\n  required: [name]\n",
    );
    let schema = json!({"items": {"$ref": "pet.yaml#/Pet"}});
    let outcome = validate_instance(&json!([{"name": "a"}, {}]), &schema, &base(), &loader, FormatSet::v30())
        .unwrap();
    assert_eq!(paths(outcome.violations()), ["/1"]);
}

#[test]
fn broken_ref_in_one_branch_does_not_stop_siblings() {
    let schema = json!({
        "properties": {
            "a": {"$ref": "missing.json#/A"},
            "b": {"type": "string"}
        }
    });
    let violations = check(schema, json!({"a": 1, "b": 2}));
    assert_eq!(paths(&violations), ["/a", "/b"]);
    assert!(violations[0].is_reference_failure());
    assert!(!violations[1].is_reference_failure());
}

#[test]
fn validation_is_idempotent() {
    let doc = json!({"name": 1, "children": [{"children": [{}]}]});
    let first = check(node_schema(), doc.clone());
    let second = check(node_schema(), doc);
    assert!(!first.is_empty());
    assert_eq!(first, second);
}

#[test]
fn valid_outcome_has_no_violations() {
    let loader = MemoryLoader::new();
    let outcome = validate_instance(&json!(1), &json!({}), &base(), &loader, FormatSet::none()).unwrap();
    assert_eq!(outcome, ValidationOutcome::Valid);
    assert!(outcome.into_result().is_ok());
}
