use serde_json::{Map, Value};

use crate::error::Violation;
use crate::schema::validator::{short, Ctx, SchemaValidator};

const TYPE_NAMES: [&str; 7] = ["array", "boolean", "integer", "null", "number", "object", "string"];

/// Relative tolerance for `multipleOf` on non-integral operands.
const MULTIPLE_OF_EPSILON: f64 = 1e-9;

impl SchemaValidator<'_, '_> {
    pub(crate) fn check_type(&mut self, instance: &Value, ctx: &Ctx<'_>, out: &mut Vec<Violation>) {
        let Some(declared) = ctx.map.get("type") else {
            return;
        };
        let names: Vec<&str> = match declared {
            Value::String(s) => vec![s.as_str()],
            Value::Array(items) => match items.iter().map(Value::as_str).collect::<Option<Vec<_>>>() {
                Some(names) if !names.is_empty() => names,
                _ => {
                    out.push(ctx.malformed("type", "type must be a string or a non-empty array of strings"));
                    return;
                }
            },
            _ => {
                out.push(ctx.malformed("type", "type must be a string or a non-empty array of strings"));
                return;
            }
        };

        if let Some(unknown) = names.iter().find(|n| !TYPE_NAMES.contains(*n)) {
            out.push(ctx.malformed("type", format!("unknown type '{unknown}'")));
            return;
        }

        if !names.iter().any(|n| is_type(instance, n)) {
            let expected = names.iter().map(|n| format!("'{n}'")).collect::<Vec<_>>().join(", ");
            out.push(ctx.violation("type", format!("{} is not of type {expected}", short(instance))));
        }
    }

    pub(crate) fn check_enum(&mut self, instance: &Value, ctx: &Ctx<'_>, out: &mut Vec<Violation>) {
        let Some(allowed) = ctx.map.get("enum") else {
            return;
        };
        let Some(allowed) = allowed.as_array() else {
            out.push(ctx.malformed("enum", "enum must be an array"));
            return;
        };
        if !allowed.iter().any(|v| json_equal(v, instance)) {
            out.push(ctx.violation(
                "enum",
                format!("{} is not one of {}", short(instance), short(&Value::Array(allowed.clone()))),
            ));
        }
    }

    pub(crate) fn check_required(&mut self, obj: &Map<String, Value>, ctx: &Ctx<'_>, out: &mut Vec<Violation>) {
        let Some(required) = ctx.map.get("required") else {
            return;
        };
        let Some(names) = string_list(required) else {
            out.push(ctx.malformed("required", "required must be an array of strings"));
            return;
        };
        for name in names {
            if !obj.contains_key(name) {
                out.push(ctx.violation("required", format!("'{name}' is a required property")));
            }
        }
    }

    pub(crate) fn check_property_counts(&mut self, obj: &Map<String, Value>, ctx: &Ctx<'_>, out: &mut Vec<Violation>) {
        let len = obj.len() as u64;
        if let Some(min) = self.limit(ctx, "minProperties", out) {
            if len < min {
                out.push(ctx.violation(
                    "minProperties",
                    format!("object has {len} properties, fewer than the minimum of {min}"),
                ));
            }
        }
        if let Some(max) = self.limit(ctx, "maxProperties", out) {
            if len > max {
                out.push(ctx.violation(
                    "maxProperties",
                    format!("object has {len} properties, more than the maximum of {max}"),
                ));
            }
        }
    }

    /// `properties`, `patternProperties` and `additionalProperties`, applied
    /// key by key in document order. A key matching both `properties` and a
    /// pattern is checked against both; `additionalProperties` sees only keys
    /// matched by neither.
    pub(crate) fn check_properties(&mut self, obj: &Map<String, Value>, ctx: &Ctx<'_>, out: &mut Vec<Violation>) {
        let properties = match ctx.map.get("properties") {
            None => None,
            Some(Value::Object(p)) => Some(p),
            Some(_) => {
                out.push(ctx.malformed("properties", "properties must be an object"));
                None
            }
        };
        let patterns = match ctx.map.get("patternProperties") {
            None => None,
            Some(Value::Object(p)) => Some(p),
            Some(_) => {
                out.push(ctx.malformed("patternProperties", "patternProperties must be an object"));
                None
            }
        };
        let additional = ctx.map.get("additionalProperties");
        if properties.is_none() && patterns.is_none() && additional.is_none() {
            return;
        }

        let mut broken_patterns: Vec<&str> = Vec::new();
        for (key, value) in obj {
            let value_path = ctx.path.key(key.as_str());
            let mut matched = false;

            if let Some(sub) = properties.and_then(|p| p.get(key)) {
                matched = true;
                let at = ctx.at("properties").key(key.as_str());
                self.descend(value, sub, ctx.scope, &value_path, &at, out);
            }

            for (pattern, sub) in patterns.into_iter().flatten() {
                match self.pattern_matches(pattern, key) {
                    Some(true) => {
                        matched = true;
                        let at = ctx.at("patternProperties").key(pattern.as_str());
                        self.descend(value, sub, ctx.scope, &value_path, &at, out);
                    }
                    Some(false) => {}
                    None => {
                        if !broken_patterns.contains(&pattern.as_str()) {
                            broken_patterns.push(pattern);
                            out.push(ctx.malformed(
                                "patternProperties",
                                format!("'{pattern}' is not a valid regular expression"),
                            ));
                        }
                    }
                }
            }

            if matched {
                continue;
            }
            match additional {
                None | Some(Value::Bool(true)) => {}
                Some(Value::Bool(false)) => out.push(ctx.violation(
                    "additionalProperties",
                    format!("additional property '{key}' is not allowed"),
                )),
                Some(sub @ Value::Object(_)) => {
                    let at = ctx.at("additionalProperties");
                    self.descend(value, sub, ctx.scope, &value_path, &at, out);
                }
                Some(_) => out.push(ctx.malformed(
                    "additionalProperties",
                    "additionalProperties must be a boolean or an object",
                )),
            }
        }
    }

    pub(crate) fn check_dependencies(
        &mut self,
        instance: &Value,
        obj: &Map<String, Value>,
        ctx: &Ctx<'_>,
        out: &mut Vec<Violation>,
    ) {
        let Some(dependencies) = ctx.map.get("dependencies") else {
            return;
        };
        let Some(dependencies) = dependencies.as_object() else {
            out.push(ctx.malformed("dependencies", "dependencies must be an object"));
            return;
        };
        for (property, dependency) in dependencies {
            if !obj.contains_key(property) {
                continue;
            }
            match dependency {
                Value::Array(_) => {
                    let Some(names) = string_list(dependency) else {
                        out.push(ctx.malformed("dependencies", "property dependencies must be strings"));
                        continue;
                    };
                    for name in names.into_iter().filter(|n| !obj.contains_key(*n)) {
                        out.push(ctx.violation(
                            "dependencies",
                            format!("'{name}' is a dependency of '{property}'"),
                        ));
                    }
                }
                Value::Object(_) | Value::Bool(_) => {
                    let at = ctx.at("dependencies").key(property.as_str());
                    self.descend(instance, dependency, ctx.scope, ctx.path, &at, out);
                }
                _ => out.push(ctx.malformed("dependencies", "dependency must be an array or a schema")),
            }
        }
    }

    pub(crate) fn check_items(&mut self, items: &[Value], ctx: &Ctx<'_>, out: &mut Vec<Violation>) {
        match ctx.map.get("items") {
            None => {}
            Some(Value::Array(positional)) => {
                let at = ctx.at("items");
                for (i, (item, sub)) in items.iter().zip(positional).enumerate() {
                    self.descend(item, sub, ctx.scope, &ctx.path.index(i), &at.index(i), out);
                }
                if items.len() > positional.len() {
                    self.check_additional_items(items, positional.len(), ctx, out);
                }
            }
            Some(sub @ (Value::Object(_) | Value::Bool(_))) => {
                let at = ctx.at("items");
                for (i, item) in items.iter().enumerate() {
                    self.descend(item, sub, ctx.scope, &ctx.path.index(i), &at, out);
                }
            }
            Some(_) => out.push(ctx.malformed("items", "items must be a schema or an array of schemas")),
        }
    }

    fn check_additional_items(&mut self, items: &[Value], start: usize, ctx: &Ctx<'_>, out: &mut Vec<Violation>) {
        match ctx.map.get("additionalItems") {
            None | Some(Value::Bool(true)) => {}
            Some(Value::Bool(false)) => out.push(ctx.violation(
                "additionalItems",
                format!(
                    "additional items are not allowed ({} beyond the {start} positional schemas)",
                    items.len() - start
                ),
            )),
            Some(sub @ Value::Object(_)) => {
                let at = ctx.at("additionalItems");
                for (i, item) in items.iter().enumerate().skip(start) {
                    self.descend(item, sub, ctx.scope, &ctx.path.index(i), &at, out);
                }
            }
            Some(_) => out.push(ctx.malformed(
                "additionalItems",
                "additionalItems must be a boolean or an object",
            )),
        }
    }

    pub(crate) fn check_item_counts(&mut self, items: &[Value], ctx: &Ctx<'_>, out: &mut Vec<Violation>) {
        let len = items.len() as u64;
        if let Some(min) = self.limit(ctx, "minItems", out) {
            if len < min {
                out.push(ctx.violation(
                    "minItems",
                    format!("array has {len} items, fewer than the minimum of {min}"),
                ));
            }
        }
        if let Some(max) = self.limit(ctx, "maxItems", out) {
            if len > max {
                out.push(ctx.violation(
                    "maxItems",
                    format!("array has {len} items, more than the maximum of {max}"),
                ));
            }
        }
        match ctx.map.get("uniqueItems") {
            None | Some(Value::Bool(false)) => {}
            Some(Value::Bool(true)) => {
                if let Some((first, second)) = first_duplicate(items) {
                    out.push(ctx.violation(
                        "uniqueItems",
                        format!("items {first} and {second} are equal ({})", short(&items[first])),
                    ));
                }
            }
            Some(_) => out.push(ctx.malformed("uniqueItems", "uniqueItems must be a boolean")),
        }
    }

    pub(crate) fn check_string(&mut self, s: &str, ctx: &Ctx<'_>, out: &mut Vec<Violation>) {
        // Lengths count Unicode scalar values, not bytes.
        let len = s.chars().count() as u64;
        if let Some(min) = self.limit(ctx, "minLength", out) {
            if len < min {
                out.push(ctx.violation(
                    "minLength",
                    format!("'{s}' is shorter than {min} characters"),
                ));
            }
        }
        if let Some(max) = self.limit(ctx, "maxLength", out) {
            if len > max {
                out.push(ctx.violation(
                    "maxLength",
                    format!("'{}' is longer than {max} characters", short(&Value::from(s))),
                ));
            }
        }
        match ctx.map.get("pattern") {
            None => {}
            Some(Value::String(pattern)) => match self.pattern_matches(pattern, s) {
                Some(true) => {}
                Some(false) => out.push(ctx.violation(
                    "pattern",
                    format!("'{s}' does not match '{pattern}'"),
                )),
                None => out.push(ctx.malformed(
                    "pattern",
                    format!("'{pattern}' is not a valid regular expression"),
                )),
            },
            Some(_) => out.push(ctx.malformed("pattern", "pattern must be a string")),
        }
    }

    pub(crate) fn check_format(&mut self, instance: &Value, ctx: &Ctx<'_>, out: &mut Vec<Violation>) {
        let Some(name) = ctx.map.get("format") else {
            return;
        };
        let Some(name) = name.as_str() else {
            out.push(ctx.malformed("format", "format must be a string"));
            return;
        };
        if let Some(format) = self.formats().get(name) {
            if !format.check(instance) {
                out.push(ctx.violation("format", format!("{} is not a valid '{name}'", short(instance))));
            }
        }
    }

    pub(crate) fn check_numeric(&mut self, instance: &Value, ctx: &Ctx<'_>, out: &mut Vec<Violation>) {
        let Some(value) = instance.as_f64() else {
            return;
        };

        if let Some(divisor) = ctx.map.get("multipleOf") {
            match divisor.as_f64() {
                Some(d) if d > 0.0 => {
                    if !is_multiple_of(instance, divisor, value, d) {
                        out.push(ctx.violation(
                            "multipleOf",
                            format!("{} is not a multiple of {divisor}", short(instance)),
                        ));
                    }
                }
                _ => out.push(ctx.malformed("multipleOf", "multipleOf must be a number greater than 0")),
            }
        }

        if let Some(bound) = ctx.map.get("minimum") {
            match bound.as_f64() {
                Some(min) => {
                    let exclusive = matches!(ctx.map.get("exclusiveMinimum"), Some(Value::Bool(true)));
                    if value < min || (exclusive && value == min) {
                        let relation = if exclusive { "less than or equal to" } else { "less than" };
                        out.push(ctx.violation(
                            "minimum",
                            format!("{} is {relation} the minimum of {bound}", short(instance)),
                        ));
                    }
                }
                None => out.push(ctx.malformed("minimum", "minimum must be a number")),
            }
        }
        if let Some(Value::Number(bound)) = ctx.map.get("exclusiveMinimum") {
            if bound.as_f64().is_some_and(|min| value <= min) {
                out.push(ctx.violation(
                    "exclusiveMinimum",
                    format!("{} is less than or equal to the minimum of {bound}", short(instance)),
                ));
            }
        }

        if let Some(bound) = ctx.map.get("maximum") {
            match bound.as_f64() {
                Some(max) => {
                    let exclusive = matches!(ctx.map.get("exclusiveMaximum"), Some(Value::Bool(true)));
                    if value > max || (exclusive && value == max) {
                        let relation = if exclusive { "greater than or equal to" } else { "greater than" };
                        out.push(ctx.violation(
                            "maximum",
                            format!("{} is {relation} the maximum of {bound}", short(instance)),
                        ));
                    }
                }
                None => out.push(ctx.malformed("maximum", "maximum must be a number")),
            }
        }
        if let Some(Value::Number(bound)) = ctx.map.get("exclusiveMaximum") {
            if bound.as_f64().is_some_and(|max| value >= max) {
                out.push(ctx.violation(
                    "exclusiveMaximum",
                    format!("{} is greater than or equal to the maximum of {bound}", short(instance)),
                ));
            }
        }
    }

    pub(crate) fn check_all_of(&mut self, instance: &Value, ctx: &Ctx<'_>, out: &mut Vec<Violation>) {
        let Some(branches) = self.branches(ctx, "allOf", out) else {
            return;
        };
        let at = ctx.at("allOf");
        for (i, branch) in branches.iter().enumerate() {
            self.descend(instance, branch, ctx.scope, ctx.path, &at.index(i), out);
        }
    }

    pub(crate) fn check_any_of(&mut self, instance: &Value, ctx: &Ctx<'_>, out: &mut Vec<Violation>) {
        let Some(branches) = self.branches(ctx, "anyOf", out) else {
            return;
        };
        let at = ctx.at("anyOf");
        let mut causes = Vec::new();
        for (i, branch) in branches.iter().enumerate() {
            let found = self.validate(instance, branch, ctx.scope, ctx.path, &at.index(i));
            if found.is_empty() {
                return;
            }
            causes.extend(found);
        }
        out.push(
            ctx.violation(
                "anyOf",
                format!("{} is not valid under any of the given schemas", short(instance)),
            )
            .with_causes(causes),
        );
    }

    pub(crate) fn check_one_of(&mut self, instance: &Value, ctx: &Ctx<'_>, out: &mut Vec<Violation>) {
        let Some(branches) = self.branches(ctx, "oneOf", out) else {
            return;
        };
        let at = ctx.at("oneOf");
        let mut matched = Vec::new();
        let mut causes = Vec::new();
        for (i, branch) in branches.iter().enumerate() {
            let found = self.validate(instance, branch, ctx.scope, ctx.path, &at.index(i));
            if found.is_empty() {
                matched.push(i);
            } else {
                causes.extend(found);
            }
        }

        match matched.len() {
            1 => {}
            0 => out.push(
                ctx.violation(
                    "oneOf",
                    format!("{} is not valid under any of the given schemas", short(instance)),
                )
                .with_causes(causes),
            ),
            _ => {
                let which = matched.iter().map(|i| format!("#{i}")).collect::<Vec<_>>().join(", ");
                out.push(ctx.violation(
                    "oneOf",
                    format!(
                        "{} is valid under more than one of the given schemas (matched {which})",
                        short(instance)
                    ),
                ));
            }
        }
    }

    pub(crate) fn check_not(&mut self, instance: &Value, ctx: &Ctx<'_>, out: &mut Vec<Violation>) {
        let Some(sub) = ctx.map.get("not") else {
            return;
        };
        if !matches!(sub, Value::Object(_) | Value::Bool(_)) {
            out.push(ctx.malformed("not", "not must be a schema"));
            return;
        }
        if self.validate(instance, sub, ctx.scope, ctx.path, &ctx.at("not")).is_empty() {
            out.push(ctx.violation(
                "not",
                format!("{} must not be valid under the given schema", short(instance)),
            ));
        }
    }

    fn branches<'s>(&self, ctx: &Ctx<'s>, keyword: &str, out: &mut Vec<Violation>) -> Option<&'s Vec<Value>> {
        match ctx.map.get(keyword)? {
            Value::Array(branches) if !branches.is_empty() => Some(branches),
            _ => {
                out.push(ctx.malformed(keyword, format!("{keyword} must be a non-empty array of schemas")));
                None
            }
        }
    }

    /// Reads a non-negative integer keyword such as `minItems`.
    fn limit(&self, ctx: &Ctx<'_>, keyword: &str, out: &mut Vec<Violation>) -> Option<u64> {
        let raw = ctx.map.get(keyword)?;
        let parsed = raw.as_u64().or_else(|| {
            raw.as_f64()
                .filter(|f| *f >= 0.0 && f.fract() == 0.0)
                .map(|f| f as u64)
        });
        if parsed.is_none() {
            out.push(ctx.malformed(keyword, format!("{keyword} must be a non-negative integer")));
        }
        parsed
    }
}

fn is_type(instance: &Value, name: &str) -> bool {
    match name {
        "array" => instance.is_array(),
        "boolean" => instance.is_boolean(),
        "null" => instance.is_null(),
        "number" => instance.is_number(),
        "object" => instance.is_object(),
        "string" => instance.is_string(),
        "integer" => match instance {
            Value::Number(n) => n.is_i64() || n.is_u64() || n.as_f64().is_some_and(|f| f.fract() == 0.0),
            _ => false,
        },
        _ => false,
    }
}

fn string_list(value: &Value) -> Option<Vec<&str>> {
    value.as_array()?.iter().map(Value::as_str).collect()
}

fn is_multiple_of(instance: &Value, divisor: &Value, value: f64, d: f64) -> bool {
    if let (Some(a), Some(b)) = (instance.as_i64(), divisor.as_i64()) {
        return b != 0 && a % b == 0;
    }
    let quotient = value / d;
    if !quotient.is_finite() {
        return false;
    }
    (quotient - quotient.round()).abs() <= MULTIPLE_OF_EPSILON * quotient.abs().max(1.0)
}

fn first_duplicate(items: &[Value]) -> Option<(usize, usize)> {
    for (i, a) in items.iter().enumerate() {
        for (j, b) in items.iter().enumerate().skip(i + 1) {
            if json_equal(a, b) {
                return Some((i, j));
            }
        }
    }
    None
}

/// Structural equality where `1` and `1.0` are the same number.
fn json_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => match (x.as_i64(), y.as_i64()) {
            (Some(i), Some(j)) => i == j,
            _ => match (x.as_u64(), y.as_u64()) {
                (Some(i), Some(j)) => i == j,
                _ => x.as_f64() == y.as_f64(),
            },
        },
        (Value::Array(xs), Value::Array(ys)) => {
            xs.len() == ys.len() && xs.iter().zip(ys).all(|(x, y)| json_equal(x, y))
        }
        (Value::Object(xs), Value::Object(ys)) => {
            xs.len() == ys.len()
                && xs
                    .iter()
                    .all(|(k, x)| ys.get(k).is_some_and(|y| json_equal(x, y)))
        }
        _ => a == b,
    }
}
