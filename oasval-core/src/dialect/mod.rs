//! Version-specific configuration: which meta-schema applies and which
//! formats it asserts.

use std::sync::{Arc, LazyLock};

use serde_json::Value;
use url::Url;

use crate::resolver::Resolver;
use crate::schema::FormatSet;
use crate::version::SpecVersion;

pub const DRAFT_04_URI: &str = "http://json-schema.org/draft-04/schema";
pub const SWAGGER_20_URI: &str = "http://swagger.io/v2/schema.json";
pub const OPENAPI_30_URI: &str = "https://spec.openapis.org/oas/3.0/schema/2019-04-02";

/// A meta-schema shipped inside the crate.
#[derive(Debug, Clone, Copy)]
pub struct BundledSchema {
    pub name: &'static str,
    pub uri: &'static str,
    source: &'static str,
}

const BUNDLED: [BundledSchema; 3] = [
    BundledSchema {
        name: "JSON Schema draft-04",
        uri: DRAFT_04_URI,
        source: include_str!("../../schemas/draft-04.json"),
    },
    BundledSchema {
        name: "Swagger 2.0",
        uri: SWAGGER_20_URI,
        source: include_str!("../../schemas/swagger-2.0.json"),
    },
    BundledSchema {
        name: "OpenAPI 3.0",
        uri: OPENAPI_30_URI,
        source: include_str!("../../schemas/openapi-3.0.json"),
    },
];

static PARSED: LazyLock<Vec<(Url, Arc<Value>)>> = LazyLock::new(|| {
    BUNDLED
        .iter()
        .map(|schema| {
            let uri = Url::parse(schema.uri).expect("valid");
            let root = serde_json::from_str(schema.source).expect("valid");
            (uri, Arc::new(root))
        })
        .collect()
});

pub fn bundled_schemas() -> &'static [BundledSchema] {
    &BUNDLED
}

/// Makes every bundled meta-schema resolvable by its id without a fetch.
pub fn register_bundled(resolver: &mut Resolver<'_>) {
    for (uri, root) in PARSED.iter() {
        resolver.add_document(uri.clone(), Arc::clone(root));
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Dialect {
    pub version: SpecVersion,
    pub meta_schema_uri: &'static str,
    pub formats: FormatSet,
}

pub fn dialect(version: SpecVersion) -> Dialect {
    match version {
        SpecVersion::V2 => Dialect {
            version,
            meta_schema_uri: SWAGGER_20_URI,
            formats: FormatSet::v2(),
        },
        SpecVersion::V30 => Dialect {
            version,
            meta_schema_uri: OPENAPI_30_URI,
            formats: FormatSet::v30(),
        },
    }
}
