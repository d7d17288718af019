use schemars::schema::RootSchema;
use schemars::schema_for;

use crate::DevirtConfig;

/// JSON schema for `devirt.toml`, for editor integration and CI checks.
#[must_use]
pub fn json_schema() -> RootSchema {
    let mut schema = schema_for!(DevirtConfig);
    schema.schema.metadata().title = Some("devirt.toml".to_owned());
    schema
}
