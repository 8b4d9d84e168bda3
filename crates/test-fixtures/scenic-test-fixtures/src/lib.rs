//! Named JSON fixtures for the scenic animation tests, resolved through
//! `fixtures/manifest.json`.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use once_cell::sync::Lazy;
use serde::de::DeserializeOwned;
use serde::Deserialize;

static INDEX: Lazy<FixtureIndex> = Lazy::new(|| {
    serde_json::from_str(include_str!("../../../../fixtures/manifest.json"))
        .expect("fixtures manifest should parse")
});

#[derive(Debug, Deserialize)]
struct FixtureIndex {
    tangents: HashMap<String, String>,
    tracks: HashMap<String, Track>,
}

#[derive(Debug, Deserialize)]
struct Track {
    keys: String,
    #[serde(default)]
    samples: Option<String>,
}

/// Parse the fixture file at `rel`, relative to the repository's `fixtures/`.
fn parse_file<T: DeserializeOwned>(rel: &str) -> Result<T> {
    let path = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("../../../fixtures")
        .join(rel);
    let text = fs::read_to_string(&path)
        .with_context(|| format!("reading fixture {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing fixture {rel}"))
}

fn track(name: &str) -> Result<&'static Track> {
    INDEX
        .tracks
        .get(name)
        .ok_or_else(|| anyhow!("no track fixture named '{name}'"))
}

/// Tangent inference cases: neighbouring keys and the expected tangents.
pub mod tangents {
    use super::*;

    pub fn load<T: DeserializeOwned>(name: &str) -> Result<T> {
        let rel = INDEX
            .tangents
            .get(name)
            .ok_or_else(|| anyhow!("no tangent fixture named '{name}'"))?;
        parse_file(rel)
    }
}

/// Keyed parameter tracks, optionally with expected samples.
pub mod tracks {
    use super::*;

    pub fn load<T: DeserializeOwned>(name: &str) -> Result<T> {
        parse_file(&track(name)?.keys)
    }

    /// Expected samples for `name`; `None` when the track has none.
    pub fn samples<T: DeserializeOwned>(name: &str) -> Result<Option<T>> {
        track(name)?.samples.as_deref().map(parse_file).transpose()
    }
}
