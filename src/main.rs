use std::collections::BTreeMap;

use anyhow::{Context, Result};
use serde_json::{json, Value};

use airq_explorer::analysis::AnalysisKind;
use airq_explorer::config::ExplorerConfig;
use airq_explorer::inference::FeatureMap;
use airq_explorer::session::Session;

/// Render every page of the explorer as one JSON document on stdout:
/// the overview, each analysis (or its error), and a prediction when a
/// feature file is configured.
fn main() -> Result<()> {
    env_logger::init();

    let config = ExplorerConfig::load()?;
    let session = Session::open(&config)?;

    let mut analyses = BTreeMap::new();
    for kind in AnalysisKind::ALL {
        let entry = match session.analyze(kind) {
            Ok(result) => serde_json::to_value(&result)?,
            Err(err) => {
                log::warn!("{}: {err}", kind.name());
                json!({ "error": err.to_string() })
            }
        };
        analyses.insert(kind.name(), entry);
    }

    let prediction = match &config.features {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("reading features from {}", path.display()))?;
            let features: FeatureMap =
                serde_json::from_str(&text).context("parsing feature map")?;
            match session.predict(&features) {
                Ok(pm25) => json!({ "PM2.5": pm25 }),
                Err(err) => json!({ "error": err.to_string() }),
            }
        }
        None => Value::Null,
    };

    let report = json!({
        "overview": session.profile(),
        "analyses": analyses,
        "prediction": prediction,
    });
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
