//! Plan interactions for one storyboard module and report load and density findings.
//!
//! Usage:
//!   plan_storyboard --input module.json [--catalog catalog.toml] [--settings engine.toml]
//!                   [--optimize] [--load-gate] [--safe-zone]
//!
//! Interactions are only decided at the placements of the module's density profile;
//! the other scenes stay passive.
//!
//! The input is a JSON object:
//!
//! ```json
//! {
//!   "topic": "Handling customer complaints",
//!   "source_material": "...",
//!   "duration_minutes": 20,
//!   "scenes": [
//!     {
//!       "scene_number": 1,
//!       "title": "Welcome",
//!       "narration": "...",
//!       "outcome": "Explain the complaint process",
//!       "metadata": { "bloomLevel": "understand", "moduleLevel": 2 }
//!     }
//!   ]
//! }
//! ```
//!
//! The report is printed to stdout as JSON; logs go to stderr.

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

use clap::Parser;
use interactivity_core::{
    infer_module_type, seed_history, validate_sequence, EngineSettings, KeywordClassifier,
    ModulePlan, ModulePlanner, PlanConstraints, RuleAdvice, RuleContext, RuleEngine, SceneLoad,
    SequenceOptimizer, SequenceReport,
};
use serde::{Deserialize, Serialize};
use storyboard_rules::{Catalog, ModuleType, RawSceneMetadata, Scene};

#[derive(Parser, Debug)]
#[command(name = "plan_storyboard")]
#[command(about = "Choose interactions for storyboard scenes and validate the sequence", long_about = None)]
struct Args {
    /// Module JSON file
    #[arg(short, long)]
    input: PathBuf,

    /// Interactivity catalog TOML (defaults to the built-in catalog)
    #[arg(short, long)]
    catalog: Option<PathBuf>,

    /// Engine settings TOML
    #[arg(short, long)]
    settings: Option<PathBuf>,

    /// Reorder scenes by Bloom level, load and engagement before validation
    #[arg(short, long)]
    optimize: bool,

    /// Withhold interactions while cumulative load shows overload risk
    #[arg(long)]
    load_gate: bool,

    /// Drop placements whose scene load sits outside the safe zone
    #[arg(long)]
    safe_zone: bool,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ModuleInput {
    topic: String,
    source_material: String,
    duration_minutes: Option<f64>,
    scenes: Vec<SceneInput>,
}

#[derive(Debug, Deserialize)]
struct SceneInput {
    #[serde(flatten)]
    scene: Scene,
    #[serde(default)]
    outcome: Option<String>,
    #[serde(default)]
    metadata: RawSceneMetadata,
}

#[derive(Debug, Serialize)]
struct PlanReport {
    topic: String,
    module_type: ModuleType,
    catalog_version: String,
    plan: ModulePlan,
    rule_advice: Vec<RuleAdvice>,
    scenes: Vec<Scene>,
    validation: SequenceReport,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("interactivity_core=info")),
        )
        .init();

    let args = Args::parse();

    // Configuration problems abort before any scene is processed.
    let settings = match &args.settings {
        Some(path) => EngineSettings::load(path)?,
        None => EngineSettings::default(),
    };
    let catalog = match &args.catalog {
        Some(path) => Catalog::load(path)?,
        None => Catalog::builtin()?,
    };
    let catalog_version = catalog.version().to_string();
    let engine = settings.engine(catalog);

    let content = fs::read_to_string(&args.input)
        .map_err(|e| format!("Failed to read {}: {}", args.input.display(), e))?;
    let input: ModuleInput = serde_json::from_str(&content)?;
    tracing::info!(
        topic = %input.topic,
        scenes = input.scenes.len(),
        catalog = %catalog_version,
        "planning module"
    );

    let metadata: Vec<_> = input
        .scenes
        .iter()
        .map(|s| {
            let mut raw = s.metadata.clone();
            raw.scene_number.get_or_insert(s.scene.scene_number);
            raw.normalize()
        })
        .collect();

    let module_type = infer_module_type(
        &input.topic,
        &input.source_material,
        input.duration_minutes,
    );
    let density = settings.density_manager();
    let assessor = settings.load_assessor();
    let profile = density.profile_for(module_type);

    // Scenes as written, before any interaction is attached.
    let passive: Vec<Scene> = input
        .scenes
        .iter()
        .zip(&metadata)
        .map(|(s, m)| {
            let mut scene = s.scene.clone();
            scene.scene_number = m.scene_number;
            scene.interaction = None;
            scene
        })
        .collect();
    let mut in_order = passive.clone();
    in_order.sort_by_key(|s| s.scene_number);

    let mut placements = density.calculate_optimal_placements(in_order.len(), &profile, &[]);
    if args.safe_zone {
        placements = assessor.safe_positions(&in_order, &placements);
    }
    let base_loads: Vec<f64> = passive.iter().map(|s| SceneLoad::of(s).total).collect();
    let constraints = PlanConstraints {
        placements: Some(placements.as_slice()),
        base_loads: args.load_gate.then_some(base_loads.as_slice()),
    };

    let planner = ModulePlanner::new(&engine).with_load_config(settings.load.clone());
    let plan = planner.plan_with(&metadata, seed_history(&metadata), constraints);

    let decided: HashMap<u32, _> = plan
        .decisions
        .iter()
        .map(|d| (d.scene_number, d.interactivity_type))
        .collect();
    let mut scenes: Vec<Scene> = in_order
        .into_iter()
        .map(|mut scene| {
            scene.interaction = decided.get(&scene.scene_number).copied().flatten();
            scene
        })
        .collect();

    let classifier = KeywordClassifier::new();
    let rules = RuleEngine::with_defaults();
    let rule_advice: Vec<RuleAdvice> = plan
        .decisions
        .iter()
        .enumerate()
        .filter_map(|(i, decision)| {
            let bloom = metadata
                .iter()
                .find(|m| m.scene_number == decision.scene_number)?
                .bloom_level;
            let context =
                RuleContext::for_scene(&scenes, i, input.duration_minutes, &classifier)?
                    .with_bloom_level(bloom);
            rules.review(&context, decision)
        })
        .collect();

    if args.optimize {
        let outcomes: HashMap<u32, String> = input
            .scenes
            .iter()
            .zip(&metadata)
            .filter_map(|(s, m)| s.outcome.clone().map(|o| (m.scene_number, o)))
            .collect();
        scenes = SequenceOptimizer::new().optimize(scenes, &outcomes);
    }

    let validation = validate_sequence(&scenes, &profile, &assessor, &density);

    tracing::info!(
        %module_type,
        interactive = plan.interactive_count(),
        advice = rule_advice.len(),
        clean = validation.is_clean(),
        "module planned"
    );

    let report = PlanReport {
        topic: input.topic,
        module_type,
        catalog_version,
        plan,
        rule_advice,
        scenes,
        validation,
    };
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
