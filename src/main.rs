//! morphview binary: loads the head model and its facial blendshapes,
//! then hands everything to the viewer shell.
//!
//! Usage: `morphview [asset-root]` where asset-root defaults to the
//! current directory and must contain `res/model/head/`.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use morphview::{app, asset, BlendshapeDesc, MorphEngine, TextureData, ViewerConfig, ViewerResult};

const BASE_MESH: &str = "res/model/head/FaceDefault.obj";
const BASE_TEXTURE: &str = "res/model/head/headTexture.jpg";

const BLENDSHAPE_NAMES: [&str; 14] = [
    "CheekPuff",
    "CheekSuck",
    "JawOpen",
    "Kiss",
    "LeftBrowDown",
    "LeftBrowUp",
    "LeftFrown",
    "LeftSmile",
    "LeftSneer",
    "RightBrowDown",
    "RightBrowUp",
    "RightFrown",
    "RightSmile",
    "RightSneer",
];

fn blendshape_manifest(root: &Path) -> Vec<BlendshapeDesc> {
    BLENDSHAPE_NAMES
        .iter()
        .map(|name| {
            BlendshapeDesc::new(
                *name,
                root.join(format!("res/model/head/Face{}.obj", name)),
            )
        })
        .collect()
}

fn run(root: &Path) -> ViewerResult<()> {
    let base = asset::load_obj("FaceDefault", &root.join(BASE_MESH))?;
    let targets = asset::load_blendshapes(&blendshape_manifest(root))?;
    let engine = MorphEngine::new(base, &targets)?;

    // A missing texture falls back to untextured shading.
    let texture = match TextureData::from_file(&root.join(BASE_TEXTURE)) {
        Ok(tex) => Some(tex),
        Err(e) => {
            log::warn!("{}", e);
            None
        }
    };

    let config = ViewerConfig {
        title: "morphview".to_string(),
        model_scale: 0.25,
        ..Default::default()
    };

    app::run(config, engine, texture)
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let root = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."));

    match run(&root) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
