//! Vizij Choreo Core (renderer-agnostic)
//!
//! A scene graph of shape nodes plus a timeline of declarative, time-scoped
//! animation commands. `state_at(t)` is a pure function of the graph, the
//! command list and `t`; hosts sample it (or bake it) and draw the result.
//!
//! Authoring usually goes through the script driver:
//!
//! ```
//! use vizij_choreo_core::{CommandDraft, Config, Geometry, NodeBuilder, PlayOpts, Scene};
//!
//! let mut scene = Scene::new(Config::default());
//! let dot = scene.add(NodeBuilder::new(Geometry::circle(0.5))).unwrap();
//! scene.play(&[CommandDraft::fade_in(&[dot])], PlayOpts::run_time(1.0)).unwrap();
//! let player = scene.finish().unwrap();
//! assert_eq!(player.state_at(1.0).node(dot).unwrap().world.opacity, 1.0);
//! ```

pub mod baking;
pub mod camera;
pub mod command;
pub mod config;
pub mod error;
pub mod ids;
pub mod interp;
pub mod math;
pub mod node;
pub mod player;
pub mod sampling;
pub mod scene;
pub mod script;
pub mod shape;
pub mod snapshot;
pub mod timeline;
pub mod value;

// Re-exports for hosts and scene scripts
pub use baking::{bake, export_baked_json, export_baked_json_string, BakedChoreography, BakingConfig};
pub use camera::{CameraAxis, CameraState};
pub use command::{AnimationCommand, Attribute, CommandDraft, Verb, VerbKind};
pub use config::Config;
pub use error::{ChoreoError, Result};
pub use ids::{CommandId, NodeId};
pub use interp::Easing;
pub use math::{Quat, Vec3, DEGREES, DOWN, IN, LEFT, ORIGIN, OUT, RIGHT, UP};
pub use node::{NodeBuilder, NodeState, ShapeNode, Style, Transform};
pub use player::Player;
pub use sampling::state_at;
pub use scene::SceneGraph;
pub use script::{run_script, PlayOpts, Scene, SceneScript};
pub use shape::{Bounds, Color, Geometry, ShapeKind};
pub use snapshot::{NodeSnapshot, SceneSnapshot};
pub use timeline::{Channel, Timeline};
pub use value::Value;
