//! Hex map editor.
//!
//! Paint elevation, color, rivers and roads onto a chunked hex grid. Tab
//! toggles the world inspector, Esc quits.

use bevy::app::AppExit;
use bevy::prelude::*;
use bevy_inspector_egui::quick::WorldInspectorPlugin;

use hex_map::GameState;
use hex_map::camera::{CameraConfig, MapCameraPlugin};
use hex_map::editor::{EditorConfig, EditorPlugin};
use hex_map::map::{HexMapConfig, HexMapPlugin};

fn main() {
    #[cfg_attr(not(feature = "native"), allow(unused_mut))]
    let mut map_config = HexMapConfig::default();
    #[cfg(feature = "native")]
    {
        use clap::Parser;
        hex_map::cli::Cli::parse().apply(&mut map_config);
    }

    let mut app = App::new();

    app.add_plugins(DefaultPlugins.set(WindowPlugin {
        primary_window: Some(Window {
            title: "Hex Map Editor".into(),
            ..default()
        }),
        ..default()
    }))
    .register_type::<GameState>()
    .init_state::<GameState>()
    .add_plugins(bevy_egui::EguiPlugin::default())
    .add_plugins(HexMapPlugin(map_config))
    .add_plugins(EditorPlugin(EditorConfig::default()))
    .add_plugins(MapCameraPlugin(CameraConfig::default()))
    .add_systems(Update, exit_on_esc)
    .add_systems(Update, toggle_inspector)
    .add_plugins(WorldInspectorPlugin::new().run_if(in_state(GameState::Inspecting)));

    #[cfg(feature = "native")]
    {
        use bevy::remote::{RemotePlugin, http::RemoteHttpPlugin};
        app.add_plugins(RemotePlugin::default())
            .add_plugins(RemoteHttpPlugin::default());
    }

    app.run();
}

fn toggle_inspector(
    keys: Res<ButtonInput<KeyCode>>,
    state: Res<State<GameState>>,
    mut next: ResMut<NextState<GameState>>,
) {
    if keys.just_pressed(KeyCode::Tab) {
        next.set(match state.get() {
            GameState::Editing => GameState::Inspecting,
            GameState::Inspecting => GameState::Editing,
        });
    }
}

fn exit_on_esc(keys: Res<ButtonInput<KeyCode>>, mut exit: MessageWriter<AppExit>) {
    if keys.just_pressed(KeyCode::Escape) {
        exit.write(AppExit::Success);
    }
}
