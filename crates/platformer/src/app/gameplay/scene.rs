use engine::{
    screen_to_world_px, DrawList, DrawRect, InputCommand, InputSnapshot, MetricsHandle, Scene,
    SceneCommand, Vec2,
};
use tracing::{debug, info, warn};

use super::editor::{
    apply_tool, default_platform, default_trampoline, erase_at, place_entity,
    quick_place_position,
};
use super::physics::{self, TickOutcome};
use super::{
    demo_level, EditOutcome, EditorState, Entity, EntityKind, EntityTag, MovementInput,
    PhysicsConfig, PlatformerWorld, DEMO_START,
};
use crate::app::level_store::{LevelRepository, LevelStore, LoadReport, DEMO_LEVEL_NAME};

const SKY_COLOR: [u8; 3] = [24, 28, 44];
const GROUND_COLOR: [u8; 3] = [70, 56, 44];
const GROUND_STRIP_HEIGHT: f32 = 4.0;
const SOLID_COLOR: [u8; 3] = [112, 86, 62];
const TRAMPOLINE_COLOR: [u8; 3] = [222, 64, 96];
const STAR_COLOR: [u8; 3] = [250, 212, 64];
const PLAYER_START_COLOR: [u8; 3] = [70, 200, 110];
const PLAYER_START_ALPHA: f32 = 0.5;
const CHARACTER_COLOR: [u8; 3] = [64, 124, 226];

/// Session orchestrator: owns the live world, the level store and the editor, and runs the
/// per-tick order commands, clicks, physics, reset, cosmetics.
pub(crate) struct PlatformerScene {
    world: PlatformerWorld,
    store: LevelStore<Box<dyn LevelRepository>>,
    editor: EditorState,
    config: PhysicsConfig,
    current_level: String,
    status: String,
    store_notice: Option<String>,
    metrics: Option<MetricsHandle>,
}

impl PlatformerScene {
    pub(crate) fn new(repository: Box<dyn LevelRepository>, config: PhysicsConfig) -> Self {
        let world = PlatformerWorld::new(config.spawn_character(DEMO_START), DEMO_START);
        Self {
            world,
            store: LevelStore::new(repository),
            editor: EditorState::default(),
            config,
            current_level: DEMO_LEVEL_NAME.to_string(),
            status: String::new(),
            store_notice: None,
            metrics: None,
        }
    }

    /// Shows the loop's measured frame rate in the debug title.
    pub(crate) fn with_metrics(mut self, metrics: MetricsHandle) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Shown in place of the load status when the store will not outlive the session.
    pub(crate) fn with_store_notice(mut self, notice: impl Into<String>) -> Self {
        self.store_notice = Some(notice.into());
        self
    }

    fn set_status(&mut self, status: impl Into<String>) {
        self.status = status.into();
    }

    fn apply_commands(&mut self, input: &InputSnapshot) {
        if input.pressed(InputCommand::ToggleEditor) {
            let enabled = self.editor.toggle();
            info!(enabled, "editor_toggled");
            self.set_status(if enabled { "editor on" } else { "editor off" });
        }
        if input.pressed(InputCommand::NextTool) {
            let tool = self.editor.select_next_tool();
            debug!(tool = tool.label(), "tool_selected");
        }
        if input.pressed(InputCommand::PreviousTool) {
            let tool = self.editor.select_previous_tool();
            debug!(tool = tool.label(), "tool_selected");
        }
        if input.pressed(InputCommand::AddPlatform) {
            let position = quick_place_position(self.world.character());
            self.place(default_platform(position));
        }
        if input.pressed(InputCommand::AddTrampoline) {
            let position = quick_place_position(self.world.character());
            self.place(default_trampoline(position));
        }
        if input.pressed(InputCommand::RemoveLast) {
            match self.world.remove_last() {
                Some(entity) => {
                    debug!(kind = entity.tag().as_str(), "entity_removed");
                    self.set_status(format!("removed {}", entity.tag().as_str()));
                }
                None => self.set_status("nothing to remove"),
            }
        }
        if input.pressed(InputCommand::ClearAll) {
            let removed = self.world.entity_count();
            self.world.clear();
            info!(removed, "entities_cleared");
            self.set_status(format!("cleared {removed} entities"));
        }
        if input.pressed(InputCommand::SaveLevel) {
            self.save_current_level();
        }
        if input.pressed(InputCommand::SaveLevelAs) {
            self.save_as_new_level();
        }
        if input.pressed(InputCommand::ReloadLevel) {
            let name = self.current_level.clone();
            self.load_level(&name);
        }
        if input.pressed(InputCommand::NextLevel) {
            self.load_next_level();
        }
        if input.pressed(InputCommand::DeleteLevel) {
            self.delete_current_level();
        }
    }

    fn apply_clicks(&mut self, input: &InputSnapshot) {
        if !input.left_click_pressed() && !input.right_click_pressed() {
            return;
        }
        let Some(cursor) = input.cursor_position_px() else {
            return;
        };
        let position = screen_to_world_px(input.window_size(), self.config.world_size, cursor);
        if input.left_click_pressed() {
            let outcome = apply_tool(&mut self.world, self.editor.active_tool(), position);
            self.report_edit(outcome);
        }
        if input.right_click_pressed() {
            let outcome = erase_at(&mut self.world, position);
            self.report_edit(outcome);
        }
    }

    fn place(&mut self, entity: Entity) {
        let outcome = place_entity(&mut self.world, entity);
        self.report_edit(outcome);
    }

    fn report_edit(&mut self, outcome: EditOutcome) {
        match outcome {
            EditOutcome::Placed {
                index,
                tag,
                evicted,
            } => {
                debug!(index, kind = tag.as_str(), evicted, "entity_placed");
                self.set_status(format!("placed {}", tag.as_str()));
            }
            EditOutcome::Erased { index, entity } => {
                debug!(index, kind = entity.tag().as_str(), "entity_erased");
                self.set_status(format!("erased {}", entity.tag().as_str()));
            }
            EditOutcome::Missed => self.set_status("nothing to erase"),
        }
    }

    fn save_current_level(&mut self) {
        let name = self.current_level.clone();
        self.save_level(&name);
    }

    fn save_as_new_level(&mut self) {
        let names = match self.store.list() {
            Ok(names) => names,
            Err(error) => {
                warn!(error = %error, "level_list_failed");
                self.set_status(format!("list failed: {error}"));
                return;
            }
        };
        let name = unused_level_name(&names);
        if self.save_level(&name) {
            self.current_level = name;
        }
    }

    fn save_level(&mut self, name: &str) -> bool {
        match self
            .store
            .save(name, self.world.entities(), self.world.default_start())
        {
            Ok(()) => {
                info!(
                    level = %name,
                    entity_count = self.world.entity_count(),
                    "level_saved"
                );
                self.set_status(format!("saved '{name}'"));
                true
            }
            Err(error) => {
                warn!(level = %name, error = %error, "level_save_failed");
                self.set_status(format!("save failed: {error}"));
                false
            }
        }
    }

    /// Deletes the current level, then loads whatever startup would pick now. Deleting the
    /// last stored level reseeds the demo.
    fn delete_current_level(&mut self) {
        let name = self.current_level.clone();
        if let Err(error) = self.store.delete(&name) {
            warn!(level = %name, error = %error, "level_delete_failed");
            self.set_status(format!("delete failed: {error}"));
            return;
        }
        info!(level = %name, "level_deleted");
        match self
            .store
            .bootstrap(&mut self.world, &demo_level(), DEMO_START)
        {
            Ok(report) => {
                self.finish_load(report);
                self.set_status(format!("deleted '{name}', now '{}'", self.current_level));
            }
            Err(error) => {
                warn!(error = %error, "level_load_failed");
                self.set_status(format!("deleted '{name}', load failed: {error}"));
            }
        }
    }

    fn load_level(&mut self, name: &str) {
        match self.store.load(name, &mut self.world) {
            Ok(report) => self.finish_load(report),
            Err(error) => {
                warn!(level = %name, error = %error, "level_load_failed");
                self.set_status(format!("load failed: {error}"));
            }
        }
    }

    fn load_next_level(&mut self) {
        let mut names = match self.store.list() {
            Ok(names) => names,
            Err(error) => {
                warn!(error = %error, "level_list_failed");
                self.set_status(format!("list failed: {error}"));
                return;
            }
        };
        names.sort();
        let Some(next) = next_level_name(&names, &self.current_level) else {
            self.set_status("no stored levels");
            return;
        };
        let next = next.to_string();
        self.load_level(&next);
    }

    fn finish_load(&mut self, report: LoadReport) {
        info!(
            level = %report.name,
            entity_count = report.entity_count,
            skipped = report.skipped,
            "level_loaded"
        );
        self.set_status(if report.skipped == 0 {
            format!("loaded '{}'", report.name)
        } else {
            format!("loaded '{}' ({} skipped)", report.name, report.skipped)
        });
        self.current_level = report.name;
    }

    fn apply_tick_outcome(&mut self, outcome: TickOutcome) {
        if outcome.stars_collected > 0 {
            debug!(count = outcome.stars_collected, "stars_collected");
        }
        if outcome.fell_off {
            self.world.reset_world();
            info!(level = %self.current_level, "world_reset");
        }
    }

    fn stars_progress(&self) -> (usize, usize) {
        let total = self.world.count_tag(EntityTag::Star);
        let collected = self
            .world
            .entities()
            .iter()
            .filter(|entity| entity.is_collected())
            .count();
        (collected, total)
    }
}

/// The name after `current` in `sorted`, wrapping. Falls back to the first name when `current`
/// is not stored.
fn next_level_name<'a>(sorted: &'a [String], current: &str) -> Option<&'a str> {
    let first = sorted.first()?;
    let next = sorted
        .iter()
        .position(|name| name == current)
        .map(|index| &sorted[(index + 1) % sorted.len()])
        .unwrap_or(first);
    Some(next.as_str())
}

fn unused_level_name(names: &[String]) -> String {
    let mut number = 1usize;
    loop {
        let candidate = format!("Level {number}");
        if !names.contains(&candidate) {
            return candidate;
        }
        number += 1;
    }
}

fn entity_rect(entity: &Entity) -> DrawRect {
    let bounds = entity.bounds();
    let color = match entity.kind() {
        EntityKind::Solid { .. } => SOLID_COLOR,
        EntityKind::Trampoline { .. } => TRAMPOLINE_COLOR,
        EntityKind::Star { .. } => STAR_COLOR,
        EntityKind::PlayerStart => PLAYER_START_COLOR,
    };
    let visual = entity.visual();
    let alpha = if entity.tag() == EntityTag::PlayerStart {
        PLAYER_START_ALPHA
    } else {
        visual.alpha()
    };
    DrawRect {
        alpha,
        scale: visual.scale(),
        ..DrawRect::solid(bounds.position, bounds.size, color)
    }
}

impl Scene for PlatformerScene {
    fn load(&mut self) {
        match self
            .store
            .bootstrap(&mut self.world, &demo_level(), DEMO_START)
        {
            Ok(report) => {
                self.finish_load(report);
                if let Some(notice) = self.store_notice.clone() {
                    self.set_status(notice);
                }
            }
            Err(error) => {
                warn!(error = %error, "level_bootstrap_failed");
                self.world.replace(demo_level(), DEMO_START);
                self.world.respawn_character();
                self.current_level = DEMO_LEVEL_NAME.to_string();
                self.set_status("level store unavailable, playing unsaved demo");
            }
        }
        info!(
            level = %self.current_level,
            entity_count = self.world.entity_count(),
            "scene_loaded"
        );
    }

    fn update(&mut self, fixed_dt_seconds: f32, input: &InputSnapshot) -> SceneCommand {
        self.apply_commands(input);
        if self.editor.enabled() {
            self.apply_clicks(input);
        }

        let outcome = physics::step(
            &mut self.world,
            MovementInput::from_snapshot(input),
            &self.config,
        );
        self.apply_tick_outcome(outcome);
        self.world.tick_visuals(fixed_dt_seconds);

        SceneCommand::None
    }

    fn render(&mut self, draw_list: &mut DrawList) {
        draw_list.begin(self.config.world_size, SKY_COLOR);
        if let Some(ground_y) = self.config.ground_line {
            draw_list.push(DrawRect::solid(
                Vec2::new(0.0, ground_y - GROUND_STRIP_HEIGHT),
                Vec2::new(self.config.world_size.x, GROUND_STRIP_HEIGHT),
                GROUND_COLOR,
            ));
        }
        for entity in self.world.entities() {
            // start markers are editor-only
            if entity.tag() == EntityTag::PlayerStart && !self.editor.enabled() {
                continue;
            }
            draw_list.push(entity_rect(entity));
        }
        let character = self.world.character().bounds();
        draw_list.push(DrawRect::solid(
            character.position,
            character.size,
            CHARACTER_COLOR,
        ));
    }

    fn unload(&mut self) {
        info!(level = %self.current_level, "scene_unloaded");
    }

    fn debug_title(&self) -> Option<String> {
        let mode = if self.editor.enabled() {
            format!("edit [{}]", self.editor.active_tool().label())
        } else {
            "play".to_string()
        };
        let (collected, total) = self.stars_progress();
        let mut title = format!(
            "{} | {mode} | stars {collected}/{total}",
            self.current_level
        );
        if let Some(fps) = self
            .metrics
            .as_ref()
            .map(|metrics| metrics.snapshot().fps)
            .filter(|fps| *fps > 0.0)
        {
            title.push_str(&format!(" | {fps:.0} fps"));
        }
        if !self.status.is_empty() {
            title.push_str(" | ");
            title.push_str(&self.status);
        }
        Some(title)
    }
}
