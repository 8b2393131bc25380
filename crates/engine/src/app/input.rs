/// Held actions, sampled as "is this currently down" every tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputAction {
    MoveLeft,
    MoveRight,
    Jump,
    Quit,
}

const ACTION_COUNT: usize = 4;

impl InputAction {
    const fn index(self) -> usize {
        match self {
            InputAction::MoveLeft => 0,
            InputAction::MoveRight => 1,
            InputAction::Jump => 2,
            InputAction::Quit => 3,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct ActionStates {
    down: [bool; ACTION_COUNT],
}

impl ActionStates {
    pub(crate) fn set(&mut self, action: InputAction, is_down: bool) {
        self.down[action.index()] = is_down;
    }

    pub(crate) fn is_down(&self, action: InputAction) -> bool {
        self.down[action.index()]
    }
}

/// One-shot commands. Each fires once per press-and-release.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputCommand {
    AddTrampoline,
    AddPlatform,
    RemoveLast,
    ToggleEditor,
    ClearAll,
    NextTool,
    PreviousTool,
    SaveLevel,
    SaveLevelAs,
    ReloadLevel,
    NextLevel,
    DeleteLevel,
}

const COMMAND_COUNT: usize = 12;

impl InputCommand {
    pub const ALL: [InputCommand; COMMAND_COUNT] = [
        InputCommand::AddTrampoline,
        InputCommand::AddPlatform,
        InputCommand::RemoveLast,
        InputCommand::ToggleEditor,
        InputCommand::ClearAll,
        InputCommand::NextTool,
        InputCommand::PreviousTool,
        InputCommand::SaveLevel,
        InputCommand::ReloadLevel,
        InputCommand::NextLevel,
        InputCommand::SaveLevelAs,
        InputCommand::DeleteLevel,
    ];

    const fn index(self) -> usize {
        match self {
            InputCommand::AddTrampoline => 0,
            InputCommand::AddPlatform => 1,
            InputCommand::RemoveLast => 2,
            InputCommand::ToggleEditor => 3,
            InputCommand::ClearAll => 4,
            InputCommand::NextTool => 5,
            InputCommand::PreviousTool => 6,
            InputCommand::SaveLevel => 7,
            InputCommand::ReloadLevel => 8,
            InputCommand::NextLevel => 9,
            InputCommand::SaveLevelAs => 10,
            InputCommand::DeleteLevel => 11,
        }
    }
}

/// Previous/current key state per command, diffed once per tick.
#[derive(Debug, Clone, Copy, Default)]
pub struct CommandStates {
    previous: [bool; COMMAND_COUNT],
    current: [bool; COMMAND_COUNT],
}

impl CommandStates {
    pub fn set_down(&mut self, command: InputCommand, is_down: bool) {
        self.current[command.index()] = is_down;
    }

    pub fn is_down(&self, command: InputCommand) -> bool {
        self.current[command.index()]
    }

    /// Commands that went up->down since the last call, then rolls `previous` forward.
    pub fn pressed_edges(&mut self) -> CommandEdges {
        let mut edges = CommandEdges::default();
        for command in InputCommand::ALL {
            let idx = command.index();
            edges.pressed[idx] = self.current[idx] && !self.previous[idx];
        }
        self.previous = self.current;
        edges
    }
}

/// Commands that fired this tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CommandEdges {
    pressed: [bool; COMMAND_COUNT],
}

impl CommandEdges {
    pub(crate) fn set(&mut self, command: InputCommand, pressed: bool) {
        self.pressed[command.index()] = pressed;
    }

    pub fn pressed(&self, command: InputCommand) -> bool {
        self.pressed[command.index()]
    }
}
