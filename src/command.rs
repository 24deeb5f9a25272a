use crate::foundation::error::TimemaskError;
use crate::settings::Settings;

/// Closed set of control commands accepted from the keyboard or a remote.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Command {
    ToggleHud,
    ToggleMirrored,
    ToggleMask,
    ToggleInset,
    ToggleAutoAdvance,
    SaveFrame,
    PrevMask,
    NextMask,
    DecDuration,
    IncDuration,
    LoadSettings,
}

impl Command {
    pub const ALL: [Command; 11] = [
        Command::ToggleHud,
        Command::ToggleMirrored,
        Command::ToggleMask,
        Command::ToggleInset,
        Command::ToggleAutoAdvance,
        Command::SaveFrame,
        Command::PrevMask,
        Command::NextMask,
        Command::DecDuration,
        Command::IncDuration,
        Command::LoadSettings,
    ];

    /// Remote wire name.
    pub fn name(self) -> &'static str {
        match self {
            Command::ToggleHud => "toggleHud",
            Command::ToggleMirrored => "toggleMirrored",
            Command::ToggleMask => "toggleMask",
            Command::ToggleInset => "toggleInset",
            Command::ToggleAutoAdvance => "toggleAutoAdvance",
            Command::SaveFrame => "saveFrame",
            Command::PrevMask => "prevMask",
            Command::NextMask => "nextMask",
            Command::DecDuration => "decDuration",
            Command::IncDuration => "incDuration",
            Command::LoadSettings => "loadSettings",
        }
    }

    pub fn key(self) -> char {
        match self {
            Command::ToggleHud => 'h',
            Command::ToggleMirrored => 'm',
            Command::ToggleMask => 't',
            Command::ToggleInset => 'i',
            Command::ToggleAutoAdvance => 'a',
            Command::SaveFrame => 'r',
            Command::PrevMask => 'b',
            Command::NextMask => 'n',
            Command::DecDuration => '[',
            Command::IncDuration => ']',
            Command::LoadSettings => 'l',
        }
    }

    pub fn from_key(key: char) -> Option<Self> {
        let key = key.to_ascii_lowercase();
        Self::ALL.into_iter().find(|c| c.key() == key)
    }

    /// Apply the settings part of the command. Returns whether settings changed and should be
    /// persisted; mask navigation, frame saving and reloads are left to the caller.
    pub fn apply(self, settings: &mut Settings) -> bool {
        match self {
            Command::ToggleHud => settings.show_hud = !settings.show_hud,
            Command::ToggleMirrored => settings.mirrored = !settings.mirrored,
            Command::ToggleMask => settings.show_mask = !settings.show_mask,
            Command::ToggleInset => settings.show_inset = !settings.show_inset,
            Command::ToggleAutoAdvance => settings.auto_advance = !settings.auto_advance,
            Command::DecDuration => settings.decrease_duration(),
            Command::IncDuration => settings.increase_duration(),
            Command::SaveFrame | Command::PrevMask | Command::NextMask | Command::LoadSettings => {
                return false;
            }
        }
        true
    }
}

impl std::str::FromStr for Command {
    type Err = TimemaskError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|c| c.name() == s)
            .ok_or_else(|| TimemaskError::validation(format!("unknown command '{s}'")))
    }
}

impl std::fmt::Display for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
