use keymap::KeyMap;

#[derive(KeyMap, Clone, Copy, Debug, PartialEq)]
pub enum Action {
    /// Quit the application
    #[key("q")]
    Quit,
    /// Restart the animation from the seed
    #[key("r")]
    Restart,
    /// Advance the animation by one tick
    #[key("space")]
    Tick,
    /// Toggle auto-play
    #[key("p")]
    ToggleAutoPlay,
    /// Search for a new random rule set
    #[key("n")]
    NewSearch,
    /// Edit the rules as text
    #[key("e")]
    EditRules,
    /// Toggle help display
    #[key("h")]
    ToggleHelp,
    /// Load the previous preset
    #[key("left")]
    PreviousPreset,
    /// Load the next preset
    #[key("right")]
    NextPreset,
}
