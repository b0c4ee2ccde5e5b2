#![forbid(unsafe_code)]

//! Host page decisions that do not touch the DOM.

/// User-agent fragments that mark a mobile browser.
const MOBILE_UA_MARKERS: [&str; 4] = ["iphone", "ipad", "ipod", "android"];

/// How the host page presents the game.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageMode {
    /// Load the game into the embedded surface right away.
    Embedded,
    /// Show the start container; the start button navigates to the game page.
    StartScreen,
}

impl PageMode {
    #[must_use]
    pub fn for_user_agent(user_agent: &str) -> Self {
        if is_mobile_user_agent(user_agent) {
            Self::StartScreen
        } else {
            Self::Embedded
        }
    }
}

/// Case-insensitive check for iOS/Android user agents.
#[must_use]
pub fn is_mobile_user_agent(user_agent: &str) -> bool {
    let ua = user_agent.to_ascii_lowercase();
    MOBILE_UA_MARKERS.iter().any(|marker| ua.contains(marker))
}
