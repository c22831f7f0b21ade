//! WebDriver capabilities for one browser context.
//!
//! Chromium-family browsers get the session directory as `--user-data-dir`
//! and lose scripting through a content-settings pref. Firefox gets it as
//! `-profile` and loses scripting through `javascript.enabled`.
use super::fingerprint::UserAgentProfile;
use super::stealth::build_stealth_arguments;
use seeker_common::{BrowserName, ScriptMode, StealthLevel};
use serde_json::{json, Map, Value};
use std::path::Path;
use webdriver::capabilities::Capabilities;

/// Everything that shapes a context at launch.
#[derive(Debug, Clone)]
pub struct ContextOptions<'a> {
    pub browser: BrowserName,
    pub session_dir: &'a Path,
    pub scripts: ScriptMode,
    pub headless: bool,
    pub stealth: StealthLevel,
    pub profile: &'a UserAgentProfile,
}

/// Chromium content setting value that blocks JavaScript.
const CHROMIUM_BLOCK: u8 = 2;

pub fn build_capabilities(opts: &ContextOptions<'_>) -> Capabilities {
    let mut caps = Capabilities::new();
    match opts.browser {
        BrowserName::Chrome => {
            caps.insert("browserName".into(), json!("chrome"));
            caps.insert("goog:chromeOptions".into(), chromium_options(opts));
        }
        BrowserName::Edge => {
            caps.insert("browserName".into(), json!("MicrosoftEdge"));
            caps.insert("ms:edgeOptions".into(), chromium_options(opts));
        }
        BrowserName::Firefox => {
            caps.insert("browserName".into(), json!("firefox"));
            caps.insert("moz:firefoxOptions".into(), firefox_options(opts));
        }
    }
    caps
}

fn chromium_options(opts: &ContextOptions<'_>) -> Value {
    let mut args = build_stealth_arguments(opts.stealth, opts.profile);
    args.push(format!("--user-data-dir={}", opts.session_dir.display()));
    if opts.headless {
        args.push("--headless=new".to_string());
    }

    let mut options = Map::new();
    options.insert("args".into(), json!(args));
    options.insert("excludeSwitches".into(), json!(["enable-automation"]));
    if !opts.scripts.is_enabled() {
        options.insert(
            "prefs".into(),
            json!({ "profile.managed_default_content_settings.javascript": CHROMIUM_BLOCK }),
        );
    }
    Value::Object(options)
}

fn firefox_options(opts: &ContextOptions<'_>) -> Value {
    let mut args = vec![
        "-profile".to_string(),
        opts.session_dir.display().to_string(),
    ];
    if opts.headless {
        args.push("-headless".to_string());
    }

    let mut prefs = Map::new();
    prefs.insert(
        "intl.accept_languages".into(),
        json!(opts.profile.languages.join(",")),
    );
    if opts.stealth != StealthLevel::Lightweight {
        prefs.insert("dom.webdriver.enabled".into(), json!(false));
    }
    if !opts.scripts.is_enabled() {
        prefs.insert("javascript.enabled".into(), json!(false));
    }

    json!({ "args": args, "prefs": prefs })
}
