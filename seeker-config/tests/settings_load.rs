use seeker_common::BrowserName;
use seeker_config::{LlmSettings, SeekerConfigLoader};
use serial_test::serial;
use std::{fs, path::PathBuf};
use tempfile::TempDir;

/// Helper to write a YAML file in a temp dir and return its path.
fn write_yaml(tmp: &TempDir, name: &str, yaml: &str) -> PathBuf {
    let p = tmp.path().join(name);
    fs::write(&p, yaml).expect("write yaml");
    p
}

const FILE_YAML: &str = r#"
llm:
  provider: openai
  model: "gpt-4o-mini"
  auth_token: "${SEEKER_IT_TOKEN}"
  endpoint: "https://gateway.example/v1"
browser:
  headless: false
  stealth: maximum
  webdriver:
    firefox: "http://127.0.0.1:4455"
search:
  max_pages: 3
"#;

#[test]
#[serial]
fn file_values_are_loaded_and_expanded() {
    let tmp = TempDir::new().unwrap();
    let p = write_yaml(&tmp, "seeker.yaml", FILE_YAML);

    temp_env::with_var("SEEKER_IT_TOKEN", Some("sk-from-env"), || {
        let settings = SeekerConfigLoader::new().with_file(&p).load().expect("load");

        match &settings.llm {
            LlmSettings::Openai {
                model,
                auth_token,
                endpoint,
                temperature,
                ..
            } => {
                assert_eq!(model, "gpt-4o-mini");
                assert_eq!(auth_token, "sk-from-env");
                assert_eq!(endpoint, "https://gateway.example/v1");
                assert!((temperature - 0.2).abs() < f32::EPSILON);
            }
            other => panic!("expected openai settings, got {other:?}"),
        }

        assert!(!settings.browser.headless);
        assert_eq!(
            settings.browser.webdriver.for_browser(BrowserName::Firefox),
            "http://127.0.0.1:4455"
        );
        assert_eq!(
            settings.browser.webdriver.for_browser(BrowserName::Chrome),
            "http://localhost:9515"
        );
        assert_eq!(settings.search.max_pages, 3);
        assert_eq!(settings.search.max_chars_per_page, 6000);
    });
}

#[test]
#[serial]
fn environment_overrides_win_over_files() {
    let tmp = TempDir::new().unwrap();
    let p = write_yaml(&tmp, "seeker.yaml", FILE_YAML);

    temp_env::with_vars(
        [
            ("SEEKER_IT_TOKEN", Some("sk")),
            ("SEEKER__SEARCH__MAX_PAGES", Some("7")),
            ("SEEKER__BROWSER__HEADLESS", Some("true")),
        ],
        || {
            let settings = SeekerConfigLoader::new().with_file(&p).load().expect("load");
            assert_eq!(settings.search.max_pages, 7);
            assert!(settings.browser.headless);
        },
    );
}

#[test]
#[serial]
fn missing_optional_file_falls_back_to_defaults() {
    let tmp = TempDir::new().unwrap();
    let settings = SeekerConfigLoader::new()
        .with_optional_file(tmp.path().join("absent.yaml"))
        .load()
        .expect("defaults");

    assert_eq!(settings.search.min_content_chars, 200);
    assert_eq!(settings.browser.page_load_timeout().as_secs(), 20);
    assert!(matches!(settings.llm, LlmSettings::Openai { .. }));
}

#[test]
#[serial]
fn missing_required_file_is_an_error() {
    let tmp = TempDir::new().unwrap();
    let result = SeekerConfigLoader::new()
        .with_file(tmp.path().join("absent.yaml"))
        .load();
    assert!(result.is_err());
}
